const SEED: u64 = 1293890;
const NUM_ROWS: usize = 30;
const TEMPLATE_LEN: usize = 100;
const NUM_QUERY: usize = 10;
fn main() -> domhmm::Result<()> {
    use domhmm::gen_seq::{self, CONSERVED_PROFILE, PROFILE};
    use domhmm::{Alphabet, DecodeMode, ProfileHmm, TrainConfig};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(SEED);
    let alphabet = Alphabet::amino_acids();
    let template = gen_seq::generate_seq(&mut rng, TEMPLATE_LEN);
    for (name, prof) in [("Conserved", &CONSERVED_PROFILE), ("Divergent", &PROFILE)].iter() {
        let rows = gen_seq::generate_alignment(&template, NUM_ROWS, &mut rng, prof);
        for &pseudocount in [0f64, 0.01, 0.1].iter() {
            let config = TrainConfig::new(0.4, pseudocount);
            let s = std::time::Instant::now();
            let hmm = ProfileHmm::train_from_rows(&rows, &alphabet, &config)?;
            let e = std::time::Instant::now();
            let time = (e - s).as_millis();
            let k = hmm.topology().consensus_len();
            println!("Train\t{}\t{}\t{}\t{}", name, pseudocount, time, k);
            let null = hmm.null_model();
            for t in 0..NUM_QUERY {
                let member = gen_seq::introduce_randomness(&template, &mut rng, prof);
                let decoy = gen_seq::generate_seq(&mut rng, member.len());
                let member_lk = domhmm::log_likelihood_ratio(hmm.forward(&member)?, null.forward(&member)?);
                let decoy_lk = domhmm::log_likelihood_ratio(hmm.forward(&decoy)?, null.forward(&decoy)?);
                let s = std::time::Instant::now();
                let decoded = match hmm.viterbi(DecodeMode::Bracketed, &member) {
                    Ok((path, lk)) => format!("{}\t{:.2}", path.len(), lk),
                    Err(why) => format!("{}", why),
                };
                let time = (std::time::Instant::now() - s).as_millis();
                println!(
                    "Query\t{}\t{}\t{}\t{:.2}\t{:.2}\t{}\t{}",
                    name, pseudocount, t, member_lk, decoy_lk, decoded, time
                );
            }
        }
    }
    Ok(())
}
