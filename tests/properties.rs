use domhmm::{
    Alphabet, DecodeMode, ProbMatrix, ProfileHmm, State, StepBound, Topology, TrainConfig,
};
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn alignment_rows() -> impl Strategy<Value = Vec<Vec<u8>>> {
    (1usize..6, 1usize..8).prop_flat_map(|(rows, width)| {
        let symbol = prop_oneof![
            Just(b'A'),
            Just(b'C'),
            Just(b'G'),
            Just(b'T'),
            Just(b'-'),
        ];
        proptest::collection::vec(proptest::collection::vec(symbol, width), rows)
    })
}

fn sequence(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], len)
}

fn acgt() -> Alphabet {
    Alphabet::new(b"ACGT").unwrap()
}

// log Pr{seq, path} of a bracketed path, walking from Start.
fn bracketed_joint(hmm: &ProfileHmm, path: &[State], seq: &[u8]) -> f64 {
    let seq = hmm.alphabet().encode(seq).unwrap();
    let path = hmm.state_indices(path).unwrap();
    let (mut lk, mut prev, mut pos) = (0f64, 0, 0);
    for &state in path.iter() {
        lk += hmm.transition(prev, state).ln();
        if hmm.topology().state(state).is_emitting() {
            lk += hmm.emission(state, seq[pos]).ln();
            pos += 1;
        }
        prev = state;
    }
    assert_eq!(pos, seq.len());
    lk
}

proptest! {
    #[test]
    fn rows_are_distributions(
        rows in alignment_rows(),
        threshold in 0.05f64..1f64,
        pseudocount in prop_oneof![Just(0f64), 0.001f64..0.5],
    ) {
        let config = TrainConfig::new(threshold, pseudocount);
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &config).unwrap();
        let topology = hmm.topology();
        let edges = topology.profile_edges().unwrap();
        for (i, state) in topology.states().iter().enumerate() {
            let sum = hmm.transitions().row_sum(i);
            prop_assert!(sum == 0f64 || (sum - 1f64).abs() < 1e-9, "{} {}", state, sum);
            let sum = hmm.emissions().row_sum(i);
            if state.is_silent() {
                prop_assert!(hmm.emissions().is_zero_row(i));
            } else {
                prop_assert!(sum == 0f64 || (sum - 1f64).abs() < 1e-9, "{} {}", state, sum);
            }
            for j in 0..hmm.num_states() {
                if edges.binary_search(&(i, j)).is_err() {
                    prop_assert_eq!(hmm.transition(i, j), 0f64);
                }
            }
        }
        prop_assert!(hmm.transitions().is_zero_row(hmm.num_states() - 1));
    }

    #[test]
    fn pseudocount_keeps_support(
        rows in alignment_rows(),
        threshold in 0.05f64..1f64,
        smaller in prop_oneof![Just(0f64), 0.001f64..0.25],
        increment in 0.001f64..0.25,
    ) {
        let pseudocount = smaller + increment;
        let lower = ProfileHmm::train_from_rows(&rows, &acgt(), &TrainConfig::new(threshold, smaller)).unwrap();
        let smooth = ProfileHmm::train_from_rows(&rows, &acgt(), &TrainConfig::new(threshold, pseudocount)).unwrap();
        prop_assert_eq!(lower.topology(), smooth.topology());
        for (i, j) in smooth.topology().profile_edges().unwrap() {
            prop_assert!(0f64 < smooth.transition(i, j));
        }
        for i in 0..lower.num_states() {
            for j in 0..lower.num_states() {
                if 0f64 < lower.transition(i, j) {
                    prop_assert!(0f64 < smooth.transition(i, j));
                }
            }
            for x in 0..lower.alphabet().len() {
                if 0f64 < lower.emission(i, x) {
                    prop_assert!(0f64 < smooth.emission(i, x));
                }
            }
        }
    }

    #[test]
    fn forward_ignores_state_order(
        rows in alignment_rows(),
        seq in sequence(1..7),
        seed in any::<u64>(),
    ) {
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &TrainConfig::default()).unwrap();
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..hmm.num_states()).collect();
        order.shuffle(&mut rng);
        let states: Vec<_> = order.iter().map(|&i| hmm.topology().state(i)).collect();
        let topology = Topology::from_states(states).unwrap();
        let mut transition = ProbMatrix::zeros(order.len(), order.len());
        let mut emission = ProbMatrix::zeros(order.len(), hmm.alphabet().len());
        for (new_from, &from) in order.iter().enumerate() {
            for (new_to, &to) in order.iter().enumerate() {
                *transition.get_mut(new_from, new_to) = hmm.transition(from, to);
            }
            emission.row_mut(new_from).copy_from_slice(hmm.emissions().row(from));
        }
        let shuffled = ProfileHmm::new(topology, hmm.alphabet().clone(), transition, emission).unwrap();
        let x = hmm.forward(&seq).unwrap();
        let y = shuffled.forward(&seq).unwrap();
        prop_assert!((x - y).abs() <= 1e-9 * x.max(y), "{},{}", x, y);
    }

    #[test]
    fn open_viterbi_is_optimal(
        transition in proptest::collection::vec(0.01f64..1f64, 9),
        emission in proptest::collection::vec(0.01f64..1f64, 6),
        seq in proptest::collection::vec(prop_oneof![Just(b'x'), Just(b'y')], 1..6),
    ) {
        let topology = Topology::from_labels(&["I0", "M1", "I1"]).unwrap();
        let alphabet = Alphabet::new(b"xy").unwrap();
        let mut transition = ProbMatrix::from_rows(&[&transition[0..3], &transition[3..6], &transition[6..9]]).unwrap();
        let mut emission = ProbMatrix::from_rows(&[&emission[0..2], &emission[2..4], &emission[4..6]]).unwrap();
        transition.normalize_rows();
        emission.normalize_rows();
        let hmm = ProfileHmm::new(topology, alphabet, transition, emission).unwrap();
        prop_assert_eq!(DecodeMode::infer(&hmm), DecodeMode::Open);
        let (path, lk) = hmm.viterbi(DecodeMode::Open, &seq).unwrap();
        prop_assert_eq!(path.len(), seq.len());
        let encoded = hmm.alphabet().encode(&seq).unwrap();
        let joint = |path: &[usize]| -> f64 {
            let mut lk = (3f64).recip().ln() + hmm.emission(path[0], encoded[0]).ln();
            for t in 1..path.len() {
                lk += hmm.transition(path[t - 1], path[t]).ln() + hmm.emission(path[t], encoded[t]).ln();
            }
            lk
        };
        let own = hmm.state_indices(&path).unwrap();
        prop_assert!((joint(&own) - lk).abs() < 1e-9);
        let n = seq.len() as u32;
        for code in 0..3usize.pow(n) {
            let other: Vec<usize> = (0..n).map(|i| code / 3usize.pow(i) % 3).collect();
            prop_assert!(joint(&other) <= lk + 1e-9);
        }
    }

    #[test]
    fn bracketed_viterbi_beats_insert_only_path(
        rows in alignment_rows(),
        seq in sequence(1..7),
    ) {
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &TrainConfig::default()).unwrap();
        let (path, lk) = hmm.viterbi(DecodeMode::Bracketed, &seq).unwrap();
        prop_assert_eq!(path.last(), Some(&State::End));
        prop_assert!(!path.contains(&State::Start));
        prop_assert!((bracketed_joint(&hmm, &path, &seq) - lk).abs() < 1e-9);
        // Stay in I0, then delete every column.
        let k = hmm.topology().consensus_len();
        let mut other = vec![State::Insert(0); seq.len()];
        other.extend((1..=k).map(State::Delete));
        other.push(State::End);
        prop_assert!(bracketed_joint(&hmm, &other, &seq) <= lk + 1e-9);
        prop_assert!(0f64 < hmm.path_probability(DecodeMode::Bracketed, &path).unwrap());
    }

    #[test]
    fn sampled_paths_are_possible(
        rows in alignment_rows(),
        pseudocount in prop_oneof![Just(0f64), 0.001f64..0.5],
        seed in any::<u64>(),
    ) {
        let config = TrainConfig::new(0.5, pseudocount);
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &config).unwrap();
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
        for bound in [StepBound::FixedSteps, StepBound::UntilEnd { max_steps: 50 }].iter() {
            let path = hmm.sample_path(&mut rng, *bound);
            prop_assert!(!path.is_empty());
            prop_assert!(0f64 < hmm.path_probability(DecodeMode::Bracketed, &path).unwrap());
            let seq = hmm.sample_sequence(&path, &mut rng).unwrap();
            prop_assert_eq!(seq.len(), path.iter().filter(|s| s.is_emitting()).count());
        }
    }
}
