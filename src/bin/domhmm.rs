use clap::{App, Arg, SubCommand};
use domhmm::fasta::FASTARecord;
use domhmm::{DecodeMode, HmmError, ProfileHmm, Result, StepBound, TrainConfig};
#[macro_use]
extern crate log;

fn verbose() -> Arg<'static, 'static> {
    Arg::with_name("verbose")
        .short("v")
        .multiple(true)
        .help("Debug mode")
}

fn model_args(app: App<'static, 'static>) -> App<'static, 'static> {
    app.arg(
        Arg::with_name("transition")
            .long("transition")
            .short("t")
            .value_name("TrMap")
            .takes_value(true)
            .required(true)
            .help("Transition matrix file."),
    )
    .arg(
        Arg::with_name("emission")
            .long("emission")
            .short("e")
            .value_name("EmiMap")
            .takes_value(true)
            .required(true)
            .help("Emission matrix file."),
    )
}

fn query_args(app: App<'static, 'static>) -> App<'static, 'static> {
    app.arg(
        Arg::with_name("sequence")
            .long("sequence")
            .short("s")
            .value_name("SEQ")
            .takes_value(true)
            .conflicts_with("fasta")
            .help("A sequence without gaps."),
    )
    .arg(
        Arg::with_name("fasta")
            .long("fasta")
            .short("f")
            .value_name("FASTA")
            .takes_value(true)
            .help("Sequences in FASTA format. If neither this nor --sequence is given, read stdin."),
    )
}

fn subcommand_build() -> App<'static, 'static> {
    SubCommand::with_name("build")
        .version("0.1")
        .about("Build a profile HMM from a multiple alignment.")
        .arg(verbose())
        .arg(
            Arg::with_name("alignment")
                .long("alignment")
                .short("a")
                .value_name("FILE")
                .takes_value(true)
                .required(true)
                .help("Alignment of a domain family."),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .takes_value(true)
                .default_value("pfam")
                .possible_values(&["pfam", "blast"])
                .help("Format of the alignment."),
        )
        .arg(
            Arg::with_name("domain")
                .long("domain")
                .short("d")
                .takes_value(true)
                .required(true)
                .help("Name of the domain family. Used as the prefix of the output files."),
        )
        .arg(
            Arg::with_name("threshold")
                .long("threshold")
                .takes_value(true)
                .default_value("0.4")
                .help("A column with this fraction of gaps or more is an insert column."),
        )
        .arg(
            Arg::with_name("pseudocount")
                .long("pseudocount")
                .takes_value(true)
                .default_value("0.01")
                .help("Pseudocount added to each legal transition and emission. 0 to disable."),
        )
        .arg(
            Arg::with_name("alphabet")
                .long("alphabet")
                .takes_value(true)
                .default_value("GALMFWKQESPVICYHRNDT")
                .help("Symbols of the sequences."),
        )
        .arg(
            Arg::with_name("outdir")
                .long("outdir")
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Output directory."),
        )
}

fn subcommand_score() -> App<'static, 'static> {
    let app = SubCommand::with_name("score")
        .version("0.1")
        .about("Log-likelihood ratio of sequences between a profile HMM and its null model.")
        .arg(verbose());
    query_args(model_args(app))
}

fn subcommand_decode() -> App<'static, 'static> {
    let app = SubCommand::with_name("decode")
        .version("0.1")
        .about("The most probable state path of sequences.")
        .arg(verbose());
    query_args(model_args(app))
}

fn subcommand_generate() -> App<'static, 'static> {
    let app = SubCommand::with_name("generate")
        .version("0.1")
        .about("Generate fictional domain sequences. FASTA format.")
        .arg(verbose())
        .arg(
            Arg::with_name("num")
                .long("num")
                .short("n")
                .takes_value(true)
                .default_value("10")
                .help("Number of sequences."),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .takes_value(true)
                .default_value("32389")
                .help("Seed"),
        )
        .arg(
            Arg::with_name("until_end")
                .long("until_end")
                .help("Walk until the End state instead of a fixed number of steps."),
        )
        .arg(
            Arg::with_name("max_steps")
                .long("max_steps")
                .takes_value(true)
                .default_value("10000")
                .help("Maximum number of steps with --until_end."),
        );
    model_args(app)
}

fn parse<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Result<T> {
    let value = matches.value_of(name).unwrap_or("");
    value
        .parse()
        .map_err(|_| HmmError::Parse(format!("--{} {}", name, value)))
}

fn load_model(matches: &clap::ArgMatches) -> Result<ProfileHmm> {
    let transition = matches.value_of("transition").unwrap_or("");
    let emission = matches.value_of("emission").unwrap_or("");
    let hmm = ProfileHmm::load(transition, emission)?;
    debug!("MODEL\t{}", hmm.topology());
    Ok(hmm)
}

fn queries(matches: &clap::ArgMatches) -> Result<Vec<FASTARecord>> {
    match matches.value_of("sequence") {
        Some(seq) => {
            let seq = seq.trim().to_ascii_uppercase().into_bytes();
            Ok(vec![("query".to_string(), seq)])
        }
        None => Ok(domhmm::fasta::read_fasta(&matches.value_of("fasta"))?),
    }
}

fn build(matches: &clap::ArgMatches) -> Result<()> {
    let format: domhmm::msa::Format = parse(matches, "format")?;
    let alignment = domhmm::msa::read_alignment(matches.value_of("alignment").unwrap_or(""), format)?;
    let config = TrainConfig::new(parse(matches, "threshold")?, parse(matches, "pseudocount")?);
    let symbols = matches.value_of("alphabet").unwrap_or("");
    let alphabet = domhmm::Alphabet::new(symbols.as_bytes())?;
    let start = std::time::Instant::now();
    let hmm = ProfileHmm::train(&alignment, &alphabet, &config)?;
    let domain = matches.value_of("domain").unwrap_or("");
    let outdir = matches.value_of("outdir").unwrap_or(".");
    let (tr_path, emi_path) = hmm.save(outdir, domain)?;
    info!(
        "Trained {} states in {}ms",
        hmm.num_states(),
        (std::time::Instant::now() - start).as_millis()
    );
    println!("Emission matrix of {} written to {}", domain, emi_path.display());
    println!("Transition matrix of {} written to {}", domain, tr_path.display());
    Ok(())
}

fn score(matches: &clap::ArgMatches) -> Result<()> {
    let hmm = load_model(matches)?;
    let null = hmm.null_model();
    for (id, seq) in queries(matches)? {
        let (model, background) = (hmm.forward(&seq)?, null.forward(&seq)?);
        let ratio = domhmm::log_likelihood_ratio(model, background);
        let verdict = if domhmm::likely_member(ratio) {
            "member"
        } else {
            "null"
        };
        debug!("{}\t{}\t{}", id, model, background);
        println!("{}\t{:.4}\t{}", id, ratio, verdict);
    }
    Ok(())
}

fn decode(matches: &clap::ArgMatches) -> Result<()> {
    let hmm = load_model(matches)?;
    let mode = DecodeMode::infer(&hmm);
    info!("Decoding in {:?} mode", mode);
    for (id, seq) in queries(matches)? {
        let path = match hmm.decode(mode, &seq) {
            Ok(path) => path,
            Err(why @ HmmError::NoPath) | Err(why @ HmmError::EmptyInput) => {
                warn!("{}\t{}", id, why);
                continue;
            }
            Err(why) => return Err(why),
        };
        let prob = hmm.path_probability(mode, &path)?;
        let path: Vec<_> = path.iter().map(|s| s.to_string()).collect();
        println!("{}\t{}\t{}", id, path.join(" "), prob);
    }
    Ok(())
}

fn generate(matches: &clap::ArgMatches) -> Result<()> {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    let hmm = load_model(matches)?;
    let num: usize = parse(matches, "num")?;
    let seed: u64 = parse(matches, "seed")?;
    let bound = if matches.is_present("until_end") {
        StepBound::UntilEnd {
            max_steps: parse(matches, "max_steps")?,
        }
    } else {
        StepBound::FixedSteps
    };
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(seed);
    let records = (0..num)
        .map(|i| -> Result<FASTARecord> {
            let path = hmm.sample_path(&mut rng, bound);
            let seq = hmm.sample_sequence(&path, &mut rng)?;
            let path: Vec<_> = path.iter().map(|s| s.to_string()).collect();
            Ok((format!("{} {}", i, path.join(" ")), seq))
        })
        .collect::<Result<Vec<FASTARecord>>>()?;
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    domhmm::fasta::write_fasta(&mut wtr, &records)?;
    Ok(())
}

fn main() -> Result<()> {
    let matches = App::new("domhmm")
        .version("0.1")
        .about("Profile HMM of protein domains: Build:[ALN]->[TrMap]x[EmiMap], Score/Decode/Generate:[TrMap]x[EmiMap]->TEXT")
        .setting(clap::AppSettings::ArgRequiredElseHelp)
        .subcommand(subcommand_build())
        .subcommand(subcommand_score())
        .subcommand(subcommand_decode())
        .subcommand(subcommand_generate())
        .get_matches();
    if let Some(sub_m) = matches.subcommand().1 {
        let level = match sub_m.occurrences_of("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    }
    debug!("Start");
    match matches.subcommand() {
        ("build", Some(sub_m)) => build(sub_m),
        ("score", Some(sub_m)) => score(sub_m),
        ("decode", Some(sub_m)) => decode(sub_m),
        ("generate", Some(sub_m)) => generate(sub_m),
        _ => unreachable!(),
    }
}
