//! Profile hidden Markov models of protein domains.
//!
//! A model is trained from a multiple alignment of a domain family
//! (see [`msa`] for the Pfam and BLAST readers), and then used to
//! - score a sequence against the family by the forward probability and a null model,
//! - decode the most probable state path of a sequence by the Viterbi algorithm,
//! - generate fictional members of the family.
//!
//! ```
//! use domhmm::{Alphabet, DecodeMode, ProfileHmm, TrainConfig};
//! let rows: [&[u8]; 3] = [b"AC-GT", b"AC-GT", b"A--GT"];
//! let alphabet = Alphabet::new(b"ACGT").unwrap();
//! let config = TrainConfig::new(0.5, 0.01);
//! let hmm = ProfileHmm::train_from_rows(&rows, &alphabet, &config).unwrap();
//! assert_eq!(hmm.topology().consensus_len(), 4);
//! let path = hmm.decode(DecodeMode::Bracketed, b"AGT").unwrap();
//! assert_eq!(path.last(), Some(&domhmm::State::End));
//! ```
#[macro_use]
extern crate log;
pub mod alignment;
pub mod alphabet;
pub mod error;
pub mod fasta;
pub mod gen_seq;
pub mod hmm;
pub mod msa;
pub mod tablefile;
pub mod topology;

pub use alignment::{Alignment, ColumnClassification};
pub use alphabet::Alphabet;
pub use error::{HmmError, Result};
pub use hmm::{
    likely_member, log_likelihood_ratio, DecodeMode, ProbMatrix, ProfileHmm, StepBound,
    TrainConfig, LOG_RATIO_THRESHOLD,
};
pub use topology::{State, Topology};
