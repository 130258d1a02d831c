//! Forward algorithm and the null model.
//!
//! The forward recurrence here is the textbook one over all the states of the topology,
//! starting from the uniform occupancy `1/|states|`:
//! `F[s][1] = e(s,x1)/|states|`, `F[s][t] = sum_u F[u][t-1] a(u,s) e(s,xt)`.
//! It does not treat silent states specially. As a delete state never emits,
//! it has zero mass at every position, and the probability of the paths passing through
//! delete states is not counted. In other words, the value is the forward probability
//! on the sub-lattice of the emitting states. To take the silent states into account,
//! one should either marginalize them out beforehand or use a silent-state-aware recurrence.
use super::{ProbMatrix, ProfileHmm};
use crate::alphabet::background_frequency;
use crate::error::Result;

/// A sequence with log-likelihood ratio equal to or larger than this value is regarded
/// as a member of the domain family.
pub const LOG_RATIO_THRESHOLD: f64 = 1f64;

/// Natural log of `model / null`.
pub fn log_likelihood_ratio(model: f64, null: f64) -> f64 {
    (model / null).ln()
}

/// Whether a log-likelihood ratio supports the family model over the null model.
pub fn likely_member(log_ratio: f64) -> bool {
    LOG_RATIO_THRESHOLD <= log_ratio
}

impl ProfileHmm {
    /// Return the forward probability of `seq`. The empty sequence has probability zero.
    pub fn forward(&self, seq: &[u8]) -> Result<f64> {
        let seq = self.alphabet.encode(seq)?;
        Ok(self.forward_encoded(&seq))
    }
    fn forward_encoded(&self, seq: &[usize]) -> f64 {
        let (first, rest) = match seq.split_first() {
            Some(res) => res,
            None => return 0f64,
        };
        let states = self.num_states();
        let init = (states as f64).recip();
        let mut prev: Vec<f64> = (0..states)
            .map(|s| init * self.emission(s, *first))
            .collect();
        let mut current = vec![0f64; states];
        for &x in rest {
            for (to, slot) in current.iter_mut().enumerate() {
                let emit = self.emission(to, x);
                *slot = if emit == 0f64 {
                    0f64
                } else {
                    let reach: f64 = prev
                        .iter()
                        .enumerate()
                        .map(|(from, f)| f * self.transition(from, to))
                        .sum();
                    reach * emit
                };
            }
            std::mem::swap(&mut prev, &mut current);
        }
        prev.iter().sum()
    }
    /// The null model of this model. It has the same topology and alphabet.
    /// Each state moves to each of its successors with equal probability, and every
    /// match/insert state emits symbols by the background amino acid frequencies.
    pub fn null_model(&self) -> Self {
        let states = self.num_states();
        let mut transition = ProbMatrix::zeros(states, states);
        for from in 0..states {
            let row = self.transitions().row(from);
            let entries = row.iter().filter(|&&x| x != 0f64).count();
            for (slot, &x) in transition.row_mut(from).iter_mut().zip(row) {
                if x != 0f64 {
                    *slot = (entries as f64).recip();
                }
            }
        }
        let mut emission = ProbMatrix::zeros(states, self.alphabet.len());
        for (idx, state) in self.topology.states().iter().enumerate() {
            if state.is_emitting() {
                let row = emission.row_mut(idx).iter_mut();
                for (slot, &symbol) in row.zip(self.alphabet.symbols()) {
                    *slot = background_frequency(symbol);
                }
            }
        }
        Self {
            topology: self.topology.clone(),
            alphabet: self.alphabet.clone(),
            transition,
            emission,
        }
    }
    /// Log-likelihood ratio of `seq` between this model and its null model.
    pub fn log_odds(&self, seq: &[u8]) -> Result<f64> {
        let model = self.forward(seq)?;
        let null = self.null_model().forward(seq)?;
        trace!("FORWARD\t{}\t{}", model, null);
        Ok(log_likelihood_ratio(model, null))
    }
}
