//! A profile hidden Markov model, trained from a multiple alignment.
//!
//! The model consists of a [`Topology`], an [`Alphabet`], and two dense tables:
//! the transition table (state x state) and the emission table (state x symbol).
//! The algorithms working on the model live in the submodules:
//! - `train`: counting and normalizing an alignment into the tables,
//! - `forward`: total probability of a sequence and the null model,
//! - `viterbi`: the most probable path of a sequence,
//! - `sample`: generating fictional paths and sequences.
//! Once built, a model is never modified.
use crate::alphabet::Alphabet;
use crate::error::{HmmError, Result};
use crate::topology::{State, Topology};
use serde::{Deserialize, Serialize};
pub mod forward;
pub mod sample;
pub mod train;
pub mod viterbi;

pub use forward::{likely_member, log_likelihood_ratio, LOG_RATIO_THRESHOLD};
pub use sample::StepBound;
pub use train::TrainConfig;
pub use viterbi::DecodeMode;

/// A dense row-major matrix of probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbMatrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl ProbMatrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            data: vec![0f64; rows * columns],
        }
    }
    /// Build a matrix from rows. All rows should have the same length.
    pub fn from_rows<T: std::borrow::Borrow<[f64]>>(rows: &[T]) -> Result<Self> {
        let columns = rows.first().map(|r| r.borrow().len()).unwrap_or(0);
        if rows.iter().any(|r| r.borrow().len() != columns) {
            return Err(HmmError::InvalidModel("ragged matrix".to_string()));
        }
        let data: Vec<_> = rows.iter().flat_map(|r| r.borrow().iter().copied()).collect();
        Ok(Self {
            rows: rows.len(),
            columns,
            data,
        })
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn columns(&self) -> usize {
        self.columns
    }
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.columns + column]
    }
    pub fn get_mut(&mut self, row: usize, column: usize) -> &mut f64 {
        &mut self.data[row * self.columns + column]
    }
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.columns..(row + 1) * self.columns]
    }
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.columns..(row + 1) * self.columns]
    }
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).iter().sum()
    }
    pub fn is_zero_row(&self, row: usize) -> bool {
        self.row(row).iter().all(|&x| x == 0f64)
    }
    /// Divide each row by its sum. Rows summing to zero are left as they are.
    pub fn normalize_rows(&mut self) {
        if self.columns == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(self.columns) {
            let sum: f64 = row.iter().sum();
            if 0f64 < sum {
                row.iter_mut().for_each(|x| *x /= sum);
            }
        }
    }
    /// Same as `self` with every element replaced by its natural logarithm.
    /// Zero probabilities become negative infinity.
    pub fn ln(&self) -> Self {
        Self {
            rows: self.rows,
            columns: self.columns,
            data: self.data.iter().map(|x| x.ln()).collect(),
        }
    }
}

/// A profile HMM. To train one, call [`ProfileHmm::train`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileHmm {
    topology: Topology,
    alphabet: Alphabet,
    // transition[from][to]
    transition: ProbMatrix,
    // emission[state][symbol]
    emission: ProbMatrix,
}

impl ProfileHmm {
    /// Assemble a model from its tables. The shapes of the tables should match
    /// the topology and the alphabet.
    pub fn new(
        topology: Topology,
        alphabet: Alphabet,
        transition: ProbMatrix,
        emission: ProbMatrix,
    ) -> Result<Self> {
        let states = topology.len();
        if transition.rows() != states || transition.columns() != states {
            let msg = format!(
                "{} states but the transition table is {}x{}",
                states,
                transition.rows(),
                transition.columns()
            );
            return Err(HmmError::InvalidModel(msg));
        }
        if emission.rows() != states || emission.columns() != alphabet.len() {
            let msg = format!(
                "{} states and {} symbols but the emission table is {}x{}",
                states,
                alphabet.len(),
                emission.rows(),
                emission.columns()
            );
            return Err(HmmError::InvalidModel(msg));
        }
        let is_prob = |x: &f64| x.is_finite() && 0f64 <= *x;
        if !transition.data.iter().all(is_prob) || !emission.data.iter().all(is_prob) {
            let msg = "probabilities should be finite and non-negative".to_string();
            return Err(HmmError::InvalidModel(msg));
        }
        Ok(Self {
            topology,
            alphabet,
            transition,
            emission,
        })
    }
    pub fn topology(&self) -> &Topology {
        &self.topology
    }
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
    pub fn transitions(&self) -> &ProbMatrix {
        &self.transition
    }
    pub fn emissions(&self) -> &ProbMatrix {
        &self.emission
    }
    pub fn num_states(&self) -> usize {
        self.topology.len()
    }
    /// Pr{from -> to}
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition.get(from, to)
    }
    /// Pr{symbol | state}. `symbol` is the index in the alphabet.
    pub fn emission(&self, state: usize, symbol: usize) -> f64 {
        self.emission.get(state, symbol)
    }
    /// Whether some state never emits, e.g., delete states.
    pub fn has_silent_states(&self) -> bool {
        (0..self.num_states()).any(|s| self.emission.is_zero_row(s))
    }
    /// Convert a path of states into their indices.
    pub fn state_indices(&self, path: &[State]) -> Result<Vec<usize>> {
        path.iter()
            .map(|s| {
                self.topology
                    .index_of(s)
                    .ok_or_else(|| HmmError::UnknownState(s.to_string()))
            })
            .collect()
    }
}

impl std::fmt::Display for ProfileHmm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "States:{}", self.topology)?;
        writeln!(f, "Transition:")?;
        for (from, state) in self.topology.states().iter().enumerate() {
            let probs: Vec<_> = self
                .transition
                .row(from)
                .iter()
                .map(|x| format!("{:.3}", x))
                .collect();
            writeln!(f, "{}\t{}", state, probs.join("\t"))?;
        }
        writeln!(f, "Emission:{}", self.alphabet)?;
        for (idx, state) in self.topology.states().iter().enumerate() {
            let probs: Vec<_> = self
                .emission
                .row(idx)
                .iter()
                .map(|x| format!("{:.3}", x))
                .collect();
            writeln!(f, "{}\t{}", state, probs.join("\t"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn normalize() {
        let mut matrix = ProbMatrix::from_rows(&[vec![1f64, 3f64], vec![0f64, 0f64]]).unwrap();
        matrix.normalize_rows();
        assert_eq!(matrix.row(0), &[0.25, 0.75]);
        assert_eq!(matrix.row(1), &[0f64, 0f64]);
        assert!(matrix.is_zero_row(1));
        let logs = matrix.ln();
        assert_eq!(logs.get(1, 0), f64::NEG_INFINITY);
        assert!((logs.get(0, 1) - 0.75f64.ln()).abs() < 1e-12);
        assert!(ProbMatrix::from_rows(&[vec![1f64], vec![]]).is_err());
    }
    #[test]
    fn shape_check() {
        let topology = Topology::profile(1);
        let alphabet = Alphabet::new(b"AC").unwrap();
        let ok = ProfileHmm::new(
            topology.clone(),
            alphabet.clone(),
            ProbMatrix::zeros(6, 6),
            ProbMatrix::zeros(6, 2),
        );
        assert!(ok.is_ok());
        let bad = ProfileHmm::new(
            topology.clone(),
            alphabet.clone(),
            ProbMatrix::zeros(6, 6),
            ProbMatrix::zeros(6, 3),
        );
        assert!(matches!(bad, Err(HmmError::InvalidModel(_))));
        let mut negative = ProbMatrix::zeros(6, 6);
        *negative.get_mut(0, 1) = -0.5;
        let bad = ProfileHmm::new(topology, alphabet, negative, ProbMatrix::zeros(6, 2));
        assert!(bad.is_err());
    }
}
