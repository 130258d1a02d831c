//! Training a profile HMM from a multiple alignment.
//!
//! Each row of the alignment is walked once, from the left to the right, with a cursor
//! on the state visited last. Visiting a state adds one to the transition from the cursor,
//! and, if the state emits, one to the emission of the symbol. The counts are then
//! normalized row by row, optionally smoothed by a pseudocount, and normalized again.
use super::{ProbMatrix, ProfileHmm};
use crate::alignment::{Alignment, ColumnClassification};
use crate::alphabet::{Alphabet, GAP};
use crate::error::{HmmError, Result};
use crate::topology::{State, Topology};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Parameters of training.
pub struct TrainConfig {
    /// A column is an insert column if its fraction of gaps is at least this value.
    /// Should be in (0, 1].
    pub threshold: f64,
    /// Added to each legal transition and each match/insert emission after normalization.
    /// Zero disables smoothing.
    pub pseudocount: f64,
}

impl TrainConfig {
    pub fn new(threshold: f64, pseudocount: f64) -> Self {
        Self {
            threshold,
            pseudocount,
        }
    }
    fn validate(&self) -> Result<()> {
        if !(0f64 < self.threshold && self.threshold <= 1f64) {
            let msg = format!("threshold {} is not in (0,1]", self.threshold);
            return Err(HmmError::InvalidTrainingData(msg));
        }
        if !(self.pseudocount.is_finite() && 0f64 <= self.pseudocount) {
            let msg = format!("pseudocount {} is not a non-negative value", self.pseudocount);
            return Err(HmmError::InvalidTrainingData(msg));
        }
        Ok(())
    }
}

impl std::default::Default for TrainConfig {
    fn default() -> Self {
        Self {
            threshold: 0.4,
            pseudocount: 0.01,
        }
    }
}

impl ProfileHmm {
    /// Train a profile HMM from `alignment`. Every non-gap symbol of the alignment should be in `alphabet`.
    /// The result is deterministic: the same input always gives the same tables.
    pub fn train(alignment: &Alignment, alphabet: &Alphabet, config: &TrainConfig) -> Result<Self> {
        config.validate()?;
        if alignment.width() == 0 {
            let msg = "the alignment has no column".to_string();
            return Err(HmmError::InvalidTrainingData(msg));
        }
        let columns = alignment.classify_columns(config.threshold);
        let topology = Topology::profile(columns.consensus_count());
        debug!(
            "TRAIN\t{} rows\t{} columns\t{} consensus",
            alignment.num_rows(),
            alignment.width(),
            columns.consensus_count()
        );
        let (mut transition, mut emission) = count(alignment, alphabet, &columns, &topology)?;
        transition.normalize_rows();
        emission.normalize_rows();
        if 0f64 < config.pseudocount {
            for (from, to) in topology.profile_edges()? {
                *transition.get_mut(from, to) += config.pseudocount;
            }
            for (idx, state) in topology.states().iter().enumerate() {
                if state.is_emitting() {
                    emission
                        .row_mut(idx)
                        .iter_mut()
                        .for_each(|x| *x += config.pseudocount);
                }
            }
            transition.normalize_rows();
            emission.normalize_rows();
        }
        Self::new(topology, alphabet.clone(), transition, emission)
    }
    /// Shorthand for training from raw rows.
    pub fn train_from_rows<T: std::borrow::Borrow<[u8]>>(
        rows: &[T],
        alphabet: &Alphabet,
        config: &TrainConfig,
    ) -> Result<Self> {
        let alignment = Alignment::new(rows)?;
        Self::train(&alignment, alphabet, config)
    }
}

// Raw transition and emission counts.
fn count(
    alignment: &Alignment,
    alphabet: &Alphabet,
    columns: &ColumnClassification,
    topology: &Topology,
) -> Result<(ProbMatrix, ProbMatrix)> {
    let mut transition = ProbMatrix::zeros(topology.len(), topology.len());
    let mut emission = ProbMatrix::zeros(topology.len(), alphabet.len());
    let index = |state: State| {
        topology
            .index_of(&state)
            .ok_or_else(|| HmmError::UnknownState(state.to_string()))
    };
    let (start, end) = (index(State::Start)?, index(State::End)?);
    for row in alignment.rows() {
        let mut cursor = start;
        // Consensus columns passed so far.
        let mut passed = 0;
        for (&x, &is_consensus) in row.iter().zip(columns.as_slice()) {
            let visited = if is_consensus {
                passed += 1;
                match x {
                    GAP => State::Delete(passed),
                    _ => State::Match(passed),
                }
            } else if x == GAP {
                continue;
            } else {
                State::Insert(passed)
            };
            let visited = index(visited)?;
            *transition.get_mut(cursor, visited) += 1f64;
            if x != GAP {
                let symbol = alphabet
                    .index(x)
                    .ok_or(HmmError::UnknownSymbol(x as char))?;
                *emission.get_mut(visited, symbol) += 1f64;
            }
            cursor = visited;
        }
        *transition.get_mut(cursor, end) += 1f64;
    }
    Ok((transition, emission))
}

#[cfg(test)]
mod tests {
    use super::*;
    const ROWS: [&[u8]; 3] = [b"AC-GT", b"AC-GT", b"A--GT"];
    fn close(x: f64, y: f64) -> bool {
        (x - y).abs() < 1e-9
    }
    fn acgt() -> Alphabet {
        Alphabet::new(b"ACGT").unwrap()
    }
    #[test]
    fn counts() {
        let config = TrainConfig::new(0.5, 0f64);
        let hmm = ProfileHmm::train_from_rows(&ROWS, &acgt(), &config).unwrap();
        let topology = hmm.topology();
        assert_eq!(topology.consensus_len(), 4);
        let idx = |label: &str| topology.index_of_label(label).unwrap();
        assert!(close(hmm.transition(idx("Start"), idx("M1")), 1f64));
        assert!(close(hmm.transition(idx("M1"), idx("M2")), 2f64 / 3f64));
        assert!(close(hmm.transition(idx("M1"), idx("D2")), 1f64 / 3f64));
        assert!(close(hmm.transition(idx("D2"), idx("M3")), 1f64));
        assert!(close(hmm.transition(idx("M4"), idx("End")), 1f64));
        // Never visited.
        assert!(hmm.transitions().is_zero_row(idx("I2")));
        assert!(hmm.transitions().is_zero_row(idx("End")));
        let (a, c, g, t) = (0, 1, 2, 3);
        assert!(close(hmm.emission(idx("M1"), a), 1f64));
        assert!(close(hmm.emission(idx("M2"), c), 1f64));
        assert!(close(hmm.emission(idx("M3"), g), 1f64));
        assert!(close(hmm.emission(idx("M4"), t), 1f64));
        assert!(hmm.emissions().is_zero_row(idx("D2")));
    }
    #[test]
    fn insertions() {
        // The third column is an insert column, and only the first row has a symbol there.
        let rows: [&[u8]; 4] = [b"AGGC", b"AT-C", b"AC-C", b"A--C"];
        let config = TrainConfig::new(0.5, 0f64);
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &config).unwrap();
        let topology = hmm.topology();
        assert_eq!(topology.to_string(), "Start I0 M1 D1 I1 M2 D2 I2 M3 D3 I3 End");
        let idx = |label: &str| topology.index_of_label(label).unwrap();
        assert!(close(hmm.transition(idx("M2"), idx("I2")), 1f64 / 3f64));
        assert!(close(hmm.transition(idx("M2"), idx("M3")), 2f64 / 3f64));
        assert!(close(hmm.transition(idx("D2"), idx("M3")), 1f64));
        assert!(close(hmm.transition(idx("I2"), idx("M3")), 1f64));
        assert!(close(hmm.emission(idx("I2"), 2), 1f64));
        // Self loop on an insert state.
        let rows: [&[u8]; 2] = [b"ATTC", b"A--C"];
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &config).unwrap();
        let idx = |label: &str| hmm.topology().index_of_label(label).unwrap();
        assert!(close(hmm.transition(idx("I1"), idx("I1")), 1f64 / 2f64));
        assert!(close(hmm.transition(idx("I1"), idx("M2")), 1f64 / 2f64));
        assert!(close(hmm.transition(idx("M1"), idx("I1")), 1f64 / 2f64));
        assert!(close(hmm.transition(idx("M1"), idx("M2")), 1f64 / 2f64));
    }
    #[test]
    fn pseudocount() {
        let config = TrainConfig::new(0.5, 0.01);
        let hmm = ProfileHmm::train_from_rows(&ROWS, &acgt(), &config).unwrap();
        let topology = hmm.topology();
        let idx = |label: &str| topology.index_of_label(label).unwrap();
        let m1 = idx("M1");
        assert!(close(hmm.transition(m1, idx("M2")), (2f64 / 3f64 + 0.01) / 1.03));
        assert!(close(hmm.transition(m1, idx("I1")), 0.01 / 1.03));
        // Illegal edges stay zero.
        assert_eq!(hmm.transition(m1, idx("M3")), 0f64);
        assert_eq!(hmm.transition(m1, idx("D1")), 0f64);
        // Never visited rows become uniform over their legal edges.
        let i2 = idx("I2");
        for to in ["I2", "M3", "D3"].iter() {
            assert!(close(hmm.transition(i2, idx(to)), 1f64 / 3f64));
        }
        assert!(hmm.transitions().is_zero_row(idx("End")));
        for (i, state) in topology.states().iter().enumerate() {
            let emission = hmm.emissions().row_sum(i);
            if state.is_emitting() {
                assert!(close(emission, 1f64), "{}", state);
            } else {
                assert!(hmm.emissions().is_zero_row(i), "{}", state);
            }
            let transition = hmm.transitions().row_sum(i);
            assert!(transition == 0f64 || close(transition, 1f64), "{}", state);
        }
        assert!(close(hmm.emission(idx("M1"), 0), 1.01 / 1.04));
        assert!(close(hmm.emission(idx("I0"), 0), 0.25));
    }
    #[test]
    fn no_consensus() {
        let rows: [&[u8]; 3] = [b"A-", b"--", b"-C"];
        let config = TrainConfig::new(0.5, 0f64);
        let hmm = ProfileHmm::train_from_rows(&rows, &acgt(), &config).unwrap();
        assert_eq!(hmm.topology().to_string(), "Start I0 End");
        assert!(close(hmm.transition(0, 1), 2f64 / 3f64));
        assert!(close(hmm.transition(0, 2), 1f64 / 3f64));
        assert!(close(hmm.transition(1, 2), 1f64));
    }
    #[test]
    fn errors() {
        let config = TrainConfig::default();
        let zero_width: [&[u8]; 2] = [b"", b""];
        assert!(matches!(
            ProfileHmm::train_from_rows(&zero_width, &acgt(), &config),
            Err(HmmError::InvalidTrainingData(_))
        ));
        let no_rows: [&[u8]; 0] = [];
        assert!(matches!(
            ProfileHmm::train_from_rows(&no_rows, &acgt(), &config),
            Err(HmmError::InvalidAlignment(_))
        ));
        let unknown: [&[u8]; 2] = [b"ACX", b"ACG"];
        assert!(matches!(
            ProfileHmm::train_from_rows(&unknown, &acgt(), &config),
            Err(HmmError::UnknownSymbol('X'))
        ));
        for &(threshold, pseudocount) in [(0f64, 0.01), (1.5, 0.01), (0.4, -1f64)].iter() {
            let config = TrainConfig::new(threshold, pseudocount);
            assert!(matches!(
                ProfileHmm::train_from_rows(&ROWS, &acgt(), &config),
                Err(HmmError::InvalidTrainingData(_))
            ));
        }
    }
    #[test]
    fn deterministic() {
        let config = TrainConfig::default();
        let hmm1 = ProfileHmm::train_from_rows(&ROWS, &acgt(), &config).unwrap();
        let hmm2 = ProfileHmm::train_from_rows(&ROWS, &acgt(), &config).unwrap();
        assert_eq!(hmm1, hmm2);
    }
}
