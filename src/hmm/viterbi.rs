//! Viterbi decoding: the most probable state path of a sequence.
//!
//! There are two modes.
//! - `Bracketed`: the model starts at `Start` and finishes at `End`, and has silent states
//!   (delete states and `End`). A silent state consumes no symbol, so it is filled from the
//!   states preceding it in the *same* column of the DP table.
//! - `Open`: every state emits, and every state is a possible first and last state,
//!   with the uniform initial probability `1/|states|`.
//!
//! All the scores are natural logarithms; a zero probability is negative infinity.
//! Candidates are compared by `>=` in topology order, so that among equal scores the
//! state with the largest index wins. This holds both for the predecessors and for the last
//! state in the open mode, even when every candidate is negative infinity. Thus the open mode
//! always returns a path. The bracketed mode fails with `NoPath` when `End` is unreachable.
use super::ProfileHmm;
use crate::error::{HmmError, Result};
use crate::topology::State;

const START: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Bracketed,
    Open,
}

impl DecodeMode {
    /// Bracketed if some state never emits, open otherwise.
    pub fn infer(hmm: &ProfileHmm) -> Self {
        if hmm.has_silent_states() {
            DecodeMode::Bracketed
        } else {
            DecodeMode::Open
        }
    }
}

// (state, column) of the predecessor.
type Pointer = Option<(usize, usize)>;

/// DP table of log-probabilities and back pointers. Serialized 2-d array of (state x column).
#[derive(Debug, Clone)]
struct DPTable {
    column: usize,
    lk: Vec<f64>,
    backtrace: Vec<Pointer>,
}

impl DPTable {
    fn new(states: usize, column: usize) -> Self {
        Self {
            column,
            lk: vec![f64::NEG_INFINITY; states * column],
            backtrace: vec![None; states * column],
        }
    }
    fn get(&self, state: usize, pos: usize) -> f64 {
        self.lk[state * self.column + pos]
    }
    fn trace(&self, state: usize, pos: usize) -> Pointer {
        self.backtrace[state * self.column + pos]
    }
    fn set(&mut self, state: usize, pos: usize, (lk, from): (f64, Pointer)) {
        self.lk[state * self.column + pos] = lk;
        self.backtrace[state * self.column + pos] = from;
    }
}

// Keep the last maximum of the candidates.
fn argmax<I: Iterator<Item = (f64, (usize, usize))>>(candidates: I) -> (f64, Pointer) {
    let mut best = (f64::NEG_INFINITY, None);
    for (lk, from) in candidates {
        if best.0 <= lk {
            best = (lk, Some(from));
        }
    }
    best
}

impl ProfileHmm {
    /// Return the most probable path of `seq`. See [`ProfileHmm::viterbi`].
    pub fn decode(&self, mode: DecodeMode, seq: &[u8]) -> Result<Vec<State>> {
        self.viterbi(mode, seq).map(|(path, _)| path)
    }
    /// Return the most probable path of `seq` and its log-probability Pr{seq, path}.
    /// The path never contains `Start`. In the bracketed mode, it ends with `End` and
    /// contains the delete states passed through.
    /// In the open mode, a sequence the model cannot emit still gets the tie-broken path
    /// with the score negative infinity.
    pub fn viterbi(&self, mode: DecodeMode, seq: &[u8]) -> Result<(Vec<State>, f64)> {
        if seq.is_empty() {
            return Err(HmmError::EmptyInput);
        }
        let seq = self.alphabet.encode(seq)?;
        let (dp, terminal) = match mode {
            DecodeMode::Bracketed => self.fill_bracketed(&seq)?,
            DecodeMode::Open => self.fill_open(&seq),
        };
        let lk = dp.get(terminal.0, terminal.1);
        if mode == DecodeMode::Bracketed && lk == f64::NEG_INFINITY {
            return Err(HmmError::NoPath);
        }
        let (mut state, mut pos) = terminal;
        let mut path = vec![];
        loop {
            if mode == DecodeMode::Bracketed && state == START {
                break;
            }
            path.push(self.topology.state(state));
            match dp.trace(state, pos) {
                Some(prev) => {
                    state = prev.0;
                    pos = prev.1;
                }
                None if mode == DecodeMode::Open => break,
                None => return Err(HmmError::NoPath),
            }
        }
        path.reverse();
        trace!("VITERBI\t{:?}\t{:.3}", mode, lk);
        Ok((path, lk))
    }
    // Column `s` holds the paths having consumed the first `s` symbols.
    fn fill_bracketed(&self, seq: &[usize]) -> Result<(DPTable, (usize, usize))> {
        if !self.topology.is_bracketed() {
            let msg = "bracketed decoding needs Start as the first state and End as the last"
                .to_string();
            return Err(HmmError::InvalidModel(msg));
        }
        let states = self.num_states();
        let log_trans = self.transition.ln();
        let log_emit = self.emission.ln();
        let mut dp = DPTable::new(states, seq.len() + 1);
        dp.set(START, 0, (0f64, None));
        for s in 0..=seq.len() {
            for to in START + 1..states {
                let cell = if self.topology.state(to).is_silent() {
                    let from = (0..to).map(|from| (dp.get(from, s) + log_trans.get(from, to), (from, s)));
                    argmax(from)
                } else if 0 < s {
                    let emit = log_emit.get(to, seq[s - 1]);
                    let from = (0..states).map(|from| {
                        let lk = dp.get(from, s - 1) + log_trans.get(from, to) + emit;
                        (lk, (from, s - 1))
                    });
                    argmax(from)
                } else {
                    continue;
                };
                dp.set(to, s, cell);
            }
        }
        Ok((dp, (states - 1, seq.len())))
    }
    // Column `t` holds the paths having emitted the (t+1)-th symbol.
    fn fill_open(&self, seq: &[usize]) -> (DPTable, (usize, usize)) {
        let states = self.num_states();
        let log_trans = self.transition.ln();
        let log_emit = self.emission.ln();
        let mut dp = DPTable::new(states, seq.len());
        let init = (states as f64).recip().ln();
        for state in 0..states {
            dp.set(state, 0, (init + log_emit.get(state, seq[0]), None));
        }
        for (t, &x) in seq.iter().enumerate().skip(1) {
            for to in 0..states {
                let emit = log_emit.get(to, x);
                let from = (0..states).map(|from| {
                    let lk = dp.get(from, t - 1) + log_trans.get(from, to) + emit;
                    (lk, (from, t - 1))
                });
                dp.set(to, t, argmax(from));
            }
        }
        let last = seq.len() - 1;
        let candidates = (0..states).map(|state| (dp.get(state, last), (state, last)));
        let (_, terminal) = argmax(candidates);
        // There is at least one state.
        (dp, terminal.unwrap_or((0, last)))
    }
    /// Probability of the state path `path` (without emissions).
    /// In the bracketed mode, the path implicitly starts from `Start`. In the open mode,
    /// the first state has the uniform initial probability.
    pub fn path_probability(&self, mode: DecodeMode, path: &[State]) -> Result<f64> {
        let path = self.state_indices(path)?;
        let first = *path.first().ok_or(HmmError::EmptyInput)?;
        let init = match mode {
            DecodeMode::Bracketed if !self.topology.is_bracketed() => {
                let msg = "the model has no Start and End states".to_string();
                return Err(HmmError::InvalidModel(msg));
            }
            DecodeMode::Bracketed if first == START => 1f64,
            DecodeMode::Bracketed => self.transition(START, first),
            DecodeMode::Open => (self.num_states() as f64).recip(),
        };
        let transitions: f64 = path
            .windows(2)
            .map(|w| self.transition(w[0], w[1]))
            .product();
        Ok(init * transitions)
    }
}
