//! States of a profile HMM and their order.
//!
//! The order of the states in a [`Topology`] is the row/column order of every table
//! and the index space of the dynamic programming in decoding.
//! For a profile with `k` consensus columns, it is
//! `Start, I0, M1, D1, I1, M2, D2, I2, ..., Mk, Dk, Ik, End`, so index 0 is always `Start`.
use crate::error::{HmmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Start,
    /// Match state of the i-th consensus column (1-origin).
    Match(usize),
    /// Delete state of the i-th consensus column (1-origin).
    Delete(usize),
    /// Insert state after the j-th consensus column. `Insert(0)` precedes the first column.
    Insert(usize),
    End,
}

impl State {
    /// Whether this state never outputs a symbol.
    pub fn is_silent(&self) -> bool {
        matches!(self, State::Start | State::Delete(_) | State::End)
    }
    pub fn is_emitting(&self) -> bool {
        !self.is_silent()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Start => write!(f, "Start"),
            State::Match(i) => write!(f, "M{}", i),
            State::Delete(i) => write!(f, "D{}", i),
            State::Insert(i) => write!(f, "I{}", i),
            State::End => write!(f, "End"),
        }
    }
}

impl std::str::FromStr for State {
    type Err = HmmError;
    fn from_str(label: &str) -> Result<Self> {
        match label {
            "Start" => return Ok(State::Start),
            "End" => return Ok(State::End),
            _ => {}
        }
        let unknown = || HmmError::UnknownState(label.to_string());
        let mut chars = label.chars();
        let kind = chars.next().ok_or_else(unknown)?;
        let position: usize = chars.as_str().parse().map_err(|_| unknown())?;
        match kind {
            'M' if 0 < position => Ok(State::Match(position)),
            'D' if 0 < position => Ok(State::Delete(position)),
            'I' => Ok(State::Insert(position)),
            _ => Err(unknown()),
        }
    }
}

/// Ordered states of a model, with the reverse lookup from a state to its index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<State>", into = "Vec<State>")]
pub struct Topology {
    states: Vec<State>,
    index: HashMap<State, usize>,
}

impl Topology {
    /// The canonical profile topology with `consensus` match states.
    pub fn profile(consensus: usize) -> Self {
        let mut states = Vec::with_capacity(3 * consensus + 3);
        states.push(State::Start);
        states.push(State::Insert(0));
        for i in 1..=consensus {
            states.push(State::Match(i));
            states.push(State::Delete(i));
            states.push(State::Insert(i));
        }
        states.push(State::End);
        let index = states.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        Self { states, index }
    }
    /// Topology of arbitrary, distinct states in the given order.
    pub fn from_states(states: Vec<State>) -> Result<Self> {
        let mut index = HashMap::with_capacity(states.len());
        for (i, &state) in states.iter().enumerate() {
            if index.insert(state, i).is_some() {
                let msg = format!("state {} appears twice", state);
                return Err(HmmError::InvalidModel(msg));
            }
        }
        Ok(Self { states, index })
    }
    /// Parse a list of labels such as `Start I0 M1 D1 I1 End`.
    pub fn from_labels<T: AsRef<str>>(labels: &[T]) -> Result<Self> {
        let states = labels
            .iter()
            .map(|label| label.as_ref().parse())
            .collect::<Result<Vec<State>>>()?;
        Self::from_states(states)
    }
    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
    pub fn states(&self) -> &[State] {
        &self.states
    }
    /// Panics if `index` is out of range.
    pub fn state(&self, index: usize) -> State {
        self.states[index]
    }
    pub fn index_of(&self, state: &State) -> Option<usize> {
        self.index.get(state).copied()
    }
    pub fn index_of_label(&self, label: &str) -> Result<usize> {
        let state: State = label.parse()?;
        self.index_of(&state)
            .ok_or_else(|| HmmError::UnknownState(label.to_string()))
    }
    pub fn labels(&self) -> Vec<String> {
        self.states.iter().map(|s| s.to_string()).collect()
    }
    /// The number of match states.
    pub fn consensus_len(&self) -> usize {
        self.states
            .iter()
            .filter(|s| matches!(s, State::Match(_)))
            .count()
    }
    /// Whether this is exactly `Topology::profile(self.consensus_len())`.
    pub fn is_profile(&self) -> bool {
        self.states == Self::profile(self.consensus_len()).states
    }
    /// Whether the first state is Start and the last one is End.
    pub fn is_bracketed(&self) -> bool {
        self.states.first() == Some(&State::Start) && self.states.last() == Some(&State::End)
    }
    /// The legal edges of a profile topology, as (from, to) index pairs, in topology order.
    /// Other edges never have any probability.
    pub fn profile_edges(&self) -> Result<Vec<(usize, usize)>> {
        if !self.is_profile() {
            let msg = "legal edges are defined only for profile topologies".to_string();
            return Err(HmmError::InvalidModel(msg));
        }
        let k = self.consensus_len();
        let idx = |s: State| self.index[&s];
        // Successors of the states at the i-th column: the next match/delete, or End.
        let next = |i: usize| -> Vec<State> {
            if i < k {
                vec![State::Match(i + 1), State::Delete(i + 1)]
            } else {
                vec![State::End]
            }
        };
        let mut edges = vec![];
        for from in [State::Start, State::Insert(0)].iter() {
            edges.push((idx(*from), idx(State::Insert(0))));
            edges.extend(next(0).into_iter().map(|to| (idx(*from), idx(to))));
        }
        for i in 1..=k {
            for from in [State::Match(i), State::Delete(i), State::Insert(i)].iter() {
                edges.push((idx(*from), idx(State::Insert(i))));
                edges.extend(next(i).into_iter().map(|to| (idx(*from), idx(to))));
            }
        }
        edges.sort_unstable();
        Ok(edges)
    }
}

impl std::convert::TryFrom<Vec<State>> for Topology {
    type Error = HmmError;
    fn try_from(states: Vec<State>) -> Result<Self> {
        Self::from_states(states)
    }
}

impl std::convert::From<Topology> for Vec<State> {
    fn from(topology: Topology) -> Vec<State> {
        topology.states
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.labels().join(" "))
    }
}
