//! Sampling fictional paths and sequences from a model.
use super::ProfileHmm;
use crate::error::Result;
use crate::topology::State;
use rand::Rng;

/// How long a sampled path can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBound {
    /// Draw exactly as many times as the number of states. Stops early only when the
    /// current state has no outgoing transition, e.g., `End`.
    FixedSteps,
    /// Draw until `End` is visited, or `max_steps` draws are made.
    UntilEnd { max_steps: usize },
}

impl std::default::Default for StepBound {
    fn default() -> Self {
        StepBound::FixedSteps
    }
}

// Subtract the non-zero entries of `row` from a uniform [0,1) value until it reaches zero.
// If it never does because of rounding, the last non-zero entry is taken.
fn pick<R: Rng>(row: &[f64], rng: &mut R) -> Option<usize> {
    let mut rest: f64 = rng.gen_range(0f64..1f64);
    let mut last = None;
    for (idx, &prob) in row.iter().enumerate() {
        if prob == 0f64 {
            continue;
        }
        rest -= prob;
        last = Some(idx);
        if rest <= 0f64 {
            return last;
        }
    }
    last
}

impl ProfileHmm {
    /// Sample a path by following the transitions from `Start`. `Start` itself is not in the path.
    /// If the topology has no `Start`, the first state is drawn uniformly and is in the path.
    pub fn sample_path<R: Rng>(&self, rng: &mut R, bound: StepBound) -> Vec<State> {
        let max_steps = match bound {
            StepBound::FixedSteps => self.num_states(),
            StepBound::UntilEnd { max_steps } => max_steps,
        };
        let mut path = vec![];
        if self.num_states() == 0 || max_steps == 0 {
            return path;
        }
        let mut current = match self.topology.index_of(&State::Start) {
            Some(start) => start,
            None => {
                let first = rng.gen_range(0..self.num_states());
                path.push(self.topology.state(first));
                first
            }
        };
        while path.len() < max_steps {
            current = match pick(self.transition.row(current), rng) {
                Some(next) => next,
                None => break,
            };
            let state = self.topology.state(current);
            path.push(state);
            if state == State::End && bound != StepBound::FixedSteps {
                break;
            }
        }
        path
    }
    /// Sample a symbol for each emitting state of `path`.
    pub fn sample_sequence<R: Rng>(&self, path: &[State], rng: &mut R) -> Result<Vec<u8>> {
        let path = self.state_indices(path)?;
        let seq = path
            .into_iter()
            .filter_map(|state| pick(self.emission.row(state), rng))
            .map(|symbol| self.alphabet.symbol(symbol))
            .collect();
        Ok(seq)
    }
}
