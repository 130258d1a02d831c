//! Multiple sequence alignments and their consensus columns.
use crate::alphabet::GAP;
use crate::error::{HmmError, Result};

/// A rectangular multiple alignment. Each row is a sequence over the alphabet and the gap `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    rows: Vec<Vec<u8>>,
    width: usize,
}

impl Alignment {
    /// Build an alignment. Fails if there is no row or rows have different lengths.
    pub fn new<T: std::borrow::Borrow<[u8]>>(rows: &[T]) -> Result<Self> {
        let width = match rows.first() {
            Some(row) => row.borrow().len(),
            None => return Err(HmmError::InvalidAlignment("no rows".to_string())),
        };
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.borrow().len() != width)
        {
            let msg = format!(
                "row {} has {} columns while row 0 has {}",
                idx,
                row.borrow().len(),
                width
            );
            return Err(HmmError::InvalidAlignment(msg));
        }
        let rows: Vec<_> = rows.iter().map(|row| row.borrow().to_vec()).collect();
        Ok(Self { rows, width })
    }
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
    pub fn width(&self) -> usize {
        self.width
    }
    /// Fraction of rows with a gap at each column.
    pub fn gap_fractions(&self) -> Vec<f64> {
        let mut gaps = vec![0usize; self.width];
        for row in self.rows.iter() {
            for (count, &x) in gaps.iter_mut().zip(row.iter()) {
                if x == GAP {
                    *count += 1;
                }
            }
        }
        let total = self.rows.len() as f64;
        gaps.iter().map(|&count| count as f64 / total).collect()
    }
    /// Label each column. A column is an insert column if the fraction of gaps
    /// in it is equal to or larger than `threshold`. Otherwise, it is a consensus column.
    pub fn classify_columns(&self, threshold: f64) -> ColumnClassification {
        let consensus = self
            .gap_fractions()
            .iter()
            .map(|&frac| frac < threshold)
            .collect();
        ColumnClassification { consensus }
    }
}

/// Consensus/insert label of each column of an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClassification {
    // true for consensus columns.
    consensus: Vec<bool>,
}

impl ColumnClassification {
    /// Panics if `column` is out of range.
    pub fn is_consensus(&self, column: usize) -> bool {
        self.consensus[column]
    }
    pub fn as_slice(&self) -> &[bool] {
        &self.consensus
    }
    pub fn len(&self) -> usize {
        self.consensus.len()
    }
    pub fn is_empty(&self) -> bool {
        self.consensus.is_empty()
    }
    /// The number of consensus columns, i.e., the number of match states.
    pub fn consensus_count(&self) -> usize {
        self.consensus.iter().filter(|&&x| x).count()
    }
}
