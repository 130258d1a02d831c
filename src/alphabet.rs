//! Alphabet: an ordered set of emitted symbols.
//!
//! The order of the symbols is the column order of every emission table,
//! so it is fixed once the alphabet is built. Lookups go through a 256-slot table,
//! the same trick used to convert nucleotides to two-bit codes.
use crate::error::{HmmError, Result};
use serde::{Deserialize, Serialize};

/// Gap marker. Only legal inside alignments.
pub const GAP: u8 = b'-';

const NULL: u8 = u8::MAX;

/// The twenty amino acids, in the order used by the emission tables.
pub const AMINO_ACIDS: &[u8; 20] = b"GALMFWKQESPVICYHRNDT";

/// Background frequency of each amino acid in proteins. It is the emission
/// distribution of the null model.
pub const AMINO_BACKGROUND: [(u8, f64); 20] = [
    (b'A', 0.074),
    (b'R', 0.042),
    (b'N', 0.044),
    (b'D', 0.059),
    (b'C', 0.033),
    (b'E', 0.058),
    (b'Q', 0.037),
    (b'G', 0.074),
    (b'H', 0.029),
    (b'I', 0.038),
    (b'L', 0.076),
    (b'K', 0.072),
    (b'M', 0.018),
    (b'F', 0.04),
    (b'P', 0.05),
    (b'S', 0.08),
    (b'T', 0.062),
    (b'W', 0.013),
    (b'Y', 0.033),
    (b'V', 0.068),
];

/// Return the background frequency of `symbol`, 0 if it is not an amino acid.
pub fn background_frequency(symbol: u8) -> f64 {
    AMINO_BACKGROUND
        .iter()
        .find(|&&(aa, _)| aa == symbol)
        .map(|&(_, freq)| freq)
        .unwrap_or(0f64)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Alphabet {
    symbols: Vec<u8>,
    lookup: Vec<u8>,
}

impl Alphabet {
    /// Build an alphabet. Symbols should be distinct, and the gap should not be in them.
    pub fn new(symbols: &[u8]) -> Result<Self> {
        if symbols.is_empty() {
            return Err(HmmError::InvalidModel("empty alphabet".to_string()));
        }
        if symbols.len() >= NULL as usize {
            return Err(HmmError::InvalidModel("too many symbols".to_string()));
        }
        let mut lookup = vec![NULL; 256];
        for (idx, &symbol) in symbols.iter().enumerate() {
            if symbol == GAP || symbol.is_ascii_whitespace() {
                let msg = format!("{:?} can not be a symbol", symbol as char);
                return Err(HmmError::InvalidModel(msg));
            }
            if lookup[symbol as usize] != NULL {
                let msg = format!("duplicated symbol {:?}", symbol as char);
                return Err(HmmError::InvalidModel(msg));
            }
            lookup[symbol as usize] = idx as u8;
        }
        Ok(Self {
            symbols: symbols.to_vec(),
            lookup,
        })
    }
    pub fn amino_acids() -> Self {
        // The constant has no gaps nor duplicates.
        Self::new(AMINO_ACIDS).unwrap()
    }
    pub fn len(&self) -> usize {
        self.symbols.len()
    }
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
    /// Panics if `index` is out of range.
    pub fn symbol(&self, index: usize) -> u8 {
        self.symbols[index]
    }
    /// Position of `symbol` in this alphabet.
    pub fn index(&self, symbol: u8) -> Option<usize> {
        match self.lookup[symbol as usize] {
            NULL => None,
            idx => Some(idx as usize),
        }
    }
    /// Convert a sequence into alphabet positions.
    pub fn encode(&self, seq: &[u8]) -> Result<Vec<usize>> {
        seq.iter()
            .map(|&x| self.index(x).ok_or(HmmError::UnknownSymbol(x as char)))
            .collect()
    }
}

impl std::convert::TryFrom<Vec<u8>> for Alphabet {
    type Error = HmmError;
    fn try_from(symbols: Vec<u8>) -> Result<Self> {
        Self::new(&symbols)
    }
}

impl std::convert::From<Alphabet> for Vec<u8> {
    fn from(alphabet: Alphabet) -> Vec<u8> {
        alphabet.symbols
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn lookup() {
        let alphabet = Alphabet::amino_acids();
        assert_eq!(alphabet.len(), 20);
        assert_eq!(alphabet.index(b'G'), Some(0));
        assert_eq!(alphabet.index(b'T'), Some(19));
        assert_eq!(alphabet.index(b'B'), None);
        assert_eq!(alphabet.index(GAP), None);
        assert_eq!(alphabet.encode(b"GAT").unwrap(), vec![0, 1, 19]);
        assert!(matches!(
            alphabet.encode(b"GXA"),
            Err(HmmError::UnknownSymbol('X'))
        ));
    }
    #[test]
    fn reject_bad_alphabet() {
        assert!(Alphabet::new(b"").is_err());
        assert!(Alphabet::new(b"AC-").is_err());
        assert!(Alphabet::new(b"ACA").is_err());
        assert!(Alphabet::new(b"ACGT").is_ok());
    }
    #[test]
    fn background_sums_to_one() {
        let total: f64 = AMINO_BACKGROUND.iter().map(|x| x.1).sum();
        assert!((total - 1f64).abs() < 0.01, "{}", total);
        assert!(AMINO_ACIDS
            .iter()
            .all(|&aa| 0f64 < background_frequency(aa)));
        assert_eq!(background_frequency(b'X'), 0f64);
    }
}
