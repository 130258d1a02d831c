//! Very thin readers of multiple alignments downloaded from Pfam and BLAST.
use crate::alignment::Alignment;
use crate::alphabet::GAP;
use crate::error::{HmmError, Result};
use std::io::{BufRead, BufReader};

/// Line number (0-origin) of the `Query` line in a BLAST query-anchored alignment.
const BLAST_QUERY_LINE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `ID ALIGNED_SEQ` per line, as the "Pfam selex"/Stockholm body.
    Pfam,
    /// Query-anchored text output of BLAST.
    Blast,
}

impl std::str::FromStr for Format {
    type Err = HmmError;
    fn from_str(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "pfam" => Ok(Format::Pfam),
            "blast" => Ok(Format::Blast),
            _ => Err(HmmError::Parse(format!("unknown alignment format {}", format))),
        }
    }
}

/// Read an alignment file.
pub fn read_alignment<P: AsRef<std::path::Path>>(file: P, format: Format) -> Result<Alignment> {
    let reader = std::fs::File::open(file).map(BufReader::new)?;
    match format {
        Format::Pfam => parse_pfam(reader),
        Format::Blast => parse_blast(reader),
    }
}

/// Parse a Pfam alignment. Comment lines (`#`), the terminator (`//`), and blank lines are skipped.
/// `.` is read as a gap and residues are upper-cased. Reading stops at the first line
/// not consisting of exactly two fields.
pub fn parse_pfam<R: BufRead>(reader: R) -> Result<Alignment> {
    let mut rows = vec![];
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let fields: Vec<_> = line.split_whitespace().collect();
        if fields.len() != 2 {
            break;
        }
        let row: Vec<u8> = fields[1]
            .bytes()
            .map(|x| match x {
                b'.' => GAP,
                _ => x.to_ascii_uppercase(),
            })
            .collect();
        rows.push(row);
    }
    debug!("PFAM\t{} rows", rows.len());
    Alignment::new(&rows)
}

/// Parse a BLAST query-anchored alignment. The sixth line should be `Query <start> <SEQ> ...`.
/// Every following non-empty line contributes its text at the columns of `<SEQ>`,
/// with spaces read as gaps.
pub fn parse_blast<R: BufRead>(reader: R) -> Result<Alignment> {
    let mut lines = reader.lines();
    let mut query = None;
    for _ in 0..=BLAST_QUERY_LINE {
        query = lines.next().transpose()?;
    }
    let query = query.ok_or_else(|| HmmError::Parse("too short BLAST output".to_string()))?;
    let (start, seq) = fields_with_offset(&query)
        .get(2)
        .copied()
        .ok_or_else(|| HmmError::Parse(format!("malformed query line:{}", query)))?;
    let end = start + seq.len();
    let mut rows = vec![seq.as_bytes().to_vec()];
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let line = line.as_bytes();
        let row: Vec<u8> = (start..end)
            .map(|i| match line.get(i) {
                Some(&b' ') | None => GAP,
                Some(&x) => x,
            })
            .collect();
        rows.push(row);
    }
    debug!("BLAST\t{} rows\t{}-{}", rows.len(), start, end);
    Alignment::new(&rows)
}

// Whitespace-separated fields with their byte offsets.
fn fields_with_offset(line: &str) -> Vec<(usize, &str)> {
    let mut fields = vec![];
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                fields.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        fields.push((s, &line[s..]));
    }
    fields
}
