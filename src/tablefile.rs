//! Plain-text matrix files holding the transition and emission tables of a model.
//!
//! The first line is the column headers, and each following line is a row header
//! followed by the values of the row. Every field is left-aligned in a width of 9,
//! and the values are rounded to 4 decimal places.
use crate::alphabet::Alphabet;
use crate::error::{HmmError, Result};
use crate::hmm::{ProbMatrix, ProfileHmm};
use crate::topology::Topology;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const DIGITS: i32 = 4;

/// A matrix with its headers.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub row_headers: Vec<String>,
    pub column_headers: Vec<String>,
    pub matrix: ProbMatrix,
}

fn round_to(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}

/// Write a matrix with headers into `wtr`.
pub fn write_table<W: Write, S: AsRef<str>, T: AsRef<str>>(
    wtr: &mut W,
    row_headers: &[S],
    column_headers: &[T],
    matrix: &ProbMatrix,
) -> std::io::Result<()> {
    write!(wtr, "{:<9}", " ")?;
    for header in column_headers {
        write!(wtr, "{:<9}", header.as_ref())?;
    }
    writeln!(wtr, " ")?;
    for (i, header) in row_headers.iter().enumerate() {
        write!(wtr, "{:<9}", header.as_ref())?;
        for &x in matrix.row(i) {
            write!(wtr, "{:<9.4}", round_to(x, DIGITS))?;
        }
        writeln!(wtr, " ")?;
    }
    Ok(())
}

/// Read a matrix file. Blank lines are skipped.
pub fn read_table<R: BufRead>(reader: R) -> Result<Table> {
    let mut lines = reader.lines();
    let column_headers: Vec<String> = match lines.next() {
        Some(line) => line?.split_whitespace().map(|x| x.to_string()).collect(),
        None => return Err(HmmError::Parse("empty matrix file".to_string())),
    };
    let mut row_headers = vec![];
    let mut rows = vec![];
    for line in lines {
        let line = line?;
        let mut fields = line.split_whitespace();
        let header = match fields.next() {
            Some(header) => header.to_string(),
            None => continue,
        };
        let row = fields
            .map(|x| {
                x.parse::<f64>()
                    .map_err(|e| HmmError::Parse(format!("{}:{}", x, e)))
            })
            .collect::<Result<Vec<f64>>>()?;
        if row.len() != column_headers.len() {
            let msg = format!(
                "row {} has {} values for {} columns",
                header,
                row.len(),
                column_headers.len()
            );
            return Err(HmmError::Parse(msg));
        }
        row_headers.push(header);
        rows.push(row);
    }
    let matrix = if rows.is_empty() {
        ProbMatrix::zeros(0, column_headers.len())
    } else {
        ProbMatrix::from_rows(&rows)?
    };
    Ok(Table {
        row_headers,
        column_headers,
        matrix,
    })
}

/// Names of the transition and the emission files of a domain.
pub fn table_paths<P: AsRef<Path>>(dir: P, domain: &str) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    let transition = dir.join(format!("{}TrMap.txt", domain));
    let emission = dir.join(format!("{}EmiMap.txt", domain));
    (transition, emission)
}

impl ProfileHmm {
    /// Write the transition table and the emission table.
    pub fn write_tables<W: Write, V: Write>(&self, transition: &mut W, emission: &mut V) -> Result<()> {
        let labels = self.topology().labels();
        write_table(transition, &labels, &labels, self.transitions())?;
        let symbols: Vec<_> = self
            .alphabet()
            .symbols()
            .iter()
            .map(|&x| (x as char).to_string())
            .collect();
        write_table(emission, &labels, &symbols, self.emissions())?;
        Ok(())
    }
    /// Rebuild a model from the tables written by [`ProfileHmm::write_tables`].
    /// The states are taken from the header of the transition table, and the alphabet from
    /// the header of the emission table. As the values are rounded, rows are normalized again.
    pub fn from_tables<R: BufRead, S: BufRead>(transition: R, emission: S) -> Result<Self> {
        let transition = read_table(transition)?;
        let emission = read_table(emission)?;
        if transition.row_headers != transition.column_headers {
            let msg = "rows and columns of the transition table differ".to_string();
            return Err(HmmError::InvalidModel(msg));
        }
        if emission.row_headers != transition.row_headers {
            let msg = "the emission table and the transition table have different states".to_string();
            return Err(HmmError::InvalidModel(msg));
        }
        let topology = Topology::from_labels(&transition.column_headers)?;
        let symbols = emission
            .column_headers
            .iter()
            .map(|x| match x.as_bytes() {
                &[symbol] => Ok(symbol),
                _ => Err(HmmError::Parse(format!("{} is not a symbol", x))),
            })
            .collect::<Result<Vec<u8>>>()?;
        let alphabet = Alphabet::new(&symbols)?;
        let (mut transition, mut emission) = (transition.matrix, emission.matrix);
        transition.normalize_rows();
        emission.normalize_rows();
        Self::new(topology, alphabet, transition, emission)
    }
    /// Write `{domain}TrMap.txt` and `{domain}EmiMap.txt` under `dir`.
    pub fn save<P: AsRef<Path>>(&self, dir: P, domain: &str) -> Result<(PathBuf, PathBuf)> {
        let (tr_path, emi_path) = table_paths(dir, domain);
        let mut transition = std::fs::File::create(&tr_path).map(BufWriter::new)?;
        let mut emission = std::fs::File::create(&emi_path).map(BufWriter::new)?;
        self.write_tables(&mut transition, &mut emission)?;
        transition.flush()?;
        emission.flush()?;
        debug!("SAVED\t{}\t{}", tr_path.display(), emi_path.display());
        Ok((tr_path, emi_path))
    }
    /// Read a model from a transition file and an emission file.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(transition: P, emission: Q) -> Result<Self> {
        let transition = std::fs::File::open(transition).map(BufReader::new)?;
        let emission = std::fs::File::open(emission).map(BufReader::new)?;
        Self::from_tables(transition, emission)
    }
}
