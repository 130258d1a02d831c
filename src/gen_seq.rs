//! This module is to generate some random protein alignments to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::alphabet::{AMINO_ACIDS, GAP};
use rand::seq::SliceRandom;
use rand::Rng;

/// Per-residue rates of substitution, deletion, and insertion.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub sub: f64,
    pub del: f64,
    pub ins: f64,
}
impl Profile {
    pub fn mul(&self, x: f64) -> Self {
        Self {
            sub: self.sub * x,
            ins: self.ins * x,
            del: self.del * x,
        }
    }
}

/// A moderately divergent family.
pub const PROFILE: Profile = Profile {
    sub: 0.1,
    del: 0.05,
    ins: 0.05,
};

/// A well conserved family.
pub const CONSERVED_PROFILE: Profile = Profile {
    sub: 0.02,
    del: 0.01,
    ins: 0.01,
};

#[derive(Debug, Clone, Copy)]
enum Op {
    Match,
    MisMatch,
    Del,
}

impl Op {
    fn draw<T: Rng>(rng: &mut T, p: &Profile) -> Self {
        let x: f64 = rng.gen_range(0f64..1f64);
        if x < p.sub {
            Op::MisMatch
        } else if x < p.sub + p.del {
            Op::Del
        } else {
            Op::Match
        }
    }
}

/// A random protein sequence of length `len`.
pub fn generate_seq<T: Rng>(rng: &mut T, len: usize) -> Vec<u8> {
    (0..len)
        .filter_map(|_| AMINO_ACIDS.choose(rng))
        .copied()
        .collect()
}

/// A mutated, unaligned copy of `seq`.
pub fn introduce_randomness<T: Rng>(seq: &[u8], rng: &mut T, p: &Profile) -> Vec<u8> {
    let (core, insertions) = mutate_aligned(seq, rng, p);
    let mut res: Vec<u8> = insertions[0].clone();
    for (&x, ins) in core.iter().zip(insertions.iter().skip(1)) {
        if x != GAP {
            res.push(x);
        }
        res.extend(ins);
    }
    res
}

/// `num` mutated copies of `template`, aligned to each other. Deleted residues become gaps,
/// and inserted residues get their own columns, padded with gaps in the other rows.
pub fn generate_alignment<T: Rng>(
    template: &[u8],
    num: usize,
    rng: &mut T,
    p: &Profile,
) -> Vec<Vec<u8>> {
    let rows: Vec<_> = (0..num).map(|_| mutate_aligned(template, rng, p)).collect();
    let widths: Vec<usize> = (0..=template.len())
        .map(|slot| rows.iter().map(|(_, ins)| ins[slot].len()).max().unwrap_or(0))
        .collect();
    rows.into_iter()
        .map(|(core, insertions)| {
            let mut row = vec![];
            for (slot, (ins, &width)) in insertions.iter().zip(widths.iter()).enumerate() {
                if 0 < slot {
                    row.push(core[slot - 1]);
                }
                row.extend(ins);
                row.extend(std::iter::repeat(GAP).take(width - ins.len()));
            }
            row
        })
        .collect()
}

// Residues (or gaps) at the template positions, and the insertions before the first position
// and after each position. The latter has `seq.len() + 1` elements.
fn mutate_aligned<T: Rng>(seq: &[u8], rng: &mut T, p: &Profile) -> (Vec<u8>, Vec<Vec<u8>>) {
    let mut insertions = vec![random_insertion(rng, p)];
    let mut core = Vec::with_capacity(seq.len());
    for &x in seq {
        let x = match Op::draw(rng, p) {
            Op::Match => x,
            Op::MisMatch => choose_residue(rng, x),
            Op::Del => GAP,
        };
        core.push(x);
        insertions.push(random_insertion(rng, p));
    }
    (core, insertions)
}

fn random_insertion<T: Rng>(rng: &mut T, p: &Profile) -> Vec<u8> {
    let mut ins = vec![];
    while rng.gen_bool(p.ins) {
        ins.push(random_residue(rng));
    }
    ins
}

fn choose_residue<T: Rng>(rng: &mut T, residue: u8) -> u8 {
    let residues: Vec<u8> = AMINO_ACIDS
        .iter()
        .filter(|&&e| e != residue)
        .copied()
        .collect();
    residues[rng.gen_range(0..residues.len())]
}
fn random_residue<T: Rng>(rng: &mut T) -> u8 {
    AMINO_ACIDS[rng.gen_range(0..AMINO_ACIDS.len())]
}
