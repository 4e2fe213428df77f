use std::fmt;

use serde::Serialize;

use crate::scoring::{AlignmentStats, Position};

// Low two bits: where the no-gap score H came from.
pub(crate) const ARROW_DIAGONAL: u8 = 0x0;
pub(crate) const ARROW_UP: u8 = 0x1; // E, consumes lhs only.
pub(crate) const ARROW_LEFT: u8 = 0x2; // F, consumes rhs only.
pub(crate) const ARROW_FINISH: u8 = 0x3; // Score clamped to zero.
const ARROW_MASK: u8 = 0x3;

// Set when the gap state was opened from H rather than extended.
pub(crate) const GAP_OPENED_UP: u8 = 0x4;
pub(crate) const GAP_OPENED_LEFT: u8 = 0x8;

/// One step of an alignment in edit-script form.
///
/// Insertions consume only an rhs character, deletions only an lhs character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TracebackOperation {
    Match,
    Mismatch,
    Insertion,
    Deletion,
}

/// Back-pointers for every cell, row-major with `rows = |lhs| + 1`.
pub struct TracebackMatrix {
    data: Vec<u8>,
    rows: usize,
    cols: usize,
}

impl TracebackMatrix {
    /// Boundary cells start out as FINISH; interior cells are overwritten
    /// by the fill.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![ARROW_FINISH; rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    /// Follows the back-pointers from `end` to the first cell whose score
    /// was clamped to zero.
    ///
    /// Returns that cell and the gap flags of the steps in between, in
    /// left-to-right order.
    pub(crate) fn trace(&self, end: Position) -> (Position, GapVectors) {
        #[derive(Clone, Copy)]
        enum Layer {
            NoGap,
            LhsOnly,
            RhsOnly,
        }

        let Position { mut i, mut j } = end;
        let mut layer = Layer::NoGap;
        let mut gaps = GapVectors::with_capacity(i + j);

        loop {
            let cell = self.get(i, j);
            match layer {
                Layer::NoGap => match cell & ARROW_MASK {
                    ARROW_DIAGONAL => {
                        gaps.push_diagonal(1);
                        i -= 1;
                        j -= 1;
                    }
                    ARROW_UP => layer = Layer::LhsOnly,
                    ARROW_LEFT => layer = Layer::RhsOnly,
                    _ => break,
                },
                Layer::LhsOnly => {
                    debug_assert!(0 < i);
                    gaps.push_lhs_only(1);
                    if cell & GAP_OPENED_UP != 0 {
                        layer = Layer::NoGap;
                    }
                    i -= 1;
                }
                Layer::RhsOnly => {
                    debug_assert!(0 < j);
                    gaps.push_rhs_only(1);
                    if cell & GAP_OPENED_LEFT != 0 {
                        layer = Layer::NoGap;
                    }
                    j -= 1;
                }
            }
        }

        gaps.reverse();
        (Position { i, j }, gaps)
    }
}

impl fmt::Display for TracebackMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let c = match self.get(row, col) & ARROW_MASK {
                    ARROW_DIAGONAL => '\\',
                    ARROW_UP => '|',
                    ARROW_LEFT => '-',
                    _ => '.',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Two index-aligned gap vectors. At most one side has a gap at any
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GapVectors {
    pub lhs: Vec<bool>,
    pub rhs: Vec<bool>,
}

impl GapVectors {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lhs: Vec::with_capacity(capacity),
            rhs: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, lhs_gap: bool, rhs_gap: bool, count: usize) {
        self.lhs.extend(std::iter::repeat(lhs_gap).take(count));
        self.rhs.extend(std::iter::repeat(rhs_gap).take(count));
    }

    pub fn push_diagonal(&mut self, count: usize) {
        self.push(false, false, count);
    }

    /// Positions holding an lhs character against a gap in rhs.
    pub fn push_lhs_only(&mut self, count: usize) {
        self.push(false, true, count);
    }

    /// Positions holding an rhs character against a gap in lhs.
    pub fn push_rhs_only(&mut self, count: usize) {
        self.push(true, false, count);
    }

    pub fn append(&mut self, other: &mut GapVectors) {
        self.lhs.append(&mut other.lhs);
        self.rhs.append(&mut other.rhs);
    }

    pub fn reverse(&mut self) {
        self.lhs.reverse();
        self.rhs.reverse();
    }
}

/// Converts gap vectors to the equivalent edit script.
pub fn operations(lhs: &[char], rhs: &[char], lhs_gaps: &[bool], rhs_gaps: &[bool]) -> Vec<TracebackOperation> {
    assert_eq!(lhs_gaps.len(), rhs_gaps.len(), "Gap vectors differ in length");

    let mut lhs_it = lhs.iter();
    let mut rhs_it = rhs.iter();
    lhs_gaps
        .iter()
        .zip(rhs_gaps)
        .map(|(&lhs_gap, &rhs_gap)| match (lhs_gap, rhs_gap) {
            (false, false) => {
                let (a, b) = (lhs_it.next(), rhs_it.next());
                assert!(a.is_some() && b.is_some(), "Gap vectors longer than the texts");
                if a == b {
                    TracebackOperation::Match
                } else {
                    TracebackOperation::Mismatch
                }
            }
            (true, false) => {
                assert!(rhs_it.next().is_some(), "Gap vectors longer than rhs");
                TracebackOperation::Insertion
            }
            (false, true) => {
                assert!(lhs_it.next().is_some(), "Gap vectors longer than lhs");
                TracebackOperation::Deletion
            }
            (true, true) => panic!("Both texts have a gap at the same aligned position"),
        })
        .collect()
}

/// Renders one side of an alignment with `-` in place of gaps.
pub fn aligned_text(text: &[char], gaps: &[bool]) -> String {
    let mut it = text.iter();
    gaps.iter()
        .map(|&gap| {
            if gap {
                return '-';
            }
            match it.next() {
                Some(&c) => c,
                None => panic!("Gap vector longer than the text"),
            }
        })
        .collect()
}

impl FromIterator<TracebackOperation> for AlignmentStats {
    fn from_iter<I: IntoIterator<Item = TracebackOperation>>(iter: I) -> Self {
        iter.into_iter().fold(AlignmentStats::default(), |mut acc, op| {
            match op {
                TracebackOperation::Match => acc.matches += 1,
                TracebackOperation::Mismatch => acc.mismatches += 1,
                TracebackOperation::Insertion | TracebackOperation::Deletion => acc.gaps += 1,
            }
            acc
        })
    }
}
