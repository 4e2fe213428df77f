//! Numeric score domain and substitution scoring.
//!
//! The recurrence is the same for every score type; only the arithmetic
//! differs. Integer scores are exact but may overflow for very long inputs
//! with large parameters, floating point scores never overflow but lose
//! precision as sums grow.

use num_traits::{SaturatingAdd, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::ops::Add;

use crate::config::AlignerParameters;

/// A numeric type the aligner can accumulate scores in.
pub trait Score:
    Copy + PartialOrd + Add<Output = Self> + Zero + From<i16> + Debug + Display + Send + Sync + 'static
{
    /// Score used for unreachable gap states on the matrix boundary.
    fn neg_infinity() -> Self;

    /// `self + penalty` for a non-positive penalty, pinned at the bottom of
    /// the domain instead of overflowing.
    fn add_penalty(self, penalty: Self) -> Self;

    /// Whether the value can take part in the recurrence.
    fn is_representable(&self) -> bool;
}

macro_rules! impl_integer_score {
    ($($t:ty),*) => {$(
        impl Score for $t {
            fn neg_infinity() -> Self {
                <$t>::MIN / 2
            }

            #[inline]
            fn add_penalty(self, penalty: Self) -> Self {
                SaturatingAdd::saturating_add(&self, &penalty)
            }

            fn is_representable(&self) -> bool {
                true
            }
        }
    )*};
}

macro_rules! impl_float_score {
    ($($t:ty),*) => {$(
        impl Score for $t {
            fn neg_infinity() -> Self {
                <$t>::NEG_INFINITY
            }

            #[inline]
            fn add_penalty(self, penalty: Self) -> Self {
                self + penalty
            }

            fn is_representable(&self) -> bool {
                self.is_finite()
            }
        }
    )*};
}

impl_integer_score!(i16, i32, i64);
impl_float_score!(f32, f64);

/// Scores the alignment of one lhs character against one rhs character.
pub trait SubstitutionScorer<S: Score> {
    fn score(&self, lhs: char, rhs: char) -> S;
}

/// Identity score for equal characters, mismatch penalty otherwise.
#[derive(Debug, Clone, Copy)]
pub struct IdentityScorer<S> {
    identity_score: S,
    mismatch_penalty: S,
}

impl<S: Score> IdentityScorer<S> {
    pub fn new(identity_score: S, mismatch_penalty: S) -> Self {
        Self {
            identity_score,
            mismatch_penalty,
        }
    }
}

impl<S: Score> From<&AlignerParameters<S>> for IdentityScorer<S> {
    fn from(params: &AlignerParameters<S>) -> Self {
        Self::new(params.identity_score, params.mismatch_penalty)
    }
}

impl<S: Score> SubstitutionScorer<S> for IdentityScorer<S> {
    #[inline]
    fn score(&self, lhs: char, rhs: char) -> S {
        if lhs == rhs {
            self.identity_score
        } else {
            self.mismatch_penalty
        }
    }
}

/// Per-pair similarity scores, e.g. for treating visually or phonetically
/// close characters as partial matches.
///
/// Keys are unordered: `(a, b)` and `(b, a)` name the same entry. Pairs that
/// are not in the table are scored by the identity rule.
#[derive(Debug, Clone)]
pub struct PairScoreTable<S> {
    scores: HashMap<(char, char), S>,
}

impl<S> Default for PairScoreTable<S> {
    fn default() -> Self {
        Self {
            scores: HashMap::new(),
        }
    }
}

impl<S: Score> PairScoreTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: char, b: char) -> (char, char) {
        (a.min(b), a.max(b))
    }

    pub fn insert(&mut self, a: char, b: char, score: S) -> Option<S> {
        self.scores.insert(Self::key(a, b), score)
    }

    pub fn with_pair(mut self, a: char, b: char, score: S) -> Self {
        self.insert(a, b, score);
        self
    }

    pub fn get(&self, a: char, b: char) -> Option<S> {
        self.scores.get(&Self::key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &S> {
        self.scores.values()
    }
}

/// A pair table consulted first, with the identity rule as fallback.
#[derive(Debug, Clone, Copy)]
pub struct TableScorer<'a, S> {
    table: &'a PairScoreTable<S>,
    fallback: IdentityScorer<S>,
}

impl<'a, S: Score> TableScorer<'a, S> {
    pub fn new(table: &'a PairScoreTable<S>, fallback: IdentityScorer<S>) -> Self {
        Self { table, fallback }
    }
}

impl<S: Score> SubstitutionScorer<S> for TableScorer<'_, S> {
    #[inline]
    fn score(&self, lhs: char, rhs: char) -> S {
        match self.table.get(lhs, rhs) {
            Some(score) => score,
            None => self.fallback.score(lhs, rhs),
        }
    }
}

/// A cell of the dynamic programming matrix; `i` indexes lhs, `j` rhs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub i: usize,
    pub j: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentStats {
    pub matches: u32,
    pub mismatches: u32,
    pub gaps: u32,
    pub execution_time_ms: f32,
}

/// Tracks the maximum score seen during a row-major scan.
///
/// Only a strictly greater score replaces the current best, so among equal
/// maxima the first one scanned wins.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BestScore<S> {
    score: S,
    position: Position,
}

impl<S: Score> BestScore<S> {
    pub fn new() -> Self {
        Self {
            score: S::zero(),
            position: Position::default(),
        }
    }

    #[inline]
    pub fn consider(&mut self, score: S, i: usize, j: usize) {
        if score > self.score {
            self.score = score;
            self.position = Position { i, j };
        }
    }

    pub fn get(&self) -> (S, Position) {
        (self.score, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_scorer_distinguishes_equal_characters() {
        let scorer = IdentityScorer::new(2, -1);
        assert_eq!(scorer.score('a', 'a'), 2);
        assert_eq!(scorer.score('a', 'b'), -1);
        assert_eq!(scorer.score('ä', 'ä'), 2);
    }

    #[test]
    fn pair_table_is_symmetric_and_falls_back() {
        let table = PairScoreTable::new().with_pair('o', '0', 1.5f32);
        let scorer = TableScorer::new(&table, IdentityScorer::new(2.0, -1.0));
        assert_eq!(scorer.score('o', '0'), 1.5);
        assert_eq!(scorer.score('0', 'o'), 1.5);
        assert_eq!(scorer.score('x', 'x'), 2.0);
        assert_eq!(scorer.score('x', 'y'), -1.0);
    }

    #[test]
    fn neg_infinity_absorbs_any_penalty() {
        assert_eq!(i16::neg_infinity().add_penalty(-100), i16::MIN / 2 - 100);
        assert_eq!(i16::neg_infinity().add_penalty(i16::MIN), i16::MIN);
        assert_eq!(i32::neg_infinity().add_penalty(-1_100_000_000), i32::MIN);
        assert_eq!(i64::MIN.add_penalty(-1), i64::MIN);
        assert_eq!(f64::neg_infinity().add_penalty(-5.0), f64::NEG_INFINITY);
    }

    #[test]
    fn floats_must_be_finite() {
        assert!(1.0f32.is_representable());
        assert!(!f32::NAN.is_representable());
        assert!(!f64::INFINITY.is_representable());
        assert!(i32::MIN.is_representable());
    }

    #[test]
    fn best_score_keeps_earliest_maximum() {
        let mut best = BestScore::<i32>::new();
        assert_eq!(best.get(), (0, Position { i: 0, j: 0 }));
        best.consider(0, 1, 1);
        best.consider(4, 2, 2);
        best.consider(4, 3, 2);
        best.consider(3, 4, 4);
        assert_eq!(best.get(), (4, Position { i: 2, j: 2 }));
    }
}
