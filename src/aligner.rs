//! Local alignment with affine gap costs (Smith-Waterman with Gotoh's three
//! states).
//!
//! For every cell `(i, j)`, `i` indexing lhs and `j` rhs:
//!
//! ```text
//! E[i][j] = max(H[i-1][j] + gap_start, E[i-1][j] + gap)     // lhs char against a gap
//! F[i][j] = max(H[i][j-1] + gap_start, F[i][j-1] + gap)     // rhs char against a gap
//! H[i][j] = max(0, H[i-1][j-1] + s(lhs[i], rhs[j]), E[i][j], F[i][j])
//! ```
//!
//! Ties prefer the diagonal over E over F, and opening a gap over extending
//! one. The alignment ends at the first maximal cell in row-major order.
//!
//! Time is `O(|lhs| * |rhs|)`, and so is memory: one traceback byte per cell.
//! Scores are kept for two rows only. The aligner does no admission control
//! of its own beyond an optional cell limit and a cancellation token checked
//! before each row; callers facing untrusted input should set both.
//!
//! Gap scores saturate at the bottom of an integer domain, so any penalty is
//! accepted. Positive sums are not guarded: `max(|lhs|, |rhs|) * identity`
//! must fit the score type. Floating point scores do not overflow but lose
//! precision on very long inputs.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, log_enabled, trace, Level};

use crate::config::AlignerParameters;
use crate::scoring::{BestScore, IdentityScorer, Score, SubstitutionScorer};
use crate::traceback::{
    GapVectors, TracebackMatrix, ARROW_DIAGONAL, ARROW_FINISH, ARROW_LEFT, ARROW_UP, GAP_OPENED_LEFT,
    GAP_OPENED_UP,
};
use crate::{AlignerError, Result};

/// Cooperative cancellation shared between the aligning thread and others.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The result of one alignment.
///
/// Both gap vectors have one entry per aligned position. Characters outside
/// the local alignment are included as gapped positions so that every
/// character of both texts appears exactly once: the unaligned lhs prefix
/// comes first, then the unaligned rhs prefix, then the local alignment,
/// then the lhs suffix and finally the rhs suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<S> {
    pub score: S,
    pub lhs_gaps: Vec<bool>,
    pub rhs_gaps: Vec<bool>,
    /// The locally aligned part of lhs.
    pub lhs_range: Range<usize>,
    /// The locally aligned part of rhs.
    pub rhs_range: Range<usize>,
    /// Positions of the gap vectors that belong to the local alignment.
    pub local_positions: Range<usize>,
}

impl<S> Alignment<S> {
    /// Number of aligned positions.
    pub fn len(&self) -> usize {
        self.lhs_gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lhs_gaps.is_empty()
    }
}

/// Number of dynamic programming cells needed for texts of the given lengths.
pub fn matrix_cells(lhs_len: usize, rhs_len: usize) -> usize {
    lhs_len.saturating_add(1).saturating_mul(rhs_len.saturating_add(1))
}

#[derive(Debug, Clone)]
pub struct SmithWatermanAligner<S> {
    parameters: AlignerParameters<S>,
    cancellation: Option<CancellationToken>,
    cell_limit: Option<usize>,
}

impl<S: Score> SmithWatermanAligner<S> {
    pub fn new(parameters: AlignerParameters<S>) -> Self {
        Self {
            parameters,
            cancellation: None,
            cell_limit: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Reject inputs needing more than `limit` matrix cells.
    pub fn with_cell_limit(mut self, limit: usize) -> Self {
        self.cell_limit = Some(limit);
        self
    }

    pub fn parameters(&self) -> &AlignerParameters<S> {
        &self.parameters
    }

    pub fn align(&self, lhs: &[char], rhs: &[char]) -> Result<Alignment<S>> {
        self.align_with_scorer(lhs, rhs, &IdentityScorer::from(&self.parameters))
    }

    /// Aligns with a custom substitution score; the gap penalties still come
    /// from the parameters.
    pub fn align_with_scorer<T: SubstitutionScorer<S>>(
        &self,
        lhs: &[char],
        rhs: &[char],
        scorer: &T,
    ) -> Result<Alignment<S>> {
        let start_time = Instant::now();
        let (rows, cols) = (lhs.len(), rhs.len());

        let cells = matrix_cells(rows, cols);
        if let Some(limit) = self.cell_limit {
            if cells > limit {
                return Err(AlignerError::SequenceTooLarge { cells, limit });
            }
        }
        self.parameters.validate()?;

        let (traceback, best) = self.fill(lhs, rhs, scorer)?;
        let (score, end) = best.get();

        if log_enabled!(Level::Trace) {
            trace!("Traceback matrix:\n{}", traceback);
        }

        let (start, mut local) = traceback.trace(end);
        let lead = start.i + start.j;
        let local_positions = lead..lead + local.lhs.len();
        let mut gaps = GapVectors::with_capacity(rows + cols);
        gaps.push_lhs_only(start.i);
        gaps.push_rhs_only(start.j);
        gaps.append(&mut local);
        gaps.push_lhs_only(rows - end.i);
        gaps.push_rhs_only(cols - end.j);

        debug!(
            "Aligned {}x{} characters in {:.3} ms; score {}, local alignment lhs {}..{} rhs {}..{}",
            rows,
            cols,
            start_time.elapsed().as_secs_f32() * 1000.0,
            score,
            start.i,
            end.i,
            start.j,
            end.j
        );

        Ok(Alignment {
            score,
            lhs_gaps: gaps.lhs,
            rhs_gaps: gaps.rhs,
            lhs_range: start.i..end.i,
            rhs_range: start.j..end.j,
            local_positions,
        })
    }

    fn fill<T: SubstitutionScorer<S>>(
        &self,
        lhs: &[char],
        rhs: &[char],
        scorer: &T,
    ) -> Result<(TracebackMatrix, BestScore<S>)> {
        let (rows, cols) = (lhs.len(), rhs.len());
        let gap_start = self.parameters.gap_start_penalty;
        let gap = self.parameters.gap_penalty;
        let zero = S::zero();

        let mut traceback = TracebackMatrix::new(rows + 1, cols + 1);
        let mut best = BestScore::new();

        // H of the previous and current rows, E of the previous row.
        let mut prev_h = vec![zero; cols + 1];
        let mut curr_h = vec![zero; cols + 1];
        let mut e = vec![S::neg_infinity(); cols + 1];

        for i in 1..=rows {
            if let Some(token) = &self.cancellation {
                if token.is_cancelled() {
                    debug!("Alignment cancelled before row {} of {}", i, rows);
                    return Err(AlignerError::Cancelled {
                        rows_completed: i - 1,
                        rows,
                    });
                }
            }

            let lhs_c = lhs[i - 1];
            let mut f = S::neg_infinity();
            curr_h[0] = zero;

            for j in 1..=cols {
                let mut flags = 0;

                let e_open = prev_h[j].add_penalty(gap_start);
                let e_extend = e[j].add_penalty(gap);
                e[j] = if e_open >= e_extend {
                    flags |= GAP_OPENED_UP;
                    e_open
                } else {
                    e_extend
                };

                let f_open = curr_h[j - 1].add_penalty(gap_start);
                let f_extend = f.add_penalty(gap);
                f = if f_open >= f_extend {
                    flags |= GAP_OPENED_LEFT;
                    f_open
                } else {
                    f_extend
                };

                let mut h = prev_h[j - 1] + scorer.score(lhs_c, rhs[j - 1]);
                let mut arrow = ARROW_DIAGONAL;
                if e[j] > h {
                    h = e[j];
                    arrow = ARROW_UP;
                }
                if f > h {
                    h = f;
                    arrow = ARROW_LEFT;
                }
                if h <= zero {
                    h = zero;
                    arrow = ARROW_FINISH;
                }

                curr_h[j] = h;
                traceback.set(i, j, arrow | flags);
                best.consider(h, i, j);
            }

            std::mem::swap(&mut prev_h, &mut curr_h);
        }

        Ok((traceback, best))
    }
}
