//! Per-request alignment state.
//!
//! A context is configured once, aligned once, and then queried for any
//! number of outputs:
//!
//! ```
//! use text_align::{AlignerParameters, AlignmentGraphNode, SmithWatermanContext};
//!
//! let mut ctx = SmithWatermanContext::new("ABC", "ABD")
//!     .with_parameters(AlignerParameters::new(2, -1, -2, -1));
//! ctx.align()?;
//! assert_eq!(
//!     ctx.make_alignment_graph()?,
//!     vec![
//!         AlignmentGraphNode::Common { text: "AB".into() },
//!         AlignmentGraphNode::Distinct { lhs: "C".into(), rhs: "D".into() },
//!     ]
//! );
//! # Ok::<(), text_align::AlignerError>(())
//! ```

use std::time::Instant;

use serde::Serialize;

use crate::aligner::{matrix_cells, Alignment, CancellationToken, SmithWatermanAligner};
use crate::config::{AlignerParameters, OutputKind};
use crate::graph::{AlignmentGraphBuilder, AlignmentGraphNode};
use crate::run_length::{self, RunVector};
use crate::scoring::{AlignmentStats, IdentityScorer, PairScoreTable, Score, TableScorer};
use crate::traceback::{self, TracebackOperation};
use crate::{AlignerError, Result};

/// Integer scores.
pub type SmithWatermanContext = AlignmentContext<i32>;
/// Floating point scores, typically used together with a pair score table.
pub type ScoringFpContext = AlignmentContext<f32>;

/// What a request produces: a segment graph, or one run vector per side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlignmentOutput {
    Graph(Vec<AlignmentGraphNode>),
    Runs { left: RunVector, right: RunVector },
}

enum ContextState<S> {
    Configured,
    Aligned {
        alignment: Alignment<S>,
        execution_time_ms: f32,
    },
}

pub struct AlignmentContext<S> {
    lhs: Vec<char>,
    rhs: Vec<char>,
    parameters: AlignerParameters<S>,
    pair_scores: PairScoreTable<S>,
    cancellation: Option<CancellationToken>,
    cell_limit: Option<usize>,
    state: ContextState<S>,
}

impl<S: Score> AlignmentContext<S> {
    pub fn new(lhs: &str, rhs: &str) -> Self {
        Self::from_chars(lhs.chars().collect(), rhs.chars().collect())
    }

    pub fn from_chars(lhs: Vec<char>, rhs: Vec<char>) -> Self {
        Self {
            lhs,
            rhs,
            parameters: AlignerParameters::default(),
            pair_scores: PairScoreTable::new(),
            cancellation: None,
            cell_limit: None,
            state: ContextState::Configured,
        }
    }

    pub fn with_parameters(mut self, parameters: AlignerParameters<S>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Scores for specific character pairs, overriding identity and mismatch.
    pub fn with_pair_scores(mut self, pair_scores: PairScoreTable<S>) -> Self {
        self.pair_scores = pair_scores;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_cell_limit(mut self, limit: usize) -> Self {
        self.cell_limit = Some(limit);
        self
    }

    pub fn parameters(&self) -> &AlignerParameters<S> {
        &self.parameters
    }

    pub fn lhs(&self) -> &[char] {
        &self.lhs
    }

    pub fn rhs(&self) -> &[char] {
        &self.rhs
    }

    /// Cells the alignment will fill; time and memory scale with this.
    pub fn matrix_cells(&self) -> usize {
        matrix_cells(self.lhs.len(), self.rhs.len())
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self.state, ContextState::Aligned { .. })
    }

    /// Runs the alignment and returns its score. May be called only once.
    ///
    /// A failed alignment leaves the context configured.
    pub fn align(&mut self) -> Result<S> {
        if self.is_aligned() {
            return Err(AlignerError::AlreadyAligned);
        }

        let mut aligner = SmithWatermanAligner::new(self.parameters);
        if let Some(token) = &self.cancellation {
            aligner = aligner.with_cancellation(token.clone());
        }
        if let Some(limit) = self.cell_limit {
            aligner = aligner.with_cell_limit(limit);
        }

        let start_time = Instant::now();
        let alignment = if self.pair_scores.is_empty() {
            aligner.align(&self.lhs, &self.rhs)?
        } else {
            if let Some(value) = self.pair_scores.values().find(|v| !v.is_representable()) {
                return Err(AlignerError::InvalidParameter {
                    name: "pair_scores",
                    value: value.to_string(),
                });
            }
            let scorer = TableScorer::new(&self.pair_scores, IdentityScorer::from(&self.parameters));
            aligner.align_with_scorer(&self.lhs, &self.rhs, &scorer)?
        };

        let score = alignment.score;
        self.state = ContextState::Aligned {
            alignment,
            execution_time_ms: start_time.elapsed().as_secs_f32() * 1000.0,
        };
        Ok(score)
    }

    pub fn alignment(&self) -> Result<&Alignment<S>> {
        match &self.state {
            ContextState::Aligned { alignment, .. } => Ok(alignment),
            ContextState::Configured => Err(AlignerError::NotAligned),
        }
    }

    pub fn alignment_score(&self) -> Result<S> {
        Ok(self.alignment()?.score)
    }

    pub fn lhs_gaps(&self) -> Result<&[bool]> {
        Ok(&self.alignment()?.lhs_gaps)
    }

    pub fn rhs_gaps(&self) -> Result<&[bool]> {
        Ok(&self.alignment()?.rhs_gaps)
    }

    pub fn make_alignment_graph(&self) -> Result<Vec<AlignmentGraphNode>> {
        let alignment = self.alignment()?;
        Ok(AlignmentGraphBuilder::new().build_graph(
            &self.lhs,
            &self.rhs,
            &alignment.lhs_gaps,
            &alignment.rhs_gaps,
        ))
    }

    pub fn make_lhs_runs(&self) -> Result<RunVector> {
        Ok(run_length::encode(self.lhs_gaps()?))
    }

    pub fn make_rhs_runs(&self) -> Result<RunVector> {
        Ok(run_length::encode(self.rhs_gaps()?))
    }

    pub fn make_output(&self, kind: OutputKind) -> Result<AlignmentOutput> {
        match kind {
            OutputKind::Graph => Ok(AlignmentOutput::Graph(self.make_alignment_graph()?)),
            OutputKind::RunVectors => Ok(AlignmentOutput::Runs {
                left: self.make_lhs_runs()?,
                right: self.make_rhs_runs()?,
            }),
        }
    }

    /// The alignment as an edit script.
    pub fn operations(&self) -> Result<Vec<TracebackOperation>> {
        let alignment = self.alignment()?;
        Ok(traceback::operations(
            &self.lhs,
            &self.rhs,
            &alignment.lhs_gaps,
            &alignment.rhs_gaps,
        ))
    }

    /// Counts over the local alignment only; unaligned flanks are not gaps.
    pub fn statistics(&self) -> Result<AlignmentStats> {
        let (alignment, execution_time_ms) = match &self.state {
            ContextState::Aligned {
                alignment,
                execution_time_ms,
            } => (alignment, *execution_time_ms),
            ContextState::Configured => return Err(AlignerError::NotAligned),
        };
        let local = alignment.local_positions.clone();
        let stats: AlignmentStats = traceback::operations(
            &self.lhs[alignment.lhs_range.clone()],
            &self.rhs[alignment.rhs_range.clone()],
            &alignment.lhs_gaps[local.clone()],
            &alignment.rhs_gaps[local],
        )
        .into_iter()
        .collect();
        Ok(AlignmentStats {
            execution_time_ms,
            ..stats
        })
    }

    /// Both sides rendered with `-` at gaps.
    pub fn aligned_texts(&self) -> Result<(String, String)> {
        let alignment = self.alignment()?;
        Ok((
            traceback::aligned_text(&self.lhs, &alignment.lhs_gaps),
            traceback::aligned_text(&self.rhs, &alignment.rhs_gaps),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_requires_align() {
        let ctx = SmithWatermanContext::new("abc", "abd");
        assert!(matches!(ctx.make_alignment_graph(), Err(AlignerError::NotAligned)));
        assert!(matches!(ctx.make_lhs_runs(), Err(AlignerError::NotAligned)));
        assert!(matches!(ctx.make_rhs_runs(), Err(AlignerError::NotAligned)));
        assert!(matches!(ctx.alignment_score(), Err(AlignerError::NotAligned)));
        assert!(matches!(ctx.statistics(), Err(AlignerError::NotAligned)));
    }

    #[test]
    fn align_only_once() {
        let mut ctx = SmithWatermanContext::new("abc", "abd");
        ctx.align().unwrap();
        assert!(matches!(ctx.align(), Err(AlignerError::AlreadyAligned)));
    }

    #[test]
    fn extraction_is_repeatable() {
        let mut ctx = SmithWatermanContext::new("kitten", "sitting").with_parameters(AlignerParameters::new(2, -1, -2, -1));
        ctx.align().unwrap();
        let graph = ctx.make_alignment_graph().unwrap();
        let lhs_runs = ctx.make_lhs_runs().unwrap();
        assert_eq!(ctx.make_alignment_graph().unwrap(), graph);
        assert_eq!(ctx.make_lhs_runs().unwrap(), lhs_runs);
        assert_eq!(lhs_runs.len(), Some(ctx.lhs_gaps().unwrap().len()));
    }

    #[test]
    fn failed_alignment_stays_configured() {
        let token = CancellationToken::new();
        token.cancel();
        let mut ctx = SmithWatermanContext::new("abc", "abc").with_cancellation(token);
        assert!(matches!(ctx.align(), Err(AlignerError::Cancelled { .. })));
        assert!(!ctx.is_aligned());
        assert!(matches!(ctx.make_lhs_runs(), Err(AlignerError::NotAligned)));
    }

    #[test]
    fn pair_scores_change_the_alignment() {
        let table = PairScoreTable::new().with_pair('C', 'D', 1.5);
        let mut ctx = ScoringFpContext::new("ABC", "ABD")
            .with_parameters(AlignerParameters::new(2.0, -1.0, -2.0, -1.0))
            .with_pair_scores(table);
        assert_eq!(ctx.align().unwrap(), 5.5);
        assert_eq!(ctx.lhs_gaps().unwrap(), &[false; 3]);
    }

    #[test]
    fn non_finite_pair_score_is_rejected() {
        let table = PairScoreTable::new().with_pair('a', 'b', f32::NAN);
        let mut ctx = ScoringFpContext::new("a", "b").with_pair_scores(table);
        assert!(matches!(
            ctx.align(),
            Err(AlignerError::InvalidParameter { name: "pair_scores", .. })
        ));
    }

    #[test]
    fn statistics_and_rendering() {
        let mut ctx = SmithWatermanContext::new("ABC", "ABD").with_parameters(AlignerParameters::new(2, -1, -2, -1));
        ctx.align().unwrap();
        let stats = ctx.statistics().unwrap();
        assert_eq!((stats.matches, stats.mismatches, stats.gaps), (2, 0, 0));
        assert_eq!(ctx.aligned_texts().unwrap(), ("ABC-".to_string(), "AB-D".to_string()));
        assert_eq!(
            ctx.operations().unwrap(),
            vec![
                TracebackOperation::Match,
                TracebackOperation::Match,
                TracebackOperation::Deletion,
                TracebackOperation::Insertion,
            ]
        );
    }

    #[test]
    fn statistics_skip_unaligned_flanks() {
        let mut ctx = SmithWatermanContext::new("xxxxGATTACAyy", "zzGATTACA")
            .with_parameters(AlignerParameters::new(2, -1, -2, -1));
        ctx.align().unwrap();
        let stats = ctx.statistics().unwrap();
        assert_eq!((stats.matches, stats.mismatches, stats.gaps), (7, 0, 0));

        let mut ctx = SmithWatermanContext::new("abcdefgh", "abcdXXXefgh")
            .with_parameters(AlignerParameters::new(2, -3, -5, -1));
        ctx.align().unwrap();
        let stats = ctx.statistics().unwrap();
        assert_eq!((stats.matches, stats.mismatches, stats.gaps), (8, 0, 3));
    }

    #[test]
    fn output_kinds() {
        let mut ctx = SmithWatermanContext::new("", "XYZ");
        ctx.align().unwrap();
        let runs = ctx.make_output(OutputKind::RunVectors).unwrap();
        assert_eq!(
            serde_json::to_value(&runs).unwrap(),
            serde_json::json!({
                "left": {"starts_with_zero": false, "runs": [3]},
                "right": {"starts_with_zero": true, "runs": [3]},
            })
        );
        let graph = ctx.make_output(OutputKind::Graph).unwrap();
        assert_eq!(
            serde_json::to_value(&graph).unwrap(),
            serde_json::json!([{"type": "distinct", "lhs": "", "rhs": "XYZ"}])
        );
    }
}
