//! Local affine-gap alignment of two texts over Unicode code points.
//!
//! The aligner finds the best scoring local alignment with Smith-Waterman and
//! Gotoh's affine gaps, then reports it as two gap vectors covering every
//! character of both texts. From those the crate builds a diff-style graph of
//! common and distinct segments, or a compact run-length form of each gap
//! vector.
//!
//! Most callers go through [`AlignmentContext`]; [`BatchAligner`] runs many
//! independent requests on worker threads.

use thiserror::Error;

pub mod aligner;
pub mod batch;
pub mod config;
pub mod context;
pub mod graph;
pub mod run_length;
pub mod scoring;
pub mod traceback;

pub use aligner::{matrix_cells, Alignment, CancellationToken, SmithWatermanAligner};
pub use batch::BatchAligner;
pub use config::{AlignerParameters, AlignmentRequest, OutputKind};
pub use context::{AlignmentContext, AlignmentOutput, ScoringFpContext, SmithWatermanContext};
pub use graph::{AlignmentGraphBuilder, AlignmentGraphNode, AlignmentGraphVisitor, NodeType};
pub use run_length::RunVector;
pub use scoring::{
    AlignmentStats, IdentityScorer, PairScoreTable, Position, Score, SubstitutionScorer, TableScorer,
};
pub use traceback::TracebackOperation;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("Alignment results requested before align() was called")]
    NotAligned,
    #[error("Context has already been aligned")]
    AlreadyAligned,
    #[error("Malformed run vector: {0}")]
    MalformedRunVector(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("Alignment needs {cells} matrix cells, limit is {limit}")]
    SequenceTooLarge { cells: usize, limit: usize },
    #[error("Alignment cancelled after {rows_completed} of {rows} rows")]
    Cancelled { rows_completed: usize, rows: usize },
    #[error("Batch worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, AlignerError>;
