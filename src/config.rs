//! Scoring parameters and the request shape accepted at the service boundary.

use serde::{Deserialize, Serialize};

use crate::context::AlignmentContext;
use crate::scoring::Score;
use crate::{AlignerError, Result};

/// Affine-gap scoring parameters.
///
/// A gap of length `k` costs `gap_start_penalty + (k - 1) * gap_penalty`.
/// Penalties are given as non-positive numbers and added to the score.
/// Beyond representability nothing is validated: parameters that make gaps
/// cheaper than matches are accepted and simply produce odd alignments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignerParameters<S> {
    pub identity_score: S,
    pub mismatch_penalty: S,
    pub gap_start_penalty: S,
    pub gap_penalty: S,
}

impl<S: Score> Default for AlignerParameters<S> {
    fn default() -> Self {
        Self {
            identity_score: S::from(2),
            mismatch_penalty: S::from(-2),
            gap_start_penalty: S::from(-3),
            gap_penalty: S::from(-1),
        }
    }
}

impl<S: Score> AlignerParameters<S> {
    pub fn new(identity_score: S, mismatch_penalty: S, gap_start_penalty: S, gap_penalty: S) -> Self {
        Self {
            identity_score,
            mismatch_penalty,
            gap_start_penalty,
            gap_penalty,
        }
    }

    pub fn with_identity_score(mut self, score: S) -> Self {
        self.identity_score = score;
        self
    }

    pub fn with_mismatch_penalty(mut self, penalty: S) -> Self {
        self.mismatch_penalty = penalty;
        self
    }

    pub fn with_gap_start_penalty(mut self, penalty: S) -> Self {
        self.gap_start_penalty = penalty;
        self
    }

    pub fn with_gap_penalty(mut self, penalty: S) -> Self {
        self.gap_penalty = penalty;
        self
    }

    /// Checks that every parameter can take part in the recurrence.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("identity_score", self.identity_score),
            ("mismatch_penalty", self.mismatch_penalty),
            ("gap_start_penalty", self.gap_start_penalty),
            ("gap_penalty", self.gap_penalty),
        ];
        for (name, value) in named {
            if !value.is_representable() {
                return Err(AlignerError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Which artifact to produce after aligning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Graph,
    #[default]
    RunVectors,
}

/// An alignment job as submitted in JSON.
///
/// ```json
/// {"left": "ABC", "right": "ABD", "match": 2, "mismatch": -1,
///  "gap_start": -2, "gap": -1, "create_alignment_graph": true}
/// ```
///
/// Without `create_alignment_graph` the job produces run vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest<S> {
    pub left: String,
    pub right: String,
    #[serde(rename = "match")]
    pub identity_score: S,
    #[serde(rename = "mismatch")]
    pub mismatch_penalty: S,
    #[serde(rename = "gap_start")]
    pub gap_start_penalty: S,
    #[serde(rename = "gap")]
    pub gap_penalty: S,
    #[serde(default)]
    pub create_alignment_graph: bool,
}

impl<S: Score> AlignmentRequest<S> {
    pub fn parameters(&self) -> AlignerParameters<S> {
        AlignerParameters::new(
            self.identity_score,
            self.mismatch_penalty,
            self.gap_start_penalty,
            self.gap_penalty,
        )
    }

    pub fn output_kind(&self) -> OutputKind {
        if self.create_alignment_graph {
            OutputKind::Graph
        } else {
            OutputKind::RunVectors
        }
    }

    /// Builds a configured, not yet aligned context for this request.
    pub fn to_context(&self) -> AlignmentContext<S> {
        AlignmentContext::new(&self.left, &self.right).with_parameters(self.parameters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = AlignerParameters::<i32>::default();
        assert_eq!(params, AlignerParameters::new(2, -2, -3, -1));
        let params = AlignerParameters::<f32>::default();
        assert_eq!(params.gap_start_penalty, -3.0);
    }

    #[test]
    fn builder_overrides_single_fields() {
        let params = AlignerParameters::<i32>::default()
            .with_identity_score(5)
            .with_gap_penalty(-2);
        assert_eq!(params, AlignerParameters::new(5, -2, -3, -2));
    }

    #[test]
    fn nan_parameter_is_rejected() {
        let params = AlignerParameters::<f32>::default().with_mismatch_penalty(f32::NAN);
        match params.validate() {
            Err(AlignerError::InvalidParameter { name, .. }) => assert_eq!(name, "mismatch_penalty"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(AlignerParameters::<f32>::default().validate().is_ok());
    }

    #[test]
    fn request_keys() {
        let request: AlignmentRequest<i32> = serde_json::from_str(
            r#"{"left": "ABC", "right": "ABD", "match": 2, "mismatch": -1, "gap_start": -2, "gap": -1}"#,
        )
        .unwrap();
        assert_eq!(request.parameters(), AlignerParameters::new(2, -1, -2, -1));
        assert_eq!(request.output_kind(), OutputKind::RunVectors);

        let request: AlignmentRequest<f32> = serde_json::from_str(
            r#"{"left": "a", "right": "b", "match": 1.5, "mismatch": -1, "gap_start": -2, "gap": -0.5,
                "create_alignment_graph": true}"#,
        )
        .unwrap();
        assert_eq!(request.output_kind(), OutputKind::Graph);
        assert_eq!(request.parameters().gap_penalty, -0.5);
    }
}
