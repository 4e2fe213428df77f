//! Run-length coding of gap vectors.
//!
//! A vector is stored as the value of its first run plus the lengths of the
//! alternating runs, e.g. `0 0 1 0 0 0` becomes
//! `{starts_with_zero: true, runs: [2, 1, 3]}`.

use serde::{Deserialize, Serialize};

use crate::{AlignerError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunVector {
    pub starts_with_zero: bool,
    pub runs: Vec<usize>,
}

impl Default for RunVector {
    /// The encoding of an empty vector.
    fn default() -> Self {
        Self {
            starts_with_zero: true,
            runs: Vec::new(),
        }
    }
}

impl RunVector {
    /// Length of the decoded vector, or `None` if it does not fit `usize`.
    pub fn len(&self) -> Option<usize> {
        self.runs.iter().try_fold(0usize, |total, &run| total.checked_add(run))
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

pub fn encode(bits: &[bool]) -> RunVector {
    let Some(&first) = bits.first() else {
        return RunVector::default();
    };

    let mut runs = Vec::new();
    let mut current = first;
    let mut length = 0;
    for &bit in bits {
        if bit == current {
            length += 1;
        } else {
            runs.push(length);
            current = bit;
            length = 1;
        }
    }
    runs.push(length);

    RunVector {
        starts_with_zero: !first,
        runs,
    }
}

/// Fails if a run has length zero, since such a vector has no unique decoding
/// under strict alternation, or if the decoded vector could not be allocated.
pub fn decode(runs: &RunVector) -> Result<Vec<bool>> {
    if let Some(idx) = runs.runs.iter().position(|&run| run == 0) {
        return Err(AlignerError::MalformedRunVector(format!(
            "run {} of {} has length zero",
            idx,
            runs.runs.len()
        )));
    }

    let total = runs
        .len()
        .filter(|&total| total <= isize::MAX as usize)
        .ok_or_else(|| AlignerError::MalformedRunVector("total length overflows".into()))?;

    let mut bits = Vec::with_capacity(total);
    let mut value = !runs.starts_with_zero;
    for &run in &runs.runs {
        bits.extend(std::iter::repeat(value).take(run));
        value = !value;
    }
    Ok(bits)
}
