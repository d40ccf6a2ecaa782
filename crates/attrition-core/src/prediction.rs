//! Scored output for one employee record.

use serde::Serialize;

/// Binary model decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Stay,
    Resign,
}

impl Outcome {
    /// Map the model's class label. Anything other than 0/1 is rejected.
    pub fn from_label(label: i64) -> Option<Self> {
        match label {
            0 => Some(Self::Stay),
            1 => Some(Self::Resign),
            _ => None,
        }
    }

    pub fn label(self) -> i64 {
        match self {
            Self::Stay => 0,
            Self::Resign => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stay => "Stay",
            Self::Resign => "Resign",
        }
    }
}

/// Label plus probability of the positive (resign) class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub outcome: Outcome,
    pub probability: f64,
}
