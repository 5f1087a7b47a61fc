//! Approval status shared by notification threads and expense sub-records.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Status of an approval request.
///
/// `Approved` and `Denied` are terminal: the only legal transitions are
/// `Requested -> Approved` and `Requested -> Denied`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Requested,
    Approved,
    Denied,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Denied)
    }
}

impl TryFrom<&str> for ApprovalStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "requested" => Ok(Self::Requested),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(EngineError::Validation(format!(
                "invalid approval status: {other}"
            ))),
        }
    }
}
