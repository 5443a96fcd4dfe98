/// Item state definitions for tracking per-URL progress
///
/// Every input URL walks `Pending → Extracting → Downloading → Assembled` on
/// success, or ends in `Failed` from any non-terminal state.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of one input URL in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemState {
    // ===== Active States =====
    /// Waiting for the rate gate
    Pending,

    /// Page is being fetched and parsed
    Extracting,

    /// Images are being downloaded
    Downloading,

    // ===== Terminal States =====
    /// Record written; the item is done
    Assembled,

    /// Extraction or persistence failed
    Failed,
}

impl ItemState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Assembled | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Assembled)
    }

    /// Checks whether moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Extracting)
            | (Self::Extracting, Self::Downloading)
            | (Self::Downloading, Self::Assembled) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn advance(self, next: ItemState) -> Result<ItemState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::Downloading => "downloading",
            Self::Assembled => "assembled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
