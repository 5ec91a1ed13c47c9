//! Change set identity
//!
//! Listeners, log events and the undo history refer to a committed batch of
//! mutations by its `ChangeSetId`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-ordered identifier of one committed transaction
///
/// Backed by a UUIDv7, so ids compare in commit order within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSetId(Uuid);

impl ChangeSetId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChangeSetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cs-{}", self.0.simple())
    }
}

impl FromStr for ChangeSetId {
    type Err = uuid::Error;

    /// Accepts the `cs-` display form as well as a bare UUID
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.strip_prefix("cs-").unwrap_or(s)).map(Self)
    }
}
