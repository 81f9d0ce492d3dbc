//! Download state definitions for items handed to the storage stage

use std::fmt;

/// What happened to a classified item after it was handed off for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadState {
    /// Recorded, download not finished yet
    Pending,

    /// Bytes written to the storage path
    Downloaded,

    /// Download or write failed
    Failed,
}

impl DownloadState {
    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "downloaded" => Some(Self::Downloaded),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible download states
    pub fn all_states() -> [Self; 3] {
        [Self::Pending, Self::Downloaded, Self::Failed]
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_string_roundtrip() {
        for state in DownloadState::all_states() {
            assert_eq!(DownloadState::from_db_string(state.to_db_string()), Some(state));
        }
    }

    #[test]
    fn test_unknown_db_string() {
        assert_eq!(DownloadState::from_db_string("queued"), None);
    }
}
