//! Static JSON fixtures served by the forum and profile-list endpoints
//!
//! The documents are compiled into the binary and parsed once at startup.

use serde_json::Value;

const MOCK_COMMENTS: &str = include_str!("mock_comments.json");
const SAMPLE_PROFILE_LIST: &str = include_str!("sample_profile_list.json");

/// Parsed fixture documents
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// Forum posts with nested replies
    pub comments: Value,
    /// Sample user profiles
    pub profile_list: Value,
}

impl Fixtures {
    /// Parse the embedded fixture documents
    pub fn load() -> Result<Self, serde_json::Error> {
        Ok(Self {
            comments: serde_json::from_str(MOCK_COMMENTS)?,
            profile_list: serde_json::from_str(SAMPLE_PROFILE_LIST)?,
        })
    }
}
