use serde::{Deserialize, Serialize};

/// Token usage metadata reported by the server for one completion.
///
/// Servers differ in how much of this they report; any field may be
/// absent, and some servers omit the whole object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: Option<u32>,
    /// Number of tokens in the completion
    pub completion_tokens: Option<u32>,
    /// Total number of tokens used
    pub total_tokens: Option<u32>,
}
