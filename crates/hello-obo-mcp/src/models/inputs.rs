//! Input models for MCP tool parameters.

use serde::{Deserialize, Serialize};

/// Input for the `hello` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloInput {
    /// Person to greet. Blank counts as absent when picking the subject.
    #[serde(default)]
    pub name: Option<String>,
}
