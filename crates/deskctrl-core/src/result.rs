//! Structured results — every tool-facing operation returns one of these,
//! never a raw error, for expected-failure conditions.

use serde::{Deserialize, Serialize};

use crate::element::ElementInfo;

/// Outcome of a resolver or action operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    /// True total match count for ambiguity failures, even when `matches`
    /// is a truncated sample.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub matches: Vec<ElementInfo>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), match_count: None, matches: Vec::new() }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), match_count: None, matches: Vec::new() }
    }

    /// Ambiguity failure carrying the true count plus a bounded sample.
    pub fn ambiguous(message: impl Into<String>, count: usize, matches: Vec<ElementInfo>) -> Self {
        Self { success: false, message: message.into(), match_count: Some(count), matches }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.match_count = Some(count);
        self
    }
}

/// One node of a bounded diagnostic tree dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub info: ElementInfo,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<TreeNode>,
    /// True child count before the per-node cap was applied.
    pub children_count: usize,
    pub children_truncated: bool,
}
