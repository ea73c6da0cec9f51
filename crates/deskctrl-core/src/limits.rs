//! Runtime bounds — every enumeration over the live tree is capped.

use serde::{Deserialize, Serialize};

/// Hard ceiling on tree-dump depth regardless of what the caller asks for.
pub const TREE_DEPTH_CAP: usize = 20;

/// Enumeration and sampling bounds, loadable as a config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum descendant depth for selector walks.
    #[serde(default = "default_max_walk_depth")]
    pub max_walk_depth: usize,
    /// Default fan-out cap per node in tree dumps.
    #[serde(default = "default_max_children_per_node")]
    pub max_children_per_node: usize,
    /// How many matches to include in ambiguity samples.
    #[serde(default = "default_match_sample_size")]
    pub match_sample_size: usize,
    /// Default cap on `find` results.
    #[serde(default = "default_find_limit")]
    pub find_limit: usize,
    /// Compiled-size ceiling for title regexes, in bytes.
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_walk_depth: default_max_walk_depth(),
            max_children_per_node: default_max_children_per_node(),
            match_sample_size: default_match_sample_size(),
            find_limit: default_find_limit(),
            regex_size_limit: default_regex_size_limit(),
        }
    }
}

fn default_max_walk_depth() -> usize { 25 }
fn default_max_children_per_node() -> usize { 80 }
fn default_match_sample_size() -> usize { 5 }
fn default_find_limit() -> usize { 50 }
fn default_regex_size_limit() -> usize { 1 << 20 }
