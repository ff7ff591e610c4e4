use serde::{Deserialize, Serialize};

/// Order applied to the flat comment list before the reply tree is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    Top,
    Newest,
    Oldest,
    Controversial,
}

impl Default for CommentSort {
    fn default() -> Self {
        Self::Top
    }
}
