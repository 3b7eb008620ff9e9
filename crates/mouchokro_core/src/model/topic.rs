//! Central discussion topic.
//!
//! # Responsibility
//! - Define the singleton topic record shown in the board center.
//! - Provide field-by-field merge for topic edits.
//!
//! # Invariants
//! - Exactly one topic exists per board; it is never destroyed.
//! - First run (or unreadable storage) starts from `Topic::default()`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC_TITLE: &str = "আজকের বিষয়";
pub const DEFAULT_TOPIC_DESCRIPTION: &str = "এখানে আপনার মূল আলোচনার বিষয়বস্তু লিখুন...";

/// Topic record persisted under the topic key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub description: String,
}

impl Default for Topic {
    fn default() -> Self {
        Self {
            title: DEFAULT_TOPIC_TITLE.to_string(),
            description: DEFAULT_TOPIC_DESCRIPTION.to_string(),
        }
    }
}

impl Topic {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Applies every present field of `patch`; absent fields keep their value.
    pub fn apply(&mut self, patch: TopicPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

/// Partial topic edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TopicPatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}
