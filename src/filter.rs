// Tag highlighting for presentation

use crate::models::Task;
use std::collections::BTreeSet;

/// Set of highlighted tags
///
/// When any tag is highlighted, tasks carrying none of them are dimmed.
/// This is display state only; it never changes task data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagHighlight {
    tags: BTreeSet<String>,
}

impl TagHighlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight a tag, or un-highlight it if it already is
    pub fn toggle(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
    }

    pub fn is_highlighted(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether a task should be shown dimmed
    pub fn is_dimmed(&self, task: &Task) -> bool {
        !self.tags.is_empty() && !task.tags.iter().any(|t| self.tags.contains(t))
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagHighlight {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}
