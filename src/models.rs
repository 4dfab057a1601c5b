// Data models for the task board

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Columns that always exist on a board, in display order
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Column that archiving empties
pub const DONE_COLUMN: &str = "Done";

/// Column assigned to tasks that arrive without a status
pub fn default_status() -> String {
    DEFAULT_COLUMNS[0].to_string()
}

/// A single board item
///
/// `order` is the task's rank inside its `status` column. The board keeps
/// ranks contiguous (`0..n`) after every move, reorder and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unknown fields carried over from legacy flat-array imports
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Task priority. Anything other than the three named levels reads as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "",
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Lenient parse: unrecognized values coerce to `Priority::None`
    pub fn parse(value: &str) -> Self {
        match value {
            "Low" => Priority::Low,
            "Medium" => Priority::Medium,
            "High" => Priority::High,
            _ => Priority::None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Priority::parse).unwrap_or_default())
    }
}

/// A task as submitted for creation; the board assigns `id` and `order`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Priority,
    pub due_date: String,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            ..Default::default()
        }
    }
}

/// Partial update merged into an existing task. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub order: Option<i64>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
    }
}

/// Generate a fresh task id (UUIDv7, so ids sort by creation time)
pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Split a user-entered tag list like `"work; urgent"` into tags
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(';')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: "Write tests".to_string(),
            description: String::new(),
            status: "To Do".to_string(),
            order: 0,
            priority: Priority::High,
            due_date: "2026-01-31".to_string(),
            tags: vec!["work".to_string()],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Priority::None).unwrap(), "\"\"");
    }

    #[test]
    fn test_priority_coerces_unknown_values() {
        let p: Priority = serde_json::from_str("\"Urgent\"").unwrap();
        assert_eq!(p, Priority::None);
        let p: Priority = serde_json::from_str("7").unwrap();
        assert_eq!(p, Priority::None);
        let p: Priority = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn test_task_uses_camel_case_due_date() {
        let json = serde_json::to_value(task("t1")).unwrap();
        assert_eq!(json["dueDate"], "2026-01-31");
        assert!(json.get("due_date").is_none());
    }

    #[test]
    fn test_task_deserialize_defaults() {
        let t: Task = serde_json::from_str(r#"{"id":"t1"}"#).unwrap();
        assert_eq!(t.title, "");
        assert_eq!(t.order, 0);
        assert_eq!(t.priority, Priority::None);
        assert!(t.tags.is_empty());
        assert!(t.extra.is_empty());
    }

    #[test]
    fn test_patch_apply() {
        let mut t = task("t1");
        TaskPatch {
            title: Some("New Title".to_string()),
            status: Some("Done".to_string()),
            ..Default::default()
        }
        .apply(&mut t);

        assert_eq!(t.title, "New Title");
        assert_eq!(t.status, "Done");
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.id, "t1");
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(), generate_id());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("important;work"), vec!["important", "work"]);
        assert_eq!(parse_tags(" a ; ;b;"), vec!["a", "b"]);
        assert!(parse_tags("").is_empty());
    }
}
