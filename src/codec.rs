// Interchange codec: JSON file/storage form <-> in-memory tasks
//
// Decoding is the import boundary for user-supplied files, so it never fails:
// anything it cannot make sense of decodes to an empty list.

use crate::models::{Priority, Task, default_status, generate_id};
use eyre::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Fields the card shape knows about; everything else is "extra"
const KNOWN_FIELDS: [&str; 8] = [
    "id",
    "title",
    "description",
    "status",
    "order",
    "priority",
    "dueDate",
    "tags",
];

#[derive(Serialize)]
struct CardsEnvelope<'a> {
    cards: &'a [Task],
}

/// Decode a raw JSON document into tasks
///
/// Accepts `{"cards": [...]}` and the legacy bare array form. Unparseable
/// input and any other shape yield an empty list.
pub fn decode(raw: &str) -> Vec<Task> {
    decode_ranked(raw).into_iter().map(|(task, _)| task).collect()
}

/// Like `decode`, pairing each task with the rank it arrived with
///
/// `Task::order` is an integer, so a fractional incoming rank is truncated
/// there; the paired rank keeps the exact value for sorting an import.
pub fn decode_ranked(raw: &str) -> Vec<(Task, f64)> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Failed to parse board JSON, nothing decoded");
            return Vec::new();
        }
    };

    let tasks: Vec<(Task, f64)> = match data {
        Value::Object(mut obj) => match obj.remove("cards") {
            Some(Value::Array(cards)) => cards.iter().map(card_to_task).collect(),
            _ => {
                debug!("JSON object has no cards array");
                Vec::new()
            }
        },
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| legacy_to_task(item, index))
            .collect(),
        _ => Vec::new(),
    };

    debug!(count = tasks.len(), "Decoded tasks");
    tasks
}

/// Encode tasks into the `{"cards": [...]}` exchange form
pub fn encode(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(&CardsEnvelope { cards: tasks }).context("Failed to serialize tasks")
}

/// Encode tasks and write them to a file
pub fn write_file(path: &Path, tasks: &[Task]) -> Result<()> {
    let raw = encode(tasks)?;
    fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}

/// Map one element of the `cards` array, defaulting every field on its own
fn card_to_task(card: &Value) -> (Task, f64) {
    let empty = Map::new();
    let obj = card.as_object().unwrap_or(&empty);
    let rank = incoming_rank(obj.get("order")).unwrap_or(0.0);

    let task = Task {
        id: non_empty_str(obj, "id").unwrap_or_else(generate_id),
        title: non_empty_str(obj, "title").unwrap_or_default(),
        description: non_empty_str(obj, "description").unwrap_or_default(),
        status: non_empty_str(obj, "status").unwrap_or_else(default_status),
        order: rank as i64,
        priority: priority(obj),
        due_date: non_empty_str(obj, "dueDate").unwrap_or_default(),
        tags: tags(obj),
        extra: Map::new(),
    };
    (task, rank)
}

/// Map one element of a legacy bare array, keeping fields we don't know
///
/// A missing status stays blank here; the board fills it in when it
/// normalizes an import.
fn legacy_to_task(item: Value, index: usize) -> (Task, f64) {
    let obj = match item {
        Value::Object(obj) => obj,
        _ => Map::new(),
    };

    let extra = obj
        .iter()
        .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let rank = incoming_rank(obj.get("order")).unwrap_or(index as f64);

    let task = Task {
        id: non_empty_str(&obj, "id").unwrap_or_else(generate_id),
        title: non_empty_str(&obj, "title").unwrap_or_default(),
        description: non_empty_str(&obj, "description").unwrap_or_default(),
        status: non_empty_str(&obj, "status").unwrap_or_default(),
        order: rank as i64,
        priority: priority(&obj),
        due_date: non_empty_str(&obj, "dueDate").unwrap_or_default(),
        tags: tags(&obj),
        extra,
    };
    (task, rank)
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn incoming_rank(value: Option<&Value>) -> Option<f64> {
    value?.as_f64()
}

fn priority(obj: &Map<String, Value>) -> Priority {
    obj.get("priority")
        .and_then(Value::as_str)
        .map(Priority::parse)
        .unwrap_or_default()
}

fn tags(obj: &Map<String, Value>) -> Vec<String> {
    match obj.get("tags") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(String::from).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: &str, order: i64) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: "desc".to_string(),
            status: status.to_string(),
            order,
            priority: Priority::High,
            due_date: "2026-03-01".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_decode_cards_format() {
        let raw = r#"{
            "columns": [{"id": "col1", "name": "To Do", "order": 0}],
            "cards": [{"id": "c1", "title": "Task 1", "description": "", "status": "To Do",
                       "order": 0, "priority": "High", "dueDate": "", "tags": ["test"]}]
        }"#;

        let tasks = decode(raw);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "c1");
        assert_eq!(tasks[0].title, "Task 1");
        assert_eq!(tasks[0].status, "To Do");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[0].tags, vec!["test"]);
    }

    #[test]
    fn test_decode_missing_fields_use_defaults() {
        let tasks = decode(r#"{"cards":[{"id":"c1","title":"T"}]}"#);

        assert_eq!(tasks.len(), 1);
        let t = &tasks[0];
        assert_eq!(t.id, "c1");
        assert_eq!(t.title, "T");
        assert_eq!(t.description, "");
        assert_eq!(t.status, "To Do");
        assert_eq!(t.priority, Priority::None);
        assert_eq!(t.due_date, "");
        assert!(t.tags.is_empty());
        assert_eq!(t.order, 0);
    }

    #[test]
    fn test_decode_invalid_values_use_defaults() {
        let tasks = decode(
            r#"{"cards":[{"title":"T","status":"","order":"3","priority":"Urgent","tags":"x,y"}]}"#,
        );

        let t = &tasks[0];
        assert!(!t.id.is_empty());
        assert_eq!(t.status, "To Do");
        assert_eq!(t.order, 0);
        assert_eq!(t.priority, Priority::None);
        assert!(t.tags.is_empty());
    }

    #[test]
    fn test_decode_cards_drop_unknown_fields() {
        let tasks = decode(r#"{"cards":[{"id":"c1","color":"red"}]}"#);
        assert!(tasks[0].extra.is_empty());
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(decode("not valid json").is_empty());
    }

    #[test]
    fn test_decode_unexpected_shapes() {
        assert!(decode("{}").is_empty());
        assert!(decode(r#"{"cards": "nope"}"#).is_empty());
        assert!(decode("42").is_empty());
        assert!(decode("\"text\"").is_empty());
    }

    #[test]
    fn test_decode_flat_array_format() {
        let raw = r#"[
            {"id": "c1", "title": "Task 1", "status": "To Do", "order": 4, "color": "red"},
            {"title": "Task 2", "status": "Done"}
        ]"#;

        let tasks = decode(raw);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, "c1");
        assert_eq!(tasks[0].order, 4);
        assert_eq!(tasks[0].extra.get("color"), Some(&Value::from("red")));
        assert!(!tasks[1].id.is_empty());
        // Positional index when order is missing
        assert_eq!(tasks[1].order, 1);
    }

    #[test]
    fn test_decode_flat_array_leaves_status_blank() {
        let tasks = decode(r#"[{"id":"c1"}, 5]"#);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, "");
        assert_eq!(tasks[1].order, 1);
    }

    #[test]
    fn test_decode_ranked_keeps_fractional_rank() {
        let ranked = decode_ranked(r#"{"cards":[{"id":"a","order":1.5},{"id":"b","order":1.2},{"id":"c"}]}"#);

        let ranks: Vec<f64> = ranked.iter().map(|(_, r)| *r).collect();
        assert_eq!(ranks, vec![1.5, 1.2, 0.0]);
        assert_eq!(ranked[0].0.order, 1);
        assert_eq!(ranked[1].0.order, 1);
    }

    #[test]
    fn test_decode_ranked_legacy_falls_back_to_position() {
        let ranked = decode_ranked(r#"[{"id":"a"},{"id":"b","order":0.5}]"#);
        assert_eq!(ranked[0].1, 0.0);
        assert_eq!(ranked[1].1, 0.5);
    }

    #[test]
    fn test_encode_cards_envelope() {
        let raw = encode(&[task("c1", "To Do", 0)]).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();

        let cards = parsed["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["id"], "c1");
        assert_eq!(cards[0]["dueDate"], "2026-03-01");
        assert_eq!(cards[0]["priority"], "High");
    }

    #[test]
    fn test_encode_field_order() {
        let raw = encode(&[task("c1", "To Do", 0)]).unwrap();
        let positions: Vec<usize> = KNOWN_FIELDS
            .iter()
            .map(|f| raw.find(&format!("\"{}\"", f)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_round_trip_preserves_tasks() {
        let mut legacy = task("c3", "Done", 0);
        legacy.extra.insert("color".to_string(), Value::from("red"));
        let tasks = vec![task("c1", "To Do", 0), task("c2", "To Do", 1), legacy];

        let decoded = decode(&encode(&tasks).unwrap());
        assert_eq!(decoded.len(), 3);
        for (before, after) in tasks.iter().zip(&decoded) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.status, after.status);
            assert_eq!(before.order, after.order);
            assert_eq!(before.tags, after.tags);
            assert_eq!(before.due_date, after.due_date);
        }
    }
}
