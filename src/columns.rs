// Derived column view for presentation

use crate::models::{DEFAULT_COLUMNS, Task};
use std::collections::HashMap;

/// A group of tasks sharing a status, built on demand
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub tasks: Vec<Task>,
}

/// Column id derived from its name: `"In Progress"` -> `"in-progress"`
pub fn column_id(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Group tasks into columns
///
/// Default columns always appear, even when empty, followed by any other
/// status in the order it is first seen. Tasks with a blank status land in
/// the first default column. Each column's tasks are sorted by `order`.
pub fn group_tasks_by_column(tasks: &[Task]) -> Vec<Column> {
    let mut names: Vec<String> = DEFAULT_COLUMNS.iter().map(|s| s.to_string()).collect();
    for task in tasks {
        if !task.status.is_empty() && !names.contains(&task.status) {
            names.push(task.status.clone());
        }
    }

    let mut columns: Vec<Column> = names
        .into_iter()
        .map(|name| Column {
            id: column_id(&name),
            name,
            tasks: Vec::new(),
        })
        .collect();

    let positions: HashMap<String, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.clone(), i))
        .collect();

    for task in tasks {
        let index = positions.get(&task.status).copied().unwrap_or(0);
        columns[index].tasks.push(task.clone());
    }

    for column in &mut columns {
        column.tasks.sort_by_key(|t| t.order);
    }

    columns
}
