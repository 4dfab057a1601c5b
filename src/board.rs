// Task board: the live task list and its per-column ordering
//
// Every task has a `status` (its column) and an `order` (its rank in that
// column). Moves, reorders and imports leave each touched column ranked
// 0..n with no gaps or duplicates. Delete and status-only updates do not
// renumber; the gap they leave is closed the next time a move or reorder
// touches the column.

use crate::codec;
use crate::columns::{self, Column};
use crate::models::{DONE_COLUMN, Task, TaskDraft, TaskPatch, default_status, generate_id};
use crate::persist::Persistence;
use eyre::Result;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// The authoritative task list, saved through `P` after every change
pub struct Board<P: Persistence> {
    tasks: Vec<Task>,
    persistence: P,
}

impl<P: Persistence> Board<P> {
    /// Open a board with whatever the persistence layer has stored
    pub fn open(mut persistence: P) -> Self {
        let tasks = persistence.load_initial();
        info!(count = tasks.len(), "Opened board");
        Self { tasks, persistence }
    }

    /// Build a board from an explicit task list
    pub fn with_tasks(tasks: Vec<Task>, persistence: P) -> Self {
        Self { tasks, persistence }
    }

    /// Flush a final save and hand back any persistence error
    pub fn close(mut self) -> Result<()> {
        self.persistence.persist(&self.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Tasks in a column, sorted by rank
    ///
    /// Positions in this view are what every index-based operation refers to.
    pub fn column_tasks(&self, status: &str) -> Vec<&Task> {
        self.column_indices(status).into_iter().map(|i| &self.tasks[i]).collect()
    }

    /// Rank a task appended to `status` would get
    pub fn next_order(&self, status: &str) -> i64 {
        self.tasks.iter().filter(|t| t.status == status).count() as i64
    }

    /// Column view for display
    pub fn columns(&self) -> Vec<Column> {
        columns::group_tasks_by_column(&self.tasks)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task to the end of its column; returns the new id
    pub fn add(&mut self, draft: TaskDraft) -> String {
        let status = if draft.status.is_empty() {
            default_status()
        } else {
            draft.status
        };

        let id = generate_id();
        let order = self.next_order(&status);
        debug!(id = %id, status = %status, order, "Adding task");

        self.tasks.push(Task {
            id: id.clone(),
            title: draft.title,
            description: draft.description,
            status,
            order,
            priority: draft.priority,
            due_date: draft.due_date,
            tags: draft.tags,
            extra: Default::default(),
        });
        self.save();
        id
    }

    /// Merge fields into an existing task
    ///
    /// Changing `status` here does not re-rank either column; use
    /// `move_task` to change columns. Returns false for an unknown id.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "update: no such task");
            return false;
        };

        patch.apply(task);
        self.save();
        true
    }

    /// Remove a task. Remaining ranks in its column are left as they are.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!(id, "delete: no such task");
            return false;
        }

        self.save();
        true
    }

    /// Remove every task in the done column and return them
    pub fn archive_done(&mut self) -> Vec<Task> {
        self.archive_column(DONE_COLUMN)
    }

    /// Archive the done column, handing its tasks to `write` first
    ///
    /// The tasks are only removed once `write` succeeds; on error the board
    /// is unchanged and the error is returned.
    pub fn archive_done_with<F>(&mut self, write: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&[Task]) -> Result<()>,
    {
        let pending: Vec<Task> = self.tasks.iter().filter(|t| t.status == DONE_COLUMN).cloned().collect();
        if pending.is_empty() {
            return Ok(pending);
        }

        write(&pending)?;
        Ok(self.archive_done())
    }

    /// Remove every task with the given status and return them
    pub fn archive_column(&mut self, status: &str) -> Vec<Task> {
        let (archived, kept): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.status == status);
        self.tasks = kept;

        if !archived.is_empty() {
            info!(status, count = archived.len(), "Archived tasks");
            self.save();
        }
        archived
    }

    /// Move a task to `new_index` in `new_status`
    ///
    /// Within the same column this is a reorder from the task's current
    /// position. Across columns both columns are re-ranked. An index past the
    /// end appends. Returns whether anything changed.
    pub fn move_task(&mut self, id: &str, new_status: &str, new_index: usize) -> bool {
        let Some(task_index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "move_task: no such task");
            return false;
        };

        let old_status = self.tasks[task_index].status.clone();

        if old_status == new_status {
            let column = self.column_indices(&old_status);
            let Some(old_index) = column.iter().position(|&i| i == task_index) else {
                return false;
            };
            if old_index == new_index {
                return false;
            }
            return self.reorder_task(new_status, old_index, new_index);
        }

        let mut destination = self.column_indices(new_status);
        let at = new_index.min(destination.len());
        destination.insert(at, task_index);
        self.renumber(&destination, new_status);

        // The moved task now carries `new_status`, so it drops out of this view
        let source = self.column_indices(&old_status);
        self.renumber(&source, &old_status);

        debug!(id, from = %old_status, to = new_status, index = at, "Moved task");
        self.save();
        true
    }

    /// Move the task at `from_index` of a column to `to_index` and re-rank
    ///
    /// Out-of-range `from_index` and `from_index == to_index` change nothing.
    pub fn reorder_task(&mut self, status: &str, from_index: usize, to_index: usize) -> bool {
        let mut column = self.column_indices(status);
        if from_index >= column.len() {
            debug!(status, from_index, len = column.len(), "reorder_task: index out of range");
            return false;
        }
        if from_index == to_index {
            return false;
        }

        let moved = column.remove(from_index);
        let at = to_index.min(column.len());
        column.insert(at, moved);
        self.renumber(&column, status);

        debug!(status, from_index, to_index = at, "Reordered column");
        self.save();
        true
    }

    /// Replace the board with tasks decoded from `raw`
    ///
    /// Returns the number of tasks loaded. When nothing decodes the board is
    /// left untouched.
    pub fn load_from_json(&mut self, raw: &str) -> usize {
        self.load_from_json_with_progress(raw, |_, _| {})
    }

    /// Like `load_from_json`, calling `on_progress(processed, total)` once per
    /// column as imported ranks are normalized
    pub fn load_from_json_with_progress<F>(&mut self, raw: &str, mut on_progress: F) -> usize
    where
        F: FnMut(usize, usize),
    {
        let tasks = codec::decode_ranked(raw);
        if tasks.is_empty() {
            warn!("Import decoded no tasks, board left unchanged");
            return 0;
        }

        self.tasks = normalize_imported_orders(tasks, &mut on_progress);
        info!(count = self.tasks.len(), "Imported tasks");
        self.save();
        self.tasks.len()
    }

    /// Serialize the whole board in the exchange format
    pub fn export_json(&self) -> Result<String> {
        codec::encode(&self.tasks)
    }

    /// Empty the board and drop the stored copy
    pub fn reset(&mut self) {
        self.tasks.clear();
        if let Err(e) = self.persistence.clear_persisted() {
            warn!(error = %e, "Failed to clear stored board");
        }
        info!("Board reset");
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Storage indices of a column's tasks, sorted by rank (stable)
    fn column_indices(&self, status: &str) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.tasks.len())
            .filter(|&i| self.tasks[i].status == status)
            .collect();
        indices.sort_by_key(|&i| self.tasks[i].order);
        indices
    }

    /// Rank the given tasks 0..n in sequence and put them in `status`
    fn renumber(&mut self, indices: &[usize], status: &str) {
        for (rank, &i) in indices.iter().enumerate() {
            let task = &mut self.tasks[i];
            task.order = rank as i64;
            if task.status != status {
                task.status = status.to_string();
            }
        }
    }

    fn save(&mut self) {
        if let Err(e) = self.persistence.persist(&self.tasks) {
            warn!(error = %e, "Failed to save board");
        }
    }
}

/// Re-rank imported tasks per column, keeping the sequence the source meant
///
/// Blank statuses go to the first default column. Within a column tasks are
/// sorted by their exact incoming rank (fractions included), ties kept in
/// file order, then ranked 0..n.
fn normalize_imported_orders<F>(ranked: Vec<(Task, f64)>, on_progress: &mut F) -> Vec<Task>
where
    F: FnMut(usize, usize),
{
    let (mut tasks, ranks): (Vec<Task>, Vec<f64>) = ranked.into_iter().unzip();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of: HashMap<String, usize> = HashMap::new();

    for (i, task) in tasks.iter_mut().enumerate() {
        if task.status.is_empty() {
            task.status = default_status();
        }
        let group = *group_of.entry(task.status.clone()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(i);
    }

    let total = tasks.len();
    let mut processed = 0;
    for mut group in groups {
        group.sort_by(|&a, &b| ranks[a].total_cmp(&ranks[b]));
        for (rank, &i) in group.iter().enumerate() {
            tasks[i].order = rank as i64;
        }
        processed += group.len();
        on_progress(processed, total);
    }

    tasks
}
