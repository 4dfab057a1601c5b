// Default locations

use std::path::PathBuf;

/// Environment variable overriding where the board is stored
pub const STORE_PATH_ENV: &str = "TASKBOARD_PATH";

/// Default file name for a full board export
pub const EXPORT_FILE_NAME: &str = "kanban-board.json";

/// Where the board lives when no path is given: the user's data directory,
/// or the current directory when there is none
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("taskboard"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// File name for an archive written on `date` (`YYYY-MM-DD`)
pub fn archive_file_name(date: chrono::NaiveDate) -> String {
    format!("archived-tasks-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_dir_named() {
        let dir = default_store_dir();
        assert!(dir.ends_with("taskboard") || dir == PathBuf::from("."));
    }

    #[test]
    fn test_archive_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(archive_file_name(date), "archived-tasks-2026-03-09.json");
    }
}
