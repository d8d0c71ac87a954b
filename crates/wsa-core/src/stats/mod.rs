//! Task log statistics.

use crate::db::Database;
use crate::error::Result;
use crate::types::TaskLogEntry;
use serde::Serialize;
use std::collections::HashMap;

/// Aggregate counts over the task log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    /// `(task, count)`, most frequent first; ties keep first appearance
    pub task_frequency: Vec<(String, usize)>,
    /// `(tag, count)`, most frequent first; ties keep first appearance
    pub tag_frequency: Vec<(String, usize)>,
    pub succeeded: usize,
    pub failed: usize,
}

impl TaskStats {
    pub fn from_records(records: &[TaskLogEntry]) -> Self {
        let succeeded = records.iter().filter(|r| r.success).count();

        Self {
            task_frequency: count_in_order(records.iter().map(|r| r.task.as_str())),
            tag_frequency: count_in_order(
                records.iter().flat_map(|r| r.tags.iter().map(String::as_str)),
            ),
            succeeded,
            failed: records.len() - succeeded,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Count occurrences, sorted by descending count with a stable tie order.
pub fn count_in_order<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

impl Database {
    /// Statistics over the whole task log.
    pub fn task_stats(&self) -> Result<TaskStats> {
        let records = self.list_task_log(None)?;
        Ok(TaskStats::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationKind, NewTaskLog};

    fn log(db: &Database, task: &str, tags: &[&str], success: bool) {
        db.insert_task_log(&NewTaskLog::now(
            task,
            ClassificationKind::Template,
            tags.iter().map(|t| t.to_string()).collect(),
            "",
            success,
        ))
        .unwrap();
    }

    #[test]
    fn test_task_stats() {
        let db = Database::open_in_memory().unwrap();
        log(&db, "list files", &["template", "cli"], true);
        log(&db, "open chrome", &["template", "voice"], true);
        log(&db, "open chrome", &["template", "cli"], false);
        log(&db, "show disk usage", &["template", "cli"], true);

        let stats = db.task_stats().unwrap();
        assert_eq!(
            stats.task_frequency,
            vec![
                ("open chrome".to_string(), 2),
                ("list files".to_string(), 1),
                ("show disk usage".to_string(), 1),
            ]
        );
        assert_eq!(stats.tag_frequency[0], ("template".to_string(), 4));
        assert_eq!(stats.tag_frequency[1], ("cli".to_string(), 3));
        assert_eq!(stats.tag_frequency[2], ("voice".to_string(), 1));
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_empty_log() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.task_stats().unwrap(), TaskStats::default());
    }
}
