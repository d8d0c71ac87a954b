//! Weekday routine patterns.
//!
//! Successful tasks are replayed in chronological order and grouped by the
//! local weekday they ran on. A task whose latest feedback contains "no"
//! (any case) is treated as unwanted and left out. Duplicates are kept so
//! callers can count frequency.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Local, Weekday};
use tracing::debug;
use wsa_core::types::parse_timestamp;
use wsa_core::Database;

use crate::SDKResult;

/// Feedback containing this marker (case-insensitive) excludes a task.
pub const NEGATIVE_MARKER: &str = "no";

/// Monday through Sunday.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name, e.g. "Monday".
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Whether feedback marks a task as unwanted.
pub fn is_negative_feedback(feedback: Option<&str>) -> bool {
    feedback.is_some_and(|f| f.to_lowercase().contains(NEGATIVE_MARKER))
}

/// Tasks per weekday, in chronological order, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutinePatterns {
    by_day: HashMap<Weekday, Vec<String>>,
}

impl RoutinePatterns {
    /// All occurrences for `day`.
    pub fn tasks(&self, day: Weekday) -> &[String] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct tasks for `day` in first-seen order.
    pub fn usual_tasks(&self, day: Weekday) -> Vec<String> {
        let mut seen = Vec::new();
        for task in self.tasks(day) {
            if !seen.contains(task) {
                seen.push(task.clone());
            }
        }
        seen
    }

    /// `(task, count)` for `day`, most frequent first.
    pub fn frequency(&self, day: Weekday) -> Vec<(String, usize)> {
        wsa_core::stats::count_in_order(self.tasks(day).iter().map(String::as_str))
    }

    /// Usual tasks for the current local weekday.
    pub fn for_today(&self) -> Vec<String> {
        self.usual_tasks(Local::now().weekday())
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.values().all(Vec::is_empty)
    }

    /// Weekdays Monday..Sunday with their task lists (empty days included).
    pub fn iter_week(&self) -> impl Iterator<Item = (Weekday, &[String])> {
        WEEK.into_iter().map(move |day| (day, self.tasks(day)))
    }
}

/// Builds [`RoutinePatterns`] from the task log. Read-only.
#[derive(Clone)]
pub struct PatternLearner {
    db: Arc<Database>,
}

impl PatternLearner {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn routine_patterns(&self) -> SDKResult<RoutinePatterns> {
        let mut rows: Vec<_> = self
            .db
            .successful_tasks_with_feedback()?
            .into_iter()
            .filter(|row| !is_negative_feedback(row.feedback.as_deref()))
            .filter_map(|row| match parse_timestamp(&row.timestamp) {
                Some(ts) => Some((ts, row.task)),
                None => {
                    debug!("Skipping task with unreadable timestamp {:?}", row.timestamp);
                    None
                }
            })
            .collect();

        // Stored offsets may differ; order by instant, stable for equal ones
        rows.sort_by_key(|(ts, _)| *ts);

        let mut patterns = RoutinePatterns::default();
        for (ts, task) in rows {
            patterns.by_day.entry(ts.weekday()).or_default().push(task);
        }
        Ok(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use wsa_core::types::{ClassificationKind, NewCommandMemory, NewTaskLog};

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap()
    }

    fn log(db: &Database, when: chrono::DateTime<Local>, task: &str, success: bool) {
        db.insert_task_log(&NewTaskLog {
            timestamp: when,
            task: task.into(),
            tags: vec![],
            classification: ClassificationKind::Template,
            output: String::new(),
            success,
        })
        .unwrap();
    }

    fn feedback(db: &Database, task: &str, text: &str) {
        db.insert_command_memory(&NewCommandMemory {
            command: task.into(),
            output: String::new(),
            feedback: Some(text.into()),
            embedding: vec![],
        })
        .unwrap();
    }

    #[test]
    fn test_negative_feedback_excluded() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        // 2025-03-03 is a Monday
        log(&db, at(2025, 3, 3, 9), "open chrome", true);
        log(&db, at(2025, 3, 3, 10), "list files", true);
        feedback(&db, "open chrome", "No thanks");

        let patterns = PatternLearner::new(db).routine_patterns().unwrap();
        assert_eq!(patterns.tasks(Weekday::Mon), ["list files".to_string()]);
    }

    #[test]
    fn test_empty_feedback_is_kept() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        log(&db, at(2025, 3, 3, 9), "open chrome", true);
        feedback(&db, "open chrome", "");

        let patterns = PatternLearner::new(db).routine_patterns().unwrap();
        assert_eq!(patterns.tasks(Weekday::Mon), ["open chrome".to_string()]);
    }

    #[test]
    fn test_failed_tasks_excluded() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        log(&db, at(2025, 3, 4, 9), "rm -rf build", false);
        let patterns = PatternLearner::new(db).routine_patterns().unwrap();
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_grouping_keeps_duplicates_in_order() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        log(&db, at(2025, 3, 10, 9), "open slack", true); // Monday
        log(&db, at(2025, 3, 3, 9), "open chrome", true); // earlier Monday
        log(&db, at(2025, 3, 3, 11), "open slack", true);
        log(&db, at(2025, 3, 5, 9), "show disk usage", true); // Wednesday

        let patterns = PatternLearner::new(db).routine_patterns().unwrap();
        assert_eq!(
            patterns.tasks(Weekday::Mon),
            ["open chrome", "open slack", "open slack"].map(String::from)
        );
        assert_eq!(patterns.usual_tasks(Weekday::Mon), vec!["open chrome", "open slack"]);
        assert_eq!(
            patterns.frequency(Weekday::Mon),
            vec![("open slack".to_string(), 2), ("open chrome".to_string(), 1)]
        );
        assert_eq!(patterns.tasks(Weekday::Wed), ["show disk usage".to_string()]);
        assert!(patterns.tasks(Weekday::Sun).is_empty());
    }

    #[test]
    fn test_iter_week_starts_monday() {
        let patterns = RoutinePatterns::default();
        let names: Vec<&str> = patterns.iter_week().map(|(d, _)| weekday_name(d)).collect();
        assert_eq!(names.first(), Some(&"Monday"));
        assert_eq!(names.last(), Some(&"Sunday"));
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_is_negative_feedback() {
        assert!(is_negative_feedback(Some("NO")));
        assert!(is_negative_feedback(Some("not useful")));
        assert!(is_negative_feedback(Some("nothing happened")));
        assert!(!is_negative_feedback(Some("great")));
        assert!(!is_negative_feedback(None));
    }
}
