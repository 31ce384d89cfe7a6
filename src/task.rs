use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task. Serialized with the camelCase field names used by the
/// stored document (`createdAt`, `completedAt`).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds; only present while the task is completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
            created_at: now_millis(),
            completed_at: None,
        }
    }

    pub fn complete(self, at: i64) -> Self {
        Self {
            completed: true,
            completed_at: Some(at),
            ..self
        }
    }

    pub fn restore(self) -> Self {
        Self {
            completed: false,
            completed_at: None,
            ..self
        }
    }

    pub fn created_date(&self) -> String {
        format_date(self.created_at)
    }

    pub fn completed_date(&self) -> Option<String> {
        self.completed_at.map(format_date)
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats an epoch-millisecond timestamp as a local `YYYY-MM-DD` date.
pub fn format_date(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_is_pending_with_fresh_id() {
        let a = Task::new("water the ferns");
        let b = Task::new("water the ferns");
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
        assert!(a.completed_at.is_none());
        assert!(a.created_at > 0);
    }

    #[test]
    fn complete_then_restore_keeps_identity() {
        let task = Task::new("repot cactus");
        let id = task.id.clone();
        let created = task.created_at;

        let done = task.complete(42);
        assert!(done.completed);
        assert_eq!(done.completed_at, Some(42));
        assert_eq!(done.id, id);

        let back = done.restore();
        assert!(!back.completed);
        assert_eq!(back.completed_at, None);
        assert_eq!(back.created_at, created);
        assert_eq!(back.text, "repot cactus");
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_completion() {
        let task = Task {
            id: "t1".into(),
            text: "prune".into(),
            completed: false,
            created_at: 1_700_000_000_000,
            completed_at: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert!(json.get("completedAt").is_none());

        let done = task.complete(1_700_000_100_000);
        let json = serde_json::to_value(&done).unwrap();
        assert_eq!(json["completedAt"], 1_700_000_100_000i64);
        assert_eq!(json["completed"], true);
    }

    #[test]
    fn missing_optional_fields_default() {
        let task: Task = serde_json::from_str(r#"{"id":"x","text":"legacy"}"#).unwrap();
        assert!(!task.completed);
        assert_eq!(task.created_at, 0);
    }

    #[test]
    fn format_date_handles_out_of_range() {
        assert_eq!(format_date(i64::MAX), "-");
        assert_eq!(format_date(0).len(), 10);
    }
}
