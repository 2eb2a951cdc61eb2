//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server schema but are defined independently of the
//! mock-server crate; integration tests catch drift between the two. Due
//! dates are calendar dates: the wire value may be a bare `YYYY-MM-DD` or a
//! full timestamp, and only the date part is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "date_only::deserialize")]
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: String,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoCreate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "date_only::deserialize"
    )]
    pub due_date: Option<NaiveDate>,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
///
/// `due_date` is tri-state: `None` leaves it alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "date_only::deserialize_patch"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// Parse the date-only portion of an ISO-like string. Anything after a `T`
/// or a space is ignored, so offsets and times never shift the day.
pub fn parse_date_only(s: &str) -> Option<NaiveDate> {
    let day = s.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

mod date_only {
    use super::*;
    use serde::de::Error;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_date_only(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {s}"))),
        }
    }

    /// Present-but-null becomes `Some(None)`; an absent field falls back to
    /// `#[serde(default)]` and stays `None`.
    pub fn deserialize_patch<'de, D>(
        deserializer: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn todo_accepts_timestamp_due_date() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":1,"title":"A","due_date":"2024-01-05T23:30:00-08:00","is_completed":false,"created_at":"2024-01-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(todo.due_date, Some(day(2024, 1, 5)));
        assert!(todo.description.is_none());
    }

    #[test]
    fn todo_treats_null_and_empty_due_date_as_absent() {
        let todo: Todo = serde_json::from_str(
            r#"{"id":1,"title":"A","description":null,"due_date":null,"is_completed":true,"created_at":"x"}"#,
        )
        .unwrap();
        assert!(todo.due_date.is_none());

        let todo: Todo = serde_json::from_str(
            r#"{"id":1,"title":"A","due_date":"","is_completed":true,"created_at":"x"}"#,
        )
        .unwrap();
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn create_omits_absent_fields() {
        let input = TodoCreate {
            title: "A".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"title": "A"}));
    }

    #[test]
    fn update_distinguishes_clear_from_leave() {
        let clear = TodoUpdate {
            due_date: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            serde_json::json!({"due_date": null})
        );

        let back: TodoUpdate = serde_json::from_str(r#"{"due_date":null}"#).unwrap();
        assert_eq!(back.due_date, Some(None));

        let back: TodoUpdate = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(back.due_date, None);
    }

    #[test]
    fn parse_date_only_ignores_time_of_day() {
        assert_eq!(parse_date_only("2024-03-01T00:00:00Z"), Some(day(2024, 3, 1)));
        assert_eq!(parse_date_only("2024-03-01 12:00"), Some(day(2024, 3, 1)));
        assert_eq!(parse_date_only("March 1"), None);
    }
}
