//! Derived views over a todo collection.
//!
//! Everything here is a pure function of its inputs: the collection is
//! borrowed, never mutated, and "today" is passed in so results do not
//! depend on the wall clock.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::types::{parse_date_only, Todo};

/// Which todos a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Completed,
    Incomplete,
    Overdue,
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DueDate,
    CreatedAt,
    Title,
}

/// Unknown filter or sort name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

impl FilterMode {
    pub const ALL: [FilterMode; 4] = [
        FilterMode::All,
        FilterMode::Completed,
        FilterMode::Incomplete,
        FilterMode::Overdue,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Completed => "completed",
            FilterMode::Incomplete => "incomplete",
            FilterMode::Overdue => "overdue",
        }
    }

    pub fn matches(self, todo: &Todo, today: NaiveDate) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Completed => todo.is_completed,
            FilterMode::Incomplete => !todo.is_completed,
            FilterMode::Overdue => is_overdue(todo, today),
        }
    }
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::DueDate, SortKey::CreatedAt, SortKey::Title];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DueDate => "due_date",
            SortKey::CreatedAt => "created_at",
            SortKey::Title => "title",
        }
    }

    pub fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortKey::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            // Case-insensitive, byte order breaks ties.
            SortKey::Title => a
                .title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title)),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownOption {
                kind: "filter",
                value: s.to_string(),
            })
    }
}

impl FromStr for SortKey {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownOption {
                kind: "sort key",
                value: s.to_string(),
            })
    }
}

/// An incomplete todo whose due date is strictly before `today`.
pub fn is_overdue(todo: &Todo, today: NaiveDate) -> bool {
    match todo.due_date {
        Some(due) if !todo.is_completed => due < today,
        _ => false,
    }
}

/// Render a calendar date as e.g. "January 5, 2024".
pub fn format_day(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

/// Render the date part of an ISO-like string. Time-of-day and offsets are
/// ignored.
pub fn format_date(date: &str) -> Option<String> {
    parse_date_only(date).map(format_day)
}

pub fn filter(todos: &[Todo], mode: FilterMode, today: NaiveDate) -> Vec<&Todo> {
    todos.iter().filter(|t| mode.matches(t, today)).collect()
}

/// Stable sort of an already-borrowed view.
pub fn sort(todos: &mut [&Todo], key: SortKey) {
    todos.sort_by(|a, b| key.compare(a, b));
}

/// Filter then sort.
pub fn project(todos: &[Todo], mode: FilterMode, key: SortKey, today: NaiveDate) -> Vec<&Todo> {
    let mut view = filter(todos, mode, today);
    sort(&mut view, key);
    view
}
