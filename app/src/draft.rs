//! Form field state for creating and editing todos.

use chrono::NaiveDate;
use todo_core::{parse_date_only, ApiError, Todo, TodoCreate, TodoUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    DueDate,
}

/// Raw text of the three form inputs, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl TodoDraft {
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            due_date: todo.due_date.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.title = value,
            FormField::Description => self.description = value,
            FormField::DueDate => self.due_date = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::DueDate => &self.due_date,
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn to_create(&self) -> Result<TodoCreate, ApiError> {
        Ok(TodoCreate {
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            due_date: self.due_date()?,
        })
    }

    /// Changes for `original`. Title and due date are always sent and an
    /// empty due date clears it. An empty description is left out when
    /// `original` had none, so an untouched field stays null.
    pub fn to_update(&self, original: &Todo) -> Result<TodoUpdate, ApiError> {
        let description = match (&original.description, self.description.is_empty()) {
            (None, true) => None,
            _ => Some(self.description.clone()),
        };
        Ok(TodoUpdate {
            title: Some(self.title.clone()),
            description,
            due_date: Some(self.due_date()?),
            is_completed: None,
        })
    }

    fn due_date(&self) -> Result<Option<NaiveDate>, ApiError> {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse_date_only(raw)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("Invalid due date: {raw}")))
    }
}
