//! Text renderers for the todo screen.
//!
//! Components are stateless: they borrow what they show and write it into a
//! `String`. Composition happens in `Screen`, which the controller renders
//! through the error boundary.

use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;
use thiserror::Error;
use todo_core::view::{self, FilterMode, SortKey};
use todo_core::Todo;

use crate::draft::TodoDraft;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),

    #[error("{component}: {reason}")]
    Component {
        component: &'static str,
        reason: String,
    },
}

pub trait Component {
    fn render(&self, out: &mut String) -> Result<(), RenderError>;
}

pub struct TodoControls {
    pub filter: FilterMode,
    pub sort_key: SortKey,
}

impl Component for TodoControls {
    fn render(&self, out: &mut String) -> Result<(), RenderError> {
        out.push_str("Filter:");
        for mode in FilterMode::ALL {
            write!(out, " {}", selected(mode.as_str(), mode == self.filter))?;
        }
        out.push_str("   Sort by:");
        for key in SortKey::ALL {
            write!(out, " {}", selected(key.as_str(), key == self.sort_key))?;
        }
        out.push('\n');
        Ok(())
    }
}

fn selected(label: &str, active: bool) -> String {
    if active {
        format!("[{label}]")
    } else {
        label.to_string()
    }
}

pub struct TodoForm<'a> {
    pub draft: &'a TodoDraft,
    pub editing: bool,
}

impl Component for TodoForm<'_> {
    fn render(&self, out: &mut String) -> Result<(), RenderError> {
        let (heading, action) = if self.editing {
            ("Edit Todo", "[Update Todo] [Cancel]")
        } else {
            ("New Todo", "[Add Todo]")
        };
        writeln!(out, "-- {heading} --")?;
        writeln!(out, "  Title *:     {}", self.draft.title)?;
        writeln!(out, "  Description: {}", self.draft.description)?;
        writeln!(out, "  Due Date:    {}", self.draft.due_date)?;
        writeln!(out, "  {action}")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    Overdue,
    Pending,
}

pub struct TodoItem<'a> {
    pub todo: &'a Todo,
    pub today: NaiveDate,
}

impl TodoItem<'_> {
    pub fn status(&self) -> Status {
        if self.todo.is_completed {
            Status::Completed
        } else if view::is_overdue(self.todo, self.today) {
            Status::Overdue
        } else {
            Status::Pending
        }
    }
}

impl Component for TodoItem<'_> {
    fn render(&self, out: &mut String) -> Result<(), RenderError> {
        let todo = self.todo;
        let status = self.status();
        let marker = match status {
            Status::Completed => "[x]",
            Status::Overdue => "[!]",
            Status::Pending => "[ ]",
        };
        writeln!(out, "{marker} #{} {}", todo.id, todo.title)?;
        if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(out, "      {description}")?;
        }
        if let Some(due) = todo.due_date {
            let suffix = if status == Status::Overdue { " (overdue)" } else { "" };
            writeln!(out, "      Due: {}{suffix}", view::format_day(due))?;
        }
        let created = view::format_date(&todo.created_at).unwrap_or_else(|| todo.created_at.clone());
        writeln!(out, "      Created: {created}")?;
        Ok(())
    }
}

pub struct TodoList<'a> {
    pub todos: &'a [&'a Todo],
    pub today: NaiveDate,
}

impl Component for TodoList<'_> {
    fn render(&self, out: &mut String) -> Result<(), RenderError> {
        if self.todos.is_empty() {
            out.push_str("No todos to show.\n");
            return Ok(());
        }
        let mut seen = HashSet::new();
        for &todo in self.todos {
            if !seen.insert(todo.id) {
                return Err(RenderError::Component {
                    component: "TodoList",
                    reason: format!("duplicate todo id {}", todo.id),
                });
            }
            TodoItem { todo, today: self.today }.render(out)?;
        }
        Ok(())
    }
}

/// The whole page below the loading gate.
pub struct Screen<'a> {
    pub error: Option<&'a str>,
    pub controls: TodoControls,
    pub form: Option<TodoForm<'a>>,
    pub list: TodoList<'a>,
}

impl Component for Screen<'_> {
    fn render(&self, out: &mut String) -> Result<(), RenderError> {
        out.push_str("Todo App\n\n");
        if let Some(error) = self.error {
            writeln!(out, "Error: {error}\n")?;
        }
        self.controls.render(out)?;
        out.push('\n');
        if let Some(form) = &self.form {
            form.render(out)?;
            out.push('\n');
        }
        self.list.render(out)
    }
}
