//! Application controller: owns the canonical todo collection and the UI
//! state around it, runs API calls, and renders the screen.
//!
//! # Design
//! - `todos` is the only copy of server data. The visible list is derived on
//!   demand from `todos`, `filter`, `sort_key` and today's date, never stored.
//! - Every mutating method takes `&mut self`, so one controller runs its
//!   operations one at a time. The collection only changes after the server
//!   confirms; a failure leaves it untouched and fills the error slot.
//! - Methods return `true` when the operation went through. Nothing is
//!   returned as an `Err`: request failures end up in the error slot.

use chrono::{Local, NaiveDate};
use todo_core::view;
use todo_core::{ApiError, FilterMode, SortKey, Todo};
use tracing::{debug, info, warn};

use crate::api::TodoApi;
use crate::boundary::ErrorBoundary;
use crate::components::{Component, Screen, TodoControls, TodoForm, TodoList};
use crate::draft::{FormField, TodoDraft};
use crate::error_slot::ErrorSlot;
use crate::toast::ToastService;
use crate::transport::Transport;

/// A todo being edited: the server copy plus the form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editing {
    pub todo: Todo,
    pub draft: TodoDraft,
}

pub struct TodoApp<T> {
    api: TodoApi<T>,
    todos: Vec<Todo>,
    draft: TodoDraft,
    editing: Option<Editing>,
    loading: bool,
    show_form: bool,
    filter: FilterMode,
    sort_key: SortKey,
    errors: ErrorSlot,
    boundary: ErrorBoundary,
    today: Option<NaiveDate>,
}

impl<T: Transport> TodoApp<T> {
    pub fn new(api: TodoApi<T>, toasts: ToastService) -> Self {
        Self {
            api,
            todos: Vec::new(),
            draft: TodoDraft::default(),
            editing: None,
            loading: true,
            show_form: false,
            filter: FilterMode::default(),
            sort_key: SortKey::default(),
            errors: ErrorSlot::new(),
            boundary: ErrorBoundary::new(toasts),
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn draft(&self) -> &TodoDraft {
        &self.draft
    }

    pub fn editing(&self) -> Option<&Editing> {
        self.editing.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_form_open(&self) -> bool {
        self.show_form
    }

    pub fn error(&self) -> Option<&str> {
        self.errors.message()
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Filtered and sorted projection of the collection.
    pub fn visible(&self) -> Vec<&Todo> {
        view::project(&self.todos, self.filter, self.sort_key, self.today())
    }

    pub async fn load(&mut self) -> bool {
        self.loading = true;
        let ok = match self.api.get_todos().await {
            Ok(todos) => {
                info!(count = todos.len(), "loaded todos");
                self.todos = dedup_by_id(todos);
                self.errors.clear();
                true
            }
            Err(e) => {
                self.errors.handle_api_error(&e, "Failed to load todos");
                false
            }
        };
        self.loading = false;
        ok
    }

    /// Open or close the new-todo form. Either way any edit is abandoned.
    pub fn toggle_form(&mut self) {
        self.show_form = !self.show_form;
        self.editing = None;
    }

    pub fn set_draft(&mut self, field: FormField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub async fn submit_new(&mut self) -> bool {
        if !self.draft.has_title() {
            debug!("ignoring submit with an empty title");
            return false;
        }
        let input = match self.draft.to_create() {
            Ok(input) => input,
            Err(e) => return self.fail(&e, "Failed to create todo"),
        };

        match self.api.create_todo(&input).await {
            Ok(created) => {
                info!(id = created.id, "todo created");
                self.upsert(created);
                self.draft = TodoDraft::default();
                self.show_form = false;
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to create todo"),
        }
    }

    /// Start editing the todo with `id` from the current collection.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.todos.iter().find(|t| t.id == id) {
            Some(todo) => {
                self.editing = Some(Editing {
                    draft: TodoDraft::from_todo(todo),
                    todo: todo.clone(),
                });
                true
            }
            None => {
                let e = ApiError::Validation(format!("Todo with id {id} not found"));
                self.fail(&e, "Failed to update todo")
            }
        }
    }

    /// Change a field of the todo being edited. No-op when nothing is.
    pub fn set_editing_field(&mut self, field: FormField, value: impl Into<String>) {
        if let Some(editing) = &mut self.editing {
            editing.draft.set(field, value);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn submit_edit(&mut self) -> bool {
        let Some(editing) = &self.editing else {
            return false;
        };
        let id = editing.todo.id;
        let input = match editing.draft.to_update(&editing.todo) {
            Ok(input) => input,
            Err(e) => return self.fail(&e, "Failed to update todo"),
        };

        match self.api.update_todo(id, &input).await {
            Ok(updated) => {
                info!(id, "todo updated");
                self.replace(updated);
                self.editing = None;
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to update todo"),
        }
    }

    pub async fn complete(&mut self, id: i64) -> bool {
        match self.api.complete_todo(id).await {
            Ok(updated) => {
                info!(id, "todo completed");
                self.replace(updated);
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to complete todo"),
        }
    }

    pub async fn incomplete(&mut self, id: i64) -> bool {
        match self.api.incomplete_todo(id).await {
            Ok(updated) => {
                info!(id, "todo reopened");
                self.replace(updated);
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to mark todo as incomplete"),
        }
    }

    pub async fn delete(&mut self, id: i64) -> bool {
        match self.api.delete_todo(id).await {
            Ok(()) => {
                info!(id, "todo deleted");
                self.todos.retain(|t| t.id != id);
                if self.editing.as_ref().is_some_and(|e| e.todo.id == id) {
                    self.editing = None;
                }
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to delete todo"),
        }
    }

    pub async fn clear_all(&mut self) -> bool {
        match self.api.delete_all_todos().await {
            Ok(()) => {
                info!(count = self.todos.len(), "all todos deleted");
                self.todos.clear();
                self.editing = None;
                self.errors.clear();
                true
            }
            Err(e) => self.fail(&e, "Failed to clear todos"),
        }
    }

    /// Render the whole screen through the error boundary.
    pub fn render(&mut self) -> String {
        if self.loading {
            return "Loading...\n".to_string();
        }

        let today = self.today();
        let visible = view::project(&self.todos, self.filter, self.sort_key, today);
        let form = match &self.editing {
            Some(editing) => Some(TodoForm {
                draft: &editing.draft,
                editing: true,
            }),
            None if self.show_form => Some(TodoForm {
                draft: &self.draft,
                editing: false,
            }),
            None => None,
        };
        let screen = Screen {
            error: self.errors.message(),
            controls: TodoControls {
                filter: self.filter,
                sort_key: self.sort_key,
            },
            form,
            list: TodoList {
                todos: &visible,
                today,
            },
        };
        self.boundary.render(|out| screen.render(out))
    }

    /// The last `render` showed the recovery panel instead of the screen.
    pub fn has_render_fault(&self) -> bool {
        self.boundary.has_error()
    }

    /// The reload action offered by the recovery panel.
    pub async fn reload(&mut self) -> bool {
        self.boundary.reset();
        self.load().await
    }

    fn fail(&mut self, err: &ApiError, default_message: &str) -> bool {
        self.errors.handle_api_error(err, default_message);
        false
    }

    fn replace(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => warn!(id = todo.id, "updated todo is no longer in the collection"),
        }
    }

    fn upsert(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => self.todos.push(todo),
        }
    }
}

/// Keep the first entry for each id, preserving server order.
fn dedup_by_id(todos: Vec<Todo>) -> Vec<Todo> {
    let mut seen = std::collections::HashSet::new();
    let before = todos.len();
    let todos: Vec<Todo> = todos.into_iter().filter(|t| seen.insert(t.id)).collect();
    if todos.len() != before {
        warn!(dropped = before - todos.len(), "server returned duplicate todo ids");
    }
    todos
}
