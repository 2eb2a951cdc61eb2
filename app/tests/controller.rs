//! Controller scenarios against the mock server's router, driven in-process.
//!
//! # Design
//! `RouterTransport` turns core `HttpRequest`s into axum requests and sends
//! them through `tower::ServiceExt::oneshot`, so every test gets a fresh,
//! isolated server with no sockets involved. Clones of the router share one
//! store, which lets a test change server state behind the controller's back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Request;
use axum::Router;
use chrono::{Days, NaiveDate};
use http_body_util::BodyExt;
use todo_app::{FormField, ToastService, TodoApi, TodoApp, Transport, TransportError};
use todo_core::{FilterMode, HttpRequest, HttpResponse, SortKey, TodoClient, TodoCreate};
use tower::ServiceExt;

const BASE_URL: &str = "http://todo.test";

#[derive(Clone)]
struct RouterTransport {
    router: Router,
    calls: Arc<AtomicUsize>,
}

impl RouterTransport {
    fn new(router: Router) -> Self {
        Self {
            router,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RouterTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let uri = request.path.strip_prefix(BASE_URL).unwrap_or(&request.path).to_string();
        let mut builder = Request::builder().method(request.method.as_str()).uri(uri);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let req = builder
            .body(request.body.unwrap_or_default())
            .map_err(|e| TransportError(e.to_string()))?;

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError(e.to_string()))?
            .to_bytes();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Always fails as if the server were unreachable.
struct RefusingTransport;

#[async_trait]
impl Transport for RefusingTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError("connection refused".to_string()))
    }
}

/// Refuses the first `failures` requests, then hands over to the router.
struct FlakyTransport {
    failures: AtomicUsize,
    inner: RouterTransport,
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let refuse = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refuse {
            return Err(TransportError("connection reset".to_string()));
        }
        self.inner.execute(request).await
    }
}

/// Answers every request with the same canned response.
struct CannedTransport(HttpResponse);

#[async_trait]
impl Transport for CannedTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.0.clone())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn api<T: Transport>(transport: T) -> TodoApi<T> {
    TodoApi::new(TodoClient::new(BASE_URL), transport)
}

/// A controller plus a second, independent API handle on the same server.
fn setup() -> (TodoApp<RouterTransport>, TodoApi<RouterTransport>, RouterTransport) {
    let router = mock_server::app();
    let transport = RouterTransport::new(router.clone());
    let app = TodoApp::new(api(transport.clone()), ToastService::default()).with_today(today());
    let side = api(RouterTransport::new(router));
    (app, side, transport)
}

async fn seed(side: &TodoApi<RouterTransport>, title: &str, due: Option<NaiveDate>) -> i64 {
    side.create_todo(&TodoCreate {
        title: title.to_string(),
        description: None,
        due_date: due,
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn load_replaces_collection_and_clears_loading() {
    let (mut app, side, _) = setup();
    seed(&side, "one", None).await;
    seed(&side, "two", None).await;

    assert!(app.is_loading());
    assert_eq!(app.render(), "Loading...\n");

    assert!(app.load().await);
    assert!(!app.is_loading());
    assert_eq!(app.todos().len(), 2);
    assert!(app.error().is_none());

    let screen = app.render();
    assert!(screen.starts_with("Todo App"));
    assert!(screen.contains("#1 one"));
    assert!(screen.contains("#2 two"));
}

#[tokio::test]
async fn create_appends_resets_draft_and_closes_form() {
    let (mut app, side, _) = setup();
    app.load().await;

    app.toggle_form();
    assert!(app.is_form_open());
    app.set_draft(FormField::Title, "A");
    assert!(app.render().contains("-- New Todo --"));

    assert!(app.submit_new().await);
    assert_eq!(app.todos().len(), 1);
    let created = &app.todos()[0];
    assert_eq!(created.title, "A");
    assert!(!created.is_completed);
    assert!(!created.created_at.is_empty());
    assert_eq!(app.draft(), &todo_app::TodoDraft::default());
    assert!(!app.is_form_open());

    let on_server = side.get_todos().await.unwrap();
    assert_eq!(on_server.iter().filter(|t| t.title == "A").count(), 1);
    assert_eq!(on_server[0].id, created.id);
}

#[tokio::test]
async fn blank_title_issues_no_request() {
    let (mut app, _, transport) = setup();
    app.load().await;
    let before = transport.calls();

    app.toggle_form();
    app.set_draft(FormField::Title, "   ");
    assert!(!app.submit_new().await);

    assert_eq!(transport.calls(), before);
    assert!(app.todos().is_empty());
    assert!(app.error().is_none());
    assert!(app.is_form_open());
}

#[tokio::test]
async fn invalid_due_date_is_rejected_locally() {
    let (mut app, _, transport) = setup();
    app.load().await;
    let before = transport.calls();

    app.set_draft(FormField::Title, "Dentist");
    app.set_draft(FormField::DueDate, "tomorrow");
    assert!(!app.submit_new().await);

    assert_eq!(transport.calls(), before);
    assert_eq!(app.error(), Some("Invalid due date: tomorrow"));
}

#[tokio::test]
async fn overdue_then_completed() {
    let (mut app, side, _) = setup();
    let yesterday = today() - Days::new(1);
    let late = seed(&side, "late", Some(yesterday)).await;
    seed(&side, "due today", Some(today())).await;
    app.load().await;

    app.set_filter(FilterMode::Overdue);
    let overdue: Vec<i64> = app.visible().iter().map(|t| t.id).collect();
    assert_eq!(overdue, vec![late]);
    assert!(app.render().contains("[!] #1 late"));

    assert!(app.complete(late).await);
    assert!(app.visible().is_empty());

    app.set_filter(FilterMode::Completed);
    let completed: Vec<i64> = app.visible().iter().map(|t| t.id).collect();
    assert_eq!(completed, vec![late]);

    assert!(app.incomplete(late).await);
    app.set_filter(FilterMode::Overdue);
    assert_eq!(app.visible().len(), 1);
}

#[tokio::test]
async fn update_of_missing_todo_leaves_collection_unchanged() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "doomed", None).await;
    app.load().await;

    assert!(app.begin_edit(id));
    app.set_editing_field(FormField::Title, "renamed");

    // Someone else deletes it before we save.
    side.delete_todo(id).await.unwrap();

    let before = app.todos().to_vec();
    assert!(!app.submit_edit().await);
    assert_eq!(app.todos(), before.as_slice());
    assert_eq!(app.error(), Some(format!("Todo with id {id} not found").as_str()));
    assert!(app.editing().is_some());
}

#[tokio::test]
async fn edit_replaces_by_id_and_clears_editing() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "draft", Some(today())).await;
    seed(&side, "other", None).await;
    app.load().await;

    assert!(app.begin_edit(id));
    assert!(app.render().contains("-- Edit Todo --"));
    app.set_editing_field(FormField::Title, "final");
    app.set_editing_field(FormField::Description, "polished");
    app.set_editing_field(FormField::DueDate, "");

    assert!(app.submit_edit().await);
    assert!(app.editing().is_none());
    let edited = app.todos().iter().find(|t| t.id == id).unwrap();
    assert_eq!(edited.title, "final");
    assert_eq!(edited.description.as_deref(), Some("polished"));
    assert!(edited.due_date.is_none());
    assert_eq!(app.todos().len(), 2);

    let on_server = side.get_todo(id).await.unwrap();
    assert_eq!(&on_server, edited);
}

#[tokio::test]
async fn server_validation_message_is_shown() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "keep", None).await;
    app.load().await;

    app.begin_edit(id);
    app.set_editing_field(FormField::Title, "  ");
    assert!(!app.submit_edit().await);
    assert_eq!(app.error(), Some("Title cannot be empty"));
    assert_eq!(app.todos()[0].title, "keep");
    assert!(app.render().contains("Error: Title cannot be empty"));
}

#[tokio::test]
async fn success_clears_previous_error() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "x", None).await;
    app.load().await;

    assert!(!app.incomplete(id).await);
    assert_eq!(app.error(), Some(format!("Todo with id {id} is already incomplete").as_str()));

    assert!(app.complete(id).await);
    assert!(app.error().is_none());
}

#[tokio::test]
async fn delete_removes_only_after_confirmation() {
    let (mut app, side, _) = setup();
    let keep = seed(&side, "keep", None).await;
    let drop = seed(&side, "drop", None).await;
    app.load().await;

    assert!(app.delete(drop).await);
    assert_eq!(app.todos().iter().map(|t| t.id).collect::<Vec<_>>(), vec![keep]);

    // Second delete fails and changes nothing.
    assert!(!app.delete(drop).await);
    assert_eq!(app.todos().len(), 1);
    assert_eq!(app.error(), Some(format!("Todo with id {drop} not found").as_str()));
}

#[tokio::test]
async fn clear_all_empties_collection() {
    let (mut app, side, _) = setup();
    seed(&side, "a", None).await;
    seed(&side, "b", None).await;
    app.load().await;

    assert!(app.clear_all().await);
    assert!(app.todos().is_empty());
    assert!(side.get_todos().await.unwrap().is_empty());
    assert!(app.render().contains("No todos to show."));
}

#[tokio::test]
async fn sort_and_filter_are_views_only() {
    let (mut app, side, _) = setup();
    seed(&side, "cherry", None).await;
    seed(&side, "apple", Some(today() + Days::new(3))).await;
    seed(&side, "banana", Some(today() + Days::new(1))).await;
    app.load().await;

    let titles = |app: &TodoApp<RouterTransport>| -> Vec<String> {
        app.visible().iter().map(|t| t.title.clone()).collect()
    };

    assert_eq!(titles(&app), vec!["banana", "apple", "cherry"]);
    app.set_sort_key(SortKey::Title);
    assert_eq!(titles(&app), vec!["apple", "banana", "cherry"]);
    app.set_sort_key(SortKey::CreatedAt);
    assert_eq!(titles(&app), vec!["cherry", "apple", "banana"]);

    // The canonical collection keeps server order.
    let stored: Vec<&str> = app.todos().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(stored, vec!["cherry", "apple", "banana"]);
}

#[tokio::test]
async fn unreachable_server_shows_generic_message() {
    let mut app = TodoApp::new(api(RefusingTransport), ToastService::default()).with_today(today());

    assert!(!app.load().await);
    assert!(!app.is_loading());
    assert_eq!(app.error(), Some("An error occurred"));
    assert!(app.todos().is_empty());
}

#[tokio::test]
async fn malformed_payload_falls_back_to_operation_message() {
    let canned = CannedTransport(HttpResponse {
        status: 200,
        headers: Vec::new(),
        body: "<html>proxy error</html>".to_string(),
    });
    let mut app = TodoApp::new(api(canned), ToastService::default()).with_today(today());

    assert!(!app.load().await);
    assert_eq!(app.error(), Some("Failed to load todos"));
}

#[tokio::test]
async fn begin_edit_unknown_id_sets_error() {
    let (mut app, _, transport) = setup();
    app.load().await;
    let before = transport.calls();

    assert!(!app.begin_edit(77));
    assert!(app.editing().is_none());
    assert_eq!(app.error(), Some("Todo with id 77 not found"));
    assert_eq!(transport.calls(), before);
}

#[tokio::test]
async fn toggling_form_abandons_edit() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "x", None).await;
    app.load().await;

    app.begin_edit(id);
    app.toggle_form();
    assert!(app.editing().is_none());
    assert!(app.is_form_open());

    app.begin_edit(id);
    app.cancel_edit();
    assert!(app.editing().is_none());
}

#[tokio::test]
async fn reload_recovers_from_failed_load() {
    let router = mock_server::app();
    let side = api(RouterTransport::new(router.clone()));
    seed(&side, "survivor", None).await;

    let flaky = FlakyTransport {
        failures: AtomicUsize::new(1),
        inner: RouterTransport::new(router),
    };
    let mut app = TodoApp::new(api(flaky), ToastService::default()).with_today(today());

    assert!(!app.load().await);
    assert_eq!(app.error(), Some("An error occurred"));
    assert!(app.todos().is_empty());

    assert!(app.reload().await);
    assert!(app.error().is_none());
    assert_eq!(app.todos().len(), 1);
    assert!(!app.has_render_fault());

    let screen = app.render();
    assert!(screen.contains("#1 survivor"));
    assert!(!app.has_render_fault());
}

#[tokio::test]
async fn title_only_edit_keeps_missing_description_null() {
    let (mut app, side, _) = setup();
    let id = seed(&side, "x", None).await;
    app.load().await;

    assert!(app.begin_edit(id));
    app.set_editing_field(FormField::Title, "y");
    assert!(app.submit_edit().await);

    let on_server = side.get_todo(id).await.unwrap();
    assert_eq!(on_server.title, "y");
    assert_eq!(on_server.description, None);
    assert_eq!(app.todos()[0].description, None);
}
