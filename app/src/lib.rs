//! Terminal front end for the todo API.
//!
//! # Overview
//! `TodoApp` owns the canonical todo collection and the UI state around it.
//! It talks to the server through `TodoApi`, which drives the request
//! builders and response parsers of `todo_core` over a `Transport`.
//! Request failures land in an inline `ErrorSlot`; rendering faults are
//! trapped by an `ErrorBoundary` that also raises a toast through the
//! shared `ToastService`.

pub mod api;
pub mod boundary;
pub mod components;
pub mod config;
pub mod controller;
pub mod draft;
pub mod error_slot;
pub mod logging;
pub mod toast;
pub mod transport;

pub use api::TodoApi;
pub use config::AppConfig;
pub use controller::TodoApp;
pub use draft::{FormField, TodoDraft};
pub use toast::{Toast, ToastKind, ToastService};
pub use transport::{Transport, TransportError, UreqTransport};
