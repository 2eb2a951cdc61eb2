//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and derives the filtered,
//! sorted views a front end shows. The caller executes the actual HTTP
//! round-trip, so the core stays deterministic and testable.
//!
//! # Design
//! - `TodoClient` is stateless: it holds only `base_url` and the fallback
//!   error message.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `ApiError` is a tagged enum; callers branch on the variant.
//! - `view` functions take "today" as an argument instead of reading a clock.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use error::{ApiError, DEFAULT_ERROR_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{parse_date_only, Todo, TodoCreate, TodoUpdate};
pub use view::{FilterMode, SortKey};
