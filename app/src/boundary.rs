//! Top-level trap for rendering faults.
//!
//! # Design
//! Request errors are handled inline by the controller's `ErrorSlot`. This
//! boundary handles everything else that goes wrong while rendering: a
//! `RenderError` or a panic. The failing output is replaced by a recovery
//! panel and an error toast is pushed. The boundary keeps showing the panel
//! until `reset` (the reload action); it never touches the error slot.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::components::RenderError;
use crate::toast::{ToastKind, ToastService};

pub const FAULT_TOAST_MESSAGE: &str = "An error occurred. Please try refreshing the page.";

#[derive(Debug)]
pub struct ErrorBoundary {
    toasts: ToastService,
    fault: Option<String>,
}

impl ErrorBoundary {
    pub fn new(toasts: ToastService) -> Self {
        Self { toasts, fault: None }
    }

    pub fn has_error(&self) -> bool {
        self.fault.is_some()
    }

    /// Run `render` into a fresh buffer. Any fault trips the boundary and
    /// yields the recovery panel instead.
    pub fn render<F>(&mut self, render: F) -> String
    where
        F: FnOnce(&mut String) -> Result<(), RenderError>,
    {
        if let Some(fault) = &self.fault {
            return recovery_panel(fault);
        }

        let mut out = String::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| render(&mut out)));
        let fault = match outcome {
            Ok(Ok(())) => return out,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(%fault, "uncaught rendering error");
        self.toasts.show(FAULT_TOAST_MESSAGE, ToastKind::Error);
        let panel = recovery_panel(&fault);
        self.fault = Some(fault);
        panel
    }

    /// Forget the fault so the next render starts from scratch.
    pub fn reset(&mut self) {
        self.fault = None;
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn recovery_panel(fault: &str) -> String {
    let mut panel = String::from(
        "Something went wrong\n\
         We apologize for the inconvenience. Please try refreshing the page.\n\
         [Refresh Page]\n",
    );
    if cfg!(debug_assertions) {
        panel.push_str("\nError Details: ");
        panel.push_str(fault);
        panel.push('\n');
    }
    panel
}
