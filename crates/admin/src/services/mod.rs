//! Order workflow and customer notifications.

pub mod notify;
pub mod workflow;

pub use notify::{NotifyOutcome, OrderNotifier, SkipReason, resolve_endpoint};
pub use workflow::{ItemsState, OrderBoard, OrderWorkflow, StatusGroup, WorkflowError};
