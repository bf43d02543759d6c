//! API Lambda handler and request processing

pub mod event_handler;
pub mod handler;
pub mod helpers;
pub mod middleware;
pub mod parsing;
pub mod signature;

// Re-export the main handler for convenience
pub use handler::{AppState, function_handler as handler, handle_request};
