//! API Lambda handler and request processing

pub mod auth;
pub mod handler;
pub mod helpers;
pub mod parsing;

// Re-export the main handler for convenience
pub use handler::handler;
