//! Small helpers shared across modules

pub mod http;
pub mod time;
