//! Configuration, domain models and the delivery seam shared by all handlers

pub mod config;
pub mod delivery;
pub mod models;
