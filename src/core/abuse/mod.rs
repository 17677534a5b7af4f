// Core anti-abuse module - counts punitive moderator actions.
// Following the same pattern as the other core modules.

pub mod abuse_models;
pub mod abuse_service;

pub use abuse_models::*;
pub use abuse_service::*;
