// Moderator action tracking - audit log lookups, gateway event handlers and the
// anti-abuse response.

pub mod abuse_handler;
pub mod audit_log;
pub mod events;
