// Log channel output: embed formatting and delivery.

pub mod formatter;
pub mod sender;

pub use sender::{deliver_log, send_log};
