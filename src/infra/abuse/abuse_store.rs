// Implementations for the anti-abuse counter.

pub mod in_memory;

// Re-export for convenience
pub use in_memory::InMemoryAbuseStore;
