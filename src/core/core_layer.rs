// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "abuse/mod.rs"]
pub mod abuse;
