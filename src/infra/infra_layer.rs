// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "abuse/abuse_store.rs"]
pub mod abuse;
