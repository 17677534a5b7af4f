// Discord commands module.
// Each feature gets its own command file.

pub mod antiabuse;

// Bot presence management
pub mod presence;
