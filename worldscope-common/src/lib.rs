//! Wire types shared between the WorldScope backend and its subscribers.

mod types;

pub use types::*;

/// Service name reported by the liveness endpoint
pub const SERVICE_NAME: &str = "worldscope-backend";
