// Context-Based Restrictions: zones, rules, and account settings.

pub mod client;
pub mod models;
pub mod options;

pub use client::{CbrClient, DEFAULT_SERVICE_URL};
pub use models::*;
pub use options::*;
