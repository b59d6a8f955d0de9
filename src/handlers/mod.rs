// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod health;
mod metrics;
mod static_files;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;

// Static content
pub use static_files::{index_service, static_dir_service};
