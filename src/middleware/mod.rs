// Gateway module - controls public API for middleware
// Modules are private, only exported symbols are public

mod request_metrics;

pub(crate) use request_metrics::track_page_requests;
