//! HTTP API handlers, one module per concern

pub mod admin;
pub mod buildinfo;
pub mod health;
pub mod results;
pub mod session;

pub use admin::admin_routes;
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use results::results_routes;
pub use session::session_routes;
