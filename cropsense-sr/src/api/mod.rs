//! HTTP API handlers for cropsense-sr
//!
//! JSON endpoints under `/api`, HTML pages at `/`, `/samples`, `/results`,
//! plus `/health`.

pub mod caller;
pub mod health;
pub mod samples;
pub mod ui;

pub use caller::CallerIp;
pub use health::health_routes;
pub use samples::sample_routes;
pub use ui::ui_routes;
