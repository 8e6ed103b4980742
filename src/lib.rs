// Library surface for the binary and integration tests.
// Keep GUI types behind the alert module so the rest stays headless-testable.
pub mod activity;
pub mod alert;
pub mod app_dirs;
pub mod config;
pub mod decision;
pub mod error;
pub mod monitors;
pub mod runtime;
pub mod session;
pub mod snooze;
pub mod util;

pub use error::AlertError;
