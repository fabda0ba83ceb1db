// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod effects;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod ui;

pub use config::{GameConfig, INITIAL_TIME, MAX_ATTEMPTS};
pub use scoring::{score_attempt, AttemptScore};
pub use session::{Activation, GameStatus, Session};
