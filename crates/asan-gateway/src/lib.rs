//! HTTP gateway for the Asan booking backend.
//!
//! Every handler is thin glue over [`asan_storage::Database`]; the storage
//! mode is decided once at startup and never inspected by the routes.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
