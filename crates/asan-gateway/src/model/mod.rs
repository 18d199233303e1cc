mod auth;
mod common;

pub use auth::*;
pub use common::*;
