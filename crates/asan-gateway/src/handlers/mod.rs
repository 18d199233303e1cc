mod auth;
mod collections;
mod health;
mod rides;
mod users;

pub use auth::{login_handler, register_handler, send_otp_handler, verify_otp_handler};
pub use collections::{
    collection_routes, deletable_routes, editable_routes, owned_collection_routes,
};
pub use health::{health_handler, ping_handler};
pub use rides::{generate_pins_handler, track_handler};
pub use users::{get_profile_handler, me_handler, update_profile_handler};

use asan_storage::Record;

const PASSWORD_FIELD: &str = "password";

/// Strips credentials from a user record before it leaves the API.
pub(crate) fn public_user(user: Record) -> Record {
    user.without(PASSWORD_FIELD)
}

/// Treats a missing or blank value as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
