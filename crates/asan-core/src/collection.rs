/// Collections every fresh file store starts with.
///
/// Other names are still accepted and created on first access.
pub const KNOWN_COLLECTIONS: [&str; 13] = [
    USERS, BOOKINGS, RIDES, VEHICLES, PAYMENTS, REVIEWS, ALERTS, OTPS, CHILDREN, CONTACTS,
    ADDRESSES, PINS, PRESETS,
];

pub const USERS: &str = "users";
pub const BOOKINGS: &str = "bookings";
pub const RIDES: &str = "rides";
pub const VEHICLES: &str = "vehicles";
pub const PAYMENTS: &str = "payments";
pub const REVIEWS: &str = "reviews";
pub const ALERTS: &str = "alerts";
pub const OTPS: &str = "otps";
pub const CHILDREN: &str = "children";
pub const CONTACTS: &str = "contacts";
pub const ADDRESSES: &str = "addresses";
pub const PINS: &str = "pins";
pub const PRESETS: &str = "presets";
