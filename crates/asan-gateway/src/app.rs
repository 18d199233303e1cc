use std::path::PathBuf;

use asan_core::collection::{
    ADDRESSES, ALERTS, BOOKINGS, CHILDREN, CONTACTS, PAYMENTS, PRESETS, REVIEWS, RIDES, VEHICLES,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    collection_routes, deletable_routes, editable_routes, generate_pins_handler,
    get_profile_handler, health_handler, login_handler, me_handler, owned_collection_routes,
    ping_handler, register_handler, send_otp_handler, track_handler, update_profile_handler,
    verify_otp_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Builds the full router. Paths outside `/api` and `/health` are served
    /// from `static_dir` when one is given.
    pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
        let router = Router::new()
            .route("/health", get(health_handler))
            .nest("/api", Self::api());
        let router = match static_dir {
            Some(dir) => router.fallback_service(ServeDir::new(dir)),
            None => router,
        };

        router
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    fn api() -> Router<AppState> {
        Router::new()
            .route("/ping", get(ping_handler))
            .route("/auth/register", post(register_handler))
            .route("/auth/login", post(login_handler))
            .route("/auth/send-otp", post(send_otp_handler))
            .route("/auth/verify-otp", post(verify_otp_handler))
            .route("/bookings", collection_routes(BOOKINGS))
            .route("/rides", collection_routes(RIDES))
            .route("/vehicles", collection_routes(VEHICLES))
            .route("/payments", collection_routes(PAYMENTS))
            .route("/reviews", collection_routes(REVIEWS))
            .route("/alerts", collection_routes(ALERTS))
            .route("/presets", collection_routes(PRESETS))
            .route("/children", owned_collection_routes(CHILDREN))
            .route("/children/{id}", editable_routes(CHILDREN))
            .route("/contacts", owned_collection_routes(CONTACTS))
            .route("/contacts/{id}", deletable_routes(CONTACTS))
            .route("/addresses", owned_collection_routes(ADDRESSES))
            .route(
                "/profile/{user_id}",
                get(get_profile_handler).put(update_profile_handler),
            )
            .route("/me", get(me_handler))
            .route("/pins/generate", post(generate_pins_handler))
            .route("/track/{ride_id}", get(track_handler))
    }
}
