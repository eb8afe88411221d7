//! HTTP front end for the minesweeper engine.
//!
//! Pages and fragments are rendered on the server and swapped in by htmx.
//! Every browser session gets its own game, identified by a cookie.

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket, routes};
use tracing::info;

pub mod cleanup;
pub mod fairings;
pub mod logic;
pub mod rate_limit;
pub mod routes;
pub mod views;

use fairings::{CleanupFairing, NoCache};
use logic::Sessions;
use rate_limit::create_rate_limiter;

pub fn build_rocket() -> Rocket<Build> {
    let sessions: Sessions = Arc::new(DashMap::new());
    let rate_limiter = create_rate_limiter();

    info!("📊 Initialized session storage and rate limiter");

    rocket::build()
        .attach(NoCache)
        .attach(CleanupFairing)
        .manage(sessions)
        .manage(rate_limiter)
        .mount(
            "/",
            routes![
                routes::index,
                routes::health,
                routes::new_game,
                routes::reveal,
                routes::flag,
                routes::unflag,
                routes::api_state,
                routes::api_new_game,
                routes::api_move,
            ],
        )
}
