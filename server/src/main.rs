use minesweeper_server::build_rocket;
use rocket::{Build, Rocket};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("🚀 Starting Minesweeper server");

    let rocket = build_rocket();

    info!("🌐 Server configured with sessions, cleanup task, and routes");
    info!("📡 Endpoints: GET /, GET /health, POST /new, POST /reveal, POST /flag, POST /unflag");

    rocket
}
