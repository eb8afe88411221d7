use rocket::{
    Build, Request, Response, Rocket,
    fairing::{Fairing, Info, Kind},
    http::Header,
};
use tracing::{info, warn};

use crate::{cleanup::start_cleanup_task, logic::Sessions};

pub struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(sessions) = rocket.state::<Sessions>() {
            info!("Starting cleanup task for session management");
            let sessions_for_cleanup = sessions.clone();
            tokio::spawn(async move {
                start_cleanup_task(sessions_for_cleanup).await;
            });
        } else {
            warn!("Failed to get sessions state for cleanup task");
        }
        Ok(rocket)
    }
}

/// Game fragments change with every move, so browsers must not cache them.
pub struct NoCache;

#[rocket::async_trait]
impl Fairing for NoCache {
    fn info(&self) -> Info {
        Info {
            name: "No Cache",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new(
            "Cache-Control",
            "no-cache, no-store, must-revalidate",
        ));
        response.set_header(Header::new("Pragma", "no-cache"));
        response.set_header(Header::new("Expires", "0"));
    }
}
