use std::{env, time::Duration};

use tokio::time;
use tracing::{debug, info};

use crate::logic::Sessions;

pub async fn start_cleanup_task(sessions: Sessions) {
    let cleanup_interval_secs: u64 = env::var("CLEANUP_INTERVAL_SECONDS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    let inactive_timeout_secs: u64 = env::var("INACTIVE_GAME_TIMEOUT_SECONDS")
        .unwrap_or_else(|_| "600".to_string())
        .parse()
        .unwrap_or(600);

    let mut interval = time::interval(Duration::from_secs(cleanup_interval_secs.max(1)));

    info!(
        "Started session cleanup task: checking every {}s, inactive timeout: {}s",
        cleanup_interval_secs, inactive_timeout_secs
    );

    loop {
        interval.tick().await;
        cleanup_sessions(&sessions, inactive_timeout_secs);
    }
}

pub fn cleanup_sessions(sessions: &Sessions, inactive_timeout_secs: u64) -> usize {
    let mut sessions_to_remove = Vec::new();

    for entry in sessions.iter() {
        // A session that is locked is being played right now.
        if let Ok(session) = entry.value().try_lock()
            && session.should_cleanup(inactive_timeout_secs)
        {
            sessions_to_remove.push(entry.key().clone());
        }
    }

    let removed_count = sessions_to_remove.len();
    for session_id in sessions_to_remove {
        sessions.remove(&session_id);
        debug!("Cleaned up session: {}", session_id);
    }

    if removed_count > 0 {
        info!("Cleaned up {} inactive sessions", removed_count);
    }
    removed_count
}
