use std::sync::Arc;

use rocket::{
    FromForm, Request, State,
    form::Form,
    get,
    http::{Cookie, CookieJar, SameSite},
    post,
    response::{self, Responder, content::RawHtml},
    serde::json::Json,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument};

use minesweeper_core::{Game, GameError, GameParams, GameSnapshot, GameStatus, Move, Pos};

use crate::{
    logic::{Session, Sessions, add_session, get_session, validate_params},
    rate_limit::{ClientIp, RateLimiter, check_rate_limit},
    views,
};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, rocket::Responder)]
pub enum ApiError {
    #[response(status = 400, content_type = "plain")]
    BadRequest(String),
    #[response(status = 404, content_type = "plain")]
    NotFound(String),
    #[response(status = 409, content_type = "plain")]
    Conflict(String),
    #[response(status = 429, content_type = "plain")]
    TooManyRequests(String),
}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        match error {
            GameError::GameOver | GameError::MineHit => ApiError::Conflict(error.to_string()),
            _ => ApiError::BadRequest(error.to_string()),
        }
    }
}

/// An HTML fragment. When `retarget` is set htmx swaps it over the whole
/// game instead of the element that made the request.
pub struct Fragment {
    html: String,
    retarget: bool,
}

impl<'r> Responder<'r, 'static> for Fragment {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let mut response = RawHtml(self.html).respond_to(request)?;
        if self.retarget {
            response.set_raw_header("HX-Retarget", "#game");
            response.set_raw_header("HX-Reswap", "outerHTML");
        }
        Ok(response)
    }
}

#[derive(Debug, FromForm)]
pub struct NewGameForm {
    pub width: usize,
    pub height: usize,
    pub mines: isize,
}

#[derive(Debug, FromForm)]
pub struct MoveForm {
    pub x: isize,
    pub y: isize,
}

fn session_id(cookies: &CookieJar<'_>) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

#[get("/")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn index(sessions: &State<Sessions>, cookies: &CookieJar<'_>) -> RawHtml<String> {
    let session = session_id(cookies).and_then(|id| get_session(sessions, &id));

    match session {
        Some(session) => {
            let session = session.lock().await;
            RawHtml(views::page(Some(session.game())))
        }
        None => RawHtml(views::page(None)),
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

/// Builds a game from `params` and stores it in the caller's session,
/// creating the session on first use.
async fn start_game(
    params: GameParams,
    sessions: &Sessions,
    rate_limiter: &State<RateLimiter>,
    client_ip: &ClientIp,
    cookies: &CookieJar<'_>,
) -> Result<Arc<Mutex<Session>>, ApiError> {
    info!(
        "New game request from {}: {}x{} with {} mines",
        client_ip.0, params.width, params.height, params.mines
    );

    check_rate_limit(rate_limiter, client_ip).map_err(|_| {
        ApiError::TooManyRequests("too many new games, try again later".to_string())
    })?;

    validate_params(&params).map_err(|e| ApiError::BadRequest(format!("new: {e}")))?;
    let game = Game::new(params).map_err(|e| ApiError::BadRequest(format!("new: {e}")))?;

    match session_id(cookies).and_then(|id| get_session(sessions, &id)) {
        Some(session) => {
            debug!("Replacing game in existing session");
            session.lock().await.restart(game);
            Ok(session)
        }
        None => {
            let id = add_session(sessions, Session::new(game));
            let session = get_session(sessions, &id)
                .ok_or_else(|| ApiError::NotFound("no game in progress".to_string()))?;
            cookies.add(
                Cookie::build((SESSION_COOKIE, id))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            );
            Ok(session)
        }
    }
}

#[post("/new", data = "<form>")]
#[instrument(level = "trace", skip(sessions, rate_limiter, client_ip, cookies), fields(client_ip = %client_ip.0))]
pub async fn new_game(
    form: Form<NewGameForm>,
    sessions: &State<Sessions>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
    cookies: &CookieJar<'_>,
) -> Result<Fragment, ApiError> {
    let params = GameParams {
        width: form.width,
        height: form.height,
        mines: form.mines,
    };
    let session = start_game(params, sessions, rate_limiter, &client_ip, cookies).await?;
    let session = session.lock().await;

    Ok(Fragment {
        html: views::game(session.game()),
        retarget: false,
    })
}

fn current_session(
    sessions: &Sessions,
    cookies: &CookieJar<'_>,
) -> Result<Arc<Mutex<Session>>, ApiError> {
    session_id(cookies)
        .and_then(|id| get_session(sessions, &id))
        .ok_or_else(|| ApiError::NotFound("no game in progress".to_string()))
}

/// Applies `mv` to the caller's game and hands back the locked session for
/// rendering.
async fn apply_move(
    sessions: &Sessions,
    cookies: &CookieJar<'_>,
    mv: Move,
) -> Result<(OwnedMutexGuard<Session>, GameStatus), ApiError> {
    let mut session = current_session(sessions, cookies)?.lock_owned().await;
    let status = session
        .play(mv)
        .inspect_err(|e| debug!("{:?} rejected: {}", mv, e))?;
    Ok((session, status))
}

async fn move_fragment(
    sessions: &Sessions,
    cookies: &CookieJar<'_>,
    mv: Move,
) -> Result<Fragment, ApiError> {
    let (session, status) = apply_move(sessions, cookies, mv).await?;

    // Coordinates were accepted by the field, so they are in bounds.
    if status == GameStatus::Playing {
        let pos = mv.pos();
        Ok(Fragment {
            html: views::cell(session.game(), pos.x as usize, pos.y as usize),
            retarget: false,
        })
    } else {
        Ok(Fragment {
            html: views::game(session.game()),
            retarget: true,
        })
    }
}

#[post("/reveal", data = "<form>")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn reveal(
    form: Form<MoveForm>,
    sessions: &State<Sessions>,
    cookies: &CookieJar<'_>,
) -> Result<Fragment, ApiError> {
    let pos = Pos {
        x: form.x,
        y: form.y,
    };
    move_fragment(sessions, cookies, Move::Reveal { pos }).await
}

#[post("/flag", data = "<form>")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn flag(
    form: Form<MoveForm>,
    sessions: &State<Sessions>,
    cookies: &CookieJar<'_>,
) -> Result<Fragment, ApiError> {
    let pos = Pos {
        x: form.x,
        y: form.y,
    };
    move_fragment(sessions, cookies, Move::Flag { pos }).await
}

#[post("/unflag", data = "<form>")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn unflag(
    form: Form<MoveForm>,
    sessions: &State<Sessions>,
    cookies: &CookieJar<'_>,
) -> Result<Fragment, ApiError> {
    let pos = Pos {
        x: form.x,
        y: form.y,
    };
    move_fragment(sessions, cookies, Move::Unflag { pos }).await
}

#[get("/api/state")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn api_state(
    sessions: &State<Sessions>,
    cookies: &CookieJar<'_>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let session = current_session(sessions, cookies)?;
    let session = session.lock().await;
    Ok(Json(session.game().snapshot()))
}

#[post("/api/new", data = "<params>")]
#[instrument(level = "trace", skip(sessions, rate_limiter, client_ip, cookies), fields(client_ip = %client_ip.0))]
pub async fn api_new_game(
    params: Json<GameParams>,
    sessions: &State<Sessions>,
    rate_limiter: &State<RateLimiter>,
    client_ip: ClientIp,
    cookies: &CookieJar<'_>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let session = start_game(params.0, sessions, rate_limiter, &client_ip, cookies).await?;
    let session = session.lock().await;
    Ok(Json(session.game().snapshot()))
}

#[post("/api/move", data = "<mv>")]
#[instrument(level = "trace", skip(sessions, cookies))]
pub async fn api_move(
    mv: Json<Move>,
    sessions: &State<Sessions>,
    cookies: &CookieJar<'_>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let (session, _) = apply_move(sessions, cookies, mv.0).await?;
    Ok(Json(session.game().snapshot()))
}
