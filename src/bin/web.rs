//! Single binary web server: public leaderboard, assist tracker and admin API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set LEADERBOARD_PROJECT_ID to use the live document store; otherwise the built-in
//! player list is served and changed locally.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{Data, Json, Path, ServiceConfig},
    App, HttpResponse, HttpServer, Responder,
};
use assist_leaderboard_web::{
    logic::encode_fields, seed_players, AdminController, AdminSession, AppConfig, AssistTracker,
    Document, LeaderboardEntry, LeaderboardError, MemoryGateway, NewPlayer, PlayerFields,
    PlayerGateway, SessionFlagStore, SharedSecretVerifier, SyncEngine, TrackerStatus,
    WriteOutcome,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

struct AppState {
    engine: SyncEngine,
    tracker: AssistTracker,
    verifier: SharedSecretVerifier,
}

type SharedState = Data<AppState>;

/// Cookie-backed session flags for the admin login.
struct CookieFlags(Session);

impl SessionFlagStore for CookieFlags {
    fn get_flag(&self, key: &str) -> bool {
        matches!(self.0.get::<bool>(key), Ok(Some(true)))
    }

    fn set_flag(&self, key: &str) -> Result<(), LeaderboardError> {
        self.0
            .insert(key, true)
            .map_err(|e| LeaderboardError::Session(e.to_string()))
    }

    fn clear_flag(&self, key: &str) {
        self.0.remove(key);
    }
}

fn admin(state: &AppState, session: Session) -> AdminController<CookieFlags> {
    AdminController::new(AdminSession::new(CookieFlags(session)), state.engine.store())
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct LeaderboardResponse {
    status: TrackerStatus,
    players: Vec<LeaderboardEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminSessionResponse {
    authenticated: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteResponse {
    applied: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    id: String,
}

#[derive(Deserialize)]
struct LoginBody {
    password: String,
}

#[derive(Deserialize)]
struct DeleteBody {
    #[serde(default)]
    confirm: bool,
}

/// Path segment: player id (e.g. /api/admin/players/{id})
#[derive(Deserialize)]
struct PlayerPath {
    id: String,
}

fn error_response(e: &LeaderboardError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        LeaderboardError::Validation(_) => HttpResponse::BadRequest().json(body),
        LeaderboardError::InvalidPassword | LeaderboardError::NotAuthenticated => {
            HttpResponse::Unauthorized().json(body)
        }
        LeaderboardError::GatewayUnavailable => HttpResponse::ServiceUnavailable().json(body),
        LeaderboardError::PlayerNotFound(_) => HttpResponse::NotFound().json(body),
        LeaderboardError::NothingToUndo
        | LeaderboardError::WriteInProgress
        | LeaderboardError::NegativeAssists(_)
        | LeaderboardError::AssistsOutOfRange(_) => HttpResponse::Conflict().json(body),
        LeaderboardError::Write(_) => HttpResponse::BadGateway().json(body),
        LeaderboardError::Session(_) => HttpResponse::InternalServerError().json(body),
    }
}

fn write_response(result: Result<WriteOutcome, LeaderboardError>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(WriteResponse {
            applied: outcome == WriteOutcome::Applied,
        }),
        Err(e) => error_response(&e),
    }
}

fn leaderboard_response(state: &AppState) -> LeaderboardResponse {
    LeaderboardResponse {
        status: state.tracker.status(),
        players: state.engine.leaderboard().entries(),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "assist-leaderboard-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Ranked players plus the tracker widget state.
#[get("/api/leaderboard")]
async fn api_leaderboard(state: SharedState) -> HttpResponse {
    HttpResponse::Ok().json(leaderboard_response(&state))
}

/// Add one assist to the tracked player.
#[post("/api/tracker/increment")]
async fn api_tracker_increment(state: SharedState) -> HttpResponse {
    match state.tracker.increment().await {
        Ok(_) => HttpResponse::Ok().json(leaderboard_response(&state)),
        Err(e) => error_response(&e),
    }
}

/// Revert the last assist added through the tracker.
#[post("/api/tracker/undo")]
async fn api_tracker_undo(state: SharedState) -> HttpResponse {
    match state.tracker.undo().await {
        Ok(_) => HttpResponse::Ok().json(leaderboard_response(&state)),
        Err(e) => error_response(&e),
    }
}

#[post("/api/admin/login")]
async fn api_admin_login(state: SharedState, session: Session, body: Json<LoginBody>) -> HttpResponse {
    match admin(&state, session).login(&body.password, &state.verifier) {
        Ok(()) => HttpResponse::Ok().json(AdminSessionResponse { authenticated: true }),
        Err(e) => error_response(&e),
    }
}

#[post("/api/admin/logout")]
async fn api_admin_logout(state: SharedState, session: Session) -> HttpResponse {
    admin(&state, session).logout();
    HttpResponse::Ok().json(AdminSessionResponse { authenticated: false })
}

#[get("/api/admin/session")]
async fn api_admin_session(state: SharedState, session: Session) -> HttpResponse {
    let authenticated = admin(&state, session).session().is_authenticated();
    HttpResponse::Ok().json(AdminSessionResponse { authenticated })
}

#[get("/api/admin/players")]
async fn api_admin_players(state: SharedState, session: Session) -> HttpResponse {
    match admin(&state, session).players() {
        Ok(board) => HttpResponse::Ok().json(board.entries()),
        Err(e) => error_response(&e),
    }
}

#[post("/api/admin/players")]
async fn api_admin_create(state: SharedState, session: Session, body: Json<NewPlayer>) -> HttpResponse {
    match admin(&state, session).create(body.into_inner()).await {
        Ok(id) => HttpResponse::Ok().json(CreatedResponse { id }),
        Err(e) => error_response(&e),
    }
}

#[put("/api/admin/players/{id}")]
async fn api_admin_edit(
    state: SharedState,
    session: Session,
    path: Path<PlayerPath>,
    body: Json<PlayerFields>,
) -> HttpResponse {
    match admin(&state, session).edit(&path.id, body.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(WriteResponse { applied: true }),
        Err(e) => error_response(&e),
    }
}

/// Body must carry `"confirm": true`; anything else leaves the player in place.
#[delete("/api/admin/players/{id}")]
async fn api_admin_delete(
    state: SharedState,
    session: Session,
    path: Path<PlayerPath>,
    body: Option<Json<DeleteBody>>,
) -> HttpResponse {
    let confirmed = body.map(|b| b.confirm).unwrap_or(false);
    let result = admin(&state, session).delete(&path.id, |_| confirmed).await;
    write_response(result)
}

#[post("/api/admin/players/{id}/increment")]
async fn api_admin_increment(state: SharedState, session: Session, path: Path<PlayerPath>) -> HttpResponse {
    write_response(admin(&state, session).increment(&path.id).await)
}

#[post("/api/admin/players/{id}/decrement")]
async fn api_admin_decrement(state: SharedState, session: Session, path: Path<PlayerPath>) -> HttpResponse {
    write_response(admin(&state, session).decrement(&path.id).await)
}

/// Re-subscribe after the live query failed.
#[post("/api/admin/resync")]
async fn api_admin_resync(state: SharedState, session: Session) -> HttpResponse {
    if let Err(e) = admin(&state, session).session().require() {
        return error_response(&e);
    }
    state.engine.mount();
    HttpResponse::Ok().json(leaderboard_response(&state))
}

/// In-process store seeded with the record list, standing in for a hosted project.
fn document_store(config: &AppConfig) -> Option<Arc<dyn PlayerGateway>> {
    let project = config.project_id.as_deref()?;
    log::info!("Using document store for project {}", project);
    let seeds = seed_players();
    let docs = seeds
        .iter()
        .map(|p| Document::new(p.id.clone(), encode_fields(&PlayerFields::from(p))));
    Some(Arc::new(MemoryGateway::with_documents(docs)))
}

/// JSON API routes. Player images are resolved by the front end, not served here.
fn configure(cfg: &mut ServiceConfig) {
    cfg.service(api_health)
        .service(favicon)
        .service(api_leaderboard)
        .service(api_tracker_increment)
        .service(api_tracker_undo)
        .service(api_admin_login)
        .service(api_admin_logout)
        .service(api_admin_session)
        .service(api_admin_players)
        .service(api_admin_create)
        .service(api_admin_edit)
        .service(api_admin_delete)
        .service(api_admin_increment)
        .service(api_admin_decrement)
        .service(api_admin_resync);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let engine = SyncEngine::start(document_store(&config), config.tracked_policy());
    let tracker = AssistTracker::new(engine.store());
    let state = Data::new(AppState {
        engine,
        tracker,
        verifier: SharedSecretVerifier::new(config.admin_password.clone()),
    });

    // Sessions only need to survive navigation within one server run.
    let session_key = Key::generate();

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await?;

    state.engine.unmount();
    Ok(())
}
