//! HTTP request handlers
//!
//! Every `/api/session` route binds the request to a session through the
//! `interview_session` cookie. A request without a live session is handled
//! against a scratch session that is only registered, and only given a
//! cookie, once the password has been accepted.

use super::assets::{serve_index, serve_static};
use super::types::{
    AnswerRequest, AnswerResponse, ErrorResponse, LoginRequest, SessionView, TopicsResponse,
    TranscriptQuery, VersionResponse,
};
use super::AppState;
use crate::config::Secret;
use crate::runtime::SessionHandle;
use crate::session::{Session, SessionId, Turn};
use crate::state_machine::{Event, TransitionError};
use crate::system_prompt::INTERVIEW_TOPICS;
use crate::transcript::TranscriptExport;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "interview_session";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Single page UI
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/session", get(get_session))
        .route("/api/session/login", post(login))
        .route("/api/session/consent", post(give_consent))
        .route("/api/session/answer", post(submit_answer))
        .route("/api/session/end", post(end_interview))
        .route("/api/session/restart", post(restart))
        // Export
        .route("/api/session/transcript", get(export_transcript))
        // Static info
        .route("/api/topics", get(list_topics))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session binding
// ============================================================

fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .build()
}

/// Resolve the live session named by the request cookie, if any
async fn bind_session(state: &AppState, jar: &CookieJar) -> Option<SessionHandle> {
    let id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<SessionId>().ok())?;
    state.sessions.find(id).await
}

/// Dispatch an event that has no model round trip and return the new view
async fn run_event(
    state: &AppState,
    jar: CookieJar,
    event: Event,
) -> (CookieJar, Result<Json<SessionView>, AppError>) {
    let topic_count = state.sessions.topic_count();

    if let Some(handle) = bind_session(state, &jar).await {
        let mut session = handle.session.lock().await;
        let result = state
            .sessions
            .dispatch(&mut session, event)
            .await
            .map(|_| Json(SessionView::new(&session, topic_count)))
            .map_err(AppError::from);
        return (jar, result);
    }

    let mut session = Session::new(SessionId::new());
    if let Err(e) = state.sessions.dispatch(&mut session, event).await {
        return (jar, Err(e.into()));
    }

    let view = SessionView::new(&session, topic_count);
    if !session.is_authenticated() {
        return (jar, Ok(Json(view)));
    }

    let handle = state.sessions.adopt(session).await;
    (jar.add(session_cookie(handle.id)), Ok(Json(view)))
}

// ============================================================
// Session routes
// ============================================================

async fn get_session(State(state): State<AppState>, jar: CookieJar) -> Json<SessionView> {
    let topic_count = state.sessions.topic_count();
    let Some(handle) = bind_session(&state, &jar).await else {
        return Json(SessionView::new(&Session::new(SessionId::new()), topic_count));
    };
    let session = handle.session.lock().await;
    let view = SessionView::new(&session, topic_count);
    Json(view)
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let event = Event::PasswordSubmitted {
        password: Secret::new(req.password),
    };
    run_event(&state, jar, event).await
}

async fn give_consent(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    run_event(&state, jar, Event::ConsentGiven).await
}

async fn end_interview(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    run_event(&state, jar, Event::EndRequested).await
}

async fn restart(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    run_event(&state, jar, Event::RestartRequested).await
}

async fn submit_answer(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let Some(handle) = bind_session(&state, &jar).await else {
        return AppError::from(TransitionError::NotAuthenticated).into_response();
    };
    let mut session = handle.session.lock().await;

    let event = Event::AnswerSubmitted { answer: req.answer };
    let outcome = match state.sessions.dispatch(&mut session, event).await {
        Ok(outcome) => outcome,
        Err(e) => return AppError::from(e).into_response(),
    };

    let view = SessionView::new(&session, state.sessions.topic_count());
    match (outcome.failure, outcome.reply) {
        (Some(error), _) => (
            StatusCode::BAD_GATEWAY,
            Json(AnswerResponse::Failed {
                error_kind: error.kind.as_str(),
                error: error.message,
                session: view,
            }),
        )
            .into_response(),
        (None, Some(reply)) => Json(AnswerResponse::Replied {
            reply,
            session: view,
        })
        .into_response(),
        (None, None) => AppError::Internal("Answer produced no reply".to_string()).into_response(),
    }
}

async fn export_transcript(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<TranscriptQuery>,
) -> Result<Json<TranscriptExport>, AppError> {
    let handle = bind_session(&state, &jar)
        .await
        .ok_or(TransitionError::NotAuthenticated)?;
    let session = handle.session.lock().await;

    if !session.is_authenticated() {
        return Err(TransitionError::NotAuthenticated.into());
    }

    let turns: &[Turn] = session.conversation().turns();
    let export = TranscriptExport::new(turns, query.format, chrono::Utc::now());
    tracing::info!(
        session = %handle.id,
        format = ?query.format,
        turns = turns.len(),
        "Transcript exported"
    );

    Ok(Json(export))
}

// ============================================================
// Static info
// ============================================================

async fn list_topics() -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: INTERVIEW_TOPICS.to_vec(),
    })
}

async fn get_version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        model: state.sessions.model_id().to_string(),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(error: TransitionError) -> Self {
        let message = error.to_string();
        match error {
            TransitionError::EmptyAnswer => AppError::BadRequest(message),
            TransitionError::IncorrectPassword | TransitionError::NotAuthenticated => {
                AppError::Unauthorized(message)
            }
            TransitionError::ConsentRequired => AppError::Conflict(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
