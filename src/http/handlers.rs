use super::state::AppState;
use crate::export::TranscriptFormat;
use crate::library::StoreError;
use crate::recorder::SaveError;
use crate::session::SessionError;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Recognition language (BCP-47 tag); defaults to the configured one
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Title for the library entry; derived from the text when omitted
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn session_error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::AlreadyRecording => StatusCode::CONFLICT,
        SessionError::Unsupported(_) => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SessionError::Closed => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/session/start
/// Start a new dictation session
pub async fn start_session(
    State(state): State<AppState>,
    req: Option<Json<StartSessionRequest>>,
) -> impl IntoResponse {
    let language = req.and_then(|Json(r)| r.language);

    match state.recorder.start(language).await {
        Ok(session_id) => {
            info!("Dictation session started: {}", session_id);
            let status = state.recorder.status();
            (
                StatusCode::OK,
                Json(StartSessionResponse {
                    session_id: session_id.clone(),
                    status: status.state.to_string(),
                    message: format!("Dictation session {} started", session_id),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to start session: {}", e);
            session_error_response(e)
        }
    }
}

/// POST /api/session/stop
/// Stop the current dictation session
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    match state.recorder.stop().await {
        Ok(status) => {
            info!("Dictation session stopped");
            (StatusCode::OK, Json(status)).into_response()
        }
        Err(e) => {
            error!("Failed to stop session: {}", e);
            session_error_response(e)
        }
    }
}

/// POST /api/session/clear
/// Empty the transcript
pub async fn clear_transcript(State(state): State<AppState>) -> impl IntoResponse {
    match state.recorder.clear().await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                status: "cleared".to_string(),
                message: "Transcript cleared".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to clear transcript: {}", e);
            session_error_response(e)
        }
    }
}

/// GET /api/session/status
/// Current controller status snapshot
pub async fn get_session_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.recorder.status()))
}

/// GET /api/transcript
/// The transcript as a whole: text, interim tail, committed segments
pub async fn get_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.recorder.transcript_snapshot()))
}

/// GET /api/transcript/export?format=txt|srt|vtt|json
/// Download the transcript in the requested format
pub async fn export_transcript(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> impl IntoResponse {
    let format: TranscriptFormat = match query.format.parse() {
        Ok(format) => format,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("{}", e),
                }),
            )
                .into_response()
        }
    };

    match state.recorder.export(format) {
        Ok(artifact) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, artifact.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.filename),
                ),
            ],
            artifact.body,
        )
            .into_response(),
        Err(e) => {
            error!("Export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Export failed: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/transcript/copy
/// Copy the transcript to the clipboard, or hand the text back
pub async fn copy_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.recorder.copy_transcript()))
}

/// POST /api/transcript/save
/// Save the committed transcript to the library (signed-in users only)
pub async fn save_transcript(
    State(state): State<AppState>,
    req: Option<Json<SaveRequest>>,
) -> impl IntoResponse {
    let title = req.and_then(|Json(r)| r.title);

    match state.recorder.save(title).await {
        Ok(id) => (
            StatusCode::OK,
            Json(SaveResponse {
                id: id.clone(),
                status: "saved".to_string(),
                message: format!("Transcript saved as {}", id),
            }),
        )
            .into_response(),
        Err(e @ SaveError::NotSignedIn) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e @ SaveError::EmptyTranscript) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to save transcript: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to save transcript: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/auth/login
/// Sign in with the configured token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.recorder.login(&req.token) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.recorder.logout();
    (
        StatusCode::OK,
        Json(MessageResponse {
            status: "signed_out".to_string(),
            message: "Signed out".to_string(),
        }),
    )
}

/// GET /api/library
/// List saved transcripts, newest first
pub async fn list_library(State(state): State<AppState>) -> impl IntoResponse {
    match state.recorder.list_saved().await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => {
            error!("Failed to list library: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to list library: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/library/:id
/// Fetch one saved transcript
pub async fn get_library_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.recorder.get_saved(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(StoreError::NotFound(id)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Transcript {} not found", id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to load transcript: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to load transcript: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
