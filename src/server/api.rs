use axum::{
    routing::{ get, post },
    Router,
    extract::{ Path, Query, State },
    response::IntoResponse,
    http::{ header, StatusCode },
    Json,
};
use chrono::{ NaiveDate, NaiveTime };
use log::info;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{ Any, CorsLayer };

use crate::appointments::generate_invite;
use crate::error::AppError;
use crate::models::appointment::{ Appointment, AppointmentConfirmation, AppointmentDraft };
use crate::models::chat::{ ConversationRequest, ConversationResponse };
use crate::models::provider::{ Provider, Specialty };
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ProviderQuery {
    pub specialty: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/providers", get(list_providers_handler))
        .route("/appointments", post(create_appointment_handler).get(list_appointments_handler))
        .route("/appointments/{appointment_id}", get(get_appointment_handler))
        .route("/appointments/{appointment_id}/invite", get(download_invite_handler))
        .route("/conversation", post(conversation_handler))
        .layer(cors)
        .with_state(state)
}

async fn root_handler() -> impl IntoResponse {
    Json(
        json!({
        "message": "Appointment scheduling API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "providers": "/providers",
            "appointments": "/appointments",
            "conversation": "/conversation",
            "health": "/health",
        }
    })
    )
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn list_providers_handler(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>
) -> Result<Json<Vec<Provider>>, AppError> {
    let providers = match query.specialty.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => {
            let specialty = raw
                .parse::<Specialty>()
                .map_err(|e| AppError::Validation(e.to_string()))?;
            state.directory.by_specialty(specialty).await
        }
        None => state.directory.list().await,
    };
    Ok(Json(providers))
}

fn validate_draft(draft: &AppointmentDraft) -> Result<(), AppError> {
    if draft.patient_name.trim().is_empty() {
        return Err(AppError::Validation("patient_name must not be empty".into()));
    }
    if draft.date.len() != 10 || NaiveDate::parse_from_str(&draft.date, "%Y-%m-%d").is_err() {
        return Err(AppError::Validation(format!("date '{}' is not in YYYY-MM-DD format", draft.date)));
    }
    if draft.time.len() != 5 || NaiveTime::parse_from_str(&draft.time, "%H:%M").is_err() {
        return Err(AppError::Validation(format!("time '{}' is not in HH:MM format", draft.time)));
    }
    Ok(())
}

async fn create_appointment_handler(
    State(state): State<AppState>,
    Json(draft): Json<AppointmentDraft>
) -> Result<Json<AppointmentConfirmation>, AppError> {
    validate_draft(&draft)?;
    info!(
        "POST /appointments provider={} date={} time={}",
        draft.provider_id,
        draft.date,
        draft.time
    );
    let confirmation = state.appointments.create_with_invite(draft).await?;
    Ok(Json(confirmation))
}

async fn list_appointments_handler(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    Json(state.appointments.list().await)
}

async fn get_appointment_handler(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>
) -> Result<Json<Appointment>, AppError> {
    state.appointments
        .get(&appointment_id).await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))
}

async fn download_invite_handler(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointments
        .get(&appointment_id).await
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;
    let invite = generate_invite(&appointment).map_err(|e| AppError::Internal(e.to_string()))?;

    let disposition = format!("attachment; filename=appointment_{}.ics", appointment.id);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        invite,
    ))
}

async fn conversation_handler(
    State(state): State<AppState>,
    Json(req): Json<ConversationRequest>
) -> Result<Json<ConversationResponse>, AppError> {
    info!(
        "POST /conversation conversation_id={}",
        req.conversation_id.as_deref().unwrap_or("<new>")
    );
    let response = state.agent.process_message(req.conversation_id, &req.message).await?;
    Ok(Json(response))
}
