#![allow(dead_code)]

use appointment_agent::agent::AppointmentAgent;
use appointment_agent::appointments::{ AppointmentService, InMemoryAppointmentRepository };
use appointment_agent::config::prompt::PromptConfig;
use appointment_agent::directory::{ default_providers, InMemoryProviderDirectory, ProviderDirectory };
use appointment_agent::history::{ ConversationManager, InMemoryConversationStore };
use appointment_agent::llm::chat::{ new_client, ChatClient };
use appointment_agent::llm::{ LlmConfig, LlmType };
use appointment_agent::models::schedule::ScheduleEntry;
use appointment_agent::schedule::{ InMemoryScheduleStore, ScheduleStore };
use appointment_agent::server::api::build_router;
use appointment_agent::server::AppState;
use axum::body::{ to_bytes, Body };
use axum::http::{ HeaderMap, Request, StatusCode };
use axum::Router;
use chrono::{ Duration, Local };
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub fn day_offset(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days)).format("%Y-%m-%d").to_string()
}

/// Dermatologists p003/p004 and GP p001 with a few open slots tomorrow.
pub fn fixture_schedules() -> Vec<ScheduleEntry> {
    let entry = |provider_id: &str, slots: &[&str]| ScheduleEntry {
        provider_id: provider_id.into(),
        date: day_offset(1),
        available_slots: slots.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        entry("p001", &["09:00", "13:00"]),
        entry("p003", &["10:00"]),
        entry("p004", &["09:00", "09:30", "14:00"])
    ]
}

/// Router over in-memory components. `llm_url` points the chat client at a
/// mock backend; `None` leaves `/conversation` unconfigured.
pub fn test_app(llm_url: Option<String>) -> Router {
    let directory: Arc<dyn ProviderDirectory> = Arc::new(
        InMemoryProviderDirectory::new(default_providers())
    );
    let schedules: Arc<dyn ScheduleStore> = Arc::new(
        InMemoryScheduleStore::from_entries(fixture_schedules())
    );
    let appointments = AppointmentService::new(
        directory.clone(),
        schedules.clone(),
        Arc::new(InMemoryAppointmentRepository::new())
    );
    let conversations = ConversationManager::new(
        Arc::new(InMemoryConversationStore::new()),
        Arc::new(PromptConfig::default())
    );
    let chat_client: Option<Arc<dyn ChatClient>> = llm_url.map(|url| {
        new_client(
            &(LlmConfig {
                llm_type: LlmType::OpenAI,
                api_key: Some("sk-test".into()),
                completion_model: Some("gpt-4o-mini".into()),
                base_url: Some(url),
            })
        ).unwrap()
    });
    let agent = AppointmentAgent::new(
        chat_client,
        conversations,
        directory.clone(),
        schedules,
        appointments.clone()
    );

    build_router(AppState { agent: Arc::new(agent), directory, appointments })
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) =>
            builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}
