use crate::appointments::AppointmentService;
use crate::cli::Args;
use crate::directory::ProviderDirectory;
use crate::history::{ ConversationError, ConversationManager };
use crate::llm::{ parse_llm_type, LlmConfig };
use crate::llm::chat::{ ChatClient, LlmError, LlmMessage, new_client as new_chat_client };
use crate::llm::tools::{ function_tools, CheckAvailabilityArgs, IdentifyProviderArgs, ToolCall };
use crate::matcher::ProviderMatcher;
use crate::models::appointment::AppointmentDraft;
use crate::models::chat::{ ConversationResponse, ConversationState, Role };
use crate::schedule::ScheduleStore;
use crate::schedule::availability::{
    availability_summary,
    common_availability,
    filter_by_time_preference,
    format_availability_message,
};

use chrono::Local;
use log::{ info, warn };
use serde_json::{ json, Value as JsonValue };
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_AVAILABILITY_DAYS: u32 = 7;
const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Builds the chat client from configuration. A hosted backend without an API
/// key yields `None`; the conversation endpoint then reports it as
/// unconfigured instead of failing startup.
pub fn initialize_chat_client(
    args: &Args
) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
    let chat_llm_type = parse_llm_type(&args.chat_llm_type)?;
    let chat_api_key = if !args.chat_api_key.is_empty() {
        Some(args.chat_api_key.clone())
    } else {
        None
    };
    if chat_api_key.is_none() && chat_llm_type.requires_api_key() {
        warn!("No API key for {}; /conversation is disabled", chat_llm_type);
        return Ok(None);
    }

    let chat_config = LlmConfig {
        llm_type: chat_llm_type,
        base_url: args.chat_base_url.clone(),
        api_key: chat_api_key,
        completion_model: args.chat_model.clone(),
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={}",
        chat_llm_type,
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );
    Ok(Some(chat_client))
}

#[derive(Clone)]
pub struct AppointmentAgent {
    chat_client: Option<Arc<dyn ChatClient>>,
    conversations: ConversationManager,
    matcher: ProviderMatcher,
    directory: Arc<dyn ProviderDirectory>,
    schedules: Arc<dyn ScheduleStore>,
    appointments: AppointmentService,
    tools: Arc<Vec<JsonValue>>,
}

impl AppointmentAgent {
    pub fn new(
        chat_client: Option<Arc<dyn ChatClient>>,
        conversations: ConversationManager,
        directory: Arc<dyn ProviderDirectory>,
        schedules: Arc<dyn ScheduleStore>,
        appointments: AppointmentService
    ) -> Self {
        Self {
            chat_client,
            conversations,
            matcher: ProviderMatcher::new(directory.clone()),
            directory,
            schedules,
            appointments,
            tools: Arc::new(function_tools()),
        }
    }

    pub fn conversations(&self) -> &ConversationManager {
        &self.conversations
    }

    /// One conversation turn. Tool calls from the first completion run in
    /// order, their results are appended, and a second completion produces
    /// the reply.
    pub async fn process_message(
        &self,
        conversation_id: Option<String>,
        message: &str
    ) -> Result<ConversationResponse, AgentError> {
        let client = self.chat_client
            .clone()
            .ok_or_else(|| {
                LlmError::NotConfigured(
                    "Chat API key not configured. Set CHAT_API_KEY environment variable.".to_string()
                )
            })?;

        let conversation_id = match conversation_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                if !self.conversations.exists(&id).await {
                    return Err(ConversationError::NotFound(id).into());
                }
                id
            }
            None => self.conversations.create_conversation().await,
        };

        self.conversations.add_message(&conversation_id, Role::User, message).await?;

        let mut messages = vec![
            LlmMessage::system(self.conversations.get_system_prompt(&conversation_id).await)
        ];
        messages.extend(
            self.conversations
                .get_messages(&conversation_id).await
                .into_iter()
                .map(|m| LlmMessage::new(m.role, m.content))
        );

        let first = client.complete_with_tools(&messages, &self.tools).await?;
        let reply = if first.tool_calls.is_empty() {
            first.content.unwrap_or_default()
        } else {
            for call in first.tool_calls {
                let result = match ToolCall::parse(&call.function.name, &call.function.arguments) {
                    Ok(tool) => {
                        info!("[{}] tool call {} ({})", conversation_id, tool.name(), call.id);
                        self.execute_tool(&conversation_id, tool).await?
                    }
                    Err(e) => {
                        warn!("[{}] rejected tool call: {}", conversation_id, e);
                        json!({ "error": e.to_string() })
                    }
                };
                let call_id = call.id.clone();
                messages.push(LlmMessage::assistant_tool_call(call));
                messages.push(LlmMessage::tool_result(call_id, result.to_string()));
            }
            let second = client.complete_with_tools(&messages, &self.tools).await?;
            second.content.unwrap_or_default()
        };

        self.conversations.add_message(&conversation_id, Role::Assistant, &reply).await?;

        let state = self.conversations.get_state(&conversation_id).await;
        Ok(ConversationResponse {
            response: reply,
            conversation_id,
            state,
            suggested_actions: state.suggested_actions(),
        })
    }

    /// Runs a decoded tool call against the conversation and returns the JSON
    /// handed back to the model. Domain failures become `{"error": ...}`.
    pub async fn execute_tool(
        &self,
        conversation_id: &str,
        call: ToolCall
    ) -> Result<JsonValue, ConversationError> {
        match call {
            ToolCall::IdentifyProvider(args) => self.identify_provider(conversation_id, args).await,
            ToolCall::CheckAvailability(args) => self.check_availability(conversation_id, args).await,
            ToolCall::CreateAppointment(draft) => self.create_appointment(conversation_id, draft).await,
        }
    }

    async fn identify_provider(
        &self,
        conversation_id: &str,
        args: IdentifyProviderArgs
    ) -> Result<JsonValue, ConversationError> {
        let found = match self.matcher.match_provider_for_issue(&args.health_issue).await {
            Ok(found) => found,
            Err(e) => {
                warn!("[{}] {}", conversation_id, e);
                return Ok(json!({ "error": "No suitable provider found" }));
            }
        };
        let Some(provider) = self.directory.get(&found.provider_id).await else {
            return Ok(json!({ "error": "No suitable provider found" }));
        };

        let alternatives: Vec<JsonValue> = self.matcher
            .provider_options_for_issue(&args.health_issue, MAX_ALTERNATIVES + 1).await
            .into_iter()
            .filter(|option| option.provider_id != found.provider_id)
            .take(MAX_ALTERNATIVES)
            .map(|option| json!({
                "provider_id": option.provider_id,
                "provider_name": option.provider_name,
                "confidence": option.confidence,
            }))
            .collect();

        let c = &self.conversations;
        c.update_context(conversation_id, "health_issue", json!(args.health_issue)).await?;
        c.update_context(conversation_id, "provider_id", json!(found.provider_id)).await?;
        c.update_context(conversation_id, "provider_name", json!(found.provider_name)).await?;
        if let Some(name) = args.patient_name.filter(|n| !n.trim().is_empty()) {
            c.update_context(conversation_id, "patient_name", json!(name)).await?;
        }
        c.set_state(conversation_id, ConversationState::ProviderMatched).await?;

        Ok(
            json!({
            "provider_id": found.provider_id,
            "provider_name": found.provider_name,
            "specialty": found.specialty,
            "experience_years": provider.experience_years,
            "rating": provider.rating,
            "location": provider.location,
            "match_reason": found.match_reason,
            "confidence": found.confidence,
            "alternatives": alternatives,
        })
        )
    }

    async fn check_availability(
        &self,
        conversation_id: &str,
        args: CheckAvailabilityArgs
    ) -> Result<JsonValue, ConversationError> {
        let store = self.schedules.as_ref();
        let availability = match args.preferred_dates.as_deref() {
            Some(dates) if !dates.is_empty() => {
                common_availability(store, &args.provider_id, dates, None).await
            }
            _ => {
                let today = Local::now().date_naive();
                let days = args.num_days.unwrap_or(DEFAULT_AVAILABILITY_DAYS);
                availability_summary(store, &args.provider_id, today, days).await
            }
        };
        let availability = filter_by_time_preference(
            availability,
            args.time_preference.unwrap_or_default()
        );

        if availability.is_empty() {
            info!("[{}] no open slots for {}", conversation_id, args.provider_id);
            return Ok(json!({ "error": "No available slots found" }));
        }

        self.conversations.update_context(conversation_id, "availability", json!(availability)).await?;
        self.conversations.set_state(conversation_id, ConversationState::AvailabilityChecked).await?;

        Ok(
            json!({
            "provider_id": args.provider_id,
            "formatted_message": format_availability_message(&availability),
            "availability": availability,
        })
        )
    }

    async fn create_appointment(
        &self,
        conversation_id: &str,
        draft: AppointmentDraft
    ) -> Result<JsonValue, ConversationError> {
        let appointment = match self.appointments.create(draft).await {
            Ok(appointment) => appointment,
            Err(e) => {
                warn!("[{}] booking failed: {}", conversation_id, e);
                return Ok(json!({ "error": e.to_string() }));
            }
        };

        let c = &self.conversations;
        c.update_context(conversation_id, "appointment_id", json!(appointment.id)).await?;
        c.update_context(conversation_id, "patient_name", json!(appointment.patient_name)).await?;
        c.set_state(conversation_id, ConversationState::AppointmentConfirmed).await?;

        Ok(
            json!({
            "success": true,
            "appointment_id": appointment.id,
            "patient_name": appointment.patient_name,
            "provider_name": appointment.provider_name,
            "date": appointment.date,
            "time": appointment.time,
            "location": appointment.location,
            "invite_url": format!("/appointments/{}/invite", appointment.id),
        })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointments::InMemoryAppointmentRepository;
    use crate::config::prompt::PromptConfig;
    use crate::directory::{ default_providers, InMemoryProviderDirectory };
    use crate::history::InMemoryConversationStore;
    use crate::llm::chat::{ ChatCompletion, FunctionCall, ToolCallRequest };
    use crate::models::schedule::ScheduleEntry;
    use crate::schedule::InMemoryScheduleStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned completions and records every request.
    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<VecDeque<ChatCompletion>>,
        requests: Mutex<Vec<Vec<LlmMessage>>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<ChatCompletion>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies.into()), ..Default::default() })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete_with_tools(
            &self,
            messages: &[LlmMessage],
            tools: &[JsonValue]
        ) -> Result<ChatCompletion, LlmError> {
            assert_eq!(tools.len(), 3);
            self.requests.lock().unwrap().push(messages.to_vec());
            self.replies.lock().unwrap().pop_front().ok_or(LlmError::EmptyResponse)
        }

        fn get_model(&self) -> String {
            "scripted".into()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    fn text(content: &str) -> ChatCompletion {
        ChatCompletion { content: Some(content.into()), tool_calls: vec![] }
    }

    fn calls(calls: &[(&str, &str, JsonValue)]) -> ChatCompletion {
        ChatCompletion {
            content: None,
            tool_calls: calls
                .iter()
                .map(|(id, name, args)| ToolCallRequest {
                    id: id.to_string(),
                    call_type: "function".into(),
                    function: FunctionCall { name: name.to_string(), arguments: args.to_string() },
                })
                .collect(),
        }
    }

    fn today_plus(days: i64) -> String {
        (Local::now().date_naive() + chrono::Duration::days(days)).format("%Y-%m-%d").to_string()
    }

    fn agent(client: Option<Arc<dyn ChatClient>>) -> AppointmentAgent {
        let directory: Arc<dyn ProviderDirectory> = Arc::new(
            InMemoryProviderDirectory::new(default_providers())
        );
        let schedules: Arc<dyn ScheduleStore> = Arc::new(
            InMemoryScheduleStore::from_entries(vec![
                ScheduleEntry {
                    provider_id: "p004".into(),
                    date: today_plus(1),
                    available_slots: vec!["09:00".into(), "14:00".into()],
                },
                ScheduleEntry {
                    provider_id: "p004".into(),
                    date: today_plus(30),
                    available_slots: vec!["10:00".into()],
                }
            ])
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
        AppointmentAgent::new(client, conversations, directory, schedules, appointments)
    }

    #[tokio::test]
    async fn plain_reply_needs_one_completion() {
        let client = ScriptedClient::new(vec![text("Hello! How can I help?")]);
        let agent = agent(Some(client.clone() as Arc<dyn ChatClient>));

        let response = agent.process_message(None, "Hi").await.unwrap();
        assert_eq!(response.response, "Hello! How can I help?");
        assert_eq!(response.state, ConversationState::Initial);
        assert_eq!(response.suggested_actions, ["Describe your health issue", "Ask about providers"]);

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0].role, "system");
        assert_eq!(requests[0][1].content.as_deref(), Some("Hi"));

        let history = agent.conversations().get_messages(&response.conversation_id).await;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_client_is_reported() {
        let err = agent(None).process_message(None, "Hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let client = ScriptedClient::new(vec![text("unused")]);
        let err = agent(Some(client as Arc<dyn ChatClient>)).process_message(Some("missing".into()), "Hi").await.unwrap_err();
        assert!(matches!(err, AgentError::Conversation(ConversationError::NotFound(_))));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back_before_the_reply() {
        let client = ScriptedClient::new(
            vec![
                calls(&[("call_1", "identify_provider", json!({ "health_issue": "I have a rash on my arm", "patient_name": "John Doe" }))]),
                text("Dr. James Wilson is a great match.")
            ]
        );
        let agent = agent(Some(client.clone() as Arc<dyn ChatClient>));

        let response = agent.process_message(None, "I have a rash on my arm").await.unwrap();
        assert_eq!(response.response, "Dr. James Wilson is a great match.");
        assert_eq!(response.state, ConversationState::ProviderMatched);

        let requests = client.requests.lock().unwrap();
        let second = &requests[1];
        let tool_msg = second.last().unwrap();
        assert_eq!(tool_msg.role, "tool");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        let result: JsonValue = serde_json::from_str(tool_msg.content.as_deref().unwrap()).unwrap();
        assert_eq!(result["provider_id"], "p004");
        assert_eq!(result["specialty"], "Dermatologist");
        assert_eq!(result["alternatives"][0]["provider_id"], "p003");
        assert_eq!(second[second.len() - 2].tool_calls.as_ref().unwrap()[0].id, "call_1");

        let context = agent.conversations().get_full_context(&response.conversation_id).await.unwrap();
        assert_eq!(context["patient_name"], "John Doe");
        assert_eq!(context["provider_name"], "Dr. James Wilson");
    }

    #[tokio::test]
    async fn unknown_function_gets_error_result() {
        let client = ScriptedClient::new(
            vec![calls(&[("call_9", "cancel_appointment", json!({}))]), text("Sorry, I can't do that.")]
        );
        let agent = agent(Some(client.clone() as Arc<dyn ChatClient>));
        let response = agent.process_message(None, "cancel it").await.unwrap();
        assert_eq!(response.state, ConversationState::Initial);

        let requests = client.requests.lock().unwrap();
        let tool_msg = requests[1].last().unwrap();
        assert_eq!(tool_msg.content.as_deref(), Some(r#"{"error":"Unknown function: cancel_appointment"}"#));
    }

    #[tokio::test]
    async fn availability_honours_window_and_preference() {
        let agent = agent(None);
        let id = agent.conversations().create_conversation().await;

        let result = agent
            .execute_tool(
                &id,
                ToolCall::parse("check_availability", r#"{"provider_id":"p004","time_preference":"afternoon"}"#).unwrap()
            ).await
            .unwrap();
        let availability = result["availability"].as_object().unwrap();
        assert_eq!(availability.len(), 1);
        assert_eq!(availability[&today_plus(1)], json!(["14:00"]));
        assert!(result["formatted_message"].as_str().unwrap().contains("Afternoon: 14:00"));
        assert_eq!(agent.conversations().get_state(&id).await, ConversationState::AvailabilityChecked);

        let preferred = format!(r#"{{"provider_id":"p004","preferred_dates":["{}"]}}"#, today_plus(30));
        let result = agent
            .execute_tool(&id, ToolCall::parse("check_availability", &preferred).unwrap()).await
            .unwrap();
        assert_eq!(result["availability"][today_plus(30)], json!(["10:00"]));

        let result = agent
            .execute_tool(&id, ToolCall::parse("check_availability", r#"{"provider_id":"p001"}"#).unwrap()).await
            .unwrap();
        assert_eq!(result, json!({ "error": "No available slots found" }));
    }

    #[tokio::test]
    async fn huge_day_window_is_answered_not_fatal() {
        let agent = agent(None);
        let id = agent.conversations().create_conversation().await;

        let result = agent
            .execute_tool(
                &id,
                ToolCall::parse("check_availability", r#"{"provider_id":"p004","num_days":4000000000}"#).unwrap()
            ).await
            .unwrap();
        assert_eq!(result["availability"][today_plus(30)], json!(["10:00"]));

        let result = agent
            .execute_tool(
                &id,
                ToolCall::parse("check_availability", r#"{"provider_id":"p001","num_days":4294967295}"#).unwrap()
            ).await
            .unwrap();
        assert_eq!(result, json!({ "error": "No available slots found" }));
    }

    #[tokio::test]
    async fn booking_confirms_and_double_booking_fails() {
        let agent = agent(None);
        let id = agent.conversations().create_conversation().await;
        let args = format!(
            r#"{{"patient_name":"John Doe","provider_id":"p004","date":"{}","time":"09:00"}}"#,
            today_plus(1)
        );

        let result = agent.execute_tool(&id, ToolCall::parse("create_appointment", &args).unwrap()).await.unwrap();
        assert_eq!(result["success"], true);
        let appointment_id = result["appointment_id"].as_str().unwrap();
        assert_eq!(result["invite_url"], format!("/appointments/{}/invite", appointment_id));
        assert_eq!(agent.conversations().get_state(&id).await, ConversationState::AppointmentConfirmed);

        let again = agent.execute_tool(&id, ToolCall::parse("create_appointment", &args).unwrap()).await.unwrap();
        assert!(again["error"].as_str().unwrap().contains("not available"));
    }
}
