use serde::{ Serialize, Deserialize };
use serde_json::{ Map, Value as JsonValue };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Labels for how far a booking conversation has progressed. Any state may
/// follow any other; tools set them directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Initial,
    IssueIdentified,
    ProviderMatched,
    AvailabilityChecked,
    AppointmentConfirmed,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Initial => "initial",
            ConversationState::IssueIdentified => "issue_identified",
            ConversationState::ProviderMatched => "provider_matched",
            ConversationState::AvailabilityChecked => "availability_checked",
            ConversationState::AppointmentConfirmed => "appointment_confirmed",
        }
    }

    pub fn suggested_actions(&self) -> Vec<String> {
        let actions: &[&str] = match self {
            ConversationState::Initial => &["Describe your health issue", "Ask about providers"],
            ConversationState::IssueIdentified => &[],
            ConversationState::ProviderMatched => &["Check availability", "Ask about the provider"],
            ConversationState::AvailabilityChecked =>
                &["Book an appointment", "Request different times"],
            ConversationState::AppointmentConfirmed =>
                &["Download .ics file", "Schedule another appointment"],
        };
        actions.iter().map(|a| a.to_string()).collect()
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub state: ConversationState,
    pub messages: Vec<ChatMessage>,
    pub context: Map<String, JsonValue>,
}

impl Conversation {
    pub fn new(id: String) -> Self {
        Self {
            id,
            state: ConversationState::Initial,
            messages: Vec::new(),
            context: Map::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ConversationRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub response: String,
    pub conversation_id: String,
    pub state: ConversationState,
    pub suggested_actions: Vec<String>,
}
