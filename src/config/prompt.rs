use chrono::NaiveDateTime;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;

use crate::models::chat::ConversationState;

const DEFAULT_PREAMBLE: &str =
    "You are a helpful medical appointment scheduling assistant.
Your role is to:
1. Understand the patient's health issue
2. Match them with the appropriate healthcare provider
3. Help them find a suitable appointment time
4. Confirm the appointment details

Be empathetic, clear, and efficient. Ask clarifying questions when needed.
Use the provided functions to:
- identify_provider: Find the right doctor for their issue
- check_availability: Look up available appointment times
- create_appointment: Book the appointment once all details are confirmed

Always confirm key details before creating an appointment.
Resolve relative dates such as \"tomorrow\" or \"next Monday\" against the current date below and pass dates to functions as YYYY-MM-DD.";

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::TemplateNotFound(key) => write!(f, "Prompt template '{}' is empty", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// One trailer per conversation state. `{provider_name}` in the
/// `provider_matched` trailer is replaced from the conversation context.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StateTrailers {
    pub initial: String,
    pub issue_identified: String,
    pub provider_matched: String,
    pub availability_checked: String,
    pub appointment_confirmed: String,
}

impl Default for StateTrailers {
    fn default() -> Self {
        Self {
            initial: "The conversation is just starting. Greet the patient and ask how you can help.".into(),
            issue_identified: "You've identified the patient's health issue. Use identify_provider to find the right doctor.".into(),
            provider_matched: "You've matched the patient with {provider_name}. Use check_availability to show available times.".into(),
            availability_checked: "You've shown available times. Help the patient choose and confirm the appointment details.".into(),
            appointment_confirmed: "The appointment has been confirmed. Provide the details and ask if they need anything else.".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub preamble: String,
    pub trailers: StateTrailers,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { preamble: DEFAULT_PREAMBLE.to_string(), trailers: StateTrailers::default() }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if self.preamble.trim().is_empty() {
            return Err(PromptError::TemplateNotFound("preamble".to_string()));
        }
        let trailers = [
            ("trailers:initial", &self.trailers.initial),
            ("trailers:issue_identified", &self.trailers.issue_identified),
            ("trailers:provider_matched", &self.trailers.provider_matched),
            ("trailers:availability_checked", &self.trailers.availability_checked),
            ("trailers:appointment_confirmed", &self.trailers.appointment_confirmed),
        ];
        for (key, text) in trailers {
            if text.trim().is_empty() {
                return Err(PromptError::TemplateNotFound(key.to_string()));
            }
        }
        Ok(())
    }

    fn trailer(&self, state: ConversationState) -> &str {
        match state {
            ConversationState::Initial => &self.trailers.initial,
            ConversationState::IssueIdentified => &self.trailers.issue_identified,
            ConversationState::ProviderMatched => &self.trailers.provider_matched,
            ConversationState::AvailabilityChecked => &self.trailers.availability_checked,
            ConversationState::AppointmentConfirmed => &self.trailers.appointment_confirmed,
        }
    }

    pub fn system_prompt(
        &self,
        state: ConversationState,
        now: NaiveDateTime,
        provider_name: Option<&str>
    ) -> String {
        let trailer = self
            .trailer(state)
            .replace("{provider_name}", provider_name.unwrap_or("the provider"));
        format!(
            "{}\n\nCurrent date and time: {} ({})\n\n{}",
            self.preamble,
            now.format("%Y-%m-%d %H:%M"),
            now.format("%A"),
            trailer
        )
    }
}

/// Reads a JSON override. Keys left out keep their built-in text.
pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt overrides from {}", path);
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn prompt_carries_date_and_state_trailer() {
        let config = PromptConfig::default();
        let prompt = config.system_prompt(ConversationState::Initial, noon(), None);
        assert!(prompt.starts_with("You are a helpful medical appointment scheduling assistant."));
        assert!(prompt.contains("2026-01-15 12:00 (Thursday)"));
        assert!(prompt.ends_with("ask how you can help."));
    }

    #[test]
    fn provider_matched_names_provider_or_placeholder() {
        let config = PromptConfig::default();
        let named = config.system_prompt(ConversationState::ProviderMatched, noon(), Some("Dr. Smith"));
        assert!(named.contains("matched the patient with Dr. Smith."));
        let unnamed = config.system_prompt(ConversationState::ProviderMatched, noon(), None);
        assert!(unnamed.contains("matched the patient with the provider."));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"trailers": {{"initial": "Say hello."}}}}"#).unwrap();
        let config = load_prompts(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.trailers.initial, "Say hello.");
        assert_eq!(config.preamble, DEFAULT_PREAMBLE);
        assert_eq!(config.trailers.issue_identified, StateTrailers::default().issue_identified);
    }

    #[test]
    fn blank_override_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"preamble": "  "}}"#).unwrap();
        let err = load_prompts(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PromptError::TemplateNotFound(ref k) if k == "preamble"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_prompts("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PromptError::IoError(_)));
    }
}
