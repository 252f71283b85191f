use serde::Deserialize;
use serde_json::{ json, Value as JsonValue };
use thiserror::Error;

use crate::models::appointment::AppointmentDraft;
use crate::models::schedule::TimePreference;

pub const IDENTIFY_PROVIDER: &str = "identify_provider";
pub const CHECK_AVAILABILITY: &str = "check_availability";
pub const CREATE_APPOINTMENT: &str = "create_appointment";

#[derive(Debug, Error, PartialEq)]
pub enum ToolError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid arguments for {function}: {message}")]
    InvalidArguments {
        function: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdentifyProviderArgs {
    pub health_issue: String,
    #[serde(default)]
    pub patient_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckAvailabilityArgs {
    pub provider_id: String,
    #[serde(default)]
    pub preferred_dates: Option<Vec<String>>,
    #[serde(default)]
    pub time_preference: Option<TimePreference>,
    #[serde(default)]
    pub num_days: Option<u32>,
}

/// The functions the model may call. Anything else is rejected at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    IdentifyProvider(IdentifyProviderArgs),
    CheckAvailability(CheckAvailabilityArgs),
    CreateAppointment(AppointmentDraft),
}

impl ToolCall {
    /// Decodes a function name and its JSON-encoded argument object.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        let raw = if arguments.trim().is_empty() { "{}" } else { arguments };
        match name {
            IDENTIFY_PROVIDER => decode(name, raw).map(ToolCall::IdentifyProvider),
            CHECK_AVAILABILITY => decode(name, raw).map(ToolCall::CheckAvailability),
            CREATE_APPOINTMENT => decode(name, raw).map(ToolCall::CreateAppointment),
            other => Err(ToolError::UnknownFunction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::IdentifyProvider(_) => IDENTIFY_PROVIDER,
            ToolCall::CheckAvailability(_) => CHECK_AVAILABILITY,
            ToolCall::CreateAppointment(_) => CREATE_APPOINTMENT,
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(function: &str, raw: &str) -> Result<T, ToolError> {
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
        function: function.to_string(),
        message: e.to_string(),
    })
}

/// Tool schema offered to the model on every request.
pub fn function_tools() -> Vec<JsonValue> {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": IDENTIFY_PROVIDER,
                "description": "Identify the best healthcare provider based on the patient's health issue. Use this when the patient describes their symptoms or health concern.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "health_issue": {
                            "type": "string",
                            "description": "The patient's health issue or symptoms"
                        },
                        "patient_name": {
                            "type": "string",
                            "description": "The patient's name if provided"
                        }
                    },
                    "required": ["health_issue"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": CHECK_AVAILABILITY,
                "description": "Check the availability of a specific provider. Use this when you need to find available appointment times.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "provider_id": {
                            "type": "string",
                            "description": "The ID of the provider to check availability for"
                        },
                        "preferred_dates": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "Optional list of preferred dates in YYYY-MM-DD format"
                        },
                        "time_preference": {
                            "type": "string",
                            "enum": ["morning", "afternoon", "any"],
                            "description": "Time of day preference: 'morning' (before 12 PM), 'afternoon' (12 PM or later), or 'any'"
                        },
                        "num_days": {
                            "type": "integer",
                            "description": "Number of days to look ahead (default: 7)"
                        }
                    },
                    "required": ["provider_id"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": CREATE_APPOINTMENT,
                "description": "Create an appointment for the patient. Use this when the patient has confirmed all details (provider, date, and time).",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "patient_name": {
                            "type": "string",
                            "description": "The patient's full name"
                        },
                        "provider_id": {
                            "type": "string",
                            "description": "The ID of the provider"
                        },
                        "date": {
                            "type": "string",
                            "description": "Appointment date in YYYY-MM-DD format"
                        },
                        "time": {
                            "type": "string",
                            "description": "Appointment time in HH:MM format (24-hour)"
                        },
                        "reason": {
                            "type": "string",
                            "description": "Reason for the appointment"
                        }
                    },
                    "required": ["patient_name", "provider_id", "date", "time"]
                }
            }
        }),
    ]
}
