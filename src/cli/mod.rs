use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, groq, xai, deepseek, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Empty disables /conversation for hosted providers.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o-mini, llama3.1)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- Data Args ---
    /// Provider CSV (id,name,specialty,experience_years,rating,location). Built-in roster if unset.
    #[arg(long, env = "PROVIDERS_PATH")]
    pub providers_path: Option<String>,

    /// Schedule CSV (provider_id,date,time_slots,is_available). Generated in memory if unset.
    #[arg(long, env = "SCHEDULES_PATH")]
    pub schedules_path: Option<String>,

    /// Rewrite the schedule CSV after every successful booking.
    #[arg(long, env = "PERSIST_BOOKINGS", default_value = "true", action = clap::ArgAction::Set)]
    pub persist_bookings: bool,

    /// Number of days ahead covered by generated schedules.
    #[arg(long, env = "MOCK_SCHEDULE_DAYS", default_value = "14")]
    pub mock_schedule_days: u32,

    // --- General App Args ---
    /// Optional JSON file overriding the system prompt preamble and state trailers.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,
}
