pub mod agent;
pub mod appointments;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod history;
pub mod llm;
pub mod matcher;
pub mod models;
pub mod schedule;
pub mod server;

use agent::{ initialize_chat_client, AppointmentAgent };
use appointments::{ AppointmentService, InMemoryAppointmentRepository };
use cli::Args;
use config::prompt::{ load_prompts, PromptConfig };
use directory::create_provider_directory;
use history::{ ConversationManager, InMemoryConversationStore };
use log::info;
use schedule::create_schedule_store;
use server::{ AppState, Server };
use std::error::Error;
use std::sync::Arc;

/// Wires repositories, services and the agent from configuration.
pub async fn build_state(args: &Args) -> Result<AppState, Box<dyn Error + Send + Sync>> {
    let prompts = match &args.prompts_path {
        Some(path) =>
            load_prompts(path).map_err(|e| format!("Failed to load prompts '{}': {}", path, e))?,
        None => Arc::new(PromptConfig::default()),
    };

    let directory = create_provider_directory(args)?;
    let providers = directory.list().await;
    info!("Provider directory holds {} providers", providers.len());
    let schedules = create_schedule_store(args, &providers)?;

    let appointments = AppointmentService::new(
        directory.clone(),
        schedules.clone(),
        Arc::new(InMemoryAppointmentRepository::new())
    );
    let conversations = ConversationManager::new(
        Arc::new(InMemoryConversationStore::new()),
        prompts
    );
    let chat_client = initialize_chat_client(args)?;
    let agent = AppointmentAgent::new(
        chat_client,
        conversations,
        directory.clone(),
        schedules,
        appointments.clone()
    );

    Ok(AppState {
        agent: Arc::new(agent),
        directory,
        appointments,
    })
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Chat API Key Set: {}", !args.chat_api_key.is_empty());
    info!("Providers Path: {}", args.providers_path.as_deref().unwrap_or("built-in roster"));
    info!("Schedules Path: {}", args.schedules_path.as_deref().unwrap_or("generated"));
    info!("Persist Bookings: {}", args.persist_bookings);
    info!("Mock Schedule Days: {}", args.mock_schedule_days);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("-------------------------");

    let state = build_state(&args).await?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state);
    server.run().await?;

    Ok(())
}
