pub mod appointment;
pub mod chat;
pub mod provider;
pub mod schedule;
