//! Application layer - use cases and services

pub mod commands;
pub mod scheduler;
pub mod services;

pub use commands::{BotCommand, CommandHandler, Reply};
pub use scheduler::{BotScheduler, ScheduleCfg};
pub use services::MonitorService;
