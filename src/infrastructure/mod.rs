//! Infrastructure layer - adapters for the web, the filesystem and chat

pub mod chart;
pub mod storage;
pub mod telegram;
pub mod wildberries;
