//! Domain layer - core business logic and entities

pub mod price;
pub mod notification;
