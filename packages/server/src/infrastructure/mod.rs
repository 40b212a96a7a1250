//! Infrastructure layer: storage, the connection registry, and wire DTOs.

pub mod dto;
pub mod registry;
pub mod repository;
