pub mod auth_dto;
pub mod content_dto;
pub mod import_dto;
pub mod play_dto;
