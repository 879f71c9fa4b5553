pub mod access_service;
pub mod achievement_service;
pub mod export_service;
pub mod grading_service;
pub mod import_service;
pub mod journey_service;
pub mod onboarding_service;
pub mod organization_service;
pub mod play_service;
pub mod product_service;
pub mod question_service;
pub mod quiz_engine;
pub mod quiz_service;
pub mod report_service;
pub mod user_service;
pub mod whitelist_service;
