pub mod admin;
pub mod auth;
pub mod health;
pub mod journeys;
pub mod onboarding;
pub mod play;
pub mod products;
pub mod questions;
pub mod quizzes;
pub mod reports;
