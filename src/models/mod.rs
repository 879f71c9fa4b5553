pub mod achievement;
pub mod journey;
pub mod onboarding_field;
pub mod organization;
pub mod product;
pub mod question;
pub mod quiz;
pub mod user;
pub mod whitelist;
