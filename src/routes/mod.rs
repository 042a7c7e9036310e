pub mod auth;
pub mod games;
pub mod notifications;
pub mod settings;
pub mod sponsorships;
pub mod teams;
pub mod tournaments;
pub mod users;
