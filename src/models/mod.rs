pub mod bracket;
pub mod game;
pub mod notification;
pub mod settings;
pub mod sponsorship;
pub mod team;
pub mod tournament;
pub mod user;
