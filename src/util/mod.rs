pub mod errors;
pub mod game_types;
pub mod jwt;
pub mod query;
pub mod views;
