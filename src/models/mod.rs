pub mod badges;
pub mod decks;
pub mod events;
pub mod matches;
pub mod profiles;
