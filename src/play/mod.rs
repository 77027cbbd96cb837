pub mod record;
pub mod rules;
pub mod submission;
