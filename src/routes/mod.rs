pub mod assignments;
pub mod attempts;
pub mod health;
pub mod packets;
pub mod profiles;
pub mod questions;
pub mod quizzes;
pub mod reports;
