pub mod packet;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod quiz_attempt;
pub mod scale;
pub mod template;
