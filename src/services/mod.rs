pub mod attempt_service;
pub mod packet_service;
pub mod profile_service;
pub mod question_service;
pub mod quiz_service;
pub mod report_service;
pub mod scale_service;
pub mod scoring_service;
