//! Core services.
//!
//! Thin orchestrators that compose several repository ports.

mod question_service;

pub use question_service::QuestionService;
