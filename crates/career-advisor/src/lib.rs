//! Career advice generation.
//!
//! Turns a [`Profile`](career_types::models::Profile) into a fixed
//! instruction prompt and sends it to an OpenAI-compatible chat-completion
//! endpoint. The response text is handed back untouched.

pub mod client;
pub mod error;
pub mod generator;
pub mod prompt;

pub use client::{ChatClient, ChatClientConfig};
pub use error::AdvisorError;
pub use generator::AdviceGenerator;
