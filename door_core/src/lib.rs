//! # Door Core
//!
//! The engine behind the riddle door. This crate talks to the chat backend,
//! keeps the door's conversation, and runs a round from riddle generation to
//! win or loss. All game state and rules live in `riddle_rules`.
//!
//! ## Core Components
//!
//! - **backend**: One contract over OpenAI-like and vLLM-like chat providers
//! - **envelope**: Isolates JSON payloads from free-form model text
//! - **generator** / **judge**: Structured one-shot calls
//! - **dialogue**: The door's in-character, single-flight conversation
//! - **controller**: The round state machine
//! - **events**: Presentation and transcript sinks
//!
//! ## Design Philosophy
//!
//! - **Untrusted output**: Model text is mined and sanitized, never assumed well-formed
//! - **One call at a time**: Each session has at most one request in flight
//! - **No retries**: A failure ends the current action; the player retries by acting again

pub mod backend;
pub mod config;
pub mod controller;
pub mod dialogue;
pub mod envelope;
pub mod error;
pub mod events;
pub mod generator;
pub mod judge;
pub mod prompt;
pub mod text;

pub use backend::{build_backend, ChatBackend, OpenAiBackend, ScriptedBackend, VllmBackend};
pub use config::*;
pub use controller::*;
pub use dialogue::*;
pub use error::{DoorError, ErrorKind, Result};
pub use events::*;
pub use generator::RiddleGenerator;
pub use judge::RiddleJudge;
