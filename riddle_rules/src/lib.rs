//! # Riddle Rules
//!
//! The rulebook crate - riddles, judge verdicts, scoring, the content policy and
//! the round state machine. It is the single source of truth for game state and
//! does not contain any AI or network logic.

pub mod entities;
pub mod mechanics;
pub mod policy;
pub mod round_state;

pub use entities::*;
pub use mechanics::*;
pub use policy::*;
pub use round_state::*;
