//! Output seams: the presentation sink and the session transcript.
//!
//! Both are fire-and-forget. Nothing here can fail back into game logic.

mod transcript;

pub use transcript::*;

use std::sync::{Mutex, PoisonError};

/// Where the player-facing text goes.
pub trait Presenter: Send + Sync {
    fn append_text(&self, delta: &str);
    fn set_full_text(&self, text: &str);
    fn set_status(&self, status: &str);

    fn set_attempts(&self, _remaining: u32) {}

    fn show_round_result(&self, _won: bool) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn append_text(&self, _delta: &str) {}
    fn set_full_text(&self, _text: &str) {}
    fn set_status(&self, _status: &str) {}
}

/// Snapshot of a [`BufferPresenter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screen {
    pub text: String,
    pub status: String,
    pub attempts: Option<u32>,
    pub result: Option<bool>,
    pub statuses: Vec<String>,
}

/// Keeps the screen in memory.
#[derive(Debug, Default)]
pub struct BufferPresenter {
    screen: Mutex<Screen>,
}

impl BufferPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.lock().clone()
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Presenter for BufferPresenter {
    fn append_text(&self, delta: &str) {
        self.lock().text.push_str(delta);
    }

    fn set_full_text(&self, text: &str) {
        self.lock().text = text.to_string();
    }

    fn set_status(&self, status: &str) {
        let mut screen = self.lock();
        screen.status = status.to_string();
        screen.statuses.push(status.to_string());
    }

    fn set_attempts(&self, remaining: u32) {
        self.lock().attempts = Some(remaining);
    }

    fn show_round_result(&self, won: bool) {
        self.lock().result = Some(won);
    }
}
