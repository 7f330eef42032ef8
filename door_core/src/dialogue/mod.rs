//! The door's side of the conversation.
//!
//! A session owns the turn history and allows at most one turn in flight.
//! The request sent to the backend is always the freshly derived system
//! prompt followed by the history; the prompt itself is never stored.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use riddle_rules::{ChatMessage, ContentPolicy};
use tracing::{debug, warn};

use crate::backend::ChatBackend;
use crate::error::{DoorError, Result};
use crate::prompt::{door_system_prompt, TurnContext, GREETING};

pub const DEFAULT_CHARS_PER_SECOND: f32 = 60.0;

/// Delay used when the configured pace is not a positive number.
const MIN_CHAR_DELAY: Duration = Duration::from_millis(10);

/// Slowest pace a reply is ever typed out at.
const MAX_CHAR_DELAY: Duration = Duration::from_secs(1);

/// Holds the busy flag for the duration of one turn.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DialogueSession {
    backend: Arc<dyn ChatBackend>,
    policy: ContentPolicy,
    history: Mutex<Vec<ChatMessage>>,
    /// Bumped by `clear_history`; a reply from an older generation is dropped.
    generation: AtomicU64,
    busy: AtomicBool,
}

impl DialogueSession {
    pub fn new(backend: Arc<dyn ChatBackend>, policy: ContentPolicy) -> Self {
        Self {
            backend,
            policy,
            history: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            busy: AtomicBool::new(false),
        }
    }

    pub fn greeting(&self) -> &'static str {
        GREETING
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.lock_history().clone()
    }

    /// Forget the conversation. Does not touch the busy flag, but a turn
    /// still in flight will not record its reply.
    pub fn clear_history(&self) {
        let mut history = self.lock_history();
        history.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Run one in-character turn and return the door's full reply.
    ///
    /// The reply is emitted one character at a time through `on_char`,
    /// paced at `chars_per_second`. A blocked player message leaves the
    /// session untouched. A failed or blocked reply keeps the player's
    /// message in history but records no assistant turn.
    pub async fn respond<F>(
        &self,
        ctx: TurnContext<'_>,
        player_text: &str,
        chars_per_second: f32,
        mut on_char: F,
    ) -> Result<String>
    where
        F: FnMut(char) + Send,
    {
        if self.is_busy() {
            return Err(DoorError::Busy);
        }
        self.policy
            .check_input(player_text)
            .into_result()
            .map_err(DoorError::input_blocked)?;
        let _guard = BusyGuard::acquire(&self.busy).ok_or(DoorError::Busy)?;

        let (generation, messages) = {
            let mut history = self.lock_history();
            let generation = self.generation.load(Ordering::Acquire);
            history.push(ChatMessage::user(player_text));

            let mut messages = Vec::with_capacity(history.len() + 1);
            messages.push(ChatMessage::system(door_system_prompt(&ctx)));
            messages.extend(history.iter().cloned());
            (generation, messages)
        };
        debug!(
            message_count = messages.len(),
            remaining_attempts = ctx.remaining_attempts,
            "door turn started"
        );

        let reply = self.backend.chat_once(&messages).await.map_err(|e| {
            warn!(error = %e, "door reply failed");
            e
        })?;

        self.policy.check_output(&reply).into_result().map_err(|reason| {
            warn!(reply_len = reply.len(), %reason, "door reply blocked");
            DoorError::output_blocked(reason)
        })?;

        let delay = char_delay(chars_per_second);
        for c in reply.chars() {
            on_char(c);
            tokio::time::sleep(delay).await;
        }

        let mut history = self.lock_history();
        if self.generation.load(Ordering::Acquire) == generation {
            history.push(ChatMessage::assistant(reply.clone()));
        } else {
            debug!("history cleared during turn; reply not recorded");
        }
        Ok(reply)
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn char_delay(chars_per_second: f32) -> Duration {
    if !(chars_per_second.is_finite() && chars_per_second > 0.0) {
        return MIN_CHAR_DELAY;
    }
    Duration::try_from_secs_f32(1.0 / chars_per_second)
        .map_or(MAX_CHAR_DELAY, |delay| delay.min(MAX_CHAR_DELAY))
}
