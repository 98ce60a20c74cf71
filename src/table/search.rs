//! Debounced free-text search input.
//!
//! Typing arms a timer that fires `delay` after the last keystroke. An
//! explicit commit (Enter) applies the current text at once. While an IME
//! composition is open keystrokes do not arm the timer; ending the
//! composition arms it with the composed text. Committed values are
//! trimmed, and an empty value means "no search filter".
//!
//! Time is passed in explicitly ([`SearchDebouncer::poll`]) so the state
//! machine can be driven deterministically; [`SearchDebouncer::wait_for_commit`]
//! sleeps until the pending deadline for async callers.

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    text: String,
    composing: bool,
    deadline: Option<Instant>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            text: String::new(),
            composing: false,
            deadline: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// New input text; restarts the timer unless composing
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        if !self.composing {
            self.deadline = Some(now + self.delay);
        }
    }

    pub fn composition_start(&mut self) {
        self.composing = true;
        self.deadline = None;
    }

    pub fn composition_end(&mut self, text: impl Into<String>, now: Instant) {
        self.composing = false;
        self.input(text, now);
    }

    /// Enter: apply the current text now
    pub fn commit(&mut self) -> Option<String> {
        self.deadline = None;
        normalize(&self.text)
    }

    /// `Some(value)` once the deadline has passed; the value itself may be
    /// `None` (cleared search)
    pub fn poll(&mut self, now: Instant) -> Option<Option<String>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(normalize(&self.text))
            }
            _ => None,
        }
    }

    /// Drop any pending timer
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Sleep until the pending deadline and return what it commits.
    /// Returns `None` straight away when nothing is pending.
    pub async fn wait_for_commit(&mut self) -> Option<Option<String>> {
        let deadline = self.deadline?;
        tokio::time::sleep_until(deadline).await;
        self.poll(Instant::now())
    }
}

fn normalize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
