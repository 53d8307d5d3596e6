//! Single-request chat session state machine.
//!
//! ```text
//!          submit(text), text non-blank
//!   Idle ─────────────────────────────────▶ Sending
//!    ▲                                         │
//!    └──── reply / failure / timeout ──────────┘
//! ```
//!
//! At most one request is ever in flight. The input field is disabled for
//! the whole `Sending` phase and a submit that still slips through is
//! rejected as [`SubmitOutcome::Busy`], never queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::latency::{LatencySummary, LatencyTracker};
use super::message::{Message, Sender};
use crate::reply::{ReplyError, ReplySource};
use crate::ui::{ChatSurface, InputField, KeyDisposition, KeyPress, MessageView, TypingIndicator};

/// Default upper bound for one reply.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed texts shown by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTexts {
    /// Bot message shown once by [`ChatSessionController::greet`].
    pub welcome: String,
    /// Shown when the reply source answers without text.
    pub fallback_reply: String,
    /// Shown when the reply could not be obtained.
    pub apology: String,
}

impl Default for SessionTexts {
    fn default() -> Self {
        Self {
            welcome: "Hi there! I'm CarList Assistant\u{2014}your guide to finding and buying cars. How can I help you today?".to_string(),
            fallback_reply: "Hmm \u{2026} I couldn\u{2019}t generate a reply.".to_string(),
            apology: "Sorry, I couldn\u{2019}t reach the server.".to_string(),
        }
    }
}

/// Controller tuning.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub texts: SessionTexts,
    /// Upper bound for one reply; exceeding it counts as a failure.
    pub request_timeout: Duration,
    /// Typing indicator animation period.
    pub typing_tick: Duration,
    /// Record round trips and show the latency status line.
    pub track_latency: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            texts: SessionTexts::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            typing_tick: crate::ui::typing::DEFAULT_TICK,
            track_latency: false,
        }
    }
}

/// Where the controller is in the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

/// Result of one submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was shown or sent.
    Ignored,
    /// Another request is still in flight; nothing was shown or sent.
    Busy,
    /// The bot answered (possibly with the fallback text).
    Replied,
    /// The reply failed and the apology was shown.
    Failed,
}

/// Result of routing one key press through the controller.
#[derive(Debug)]
pub struct KeyHandled {
    /// What the key source should do with the press.
    pub disposition: KeyDisposition,
    /// The request started by this press, if any.
    pub request: Option<JoinHandle<SubmitOutcome>>,
}

/// A request that has entered `Sending` and awaits its reply.
#[derive(Debug)]
struct Pending {
    text: String,
    started: Instant,
}

/// Owns the single-request lifecycle of one chat widget.
#[derive(Debug)]
pub struct ChatSessionController {
    view: MessageView,
    input: Arc<dyn InputField>,
    indicator: TypingIndicator,
    latency: Option<Mutex<LatencyTracker>>,
    source: Arc<dyn ReplySource>,
    state: Mutex<SessionState>,
    settings: SessionSettings,
}

impl ChatSessionController {
    /// Wire a controller to its collaborators.
    #[must_use]
    pub fn new(
        surface: Arc<dyn ChatSurface>,
        input: Arc<dyn InputField>,
        source: Arc<dyn ReplySource>,
        settings: SessionSettings,
    ) -> Self {
        let indicator = TypingIndicator::new(Arc::clone(&surface), settings.typing_tick);
        let latency = settings
            .track_latency
            .then(|| Mutex::new(LatencyTracker::new()));
        Self {
            view: MessageView::new(surface),
            input,
            indicator,
            latency,
            source,
            state: Mutex::new(SessionState::Idle),
            settings,
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_guard()
    }

    /// Snapshot of the message log.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.view.messages()
    }

    /// Latest latency summary, `None` when tracking is off or nothing was
    /// recorded yet.
    #[must_use]
    pub fn latency(&self) -> Option<LatencySummary> {
        self.latency
            .as_ref()
            .and_then(|tracker| lock(tracker).summary())
    }

    #[must_use]
    pub fn indicator(&self) -> &TypingIndicator {
        &self.indicator
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Show the welcome message and focus the input.
    pub fn greet(&self) {
        if !self.settings.texts.welcome.is_empty() {
            self.view.append(self.settings.texts.welcome.clone(), Sender::Bot);
        }
        self.input.focus();
    }

    /// Submit `text` and wait for the outcome.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.begin(text) {
            Ok(pending) => self.finish(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Submit whatever the input field currently holds.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let value = self.input.value();
        self.submit(&value).await
    }

    /// Key-event adapter.
    ///
    /// Enter without modifiers submits the input field. Everything up to the
    /// outbound request happens before this returns; the reply is awaited on
    /// a spawned task whose handle is returned.
    pub fn handle_key(self: &Arc<Self>, press: &KeyPress) -> KeyHandled {
        let disposition = press.disposition();
        let request = match disposition {
            KeyDisposition::Submit => {
                let value = self.input.value();
                self.begin(&value).ok().map(|pending| {
                    let controller = Arc::clone(self);
                    tokio::spawn(async move { controller.finish(pending).await })
                })
            }
            KeyDisposition::PassThrough => None,
        };
        KeyHandled {
            disposition,
            request,
        }
    }

    /// `Idle -> Sending`: show the user message, lock the input, start the
    /// indicator and the clock.
    fn begin(&self, text: &str) -> Result<Pending, SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitOutcome::Ignored);
        }

        {
            let mut state = self.state_guard();
            if *state == SessionState::Sending {
                debug!(name: "chat.submit.busy", "Submit rejected while a request is in flight");
                return Err(SubmitOutcome::Busy);
            }
            *state = SessionState::Sending;
        }

        self.view.append(text, Sender::User);
        self.input.set_value("");
        self.input.set_enabled(false);
        self.indicator.show();

        info!(name: "chat.request.started", chars = text.chars().count(), "Requesting reply");
        Ok(Pending {
            text: text.to_string(),
            started: Instant::now(),
        })
    }

    /// Await the reply, then `Sending -> Idle`.
    async fn finish(&self, pending: Pending) -> SubmitOutcome {
        let timeout = self.settings.request_timeout;
        let result = tokio::time::timeout(timeout, self.source.obtain_reply(&pending.text))
            .await
            .unwrap_or(Err(ReplyError::Timeout(timeout)));

        self.indicator.hide();
        let elapsed = pending.started.elapsed();
        self.record_latency(elapsed);

        let outcome = match result {
            Ok(reply) => {
                let text = reply
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| self.settings.texts.fallback_reply.clone());
                self.view.append(text, Sender::Bot);
                info!(
                    name: "chat.request.completed",
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "Reply received"
                );
                SubmitOutcome::Replied
            }
            Err(err) => {
                warn!(
                    name: "chat.request.failed",
                    error = %err,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "Reply failed"
                );
                self.view
                    .append(self.settings.texts.apology.clone(), Sender::Bot);
                SubmitOutcome::Failed
            }
        };

        self.input.set_enabled(true);
        self.input.focus();
        *self.state_guard() = SessionState::Idle;
        outcome
    }

    fn record_latency(&self, elapsed: Duration) {
        if let Some(tracker) = &self.latency {
            let summary = lock(tracker).record(elapsed);
            self.view.surface().set_status(&summary.display());
        }
    }
}

fn lock(tracker: &Mutex<LatencyTracker>) -> MutexGuard<'_, LatencyTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::SimulatedReplySource;
    use crate::ui::{MemoryInput, MemorySurface};

    fn controller(settings: SessionSettings) -> (Arc<ChatSessionController>, MemorySurface, MemoryInput) {
        let surface = MemorySurface::new();
        let input = MemoryInput::new();
        let controller = ChatSessionController::new(
            Arc::new(surface.clone()),
            Arc::new(input.clone()),
            Arc::new(SimulatedReplySource::default()),
            settings,
        );
        (Arc::new(controller), surface, input)
    }

    #[test]
    fn test_default_texts() {
        let texts = SessionTexts::default();
        assert_eq!(texts.apology, "Sorry, I couldn’t reach the server.");
        assert_eq!(texts.fallback_reply, "Hmm … I couldn’t generate a reply.");
        assert!(texts.welcome.starts_with("Hi there!"));
    }

    #[test]
    fn test_greet_shows_welcome_and_focuses() {
        let (controller, surface, input) = controller(SessionSettings::default());
        controller.greet();
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].sender(), Sender::Bot);
        assert_eq!(surface.entries().len(), 1);
        assert_eq!(input.focus_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_is_ignored() {
        let (controller, surface, input) = controller(SessionSettings::default());
        assert_eq!(controller.submit("   ").await, SubmitOutcome::Ignored);
        assert_eq!(controller.submit("").await, SubmitOutcome::Ignored);
        assert!(surface.entries().is_empty());
        assert!(input.is_enabled());
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_trims_text() {
        let (controller, surface, _input) = controller(SessionSettings::default());
        assert_eq!(controller.submit("  hello  ").await, SubmitOutcome::Replied);
        assert_eq!(surface.texts(), vec!["hello", "testt"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_status_after_reply() {
        let settings = SessionSettings {
            track_latency: true,
            ..SessionSettings::default()
        };
        let (controller, surface, _input) = controller(settings);

        controller.submit("hello").await;

        let summary = controller.latency().unwrap();
        assert!(summary.latest_ms >= 500.0);
        assert_eq!(surface.status(), Some(summary.display()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_off_by_default() {
        let (controller, surface, _input) = controller(SessionSettings::default());
        controller.submit("hello").await;
        assert!(controller.latency().is_none());
        assert!(surface.status().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shift_enter_does_not_submit() {
        let (controller, surface, input) = controller(SessionSettings::default());
        input.set_value("hello");

        let handled = controller.handle_key(&KeyPress::enter().with_shift());

        assert_eq!(handled.disposition, KeyDisposition::PassThrough);
        assert!(handled.request.is_none());
        assert!(surface.entries().is_empty());
        assert_eq!(input.value(), "hello");
    }
}
