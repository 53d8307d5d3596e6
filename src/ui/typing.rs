//! Animated "Typing" placeholder.
//!
//! While shown, the indicator owns one entry at the end of the surface and a
//! background tick that cycles the trailing dots:
//!
//! ```text
//! Typing -> Typing. -> Typing.. -> Typing... -> Typing -> ...
//! ```
//!
//! The tick and [`TypingIndicator::hide`] serialize on the same lock, and the
//! tick re-checks its cancellation token under that lock, so no frame is ever
//! drawn after `hide` returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ChatSurface, EntryId, EntryKind};

/// Default animation period.
pub const DEFAULT_TICK: Duration = Duration::from_millis(500);

/// Shortest accepted animation period.
const MIN_TICK: Duration = Duration::from_millis(1);

const LABEL: &str = "Typing";
const MAX_DOTS: u8 = 3;

/// Render the frame for a dot count.
#[must_use]
pub fn frame(dot_count: u8) -> String {
    format!("{LABEL}{}", ".".repeat(usize::from(dot_count.min(MAX_DOTS))))
}

#[derive(Debug)]
struct Active {
    entry: EntryId,
    dot_count: u8,
    cancel: CancellationToken,
}

type Slot = Arc<Mutex<Option<Active>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Active>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-instance typing indicator bound to one surface.
#[derive(Debug)]
pub struct TypingIndicator {
    surface: Arc<dyn ChatSurface>,
    period: Duration,
    slot: Slot,
}

impl TypingIndicator {
    /// Create a hidden indicator that animates every `period`, at least 1 ms.
    #[must_use]
    pub fn new(surface: Arc<dyn ChatSurface>, period: Duration) -> Self {
        Self {
            surface,
            period: period.max(MIN_TICK),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Append the placeholder and start the animation.
    ///
    /// Does nothing if the indicator is already shown. Must be called from
    /// within a Tokio runtime.
    pub fn show(&self) {
        let mut slot = lock(&self.slot);
        if slot.is_some() {
            debug!(name: "typing.show.ignored", "Typing indicator already visible");
            return;
        }

        let entry = self.surface.append_entry(EntryKind::Typing, &frame(0));
        self.surface.scroll_to_end();

        let cancel = CancellationToken::new();
        *slot = Some(Active {
            entry,
            dot_count: 0,
            cancel: cancel.clone(),
        });
        drop(slot);

        tokio::spawn(animate(
            Arc::clone(&self.slot),
            Arc::clone(&self.surface),
            entry,
            cancel,
            self.period,
        ));
    }

    /// Stop the animation and remove the placeholder.
    ///
    /// Returns `false` if the indicator was not shown. Calling it repeatedly
    /// is harmless.
    pub fn hide(&self) -> bool {
        let mut slot = lock(&self.slot);
        let Some(active) = slot.take() else {
            return false;
        };
        active.cancel.cancel();
        self.surface.remove_entry(active.entry);
        true
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Current dot count, `None` while hidden.
    #[must_use]
    pub fn dot_count(&self) -> Option<u8> {
        lock(&self.slot).as_ref().map(|a| a.dot_count)
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        if let Some(active) = lock(&self.slot).take() {
            active.cancel.cancel();
        }
    }
}

async fn animate(
    slot: Slot,
    surface: Arc<dyn ChatSurface>,
    entry: EntryId,
    cancel: CancellationToken,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut guard = lock(&slot);
        let Some(active) = guard.as_mut() else {
            break;
        };
        if cancel.is_cancelled() || active.entry != entry {
            break;
        }
        active.dot_count = (active.dot_count + 1) % (MAX_DOTS + 1);
        surface.update_entry(entry, &frame(active.dot_count));
        surface.scroll_to_end();
    }
}
