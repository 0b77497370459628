//! Debounced autosave scheduling.
//!
//! Edits during the minimum save interval coalesce into a single
//! deferred save; at most one timer is ever outstanding. All methods
//! take the current time explicitly so the debounce contract can be
//! tested without sleeping.

use crate::client::{ClientError, PersistenceClient};
use crate::document::MapDocument;
use crate::geojson;
use std::time::{Duration, Instant};

/// Default minimum interval between completed saves.
pub const DEFAULT_MIN_SAVE_INTERVAL: Duration = Duration::from_millis(2000);

/// The single pending timer, modeled explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTimer {
    /// No save pending.
    Idle,
    /// A save will run once `deadline` passes.
    Armed { deadline: Instant },
}

/// What an edit notification decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The interval has already elapsed; save immediately.
    SaveNow,
    /// The save was deferred to the given deadline.
    Deferred(Instant),
}

/// Debounce state machine for persistence calls.
#[derive(Debug)]
pub struct AutosaveScheduler {
    min_interval: Duration,
    /// Completion time of the last successful save (or creation time).
    last_completed: Instant,
    timer: SaveTimer,
}

impl AutosaveScheduler {
    pub fn new(now: Instant) -> Self {
        Self::with_interval(DEFAULT_MIN_SAVE_INTERVAL, now)
    }

    pub fn with_interval(min_interval: Duration, now: Instant) -> Self {
        Self {
            min_interval,
            last_completed: now,
            timer: SaveTimer::Idle,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Record an edit. Either the minimum interval since the last
    /// completed save has elapsed (save right away), or the single
    /// timer is (re)armed for exactly the remaining interval. An edit
    /// arriving while the timer is armed reschedules it; timers never
    /// stack.
    pub fn record_edit(&mut self, now: Instant) -> EditOutcome {
        let elapsed = now.saturating_duration_since(self.last_completed);
        if elapsed >= self.min_interval {
            self.timer = SaveTimer::Idle;
            EditOutcome::SaveNow
        } else {
            let deadline = self.last_completed + self.min_interval;
            self.timer = SaveTimer::Armed { deadline };
            EditOutcome::Deferred(deadline)
        }
    }

    /// Whether the armed timer has reached its deadline.
    pub fn due(&self, now: Instant) -> bool {
        matches!(self.timer, SaveTimer::Armed { deadline } if now >= deadline)
    }

    /// Whether a save is pending.
    pub fn is_armed(&self) -> bool {
        matches!(self.timer, SaveTimer::Armed { .. })
    }

    /// Deadline of the pending save, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        match self.timer {
            SaveTimer::Armed { deadline } => Some(deadline),
            SaveTimer::Idle => None,
        }
    }

    /// A save finished successfully; disarm and restart the interval.
    pub fn save_completed(&mut self, now: Instant) {
        self.timer = SaveTimer::Idle;
        self.last_completed = now;
    }

    /// A save failed; disarm without retrying. The next edit will
    /// trigger a fresh attempt.
    pub fn save_failed(&mut self) {
        self.timer = SaveTimer::Idle;
    }
}

/// Binds the scheduler to a named document and a persistence client.
///
/// The document is serialized at execution time, never at scheduling
/// time, so a coalesced save always persists the latest edits.
#[derive(Debug)]
pub struct Autosaver<C: PersistenceClient> {
    client: C,
    document_name: String,
    scheduler: AutosaveScheduler,
}

impl<C: PersistenceClient> Autosaver<C> {
    pub fn new(client: C, document_name: impl Into<String>, now: Instant) -> Self {
        Self {
            client,
            document_name: document_name.into(),
            scheduler: AutosaveScheduler::new(now),
        }
    }

    pub fn scheduler(&self) -> &AutosaveScheduler {
        &self.scheduler
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Notify the autosaver of an edit. Saves immediately when the
    /// interval has elapsed, otherwise defers. Returns `Ok(true)` when
    /// a save ran.
    pub fn note_edit(&mut self, doc: &MapDocument, now: Instant) -> Result<bool, ClientError> {
        match self.scheduler.record_edit(now) {
            EditOutcome::SaveNow => self.save_now(doc, now).map(|_| true),
            EditOutcome::Deferred(_) => Ok(false),
        }
    }

    /// Drive the pending timer. Saves when the deadline has passed.
    /// Returns `Ok(true)` when a save ran.
    pub fn tick(&mut self, doc: &MapDocument, now: Instant) -> Result<bool, ClientError> {
        if self.scheduler.due(now) {
            self.save_now(doc, now).map(|_| true)
        } else {
            Ok(false)
        }
    }

    /// Serialize the current document state and save it. Failures are
    /// logged and returned without scheduling a retry; further edits
    /// are unaffected.
    fn save_now(&mut self, doc: &MapDocument, now: Instant) -> Result<(), ClientError> {
        let portable = geojson::export(doc);
        match self.client.save_document(&self.document_name, &portable) {
            Ok(()) => {
                self.scheduler.save_completed(now);
                log::debug!("autosaved {:?} ({} shapes)", self.document_name, doc.len());
                Ok(())
            }
            Err(err) => {
                self.scheduler.save_failed();
                log::warn!("autosave of {:?} failed: {err}", self.document_name);
                Err(err)
            }
        }
    }
}
