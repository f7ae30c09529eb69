//! Adaptive edit debouncer.
//!
//! Pure timing: holds the latest full document content and decides how long
//! to wait before handing it downstream. No timers live here; the editor
//! actor drives it with `sleep_duration` / `take_if_due`, so the rules stay
//! unit-testable with explicit instants.
//!
//! Delay rules, first match wins:
//! 1. previous edit < 100ms ago (fast typing): 500ms for tiny deltas (≤ 2
//!    chars), 400ms otherwise
//! 2. previous edit > 500ms ago (paused typing): 200ms
//! 3. length delta > 50 chars (paste): 150ms
//! 4. appended text contains a structural character: 250ms
//! 5. fallback: the configured base delay
//!
//! Each `record` cancels the previous schedule; the downstream apply sees
//! only the latest value, exactly once. `flush` delivers a still-pending
//! value on teardown so no edit is silently dropped.

use std::time::{Duration, Instant};

/// Edits closer together than this count as fast typing.
pub(crate) const FAST_TYPING: Duration = Duration::from_millis(100);
/// Edits further apart than this count as paused typing.
pub(crate) const TYPING_PAUSE: Duration = Duration::from_millis(500);
/// Length delta treated as a paste.
pub(crate) const PASTE_DELTA: i64 = 50;

const FAST_SMALL_DELAY: Duration = Duration::from_millis(500);
const FAST_LARGE_DELAY: Duration = Duration::from_millis(400);
const PAUSED_DELAY: Duration = Duration::from_millis(200);
const PASTE_DELAY: Duration = Duration::from_millis(150);
const STRUCTURAL_DELAY: Duration = Duration::from_millis(250);

/// Characters that usually change document structure; worth recompiling a
/// little sooner than plain prose.
const STRUCTURAL_CHARS: &[char] = &['#', '=', '[', ']', '{', '}', '(', ')', '\n'];

pub struct Debouncer {
    base_delay: Duration,
    /// Last content seen, for delta and appended-text detection.
    last_value: String,
    /// Scheduled but not yet applied content.
    pending: Option<String>,
    last_edit: Option<Instant>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(base_delay: Duration) -> Self {
        Self::with_initial(base_delay, String::new())
    }

    /// Start from existing document content so the first keystroke's delta
    /// is computed against it.
    pub fn with_initial(base_delay: Duration, initial: String) -> Self {
        Self {
            base_delay,
            last_value: initial,
            pending: None,
            last_edit: None,
            deadline: None,
        }
    }

    /// Record the document's full new content after a keystroke or paste.
    ///
    /// Overwrites any earlier pending value and reschedules the deadline;
    /// the superseded value is never delivered.
    pub fn record(&mut self, new_value: String, now: Instant) {
        let delay = self.delay_for(&new_value, now);
        self.deadline = Some(now + delay);
        self.last_edit = Some(now);
        self.last_value = new_value.clone();
        self.pending = Some(new_value);
    }

    /// Adaptive delay for a new content value arriving at `now`.
    pub(crate) fn delay_for(&self, new_value: &str, now: Instant) -> Duration {
        let since_last = self.last_edit.map(|t| now.duration_since(t));
        let delta = char_len(new_value) - char_len(&self.last_value);

        if let Some(dt) = since_last
            && dt < FAST_TYPING
        {
            return if delta.abs() <= 2 {
                FAST_SMALL_DELAY
            } else {
                FAST_LARGE_DELAY
            };
        }

        if let Some(dt) = since_last
            && dt > TYPING_PAUSE
        {
            return PAUSED_DELAY;
        }

        if delta.abs() > PASTE_DELTA {
            return PASTE_DELAY;
        }

        let appended = appended_text(&self.last_value, new_value);
        if appended.contains(STRUCTURAL_CHARS) {
            return STRUCTURAL_DELAY;
        }

        self.base_delay
    }

    /// Take the pending value if the deadline has passed.
    pub fn take_if_due(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }

    /// Take the pending value unconditionally (teardown path: a scheduled
    /// edit must be applied, never dropped).
    pub fn flush(&mut self) -> Option<String> {
        self.deadline = None;
        self.pending.take()
    }

    /// Reset to new baseline content, discarding any pending edit.
    ///
    /// Used when the whole document is replaced (bulk import): an edit
    /// scheduled against the old content must not fire against the new one.
    pub fn rebase(&mut self, content: String) {
        self.last_value = content;
        self.pending = None;
        self.deadline = None;
        self.last_edit = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Precise sleep until the next possible due time.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(deadline) = self.deadline else {
            return Duration::from_secs(86400);
        };
        deadline
            .saturating_duration_since(now)
            .max(Duration::from_millis(1))
    }
}

fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

/// Text appended relative to the old value: everything in `new` past the
/// common prefix. Deletions and mid-document edits yield the changed tail.
fn appended_text<'a>(old: &str, new: &'a str) -> &'a str {
    let common = old
        .as_bytes()
        .iter()
        .zip(new.as_bytes())
        .take_while(|(a, b)| a == b)
        .count();
    let mut idx = common.min(new.len());
    while !new.is_char_boundary(idx) {
        idx -= 1;
    }
    &new[idx..]
}
