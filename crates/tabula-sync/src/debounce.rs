//! Debounce primitives driven by the host event loop
//!
//! Each debounce site retains only the latest scheduled invocation: arming
//! again replaces the pending deadline. The host supplies logical time as
//! a tick counter and polls with the current tick; no wall clock or timer
//! thread is involved.

/// A logical time unit supplied by the host event loop
pub type Tick = u64;

/// A replace-and-cancel debounce handle
///
/// `arm` schedules (or reschedules) the deadline; `fire` reports it at
/// most once per arm, once the deadline has passed.
#[derive(Debug, Clone, Default)]
pub struct Debounce {
    delay: Tick,
    deadline: Option<Tick>,
}

impl Debounce {
    /// Create a debounce with the given settle delay
    pub fn new(delay: Tick) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule the deadline, superseding any pending one
    pub fn arm(&mut self, now: Tick) {
        self.deadline = Some(now + self.delay);
    }

    /// Discard the pending deadline
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether a deadline is pending
    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once the armed deadline has passed; clears the deadline
    pub fn fire(&mut self, now: Tick) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A debounced single-value writer
///
/// Buffers the latest written value until the delay elapses. The owning
/// component must `flush` or `cancel` it on teardown, otherwise a stale
/// write could fire after the target is gone.
#[derive(Debug, Clone, Default)]
pub struct DebouncedWriter<T> {
    delay: Tick,
    pending: Option<(Tick, T)>,
}

impl<T> DebouncedWriter<T> {
    /// Create a writer with the given delay
    pub fn new(delay: Tick) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Buffer a value, replacing and cancelling any pending one
    pub fn write(&mut self, now: Tick, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the buffered value once its deadline has passed
    pub fn poll(&mut self, now: Tick) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Take the buffered value immediately (teardown path)
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    /// Discard the buffered value
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// The buffered value, if any
    pub fn pending_value(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_once_after_delay() {
        let mut debounce = Debounce::new(10);
        assert!(!debounce.fire(0));

        debounce.arm(0);
        assert!(!debounce.fire(5));
        assert!(debounce.fire(10));
        assert!(!debounce.fire(11));
    }

    #[test]
    fn test_rearm_supersedes_pending_deadline() {
        let mut debounce = Debounce::new(10);
        debounce.arm(0);
        debounce.arm(8);
        assert!(!debounce.fire(10));
        assert!(debounce.fire(18));
    }

    #[test]
    fn test_cancel_discards_deadline() {
        let mut debounce = Debounce::new(10);
        debounce.arm(0);
        debounce.cancel();
        assert!(!debounce.pending());
        assert!(!debounce.fire(100));
    }

    #[test]
    fn test_writer_latest_wins() {
        let mut writer = DebouncedWriter::new(10);
        writer.write(0, "a");
        writer.write(5, "b");
        assert_eq!(writer.poll(10), None);
        assert_eq!(writer.poll(15), Some("b"));
        assert_eq!(writer.poll(100), None);
    }

    #[test]
    fn test_writer_flush_on_teardown() {
        let mut writer = DebouncedWriter::new(10);
        writer.write(0, "a");
        assert_eq!(writer.flush(), Some("a"));
        assert_eq!(writer.flush(), None);
    }

    #[test]
    fn test_writer_cancel_prevents_stale_write() {
        let mut writer = DebouncedWriter::new(10);
        writer.write(0, "a");
        writer.cancel();
        assert_eq!(writer.poll(100), None);
    }
}
