use embedscope_core::Millis;

/// Trailing-edge debounce with a single pending slot.
///
/// Scheduling while a value is pending replaces both the value and the
/// deadline; only the last value scheduled inside the quiet period fires.
/// Time is passed in, so the same debouncer works against any clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Millis,
    pending: Option<(T, Millis)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Millis) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Millis {
        self.delay
    }

    /// Arm the timer with `value`, firing at `now + delay`. Returns `true` if a
    /// pending value was superseded.
    pub fn schedule(&mut self, value: T, now: Millis) -> bool {
        let replaced = self.pending.is_some();
        self.pending = Some((value, now.saturating_add(self.delay)));
        replaced
    }

    /// Drop the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// The pending value, if its deadline has passed.
    pub fn poll(&mut self, now: Millis) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.cancel(),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let mut d = Debouncer::new(200);
        assert!(!d.schedule("a", 0));
        assert_eq!(d.poll(199), None);
        assert_eq!(d.poll(200), Some("a"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(1000), None);
    }

    #[test]
    fn test_reschedule_supersedes() {
        let mut d = Debouncer::new(200);
        d.schedule(1, 0);
        assert!(d.schedule(2, 150));
        assert!(d.schedule(3, 300));
        assert_eq!(d.poll(499), None);
        assert_eq!(d.poll(500), Some(3));
    }

    #[test]
    fn test_cancel_discards() {
        let mut d = Debouncer::new(10);
        d.schedule("x", 0);
        assert_eq!(d.cancel(), Some("x"));
        assert_eq!(d.poll(100), None);
    }
}
