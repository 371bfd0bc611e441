use std::time::{Duration, Instant};

/// Holds the latest pushed value until `window` passes without another push.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace any pending value and restart the window from `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Yields the pending value once its deadline has passed. Fires at most once per push.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, deadline)| now >= *deadline);
        if !due {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_after_quiet_window() {
        let t0 = Instant::now();
        let mut gate = Debouncer::new(WINDOW);
        gate.push("acme", t0);

        assert_eq!(gate.poll(t0 + Duration::from_millis(299)), None);
        assert_eq!(gate.poll(t0 + WINDOW), Some("acme"));
        assert_eq!(gate.poll(t0 + Duration::from_secs(5)), None);
        assert!(!gate.is_pending());
    }

    #[test]
    fn test_rapid_pushes_only_emit_final_value() {
        let t0 = Instant::now();
        let mut gate = Debouncer::new(WINDOW);

        let mut fired = Vec::new();
        for (i, text) in ["a", "ac", "acm", "acme"].into_iter().enumerate() {
            let now = t0 + Duration::from_millis(100 * i as u64);
            if let Some(v) = gate.poll(now) {
                fired.push(v);
            }
            gate.push(text, now);
        }

        assert_eq!(gate.poll(t0 + Duration::from_millis(500)), None);
        if let Some(v) = gate.poll(t0 + Duration::from_millis(600)) {
            fired.push(v);
        }
        assert_eq!(fired, vec!["acme"]);
    }

    #[test]
    fn test_empty_value_still_fires() {
        let t0 = Instant::now();
        let mut gate = Debouncer::new(WINDOW);
        gate.push(String::new(), t0);
        assert_eq!(gate.poll(t0 + WINDOW), Some(String::new()));
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let t0 = Instant::now();
        let mut gate = Debouncer::new(WINDOW);
        gate.push(1, t0);
        gate.cancel();
        assert_eq!(gate.poll(t0 + WINDOW * 2), None);
        assert!(!gate.is_pending());
    }
}
