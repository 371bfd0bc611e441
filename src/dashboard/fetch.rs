use crate::models::DraftListResult;

/// Result of one listing request, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub result: std::result::Result<DraftListResult, String>,
}

/// Hands out request generations. Only the newest generation may touch shared state.
#[derive(Debug, Default)]
pub struct FetchTracker {
    latest: u64,
    in_flight: bool,
}

impl FetchTracker {
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.in_flight = true;
        self.latest
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest
    }

    /// Marks `generation` as landed. Returns false for a superseded response.
    pub fn complete(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn issued(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_monotonic() {
        let mut tracker = FetchTracker::default();
        assert_eq!(tracker.begin(), 1);
        assert_eq!(tracker.begin(), 2);
        assert_eq!(tracker.issued(), 2);
    }

    #[test]
    fn test_late_response_is_rejected() {
        let mut tracker = FetchTracker::default();
        let a = tracker.begin();
        let b = tracker.begin();

        assert!(tracker.complete(b));
        assert!(!tracker.in_flight());
        assert!(!tracker.complete(a));
        assert!(!tracker.in_flight());
    }

    #[test]
    fn test_stale_response_keeps_newer_request_in_flight() {
        let mut tracker = FetchTracker::default();
        let a = tracker.begin();
        let _b = tracker.begin();

        assert!(!tracker.complete(a));
        assert!(tracker.in_flight());
    }
}
