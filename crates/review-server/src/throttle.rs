//! Trailing-edge coalescing for the search overlay.
//!
//! At most one overlay is applied per interval. A query arriving inside the
//! interval is parked as pending; later queries replace it, and the last one is
//! applied when the interval ends. The final query of a burst always lands.
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Outcome of offering a query to the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Apply the query now.
    Now,
    /// The query is pending. `schedule` is set for the first query of a burst:
    /// the caller must arrange a flush after `after`.
    Deferred { after: Duration, schedule: bool },
}

/// A parked query, tied to the document it was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub document_id: String,
    pub query: String,
}

#[derive(Clone)]
pub struct SearchThrottle {
    interval: Duration,
    state: Arc<Mutex<ThrottleState>>,
}

#[derive(Debug, Default)]
struct ThrottleState {
    last_applied: Option<Instant>,
    pending: Option<PendingSearch>,
}

impl SearchThrottle {
    /// `None` when `rps` is absent or zero.
    pub fn new(rps: Option<u32>) -> Option<Self> {
        let rps = rps.filter(|&n| n > 0)?;
        Some(Self {
            interval: Duration::from_secs_f64(1.0 / rps as f64),
            state: Arc::new(Mutex::new(ThrottleState::default())),
        })
    }

    pub async fn admit(&self, search: PendingSearch) -> Admission {
        let mut state = self.state.lock().await;
        if state.pending.is_some() {
            state.pending = Some(search);
            return Admission::Deferred {
                after: Duration::ZERO,
                schedule: false,
            };
        }

        let now = Instant::now();
        let elapsed = state.last_applied.map(|t| now.duration_since(t));
        match elapsed {
            Some(elapsed) if elapsed < self.interval => {
                state.pending = Some(search);
                Admission::Deferred {
                    after: self.interval - elapsed,
                    schedule: true,
                }
            }
            _ => {
                state.last_applied = Some(now);
                Admission::Now
            }
        }
    }

    /// Take the pending query, if any, and restart the interval.
    pub async fn take_pending(&self) -> Option<PendingSearch> {
        let mut state = self.state.lock().await;
        let pending = state.pending.take()?;
        state.last_applied = Some(Instant::now());
        Some(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str) -> PendingSearch {
        PendingSearch {
            document_id: "doc".to_string(),
            query: query.to_string(),
        }
    }

    #[test]
    fn test_disabled_without_rate() {
        assert!(SearchThrottle::new(None).is_none());
        assert!(SearchThrottle::new(Some(0)).is_none());
    }

    #[tokio::test]
    async fn test_burst_keeps_last_query() {
        let throttle = SearchThrottle::new(Some(1)).unwrap();
        assert_eq!(throttle.admit(search("d")).await, Admission::Now);

        let second = throttle.admit(search("da")).await;
        assert!(matches!(second, Admission::Deferred { schedule: true, .. }));
        let third = throttle.admit(search("days")).await;
        assert!(matches!(third, Admission::Deferred { schedule: false, .. }));

        assert_eq!(throttle.take_pending().await, Some(search("days")));
        assert_eq!(throttle.take_pending().await, None);
    }

    #[tokio::test]
    async fn test_interval_elapsed_applies_immediately() {
        let throttle = SearchThrottle::new(Some(50)).unwrap();
        assert_eq!(throttle.admit(search("a")).await, Admission::Now);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(throttle.admit(search("b")).await, Admission::Now);
    }
}
