/// Per-visitor visit counting
///
/// A visitor is counted at most once per calendar day (UTC).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorState {
    /// Number of counted visits
    pub visits: u64,
    /// Time of the last counted visit
    pub last_visit: Option<DateTime<Utc>>,
}

impl VisitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit at `now`, returning whether it was counted.
    ///
    /// The first visit initializes the count to 1. Later visits count only
    /// when `now` falls on a later calendar day than the last counted visit;
    /// a clock that moved backwards leaves the state untouched.
    pub fn record_visit(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_visit {
            None => {
                self.visits = 1;
                self.last_visit = Some(now);
                true
            }
            Some(last) => {
                let days = (now.date_naive() - last.date_naive()).num_days();
                if days >= 1 {
                    self.visits = self.visits.saturating_add(1);
                    self.last_visit = Some(now);
                    true
                } else {
                    false
                }
            }
        }
    }
}
