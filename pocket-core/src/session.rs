//! Fetch-cycle ordering: last-initiated request wins.
//!
//! Overlapping cycles may settle out of order (a provider switch while a slow
//! search is in flight, say). Each cycle is tagged with a monotonically
//! increasing id at initiation; a result only commits when no newer cycle has
//! already done so. Nothing is cancelled, stale arrivals are simply dropped.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    error::FetchError,
    model::{FetchRequest, ViewModel},
    provider::WeatherProvider,
    reconcile::build_view_model,
};

#[derive(Debug, Default)]
pub struct Session {
    next_cycle: AtomicU64,
    slot: Mutex<Slot>,
}

#[derive(Debug, Default)]
struct Slot {
    cycle: u64,
    view: Option<ViewModel>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one fetch cycle end to end: adapter fetch, reconciliation, commit.
    ///
    /// `Ok(Some(view))` means the result became the current view model;
    /// `Ok(None)` means it completed fine but a newer cycle had already
    /// committed, so it was discarded. An error from the newest cycle clears
    /// the current view model (no stale data next to an error banner).
    pub async fn fetch(
        &self,
        provider: &dyn WeatherProvider,
        request: &FetchRequest,
    ) -> Result<Option<ViewModel>, FetchError> {
        let cycle = self.begin();

        match provider.fetch(request).await {
            Ok(data) => {
                let view = build_view_model(data, provider.id());
                Ok(self.commit(cycle, view))
            }
            Err(err) => {
                self.abort(cycle);
                Err(err)
            }
        }
    }

    /// The view model of the newest committed cycle, if any.
    pub fn current(&self) -> Option<ViewModel> {
        self.lock_slot().view.clone()
    }

    fn begin(&self) -> u64 {
        self.next_cycle.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn commit(&self, cycle: u64, view: ViewModel) -> Option<ViewModel> {
        let mut slot = self.lock_slot();

        if cycle < slot.cycle {
            tracing::debug!(cycle, current = slot.cycle, "discarding stale fetch result");
            return None;
        }

        slot.cycle = cycle;
        slot.view = Some(view.clone());
        Some(view)
    }

    fn abort(&self, cycle: u64) {
        let mut slot = self.lock_slot();

        if cycle < slot.cycle {
            tracing::debug!(cycle, current = slot.cycle, "discarding stale fetch failure");
            return;
        }

        slot.cycle = cycle;
        slot.view = None;
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        // A poisoned lock only means another cycle panicked mid-commit; the
        // slot itself is always in a consistent state.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentConditions, ResolvedLocation};

    fn view(name: &str) -> ViewModel {
        ViewModel {
            location: ResolvedLocation {
                lat: 0.0,
                lon: 0.0,
                name: name.to_string(),
            },
            current: CurrentConditions {
                temperature: 10.0,
                feels_like: 10.0,
                humidity: 50.0,
                wind_speed: 1.0,
                wind_deg: 0.0,
                pressure: 1000.0,
                uv_index: None,
                icon_code: "01d".to_string(),
                description: "clear sky".to_string(),
                sunrise: 1,
                sunset: 2,
                timezone_offset: 0,
                observed_at: 1,
            },
            hourly: Vec::new(),
            daily: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn location_name(session: &Session) -> Option<String> {
        session.current().map(|v| v.location.name)
    }

    #[test]
    fn newest_cycle_wins_when_results_arrive_out_of_order() {
        let session = Session::new();

        // Cycle 1 ("London") starts first, cycle 2 ("Tokyo") starts later
        // but its response arrives first.
        let london = session.begin();
        let tokyo = session.begin();

        assert!(session.commit(tokyo, view("Tokyo, JP")).is_some());
        assert!(session.commit(london, view("London, GB")).is_none());

        assert_eq!(location_name(&session).as_deref(), Some("Tokyo, JP"));
    }

    #[test]
    fn in_order_cycles_replace_each_other() {
        let session = Session::new();

        let first = session.begin();
        assert!(session.commit(first, view("Paris, FR")).is_some());

        let second = session.begin();
        assert!(session.commit(second, view("Oslo, NO")).is_some());

        assert_eq!(location_name(&session).as_deref(), Some("Oslo, NO"));
    }

    #[test]
    fn failure_of_newest_cycle_clears_the_view() {
        let session = Session::new();

        let first = session.begin();
        assert!(session.commit(first, view("Paris, FR")).is_some());

        let second = session.begin();
        session.abort(second);

        assert_eq!(session.current(), None);
    }

    #[test]
    fn stale_failure_does_not_clear_newer_result() {
        let session = Session::new();

        let slow = session.begin();
        let fast = session.begin();

        assert!(session.commit(fast, view("Tokyo, JP")).is_some());
        session.abort(slow);

        assert_eq!(location_name(&session).as_deref(), Some("Tokyo, JP"));
    }
}
