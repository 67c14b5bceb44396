//! Debounce state machine for material deposits.
//!
//! Pure and clock-injected: callers pass `now` so the behaviour is the same
//! under a real timer, a paused tokio clock, or a unit test.
//!
//! ```text
//!            observe(m), m != last_deposited
//!   Idle ─────────────────────────────────────▶ Pending(m, due)
//!    ▲  ◀──── observe(other | none) cancels ───────┘  │
//!    │                                                │ take_due(now >= due)
//!    │       complete(m, ok)                          ▼
//!    └──────────────────────────────────────── InFlight(m)
//! ```

use std::time::{Duration, Instant};

use crate::core::model::Prediction;

/// Default wait between first detection and the deposit request.
pub const DEFAULT_DEPOSIT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    material: String,
    due: Instant,
}

/// What an observation did to the pending deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Scheduled { material: String, due: Instant },
    Cancelled { material: String },
    Replaced { cancelled: String, material: String, due: Instant },
}

#[derive(Debug, Clone)]
pub struct DepositDebouncer {
    delay: Duration,
    prediction: Prediction,
    last_deposited: Option<String>,
    /// Material whose request failed during the current detection run.
    rejected: Option<String>,
    pending: Option<Pending>,
    in_flight: Option<String>,
}

impl Default for DepositDebouncer {
    fn default() -> Self { Self::new(DEFAULT_DEPOSIT_DELAY) }
}

impl DepositDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            prediction: Prediction::empty(),
            last_deposited: None,
            rejected: None,
            pending: None,
            in_flight: None,
        }
    }

    pub fn prediction(&self) -> &Prediction { &self.prediction }
    pub fn last_deposited(&self) -> Option<&str> { self.last_deposited.as_deref() }
    pub fn pending_material(&self) -> Option<&str> { self.pending.as_ref().map(|p| p.material.as_str()) }
    pub fn in_flight(&self) -> Option<&str> { self.in_flight.as_deref() }

    /// When the pending deposit becomes due, if one is scheduled.
    pub fn next_due(&self) -> Option<Instant> { self.pending.as_ref().map(|p| p.due) }

    /// Record the latest poll result.
    pub fn observe(&mut self, prediction: Prediction, wallet_present: bool, now: Instant) -> Transition {
        self.prediction = prediction;
        let detected = self.prediction.material().map(str::to_string);

        if self.rejected.is_some() && self.rejected != detected {
            self.rejected = None;
        }

        let stale = self.pending.as_ref().map_or(false, |p| {
            !wallet_present || detected.as_deref() != Some(p.material.as_str())
        });
        let cancelled = if stale { self.pending.take().map(|p| p.material) } else { None };

        let scheduled = match detected {
            Some(material) if wallet_present && self.pending.is_none() && self.eligible(&material) => {
                let due = now + self.delay;
                self.pending = Some(Pending { material: material.clone(), due });
                Some((material, due))
            }
            _ => None,
        };

        match (cancelled, scheduled) {
            (None, None) => Transition::Unchanged,
            (None, Some((material, due))) => Transition::Scheduled { material, due },
            (Some(material), None) => Transition::Cancelled { material },
            (Some(cancelled), Some((material, due))) => Transition::Replaced { cancelled, material, due },
        }
    }

    /// Take the pending deposit if its delay has elapsed. The material is
    /// marked in flight until [`complete`](Self::complete) is called.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        if !self.pending.as_ref().map_or(false, |p| p.due <= now) {
            return None;
        }
        let material = self.pending.take()?.material;
        self.in_flight = Some(material.clone());
        Some(material)
    }

    /// Settle an in-flight deposit. Success updates the de-duplication key;
    /// failure blocks the material until the detection changes.
    pub fn complete(&mut self, material: &str, success: bool) {
        if self.in_flight.as_deref() == Some(material) {
            self.in_flight = None;
        }
        if success {
            self.last_deposited = Some(material.to_string());
            self.rejected = None;
        } else {
            self.rejected = Some(material.to_string());
        }
    }

    fn eligible(&self, material: &str) -> bool {
        self.in_flight.is_none()
            && self.last_deposited.as_deref() != Some(material)
            && self.rejected.as_deref() != Some(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration { Duration::from_secs(n) }

    /// Feeds one prediction per second and settles deposits as the
    /// backend would; returns the materials that were submitted.
    fn run(readings: &[Option<&str>], backend_ok: bool) -> Vec<String> {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();
        let mut sent = Vec::new();
        for (i, reading) in readings.iter().enumerate() {
            let now = t0 + secs(i as u64);
            if let Some(material) = d.take_due(now) {
                d.complete(&material, backend_ok);
                sent.push(material);
            }
            let p = reading.map(|m| Prediction::of(m, 0.9)).unwrap_or_default();
            d.observe(p, true, now);
        }
        sent
    }

    #[test]
    fn steady_detection_deposits_once() {
        let sent = run(&[Some("plastic"); 10], true);
        assert_eq!(sent, vec!["plastic".to_string()]);
    }

    #[test]
    fn change_within_window_drops_earlier_material() {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();

        assert!(matches!(d.observe(Prediction::of("plastic", 0.9), true, t0), Transition::Scheduled { .. }));
        let t = d.observe(Prediction::of("glass", 0.8), true, t0 + secs(2));
        assert_eq!(t, Transition::Replaced { cancelled: "plastic".into(), material: "glass".into(), due: t0 + secs(5) });

        assert_eq!(d.take_due(t0 + secs(3)), None);
        assert_eq!(d.pending_material(), Some("glass"));
        assert_eq!(d.take_due(t0 + secs(5)), Some("glass".into()));
    }

    #[test]
    fn same_material_keeps_original_deadline() {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();
        d.observe(Prediction::of("can", 0.7), true, t0);
        assert_eq!(d.observe(Prediction::of("can", 0.95), true, t0 + secs(1)), Transition::Unchanged);
        assert_eq!(d.next_due(), Some(t0 + secs(3)));
    }

    #[test]
    fn deposited_material_waits_for_a_different_one() {
        // plastic deposited, then gone, then back: no second deposit.
        let mut readings = vec![Some("plastic"); 5];
        readings.extend([None, None, Some("plastic"), Some("plastic"), Some("plastic"), Some("plastic")]);
        assert_eq!(run(&readings, true), vec!["plastic".to_string()]);

        // Once glass is deposited, plastic is eligible again.
        let mut readings = vec![Some("plastic"); 5];
        readings.extend([Some("glass"); 5]);
        readings.extend([Some("plastic"); 5]);
        assert_eq!(run(&readings, true), vec!["plastic".to_string(), "glass".to_string(), "plastic".to_string()]);
    }

    #[test]
    fn empty_reading_cancels_pending() {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();
        d.observe(Prediction::of("paper", 0.6), true, t0);
        assert_eq!(d.observe(Prediction::empty(), true, t0 + secs(1)), Transition::Cancelled { material: "paper".into() });
        assert_eq!(d.take_due(t0 + secs(10)), None);
    }

    #[test]
    fn no_wallet_no_schedule() {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();
        assert_eq!(d.observe(Prediction::of("plastic", 0.9), false, t0), Transition::Unchanged);
        assert!(d.next_due().is_none());
    }

    #[test]
    fn failure_is_not_retried_during_same_detection() {
        let sent = run(&[Some("metal"); 12], false);
        assert_eq!(sent, vec!["metal".to_string()]);

        let mut readings = vec![Some("metal"); 5];
        readings.push(None);
        readings.extend([Some("metal"); 5]);
        assert_eq!(run(&readings, false), vec!["metal".to_string(), "metal".to_string()]);
    }

    #[test]
    fn in_flight_blocks_new_schedule() {
        let t0 = Instant::now();
        let mut d = DepositDebouncer::default();
        d.observe(Prediction::of("plastic", 0.9), true, t0);
        assert_eq!(d.take_due(t0 + secs(3)), Some("plastic".into()));

        assert_eq!(d.observe(Prediction::of("glass", 0.9), true, t0 + secs(4)), Transition::Unchanged);
        d.complete("plastic", true);
        assert!(matches!(d.observe(Prediction::of("glass", 0.9), true, t0 + secs(5)), Transition::Scheduled { .. }));
    }
}
