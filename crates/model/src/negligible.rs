//! One-shot signal raised when a model's density first drops to effectively nothing.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;
use parking_lot::Mutex;

/// Raised once per model instance, the first time density falls below the configured
/// fraction of sea-level density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegligibleAtmosphereEvent {
    /// Query altitude that crossed the threshold (m).
    pub altitude: f64,
    /// Density divided by sea-level density at that altitude.
    pub density_ratio: f64,
}

/// Callback invoked with the event, at most once per monitor.
pub type NegligibleObserver = Arc<dyn Fn(&NegligibleAtmosphereEvent) + Send + Sync>;

/// Per-instance threshold watcher. Concurrent crossers race for a single slot; exactly
/// one of them records the event and notifies the observer.
pub struct NegligibleAtmosphereMonitor {
    sea_level_density: f64,
    threshold_ratio: f64,
    fired: AtomicBool,
    event: Mutex<Option<NegligibleAtmosphereEvent>>,
    observer: Option<NegligibleObserver>,
}

impl NegligibleAtmosphereMonitor {
    pub fn new(sea_level_density: f64, threshold_ratio: f64) -> Self {
        Self {
            sea_level_density,
            threshold_ratio,
            fired: AtomicBool::new(false),
            event: Mutex::new(None),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: NegligibleObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Check one query result against the threshold.
    pub fn observe(&self, altitude: f64, density: f64) {
        if self.fired.load(Ordering::Acquire) {
            return;
        }
        let density_ratio = density / self.sea_level_density;
        if density_ratio.is_nan() || density_ratio >= self.threshold_ratio {
            return;
        }

        let event = {
            let mut slot = self.event.lock();
            if slot.is_some() {
                return;
            }
            let event = NegligibleAtmosphereEvent {
                altitude,
                density_ratio,
            };
            *slot = Some(event);
            self.fired.store(true, Ordering::Release);
            event
        };

        warn!(
            "negligible atmosphere reached at {:.1} m (density ratio {:.3e} < {:.1e})",
            event.altitude, event.density_ratio, self.threshold_ratio
        );
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// The recorded event, if the threshold has been crossed.
    pub fn event(&self) -> Option<NegligibleAtmosphereEvent> {
        *self.event.lock()
    }

    /// A new monitor with the same threshold, no recorded event, and no observer.
    pub fn detached(&self) -> Self {
        Self::new(self.sea_level_density, self.threshold_ratio)
    }
}

impl fmt::Debug for NegligibleAtmosphereMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegligibleAtmosphereMonitor")
            .field("sea_level_density", &self.sea_level_density)
            .field("threshold_ratio", &self.threshold_ratio)
            .field("event", &self.event())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
