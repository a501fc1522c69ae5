use crate::models::PulseMode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub const DEFAULT_PULSE_DELAY: Duration = Duration::from_millis(750);

/// Shared boolean a view can watch for the "just saved" signal.
#[derive(Debug, Clone, Default)]
pub struct PulseFlag(Arc<AtomicBool>);

impl PulseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct SavePulse {
    flag: PulseFlag,
    delay: Duration,
    mode: PulseMode,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for SavePulse {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE_DELAY, PulseMode::Overlapping)
    }
}

impl SavePulse {
    pub fn new(delay: Duration, mode: PulseMode) -> Self {
        Self {
            flag: PulseFlag::new(),
            delay,
            mode,
            pending: Mutex::new(None),
        }
    }

    pub fn flag(&self) -> PulseFlag {
        self.flag.clone()
    }

    pub fn is_set(&self) -> bool {
        self.flag.get()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn fire<F: FnOnce()>(&self, updated: Option<PulseFlag>, callback: Option<F>) {
        self.flag.set(true);
        if let Some(updated) = &updated {
            updated.set(true);
        }

        if let Some(callback) = callback {
            callback();
        }

        self.schedule_reset(updated);
    }

    fn schedule_reset(&self, updated: Option<PulseFlag>) {
        let flag = self.flag.clone();
        let delay = self.delay;
        let reset = move || {
            flag.set(false);
            if let Some(updated) = updated {
                updated.set(false);
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    reset();
                });
                let Ok(mut pending) = self.pending.lock() else {
                    return;
                };
                let previous = pending.replace(task);
                if self.mode == PulseMode::Debounced {
                    if let Some(previous) = previous {
                        previous.abort();
                    }
                }
            }
            Err(_) => {
                tracing::debug!("no async runtime for save pulse, resetting on a detached thread");
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    reset();
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PulseFlag, SavePulse};
    use crate::models::PulseMode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn pulse_resets_after_delay() {
        let pulse = SavePulse::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        pulse.fire(None, Some(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(pulse.is_set());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(pulse.is_set());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!pulse.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_pulses_reset_on_first_timer() {
        let pulse = SavePulse::new(Duration::from_millis(750), PulseMode::Overlapping);
        pulse.fire(None, None::<fn()>);
        tokio::time::sleep(Duration::from_millis(500)).await;
        pulse.fire(None, None::<fn()>);

        tokio::time::sleep(Duration::from_millis(260)).await;
        assert!(!pulse.is_set());
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_pulse_waits_for_last_save() {
        let pulse = SavePulse::new(Duration::from_millis(750), PulseMode::Debounced);
        let external = PulseFlag::new();
        pulse.fire(Some(external.clone()), None::<fn()>);
        tokio::time::sleep(Duration::from_millis(500)).await;
        pulse.fire(Some(external.clone()), None::<fn()>);

        tokio::time::sleep(Duration::from_millis(260)).await;
        assert!(pulse.is_set());
        assert!(external.get());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!pulse.is_set());
        assert!(!external.get());
    }

    #[test]
    fn pulse_resets_without_a_runtime() {
        let pulse = SavePulse::new(Duration::from_millis(20), PulseMode::Overlapping);
        let external = PulseFlag::new();
        pulse.fire(Some(external.clone()), None::<fn()>);
        assert!(pulse.is_set());
        assert!(external.get());

        let deadline = Instant::now() + Duration::from_secs(2);
        while (pulse.is_set() || external.get()) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!pulse.is_set());
        assert!(!external.get());
    }
}
