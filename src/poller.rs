use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::remote::{strip_gain_param, VoicemeeterRemote};
use crate::shared_state::{SharedState, MONITORED_STRIPS};

/// Fixed poll cadence. The engine keeps its own parameter mirror, so there is
/// no benefit to going faster than the mixer publishes changes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Dirty-gated telemetry poller. One instance, one writer.
///
/// Every tick asks the engine whether anything changed; the first tick reads
/// unconditionally so the overlay starts from real values instead of zeros.
/// Read failures keep the last-known-good reading -- the display degrades
/// silently rather than flickering or crashing.
pub struct GainPoller<R> {
    remote: R,
    shared: Arc<Mutex<SharedState>>,
    initialized: bool,
}

impl<R: VoicemeeterRemote> GainPoller<R> {
    pub fn new(remote: R, shared: Arc<Mutex<SharedState>>) -> Self {
        Self {
            remote,
            shared,
            initialized: false,
        }
    }

    /// One poll cycle. No error is propagated; the next natural tick is the
    /// only retry.
    pub fn tick(&mut self) {
        // An errored dirty query collapses into "nothing changed" -- the
        // caller can't tell engine-unavailable from value-unchanged anyway.
        let dirty = self.remote.is_dirty().unwrap_or(false);
        if !dirty && self.initialized {
            return;
        }

        // The FFI reads run before the lock is taken, so a stalled engine
        // call never blocks the GUI's per-frame snapshot.
        let mut values: [Option<f32>; 3] = [None; 3];
        for (slot, strip) in MONITORED_STRIPS.iter().enumerate() {
            let param = strip_gain_param(*strip);
            match self.remote.parameter_float(&param) {
                Ok(raw) => values[slot] = Some(raw),
                Err(e) => {
                    // Stale value retained on purpose.
                    tracing::debug!("[Poller] {} read failed: {}", param, e);
                }
            }
        }

        if let Ok(mut state) = self.shared.lock() {
            for (slot, value) in values.into_iter().enumerate() {
                if let Some(raw) = value {
                    state.store_gain(slot, raw);
                }
            }
        }

        self.initialized = true;
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Run the poller on its own thread until shutdown is signaled.
///
/// The remote is dropped (and the engine logout happens) when the loop ends.
pub fn spawn_poller<R>(
    remote: R,
    shared: Arc<Mutex<SharedState>>,
    shutdown: Arc<AtomicBool>,
) -> thread::JoinHandle<()>
where
    R: VoicemeeterRemote + Send + 'static,
{
    thread::spawn(move || {
        tracing::info!("[Poller] Started ({}ms cadence)", POLL_INTERVAL.as_millis());

        let mut poller = GainPoller::new(remote, shared);
        while !shutdown.load(Ordering::Relaxed) {
            poller.tick();
            thread::sleep(POLL_INTERVAL);
        }

        tracing::info!("[Poller] Shutting down...");
    })
}

// ========== Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::{GAIN_MAX_DB, GAIN_MIN_DB};
    use crate::remote::RemoteError;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// Scriptable engine stand-in: a dirty flag and per-parameter values,
    /// with a counter so tests can assert reads were skipped.
    struct MockRemote {
        dirty: Cell<bool>,
        values: RefCell<HashMap<String, Result<f32, i32>>>,
        reads: Cell<usize>,
    }

    impl MockRemote {
        fn new(dirty: bool) -> Self {
            Self {
                dirty: Cell::new(dirty),
                values: RefCell::new(HashMap::new()),
                reads: Cell::new(0),
            }
        }

        fn set(&self, name: &str, value: f32) {
            self.values.borrow_mut().insert(name.to_string(), Ok(value));
        }

        fn fail(&self, name: &str, code: i32) {
            self.values.borrow_mut().insert(name.to_string(), Err(code));
        }
    }

    impl VoicemeeterRemote for &MockRemote {
        fn is_dirty(&self) -> Result<bool, RemoteError> {
            Ok(self.dirty.get())
        }

        fn parameter_float(&self, name: &str) -> Result<f32, RemoteError> {
            self.reads.set(self.reads.get() + 1);
            match self.values.borrow().get(name) {
                Some(Ok(v)) => Ok(*v),
                Some(Err(code)) => Err(RemoteError::ParameterQuery {
                    name: name.to_string(),
                    code: *code,
                }),
                None => Err(RemoteError::EngineUnavailable),
            }
        }
    }

    fn shared() -> Arc<Mutex<SharedState>> {
        Arc::new(Mutex::new(SharedState::new()))
    }

    #[test]
    fn test_first_tick_reads_even_when_clean() {
        let remote = MockRemote::new(false);
        remote.set("Strip[5].Gain", -12.0);
        remote.set("Strip[6].Gain", 3.0);
        remote.set("Strip[7].Gain", 0.0);

        let state = shared();
        let mut poller = GainPoller::new(&remote, state.clone());
        poller.tick();

        assert!(poller.is_initialized());
        let s = state.lock().unwrap();
        assert_eq!(s.readings[0].gain_db, -12.0);
        assert_eq!(s.readings[1].gain_db, 3.0);
        assert_eq!(remote.reads.get(), 3);
    }

    #[test]
    fn test_clean_cycle_after_init_is_a_noop() {
        let remote = MockRemote::new(false);
        remote.set("Strip[5].Gain", -12.0);
        remote.set("Strip[6].Gain", 3.0);
        remote.set("Strip[7].Gain", 0.5);

        let state = shared();
        let mut poller = GainPoller::new(&remote, state.clone());
        poller.tick();
        let before = state.lock().unwrap().readings;
        let reads_before = remote.reads.get();

        // Values change underneath, but the dirty flag stays down.
        remote.set("Strip[5].Gain", 9.0);
        poller.tick();

        assert_eq!(remote.reads.get(), reads_before, "clean cycle must not read");
        assert_eq!(state.lock().unwrap().readings, before);
    }

    #[test]
    fn test_dirty_cycle_rereads() {
        let remote = MockRemote::new(false);
        remote.set("Strip[5].Gain", -12.0);
        remote.set("Strip[6].Gain", 3.0);
        remote.set("Strip[7].Gain", 0.5);

        let state = shared();
        let mut poller = GainPoller::new(&remote, state.clone());
        poller.tick();

        remote.set("Strip[5].Gain", 9.0);
        remote.dirty.set(true);
        poller.tick();

        assert_eq!(state.lock().unwrap().readings[0].gain_db, 9.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped_on_store() {
        let remote = MockRemote::new(false);
        remote.set("Strip[5].Gain", -300.0);
        remote.set("Strip[6].Gain", 80.0);
        remote.set("Strip[7].Gain", -24.0);

        let state = shared();
        GainPoller::new(&remote, state.clone()).tick();

        let s = state.lock().unwrap();
        assert_eq!(s.readings[0].gain_db, GAIN_MIN_DB);
        assert_eq!(s.readings[1].gain_db, GAIN_MAX_DB);
        assert_eq!(s.readings[2].gain_db, -24.0);
    }

    #[test]
    fn test_read_failure_keeps_last_known_good() {
        let remote = MockRemote::new(true);
        remote.set("Strip[5].Gain", -6.0);
        remote.set("Strip[6].Gain", 1.0);
        remote.set("Strip[7].Gain", 2.0);

        let state = shared();
        let mut poller = GainPoller::new(&remote, state.clone());
        poller.tick();

        // Middle strip starts failing; the other two keep updating.
        remote.fail("Strip[6].Gain", -2);
        remote.set("Strip[5].Gain", -3.0);
        poller.tick();

        let s = state.lock().unwrap();
        assert_eq!(s.readings[0].gain_db, -3.0);
        assert_eq!(s.readings[1].gain_db, 1.0, "stale value must persist");
        assert_eq!(s.readings[2].gain_db, 2.0);
    }

    /// Remote whose reads check whether the state mutex is free. The GUI
    /// snapshots state every frame, so holding the lock across the engine
    /// calls would stall rendering for the duration of a slow FFI call.
    struct LockProbingRemote {
        shared: Arc<Mutex<SharedState>>,
        lock_held_during_read: Cell<bool>,
    }

    impl VoicemeeterRemote for &LockProbingRemote {
        fn is_dirty(&self) -> Result<bool, RemoteError> {
            Ok(true)
        }

        fn parameter_float(&self, _name: &str) -> Result<f32, RemoteError> {
            if self.shared.try_lock().is_err() {
                self.lock_held_during_read.set(true);
            }
            Ok(-6.0)
        }
    }

    #[test]
    fn test_state_lock_is_free_during_engine_reads() {
        let state = shared();
        let remote = LockProbingRemote {
            shared: state.clone(),
            lock_held_during_read: Cell::new(false),
        };

        let mut poller = GainPoller::new(&remote, state.clone());
        poller.tick();

        assert!(
            !remote.lock_held_during_read.get(),
            "engine reads must not run under the state lock"
        );
        assert_eq!(state.lock().unwrap().readings[0].gain_db, -6.0);
    }

    #[test]
    fn test_total_failure_still_marks_initialized() {
        // Engine absent entirely: reads fail, defaults stay, but the poller
        // stops forcing reads once the first gated cycle has run.
        let remote = MockRemote::new(false);
        let state = shared();
        let mut poller = GainPoller::new(&remote, state.clone());

        poller.tick();
        assert!(poller.is_initialized());
        assert_eq!(state.lock().unwrap().readings[0].gain_db, 0.0);

        let reads_before = remote.reads.get();
        poller.tick();
        assert_eq!(remote.reads.get(), reads_before);
    }
}
