//! The traffic light and its updater thread.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::core::{LightError, Phase};
use crate::queue::BlockingQueue;

/// Timing parameters for a [`TrafficLight`].
///
/// The light keeps each phase for a dwell interval drawn uniformly from
/// `dwell_min..dwell_max`. The updater thread re-checks the elapsed time (and the stop
/// signal) every `poll_quantum`, so phase changes land within one quantum of the drawn
/// dwell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightConfig {
    /// Lower bound of the dwell interval, inclusive.
    pub dwell_min: Duration,
    /// Upper bound of the dwell interval, exclusive.
    pub dwell_max: Duration,
    /// Sleep between elapsed-time checks in the updater thread.
    pub poll_quantum: Duration,
}

impl Default for LightConfig {
    /// The standard timing: dwell between 4 and 6 seconds, checked every millisecond.
    fn default() -> Self {
        LightConfig {
            dwell_min: Duration::from_millis(4000),
            dwell_max: Duration::from_millis(6000),
            poll_quantum: Duration::from_millis(1),
        }
    }
}

/// A builder for [`LightConfig`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stoplight_lib::light::LightConfigBuilder;
///
/// let config = LightConfigBuilder::new()
///     .dwell_range(Duration::from_millis(50), Duration::from_millis(100))
///     .poll_quantum(Duration::from_millis(1))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct LightConfigBuilder {
    config: LightConfig,
}

impl LightConfigBuilder {
    /// Creates a builder initialized with the default timing.
    pub fn new() -> Self {
        LightConfigBuilder {
            config: LightConfig::default(),
        }
    }

    /// Sets the dwell interval to be drawn uniformly from `min..max`.
    pub fn dwell_range(mut self, min: Duration, max: Duration) -> Self {
        self.config.dwell_min = min;
        self.config.dwell_max = max;
        self
    }

    /// Sets the sleep between the updater's elapsed-time checks.
    pub fn poll_quantum(mut self, quantum: Duration) -> Self {
        self.config.poll_quantum = quantum;
        self
    }

    /// Builds the configuration.
    ///
    /// # Panics
    ///
    /// Panics if the dwell range is empty (`dwell_min >= dwell_max`).
    pub fn build(self) -> LightConfig {
        assert!(
            self.config.dwell_min < self.config.dwell_max,
            "empty dwell range: {:?} >= {:?}",
            self.config.dwell_min,
            self.config.dwell_max
        );
        self.config
    }
}

impl Default for LightConfigBuilder {
    fn default() -> Self {
        LightConfigBuilder::new()
    }
}

/// State shared between the light handle and its updater thread.
struct Shared {
    config: LightConfig,
    queue: BlockingQueue<Phase>,
    /// Snapshot of the current phase, readable from any thread.
    current: AtomicU8,
    stopped: AtomicBool,
}

impl Shared {
    fn current_phase(&self) -> Phase {
        Phase::from_u8(self.current.load(Ordering::Relaxed))
    }

    fn draw_dwell<R: Rng>(&self, rng: &mut R) -> Duration {
        rng.gen_range(self.config.dwell_min..self.config.dwell_max)
    }
}

/// A simulated traffic light.
///
/// The light starts out [`red`](Phase::Red) and idle. [`simulate`](TrafficLight::simulate)
/// spawns the updater thread, which toggles the phase at a randomized dwell interval and
/// publishes every new phase to an internal [`BlockingQueue`]. Any number of threads can
/// then block in [`wait_for_phase`](TrafficLight::wait_for_phase) or
/// [`wait_for_change`](TrafficLight::wait_for_change); share the light between threads with
/// an [`Arc`].
///
/// Because the queue is LIFO and waiters compete for messages, a waiter can observe phases
/// out of chronological order or miss an intermediate change entirely. Waiters synchronize
/// on "the light reached this phase", not on a complete transition log.
///
/// [`stop`](TrafficLight::stop) (also run on drop) shuts the light down: the updater thread
/// exits, blocked waiters return [`LightError::Stopped`], and the light cannot be restarted.
pub struct TrafficLight {
    shared: Arc<Shared>,
    updater: Mutex<Option<thread::JoinHandle<()>>>,
}

impl TrafficLight {
    /// Creates an idle red light with the given timing.
    pub fn new(config: LightConfig) -> Self {
        TrafficLight {
            shared: Arc::new(Shared {
                config,
                queue: BlockingQueue::new(),
                current: AtomicU8::new(Phase::Red.as_u8()),
                stopped: AtomicBool::new(false),
            }),
            updater: Mutex::new(None),
        }
    }

    /// Starts the updater thread and returns immediately.
    ///
    /// Fails with [`LightError::AlreadyRunning`] if the updater is already running and with
    /// [`LightError::Stopped`] if the light has been stopped; a light is simulated at most
    /// once.
    pub fn simulate(&self) -> Result<(), LightError> {
        let mut updater = self.updater.lock().unwrap();
        if self.shared.stopped.load(Ordering::Relaxed) {
            return Err(LightError::Stopped);
        }
        if updater.is_some() {
            return Err(LightError::AlreadyRunning);
        }
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("light-updater".to_string())
            .spawn(move || cycle_through_phases(&shared))
            .expect("failed to spawn the updater thread");
        *updater = Some(handle);
        Ok(())
    }

    /// Returns a snapshot of the current phase without blocking.
    ///
    /// The snapshot is best-effort: a phase change may be in flight, so the value can be
    /// momentarily stale. Use [`wait_for_phase`](TrafficLight::wait_for_phase) to
    /// synchronize with a change.
    pub fn current_phase(&self) -> Phase {
        self.shared.current_phase()
    }

    /// Blocks until the light publishes `target`, discarding every other phase.
    ///
    /// Returns [`LightError::Stopped`] if the light is stopped before `target` comes up.
    /// Blocks indefinitely on a light that was never simulated.
    pub fn wait_for_phase(&self, target: Phase) -> Result<(), LightError> {
        loop {
            match self.shared.queue.recv() {
                Ok(phase) if phase == target => return Ok(()),
                Ok(_) => continue,
                Err(_) => return Err(LightError::Stopped),
            }
        }
    }

    /// Blocks until the light publishes its next phase change and returns the new phase.
    pub fn wait_for_change(&self) -> Result<Phase, LightError> {
        self.shared.queue.recv().map_err(|_| LightError::Stopped)
    }

    /// Stops the simulation.
    ///
    /// Signals the updater thread, wakes every blocked waiter with
    /// [`LightError::Stopped`], and joins the updater. Idempotent; also run on drop.
    pub fn stop(&self) {
        self.shared.stopped.store(true, Ordering::Relaxed);
        self.shared.queue.close();
        if let Some(updater) = self.updater.lock().unwrap().take() {
            let _ = updater.join();
        }
    }
}

impl Default for TrafficLight {
    fn default() -> Self {
        TrafficLight::new(LightConfig::default())
    }
}

impl Drop for TrafficLight {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the updater thread.
///
/// Draws a dwell interval, polls the elapsed time every quantum, and on expiry toggles the
/// phase, stores the snapshot, publishes the new phase, and starts the next cycle. Exits
/// when the light is stopped.
fn cycle_through_phases(shared: &Shared) {
    let mut rng = rand::thread_rng();
    let mut dwell = shared.draw_dwell(&mut rng);
    let mut last_change = Instant::now();
    log::debug!("updater started, first dwell {:?}", dwell);
    while !shared.stopped.load(Ordering::Relaxed) {
        if last_change.elapsed() >= dwell {
            let next = shared.current_phase().toggled();
            shared.current.store(next.as_u8(), Ordering::Relaxed);
            if shared.queue.send(next).is_err() {
                // stopped between the flag check and the send
                break;
            }
            log::trace!("light is now {}", next);
            last_change = Instant::now();
            dwell = shared.draw_dwell(&mut rng);
        }
        thread::sleep(shared.config.poll_quantum);
    }
    log::debug!("updater exiting");
}
