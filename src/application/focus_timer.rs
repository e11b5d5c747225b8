use crate::domain::focus::{
    FocusEngine, FocusEvent, FocusSnapshot, FocusSummary, SessionKind, Transition,
};
use crate::domain::models::Settings;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Session boundary notifications (sound, toast, badge...).
pub trait FocusNotifier: Send + Sync {
    fn session_start(&self, kind: SessionKind);
    fn session_end(&self, kind: SessionKind);
    fn cycle_complete(&self);
}

/// Asks the user what the next work session is about.
pub trait FocusPrompt: Send + Sync {
    fn request_focus(&self, prefill: Option<&str>);
}

/// Writes focus events to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl FocusNotifier for LogNotifier {
    fn session_start(&self, kind: SessionKind) {
        info!(event = "session_start", kind = ?kind, "focus session started");
    }

    fn session_end(&self, kind: SessionKind) {
        info!(event = "session_end", kind = ?kind, "focus session ended");
    }

    fn cycle_complete(&self) {
        info!(event = "cycle_complete", "focus cycle complete");
    }
}

impl FocusPrompt for LogNotifier {
    fn request_focus(&self, prefill: Option<&str>) {
        info!(event = "focus_requested", prefill, "waiting for focus description");
    }
}

/// The live ticker task, if any. Every spawn and stop bumps `generation`, so
/// a task that was superseded stops without touching the engine.
#[derive(Default)]
struct Ticker {
    generation: u64,
    live: bool,
    handle: Option<JoinHandle<()>>,
}

struct Shared {
    engine: Mutex<FocusEngine>,
    ticker: Mutex<Ticker>,
    notifier: Arc<dyn FocusNotifier>,
    prompt: Arc<dyn FocusPrompt>,
}

impl Shared {
    fn engine(&self) -> MutexGuard<'_, FocusEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ticker(&self) -> MutexGuard<'_, Ticker> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, events: &[FocusEvent]) {
        for event in events {
            match event {
                FocusEvent::SessionStart { kind } => self.notifier.session_start(*kind),
                FocusEvent::SessionEnd { kind } => self.notifier.session_end(*kind),
                FocusEvent::CycleComplete => self.notifier.cycle_complete(),
                FocusEvent::FocusCaptureRequested { prefill } => {
                    self.prompt.request_focus(prefill.as_deref())
                }
            }
        }
    }

    /// `None` once `generation` is no longer the live ticker.
    fn tick_for(&self, generation: u64) -> Option<Vec<FocusEvent>> {
        let ticker = self.ticker();
        if ticker.generation != generation {
            return None;
        }
        Some(self.engine().tick())
    }

    /// Decided after the events went out, so a listener that restarts the
    /// engine keeps this task alive instead of racing a new one.
    fn keep_ticking(&self, generation: u64) -> bool {
        let mut ticker = self.ticker();
        if ticker.generation != generation {
            return false;
        }
        if self.engine().is_running() {
            return true;
        }
        ticker.live = false;
        ticker.handle = None;
        false
    }
}

/// Drives a [`FocusEngine`] from a monotonic one-second interval.
///
/// The ticker task exists only while the engine runs. Transitions go through
/// the engine; the ticker never decides state on its own.
pub struct FocusTimer {
    shared: Arc<Shared>,
}

impl FocusTimer {
    pub fn new(
        engine: FocusEngine,
        notifier: Arc<dyn FocusNotifier>,
        prompt: Arc<dyn FocusPrompt>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                engine: Mutex::new(engine),
                ticker: Mutex::new(Ticker::default()),
                notifier,
                prompt,
            }),
        }
    }

    pub fn snapshot(&self) -> FocusSnapshot {
        self.shared.engine().snapshot()
    }

    pub fn summary(&self) -> FocusSummary {
        self.shared.engine().summary()
    }

    pub fn is_ticking(&self) -> bool {
        self.shared.ticker().live
    }

    pub fn start(&self, focus: Option<&str>) -> Transition {
        let transition = self.shared.engine().start(focus);
        if transition.is_applied() {
            self.spawn_ticker();
        } else {
            debug!(refusal = ?transition, "focus start refused");
        }
        self.shared.dispatch(transition.events());
        transition
    }

    pub fn pause(&self) -> Transition {
        self.stop_ticker();
        let transition = self.shared.engine().pause();
        self.shared.dispatch(transition.events());
        transition
    }

    pub fn reset_session(&self) {
        self.stop_ticker();
        let events = self.shared.engine().reset_session();
        self.shared.dispatch(&events);
    }

    pub fn reset_cycle(&self) {
        self.stop_ticker();
        self.shared.engine().reset_cycle();
    }

    /// Settings with a zero-minute session are ignored.
    pub fn configure(&self, settings: &Settings) {
        if let Err(message) = settings.validate() {
            warn!(error = %message, "focus settings ignored");
            return;
        }
        self.shared.engine().configure_from_settings(settings);
    }

    /// One manual tick, for callers that run without a tokio runtime.
    pub fn tick(&self) -> Vec<FocusEvent> {
        let events = self.shared.engine().tick();
        self.shared.dispatch(&events);
        events
    }

    fn spawn_ticker(&self) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime; focus timer must be ticked manually");
            return;
        };

        let mut ticker = self.shared.ticker();
        if ticker.live {
            return;
        }
        ticker.generation += 1;
        ticker.live = true;

        let generation = ticker.generation;
        let shared = Arc::clone(&self.shared);
        ticker.handle = Some(runtime.spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                interval.tick().await;
                let Some(events) = shared.tick_for(generation) else {
                    break;
                };
                shared.dispatch(&events);
                if !shared.keep_ticking(generation) {
                    debug!(generation, "focus ticker stopped");
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&self) {
        let mut ticker = self.shared.ticker();
        ticker.generation += 1;
        ticker.live = false;
        if let Some(handle) = ticker.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for FocusTimer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
