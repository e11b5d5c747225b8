//! Focus session engine.
//!
//! A cycle is `mode` repetitions of (work, short break) where the final break
//! is a long break. The engine walks that cycle one second at a time and
//! reports transitions as [`FocusEvent`]s; it performs no I/O and owns no
//! timer. `remaining_seconds` is the single source of truth for the countdown.

use crate::domain::models::{CycleMode, Settings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionKind {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub kind: SessionKind,
    pub duration_seconds: u32,
}

impl Session {
    fn minutes(kind: SessionKind, minutes: u32) -> Self {
        Self {
            kind,
            duration_seconds: minutes.saturating_mul(60),
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_seconds / 60
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleConfig {
    pub mode: CycleMode,
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
}

impl CycleConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            mode: settings.cycle_mode,
            work_minutes: settings.work_duration,
            short_break_minutes: settings.short_break,
            long_break_minutes: settings.long_break,
        }
    }

    pub fn build(&self) -> Vec<Session> {
        build_cycle(
            self.mode,
            self.work_minutes,
            self.short_break_minutes,
            self.long_break_minutes,
        )
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Builds the ordered session list for one cycle. Durations are minutes.
pub fn build_cycle(
    mode: CycleMode,
    work_minutes: u32,
    short_break_minutes: u32,
    long_break_minutes: u32,
) -> Vec<Session> {
    let repetitions = mode.repetitions();
    let mut sessions = Vec::with_capacity(repetitions * 2);
    for repetition in 0..repetitions {
        sessions.push(Session::minutes(SessionKind::Work, work_minutes));
        let break_minutes = if repetition + 1 == repetitions {
            long_break_minutes
        } else {
            short_break_minutes
        };
        sessions.push(Session::minutes(SessionKind::Break, break_minutes));
    }
    sessions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPhase {
    Idle,
    Running,
    Expired,
}

impl FocusPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FocusEvent {
    SessionStart { kind: SessionKind },
    SessionEnd { kind: SessionKind },
    CycleComplete,
    /// The next work session needs a "what are you working on" answer.
    FocusCaptureRequested { prefill: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    FocusRequired,
    NotIdle,
    NotRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied(Vec<FocusEvent>),
    Refused(Refusal),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn events(&self) -> &[FocusEvent] {
        match self {
            Self::Applied(events) => events,
            Self::Refused(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedSession {
    pub index: usize,
    pub kind: SessionKind,
    pub focus: Option<String>,
    pub duration_seconds: u32,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusSummary {
    pub completed_work_sessions: u32,
    pub completed_break_sessions: u32,
    pub completed_cycles: u32,
    pub total_focus_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusSnapshot {
    pub phase: String,
    pub session_kind: SessionKind,
    pub session_index: usize,
    pub total_sessions: usize,
    pub remaining_seconds: u32,
    pub duration_seconds: u32,
    pub display: String,
    pub progress: f64,
    pub focus: Option<String>,
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct FocusEngine {
    config: CycleConfig,
    cycle: Vec<Session>,
    index: usize,
    phase: FocusPhase,
    remaining_seconds: u32,
    focus: Option<String>,
    pending_config: Option<CycleConfig>,
    history: Vec<CompletedSession>,
    completed_cycles: u32,
    now_provider: NowProvider,
}

impl FocusEngine {
    pub fn new(config: CycleConfig) -> Self {
        let cycle = config.build();
        let remaining_seconds = cycle.first().map_or(0, |session| session.duration_seconds);
        Self {
            config,
            cycle,
            index: 0,
            phase: FocusPhase::Idle,
            remaining_seconds,
            focus: None,
            pending_config: None,
            history: Vec::new(),
            completed_cycles: 0,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn cycle(&self) -> &[Session] {
        &self.cycle
    }

    pub fn phase(&self) -> FocusPhase {
        self.phase
    }

    pub fn session_index(&self) -> usize {
        self.index
    }

    pub fn current_session(&self) -> Session {
        self.cycle[self.index]
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.phase == FocusPhase::Running
    }

    pub fn history(&self) -> &[CompletedSession] {
        &self.history
    }

    /// Starts or resumes the current session.
    ///
    /// Work sessions need a focus description, either passed here or kept
    /// from an earlier start in the same session; without one the start is
    /// refused and nothing changes.
    pub fn start(&mut self, focus: Option<&str>) -> Transition {
        if self.phase != FocusPhase::Idle {
            return Transition::Refused(Refusal::NotIdle);
        }

        let session = self.current_session();
        if session.kind == SessionKind::Work {
            if let Some(focus) = normalize_focus(focus) {
                self.focus = Some(focus);
            }
            if self.focus.is_none() {
                return Transition::Refused(Refusal::FocusRequired);
            }
        }

        self.phase = FocusPhase::Running;
        Transition::Applied(vec![FocusEvent::SessionStart { kind: session.kind }])
    }

    pub fn pause(&mut self) -> Transition {
        if self.phase != FocusPhase::Running {
            return Transition::Refused(Refusal::NotRunning);
        }
        self.phase = FocusPhase::Idle;
        self.apply_pending_config();
        Transition::Applied(Vec::new())
    }

    /// One elapsed second. Reaching zero ends the session and advances.
    pub fn tick(&mut self) -> Vec<FocusEvent> {
        if self.phase != FocusPhase::Running {
            return Vec::new();
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return Vec::new();
        }

        let session = self.current_session();
        self.history.push(CompletedSession {
            index: self.index,
            kind: session.kind,
            focus: match session.kind {
                SessionKind::Work => self.focus.clone(),
                SessionKind::Break => None,
            },
            duration_seconds: session.duration_seconds,
            finished_at: (self.now_provider)(),
        });
        self.phase = FocusPhase::Expired;

        let mut events = vec![FocusEvent::SessionEnd { kind: session.kind }];
        events.extend(self.advance());
        events
    }

    /// Moves past an expired session. No-op in any other phase.
    pub fn advance(&mut self) -> Vec<FocusEvent> {
        if self.phase != FocusPhase::Expired {
            return Vec::new();
        }

        if let Some(config) = self.pending_config.take() {
            self.config = config;
            self.cycle = config.build();
        }

        let mut events = Vec::new();
        if self.index + 1 >= self.cycle.len() {
            self.completed_cycles = self.completed_cycles.saturating_add(1);
            self.index = 0;
            events.push(FocusEvent::CycleComplete);
        } else {
            self.index += 1;
        }

        let next = self.current_session();
        self.remaining_seconds = next.duration_seconds;
        match next.kind {
            SessionKind::Break => {
                self.phase = FocusPhase::Running;
                events.push(FocusEvent::SessionStart {
                    kind: SessionKind::Break,
                });
            }
            SessionKind::Work => {
                self.phase = FocusPhase::Idle;
                let prefill = self.focus.take();
                events.push(FocusEvent::FocusCaptureRequested { prefill });
            }
        }
        events
    }

    pub fn reset_session(&mut self) -> Vec<FocusEvent> {
        self.phase = FocusPhase::Idle;
        self.apply_pending_config();
        self.remaining_seconds = self.current_session().duration_seconds;

        if self.current_session().kind == SessionKind::Work {
            if let Some(focus) = self.focus.clone() {
                return vec![FocusEvent::FocusCaptureRequested {
                    prefill: Some(focus),
                }];
            }
        }
        Vec::new()
    }

    pub fn reset_cycle(&mut self) {
        self.phase = FocusPhase::Idle;
        if let Some(config) = self.pending_config.take() {
            self.config = config;
            self.cycle = config.build();
        }
        self.index = 0;
        self.remaining_seconds = self.current_session().duration_seconds;
        self.focus = None;
    }

    /// Rebuilds the cycle from new durations or mode.
    ///
    /// While running the change waits for the next session boundary. When idle
    /// the elapsed part of the current session is kept if it still fits in the
    /// new duration; otherwise the session restarts at its new full length.
    pub fn configure(&mut self, config: CycleConfig) {
        if config == self.config && self.pending_config.is_none() {
            return;
        }
        if self.phase == FocusPhase::Running {
            self.pending_config = Some(config);
            return;
        }
        self.pending_config = Some(config);
        self.apply_pending_config();
    }

    pub fn configure_from_settings(&mut self, settings: &Settings) {
        self.configure(CycleConfig::from_settings(settings));
    }

    pub fn snapshot(&self) -> FocusSnapshot {
        let session = self.current_session();
        FocusSnapshot {
            phase: self.phase.as_str().to_string(),
            session_kind: session.kind,
            session_index: self.index,
            total_sessions: self.cycle.len(),
            remaining_seconds: self.remaining_seconds,
            duration_seconds: session.duration_seconds,
            display: format_clock(self.remaining_seconds),
            progress: progress(session.duration_seconds, self.remaining_seconds),
            focus: self.focus.clone(),
        }
    }

    pub fn summary(&self) -> FocusSummary {
        let work = self
            .history
            .iter()
            .filter(|entry| entry.kind == SessionKind::Work);
        let completed_work_sessions = work.clone().count() as u32;
        let total_focus_minutes = work.map(|entry| entry.duration_seconds / 60).sum();
        let completed_break_sessions = self
            .history
            .iter()
            .filter(|entry| entry.kind == SessionKind::Break)
            .count() as u32;

        FocusSummary {
            completed_work_sessions,
            completed_break_sessions,
            completed_cycles: self.completed_cycles,
            total_focus_minutes,
        }
    }

    fn apply_pending_config(&mut self) {
        let Some(config) = self.pending_config.take() else {
            return;
        };

        let previous = self.current_session();
        let elapsed = previous
            .duration_seconds
            .saturating_sub(self.remaining_seconds);

        self.config = config;
        self.cycle = config.build();
        let clamped = self.index.min(self.cycle.len() - 1);
        let index_changed = clamped != self.index;
        self.index = clamped;

        let duration = self.current_session().duration_seconds;
        self.remaining_seconds = if index_changed || elapsed >= duration {
            duration
        } else {
            duration - elapsed
        };
    }
}

impl Default for FocusEngine {
    fn default() -> Self {
        Self::new(CycleConfig::default())
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn progress(duration_seconds: u32, remaining_seconds: u32) -> f64 {
    if duration_seconds == 0 {
        return 0.0;
    }
    let elapsed = duration_seconds.saturating_sub(remaining_seconds);
    f64::from(elapsed) / f64::from(duration_seconds)
}

fn normalize_focus(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config(mode: CycleMode) -> CycleConfig {
        CycleConfig {
            mode,
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
        }
    }

    fn minutes_of(cycle: &[Session]) -> Vec<(SessionKind, u32)> {
        cycle
            .iter()
            .map(|session| (session.kind, session.duration_minutes()))
            .collect()
    }

    fn tick_times(engine: &mut FocusEngine, count: u32) -> Vec<FocusEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(engine.tick());
        }
        events
    }

    #[test]
    fn mode_three_builds_six_sessions_with_trailing_long_break() {
        let cycle = build_cycle(CycleMode::Three, 25, 5, 15);
        assert_eq!(
            minutes_of(&cycle),
            vec![
                (SessionKind::Work, 25),
                (SessionKind::Break, 5),
                (SessionKind::Work, 25),
                (SessionKind::Break, 5),
                (SessionKind::Work, 25),
                (SessionKind::Break, 15),
            ]
        );
    }

    #[test]
    fn mode_five_uses_long_break_only_at_the_end() {
        let cycle = build_cycle(CycleMode::Five, 25, 5, 15);
        assert_eq!(cycle.len(), 10);
        let long_breaks = cycle
            .iter()
            .enumerate()
            .filter(|(_, session)| session.kind == SessionKind::Break && session.duration_minutes() == 15)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        assert_eq!(long_breaks, vec![9]);
    }

    #[test]
    fn initial_state_is_idle_at_first_session() {
        let engine = FocusEngine::new(config(CycleMode::Four));
        assert_eq!(engine.phase(), FocusPhase::Idle);
        assert_eq!(engine.session_index(), 0);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.snapshot().display, "25:00");
    }

    #[test]
    fn work_start_without_focus_is_refused() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        assert_eq!(engine.start(None), Transition::Refused(Refusal::FocusRequired));
        assert_eq!(engine.start(Some("   ")), Transition::Refused(Refusal::FocusRequired));
        assert_eq!(engine.phase(), FocusPhase::Idle);

        let started = engine.start(Some("  Write report "));
        assert_eq!(
            started,
            Transition::Applied(vec![FocusEvent::SessionStart {
                kind: SessionKind::Work
            }])
        );
        assert_eq!(engine.focus(), Some("Write report"));
        assert_eq!(engine.start(Some("again")), Transition::Refused(Refusal::NotIdle));
    }

    #[test]
    fn full_countdown_reaches_zero_then_advances_without_going_negative() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        assert!(engine.start(Some("Deep work")).is_applied());

        let before_last = tick_times(&mut engine, 1499);
        assert!(before_last.is_empty());
        assert_eq!(engine.remaining_seconds(), 1);

        let events = engine.tick();
        assert_eq!(
            events,
            vec![
                FocusEvent::SessionEnd {
                    kind: SessionKind::Work
                },
                FocusEvent::SessionStart {
                    kind: SessionKind::Break
                },
            ]
        );
        assert_eq!(engine.session_index(), 1);
        assert_eq!(engine.remaining_seconds(), 300);
        assert!(engine.is_running());
    }

    #[test]
    fn pause_keeps_remaining_and_reset_session_restores_full_duration() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        assert!(engine.start(Some("Inbox zero")).is_applied());
        tick_times(&mut engine, 90);
        assert!(engine.pause().is_applied());
        assert_eq!(engine.remaining_seconds(), 25 * 60 - 90);
        assert_eq!(engine.snapshot().display, "23:30");

        tick_times(&mut engine, 10);
        assert_eq!(engine.remaining_seconds(), 25 * 60 - 90);

        let events = engine.reset_session();
        assert_eq!(engine.remaining_seconds(), 25 * 60);
        assert_eq!(
            events,
            vec![FocusEvent::FocusCaptureRequested {
                prefill: Some("Inbox zero".to_string())
            }]
        );
    }

    #[test]
    fn resume_after_pause_reuses_stored_focus() {
        let mut engine = FocusEngine::new(config(CycleMode::Three));
        assert!(engine.start(Some("Review PR")).is_applied());
        tick_times(&mut engine, 5);
        assert!(engine.pause().is_applied());
        assert!(engine.start(None).is_applied());
        assert_eq!(engine.remaining_seconds(), 1495);
        assert_eq!(engine.pause(), Transition::Applied(Vec::new()));
        assert!(engine.pause() == Transition::Refused(Refusal::NotRunning));
    }

    #[test]
    fn mode_four_cycle_completes_once_and_returns_to_first_session() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        let mut events = Vec::new();

        for index in 0..8 {
            let session = engine.cycle()[index];
            assert_eq!(engine.session_index(), index);
            if session.kind == SessionKind::Work {
                assert_eq!(engine.phase(), FocusPhase::Idle);
                let started = engine.start(Some("Ship the release"));
                events.extend(started.events().to_vec());
            } else {
                assert!(engine.is_running());
            }
            events.extend(tick_times(&mut engine, session.duration_seconds));
        }

        let completions = events
            .iter()
            .filter(|event| **event == FocusEvent::CycleComplete)
            .count();
        assert_eq!(completions, 1);
        assert_eq!(engine.phase(), FocusPhase::Idle);
        assert_eq!(engine.session_index(), 0);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.focus(), None);

        let summary = engine.summary();
        assert_eq!(summary.completed_work_sessions, 4);
        assert_eq!(summary.completed_break_sessions, 4);
        assert_eq!(summary.completed_cycles, 1);
        assert_eq!(summary.total_focus_minutes, 100);
    }

    #[test]
    fn finishing_a_break_requests_a_new_focus() {
        let mut engine = FocusEngine::new(config(CycleMode::Three));
        assert!(engine.start(Some("Plan sprint")).is_applied());
        tick_times(&mut engine, 1500);
        let events = tick_times(&mut engine, 300);
        assert_eq!(
            events,
            vec![
                FocusEvent::SessionEnd {
                    kind: SessionKind::Break
                },
                FocusEvent::FocusCaptureRequested {
                    prefill: Some("Plan sprint".to_string())
                },
            ]
        );
        assert_eq!(engine.start(None), Transition::Refused(Refusal::FocusRequired));
    }

    #[test]
    fn reset_cycle_clears_focus_from_any_session() {
        let mut engine = FocusEngine::new(config(CycleMode::Three));
        assert!(engine.start(Some("Write")).is_applied());
        tick_times(&mut engine, 1510);
        assert_eq!(engine.session_index(), 1);

        engine.reset_cycle();
        assert_eq!(engine.phase(), FocusPhase::Idle);
        assert_eq!(engine.session_index(), 0);
        assert_eq!(engine.remaining_seconds(), 1500);
        assert_eq!(engine.focus(), None);
    }

    #[test]
    fn configure_while_idle_keeps_elapsed_time() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        assert!(engine.start(Some("Write")).is_applied());
        tick_times(&mut engine, 60);
        assert!(engine.pause().is_applied());

        engine.configure(CycleConfig {
            work_minutes: 50,
            ..config(CycleMode::Three)
        });
        assert_eq!(engine.cycle().len(), 6);
        assert_eq!(engine.remaining_seconds(), 50 * 60 - 60);
    }

    #[test]
    fn configure_while_running_waits_for_session_boundary() {
        let mut engine = FocusEngine::new(config(CycleMode::Four));
        assert!(engine.start(Some("Write")).is_applied());
        tick_times(&mut engine, 10);

        engine.configure(CycleConfig {
            short_break_minutes: 10,
            ..config(CycleMode::Four)
        });
        assert_eq!(engine.remaining_seconds(), 1490);
        assert_eq!(engine.cycle()[1].duration_minutes(), 5);

        tick_times(&mut engine, 1490);
        assert_eq!(engine.session_index(), 1);
        assert_eq!(engine.remaining_seconds(), 600);
    }

    #[test]
    fn shrinking_the_cycle_clamps_the_session_index() {
        let mut engine = FocusEngine::new(config(CycleMode::Five));
        engine.configure(config(CycleMode::Three));
        assert_eq!(engine.cycle().len(), 6);
        assert_eq!(engine.session_index(), 0);
        assert_eq!(engine.remaining_seconds(), 1500);
    }

    #[test]
    fn pending_shrink_past_the_current_index_completes_the_cycle() {
        let one_minute = CycleConfig {
            mode: CycleMode::Four,
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
        };
        let mut engine = FocusEngine::new(one_minute);
        for index in 0..6 {
            if engine.cycle()[index].kind == SessionKind::Work {
                assert!(engine.start(Some("Migrate db")).is_applied());
            }
            tick_times(&mut engine, 60);
        }
        assert!(engine.start(Some("Migrate db")).is_applied());
        assert_eq!(engine.session_index(), 6);
        tick_times(&mut engine, 30);

        engine.configure(CycleConfig {
            mode: CycleMode::Three,
            ..one_minute
        });
        assert_eq!(engine.cycle().len(), 8);
        assert_eq!(engine.remaining_seconds(), 30);

        let events = tick_times(&mut engine, 30);
        assert_eq!(
            events,
            vec![
                FocusEvent::SessionEnd {
                    kind: SessionKind::Work
                },
                FocusEvent::CycleComplete,
                FocusEvent::FocusCaptureRequested {
                    prefill: Some("Migrate db".to_string())
                },
            ]
        );
        assert_eq!(engine.cycle().len(), 6);
        assert_eq!(engine.session_index(), 0);
        assert_eq!(engine.phase(), FocusPhase::Idle);
        assert_eq!(engine.remaining_seconds(), 60);
        assert_eq!(engine.summary().completed_cycles, 1);
    }

    #[test]
    fn completed_sessions_are_stamped_with_the_clock() {
        let finished = DateTime::parse_from_rfc3339("2026-02-16T09:25:00Z")
            .expect("valid datetime")
            .with_timezone(&Utc);
        let mut engine = FocusEngine::new(CycleConfig {
            work_minutes: 1,
            ..config(CycleMode::Three)
        })
        .with_now_provider(Arc::new(move || finished));

        assert!(engine.start(Some("Outline talk")).is_applied());
        tick_times(&mut engine, 60);

        assert_eq!(
            engine.history(),
            &[CompletedSession {
                index: 0,
                kind: SessionKind::Work,
                focus: Some("Outline talk".to_string()),
                duration_seconds: 60,
                finished_at: finished,
            }]
        );
    }

    #[test]
    fn snapshot_reports_progress_fraction() {
        let mut engine = FocusEngine::new(CycleConfig {
            work_minutes: 1,
            ..config(CycleMode::Three)
        });
        assert!(engine.start(Some("Stretch")).is_applied());
        tick_times(&mut engine, 15);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.phase, "running");
        assert_eq!(snapshot.display, "00:45");
        assert!((snapshot.progress - 0.25).abs() < f64::EPSILON);
    }

    fn mode_strategy() -> impl Strategy<Value = CycleMode> {
        prop::sample::select(vec![CycleMode::Three, CycleMode::Four, CycleMode::Five])
    }

    proptest! {
        #[test]
        fn cycle_alternates_and_ends_with_long_break(
            mode in mode_strategy(),
            work in 1u32..120,
            short in 1u32..60,
            long in 1u32..90,
        ) {
            let cycle = build_cycle(mode, work, short, long);
            prop_assert_eq!(cycle.len(), mode.repetitions() * 2);
            for (index, session) in cycle.iter().enumerate() {
                if index % 2 == 0 {
                    prop_assert_eq!(session.kind, SessionKind::Work);
                    prop_assert_eq!(session.duration_seconds, work * 60);
                } else if index + 1 == cycle.len() {
                    prop_assert_eq!(session.kind, SessionKind::Break);
                    prop_assert_eq!(session.duration_seconds, long * 60);
                } else {
                    prop_assert_eq!(session.kind, SessionKind::Break);
                    prop_assert_eq!(session.duration_seconds, short * 60);
                }
            }
        }

        #[test]
        fn pause_preserves_remaining(work in 1u32..60, elapsed_fraction in 0.0f64..1.0) {
            let mut engine = FocusEngine::new(CycleConfig {
                work_minutes: work,
                ..config(CycleMode::Four)
            });
            let total = work * 60;
            let ticks = ((f64::from(total) * elapsed_fraction) as u32).min(total - 1);
            prop_assert!(engine.start(Some("focus")).is_applied());
            tick_times(&mut engine, ticks);
            prop_assert!(engine.pause().is_applied());
            prop_assert_eq!(engine.remaining_seconds(), total - ticks);
            engine.reset_session();
            prop_assert_eq!(engine.remaining_seconds(), total);
        }
    }
}
