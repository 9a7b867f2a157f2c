//! Fixed-step interpolation of scene lighting between two segment baselines.
//!
//! A transition runs `steps` ticks spread evenly over `duration`. Each tick eases the
//! linear progress with a quadratic in-out curve, blends the environment and writes it to
//! the scene. Starting a new transition drops the running one on the spot: its remaining
//! ticks are cleared and its [`Completion`] reports [`CompletionState::Cancelled`].

use anyhow::Result;
use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Duration;

use super::{LightingEnvironment, Scene, ease_in_out_quad};
use crate::constants::{DEFAULT_INTERPOLATION_DURATION, DEFAULT_INTERPOLATION_STEPS};
use crate::timers::{TimerId, TimerSet};

/// How long a lighting transition takes and how many writes it makes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationTimings {
    pub duration: Duration,
    pub steps: u32,
}

impl Default for InterpolationTimings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(DEFAULT_INTERPOLATION_DURATION),
            steps: DEFAULT_INTERPOLATION_STEPS,
        }
    }
}

impl InterpolationTimings {
    /// Nominal time between two ticks (7.5 ms with the defaults).
    pub fn step_interval(&self) -> Duration {
        self.duration / self.steps.max(1)
    }

    /// Absolute deadline of tick `step` for a transition started at `started_at`.
    fn tick_deadline(&self, started_at: Duration, step: u32) -> Duration {
        let steps = self.steps.max(1);
        started_at + self.duration * step.min(steps) / steps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Pending,
    Done,
    /// Superseded by a newer transition or cleaned up before finishing.
    Cancelled,
}

/// Completion signal for one lighting transition.
#[derive(Debug)]
pub struct Completion {
    receiver: Receiver<()>,
    resolved: Cell<Option<CompletionState>>,
}

impl Completion {
    fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver,
            resolved: Cell::new(None),
        }
    }

    pub fn state(&self) -> CompletionState {
        if let Some(state) = self.resolved.get() {
            return state;
        }
        let state = match self.receiver.try_recv() {
            Ok(()) => CompletionState::Done,
            Err(TryRecvError::Empty) => return CompletionState::Pending,
            Err(TryRecvError::Disconnected) => CompletionState::Cancelled,
        };
        self.resolved.set(Some(state));
        state
    }

    pub fn is_done(&self) -> bool {
        self.state() == CompletionState::Done
    }
}

#[derive(Debug)]
struct InterpolationSession {
    from: LightingEnvironment,
    to: LightingEnvironment,
    step: u32,
    started_at: Duration,
    timer: TimerId,
    failed_writes: u32,
    done: Sender<()>,
}

/// Owns at most one running lighting transition.
#[derive(Debug)]
pub struct LightingInterpolator {
    timings: InterpolationTimings,
    timers: TimerSet<()>,
    session: Option<InterpolationSession>,
}

impl LightingInterpolator {
    pub fn new(timings: InterpolationTimings) -> Self {
        Self {
            timings,
            timers: TimerSet::new(),
            session: None,
        }
    }

    pub fn timings(&self) -> InterpolationTimings {
        self.timings
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Ticks applied so far by the running transition.
    pub fn current_step(&self) -> Option<u32> {
        self.session.as_ref().map(|session| session.step)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Start moving the scene towards `target`.
    ///
    /// Without a `source` environment the target is written once and the returned
    /// completion is already done; a failed write is returned as an error. With a source
    /// the interpolation is scheduled starting at `now` and driven by [`advance`].
    ///
    /// [`advance`]: Self::advance
    pub fn transition(
        &mut self,
        scene: &mut dyn Scene,
        target: LightingEnvironment,
        source: Option<LightingEnvironment>,
        now: Duration,
    ) -> Result<Completion> {
        self.cleanup();

        let (done, receiver) = mpsc::channel();

        let Some(from) = source else {
            scene.update_environment(&target)?;
            let _ = done.send(());
            return Ok(Completion::new(receiver));
        };

        let timer = self.timers.schedule(self.timings.tick_deadline(now, 1), ());
        self.session = Some(InterpolationSession {
            from,
            to: target,
            step: 0,
            started_at: now,
            timer,
            failed_writes: 0,
            done,
        });

        log_debug!(
            "Interpolating lighting over {}ms in {} steps",
            self.timings.duration.as_millis(),
            self.timings.steps
        );

        Ok(Completion::new(receiver))
    }

    /// Run every tick that is due at `now`. Returns the number of ticks applied.
    pub fn advance(&mut self, scene: &mut dyn Scene, now: Duration) -> usize {
        let steps = self.timings.steps.max(1);
        let mut ticks = 0;

        while let Some(fired) = self.timers.pop_due(now) {
            let Some(session) = self.session.as_mut() else {
                break;
            };
            if session.timer != fired.id {
                continue;
            }

            session.step += 1;
            let progress = (f64::from(session.step) / f64::from(steps)).min(1.0);
            let environment = session
                .from
                .interpolate(&session.to, ease_in_out_quad(progress));

            if let Err(e) = scene.update_environment(&environment) {
                if session.failed_writes == 0 {
                    log_warning!("Could not update scene lighting: {}", e);
                }
                session.failed_writes += 1;
            }
            ticks += 1;

            if progress >= 1.0 {
                self.finish();
            } else {
                session.timer = self.timers.schedule(
                    self.timings
                        .tick_deadline(session.started_at, session.step + 1),
                    (),
                );
            }
        }

        ticks
    }

    fn finish(&mut self) {
        self.timers.clear();
        if let Some(session) = self.session.take() {
            if session.failed_writes > 0 {
                log_warning!(
                    "{} of {} lighting updates were rejected by the scene",
                    session.failed_writes,
                    session.step
                );
            }
            let _ = session.done.send(());
        }
    }

    /// Stop the running transition without finishing it.
    pub fn cleanup(&mut self) {
        self.timers.clear();
        if self.session.take().is_some() {
            log_debug!("Cancelled running lighting interpolation");
        }
    }
}

impl Default for LightingInterpolator {
    fn default() -> Self {
        Self::new(InterpolationTimings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::scene::{MemoryScene, MockScene};
    use crate::segment::Segment;

    fn env(segment: Segment) -> LightingEnvironment {
        LightingEnvironment::default_for(segment)
    }

    fn short_timings() -> InterpolationTimings {
        InterpolationTimings {
            duration: Duration::from_millis(100),
            steps: 10,
        }
    }

    #[test]
    fn test_default_step_interval() {
        let timings = InterpolationTimings::default();
        assert_eq!(timings.step_interval(), Duration::from_micros(7500));
    }

    #[test]
    fn test_immediate_write_without_source() {
        let mut mock = MockScene::new();
        let target = env(Segment::Midnight);
        mock.expect_update_environment()
            .withf(move |written| *written == target)
            .times(1)
            .returning(|_| Ok(()));

        let mut interpolator = LightingInterpolator::new(short_timings());
        let completion = interpolator
            .transition(&mut mock, target, None, Duration::ZERO)
            .unwrap();

        assert!(completion.is_done());
        assert!(!interpolator.is_running());
    }

    #[test]
    fn test_immediate_write_failure_is_returned() {
        let mut mock = MockScene::new();
        mock.expect_update_environment()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("no active scene")));

        let mut interpolator = LightingInterpolator::new(short_timings());
        let result = interpolator.transition(&mut mock, env(Segment::Dusk), None, Duration::ZERO);
        assert!(result.is_err());
    }

    #[test]
    fn test_runs_to_completion_and_lands_on_target() {
        let handle = MemoryScene::new();
        let mut scene = handle.clone();
        let from = env(Segment::Twilight);
        let to = env(Segment::Dusk);

        let mut interpolator = LightingInterpolator::new(short_timings());
        let completion = interpolator
            .transition(&mut scene, to, Some(from), Duration::ZERO)
            .unwrap();

        assert_eq!(interpolator.next_deadline(), Some(Duration::from_millis(10)));
        assert_eq!(interpolator.advance(&mut scene, Duration::from_millis(55)), 5);
        assert_eq!(completion.state(), CompletionState::Pending);

        assert_eq!(interpolator.advance(&mut scene, Duration::from_millis(100)), 5);
        assert!(completion.is_done());
        assert!(completion.is_done(), "state is cached once resolved");
        assert!(!interpolator.is_running());

        let writes = handle.writes();
        assert_eq!(writes.len(), 10);
        assert_eq!(*writes.last().unwrap(), to);
        // Twilight (0.886) to dusk (0.075) crosses zero instead of sweeping back
        for write in &writes {
            assert!(write.hue >= 0.886611 - 1e-9 || write.hue <= 0.075 + 1e-9);
        }
    }

    #[test]
    fn test_new_transition_cancels_running_one() {
        let mut scene = MemoryScene::new();
        let mut interpolator = LightingInterpolator::new(short_timings());

        let first = interpolator
            .transition(
                &mut scene,
                env(Segment::Evening),
                Some(env(Segment::Nightfall)),
                Duration::ZERO,
            )
            .unwrap();
        interpolator.advance(&mut scene, Duration::from_millis(30));
        assert_eq!(interpolator.current_step(), Some(3));

        let second = interpolator
            .transition(
                &mut scene,
                env(Segment::Midnight),
                Some(env(Segment::Evening)),
                Duration::from_millis(30),
            )
            .unwrap();

        assert_eq!(first.state(), CompletionState::Cancelled);
        assert_eq!(interpolator.current_step(), Some(0));

        interpolator.advance(&mut scene, Duration::from_millis(130));
        assert!(second.is_done());
        assert_eq!(scene.last_write(), Some(env(Segment::Midnight)));
    }

    #[test]
    fn test_write_failures_do_not_stop_the_loop() {
        let handle = MemoryScene::new();
        let mut scene = handle.clone();
        handle.reject_next(4);

        let mut interpolator = LightingInterpolator::new(short_timings());
        let completion = interpolator
            .transition(
                &mut scene,
                env(Segment::Witching),
                Some(env(Segment::Midnight)),
                Duration::ZERO,
            )
            .unwrap();

        assert_eq!(interpolator.advance(&mut scene, Duration::from_secs(1)), 10);
        assert!(completion.is_done());
        assert_eq!(handle.write_count(), 6);
        assert_eq!(handle.last_write(), Some(env(Segment::Witching)));
    }

    #[test]
    fn test_cleanup_stops_writes() {
        let mut scene = MemoryScene::new();
        let mut interpolator = LightingInterpolator::new(short_timings());
        let completion = interpolator
            .transition(
                &mut scene,
                env(Segment::Dusk),
                Some(env(Segment::Twilight)),
                Duration::ZERO,
            )
            .unwrap();

        interpolator.cleanup();
        assert_eq!(interpolator.advance(&mut scene, Duration::from_secs(1)), 0);
        assert_eq!(scene.write_count(), 0);
        assert_eq!(completion.state(), CompletionState::Cancelled);
        assert_eq!(interpolator.next_deadline(), None);
    }
}
