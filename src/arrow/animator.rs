//! Timed arrow animation: named transition, then settle, then completion.
//!
//! Each stage is a timer in the animator's [`TimerSet`]. A stage only schedules the next
//! one when it fires, and starting a new transition clears every pending stage first, so
//! a superseded session can never touch the surface again or run its callback.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::planner::{self, TransitionKind, TransitionPlan};
use crate::constants::{DEFAULT_SETTLE_DURATION, DEFAULT_TRANSITION_DURATION};
use crate::segment::Segment;
use crate::timers::TimerSet;

/// Visual effect the animator asks the arrow surface to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrowEffect {
    /// Pre-built keyframe animation for one segment move.
    Named {
        animation_id: &'static str,
        duration: Duration,
    },
    /// Short vibration that comes to rest on `rotation_degrees`.
    Settle {
        rotation_degrees: u16,
        duration: Duration,
    },
    /// Generic eased rotation used when no named animation exists.
    SmoothRotate {
        rotation_degrees: u16,
        duration: Duration,
    },
}

/// The clock hand as the host renders it.
#[cfg_attr(test, mockall::automock)]
pub trait ArrowSurface {
    fn play(&mut self, effect: ArrowEffect);

    /// Stop whatever animation or transition is currently applied.
    fn clear_effects(&mut self);

    /// Set the static rotation of the hand.
    fn set_rotation(&mut self, degrees: u16);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTimings {
    pub transition: Duration,
    pub settle: Duration,
}

impl Default for AnimationTimings {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(DEFAULT_TRANSITION_DURATION),
            settle: Duration::from_millis(DEFAULT_SETTLE_DURATION),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Settle,
    Cleanup,
    FallbackDone,
}

pub type OnComplete = Box<dyn FnOnce()>;

struct AnimationSession {
    from: Segment,
    to: Segment,
    plan: TransitionPlan,
    on_complete: Option<OnComplete>,
}

impl fmt::Debug for AnimationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSession")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("plan", &self.plan)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

/// Plays at most one arrow transition at a time.
#[derive(Debug, Default)]
pub struct ArrowAnimator {
    timings: AnimationTimings,
    timers: TimerSet<Stage>,
    session: Option<AnimationSession>,
}

impl ArrowAnimator {
    pub fn new(timings: AnimationTimings) -> Self {
        Self {
            timings,
            timers: TimerSet::new(),
            session: None,
        }
    }

    pub fn timings(&self) -> AnimationTimings {
        self.timings
    }

    /// True from the start of a transition until its completion callback ran.
    pub fn is_animating(&self) -> bool {
        self.session.is_some()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Number of stages waiting to fire.
    pub fn pending_stages(&self) -> usize {
        self.timers.len()
    }

    /// Move the arrow from `from` to `to`, running `on_complete` once it has settled.
    ///
    /// A transition that is still running is cancelled first and its callback dropped.
    /// When there is nothing to animate the rotation is set and `on_complete` runs before
    /// this returns.
    pub fn play_transition(
        &mut self,
        surface: &mut dyn ArrowSurface,
        from: Option<Segment>,
        to: Segment,
        now: Duration,
        on_complete: OnComplete,
    ) {
        if self.is_animating() {
            log_debug!("Arrow transition superseded, cancelling running animation");
            self.cancel(surface);
        }

        let Some(from) = from.filter(|from| *from != to) else {
            surface.set_rotation(to.rotation_degrees());
            on_complete();
            return;
        };

        let plan = planner::plan(Some(from), to);
        let stage = match (plan.kind, plan.animation_id) {
            (TransitionKind::Direct | TransitionKind::Wrap, Some(animation_id)) => {
                surface.play(ArrowEffect::Named {
                    animation_id,
                    duration: self.timings.transition,
                });
                Stage::Settle
            }
            _ => {
                surface.play(ArrowEffect::SmoothRotate {
                    rotation_degrees: plan.final_rotation_degrees,
                    duration: self.timings.transition,
                });
                Stage::FallbackDone
            }
        };

        self.timers.schedule(now + self.timings.transition, stage);
        self.session = Some(AnimationSession {
            from,
            to,
            plan,
            on_complete: Some(on_complete),
        });
    }

    /// Animate when the displayed segment changed since the last render.
    ///
    /// Returns whether an animation was started.
    pub fn handle_arrow_update(
        &mut self,
        surface: &mut dyn ArrowSurface,
        previous: Option<Segment>,
        current: Segment,
        now: Duration,
    ) -> bool {
        let Some(previous) = previous.filter(|previous| *previous != current) else {
            return false;
        };

        self.play_transition(
            surface,
            Some(previous),
            current,
            now,
            Box::new(move || log_debug!("Arrow settled on {}", current)),
        );
        true
    }

    /// Fire every stage that is due at `now`. Returns the number of stages run.
    pub fn advance(&mut self, surface: &mut dyn ArrowSurface, now: Duration) -> usize {
        let mut fired_stages = 0;

        while let Some(fired) = self.timers.pop_due(now) {
            let Some(session) = self.session.as_ref() else {
                break;
            };
            let rotation_degrees = session.plan.final_rotation_degrees;
            fired_stages += 1;

            match fired.event {
                Stage::Settle => {
                    surface.play(ArrowEffect::Settle {
                        rotation_degrees,
                        duration: self.timings.settle,
                    });
                    self.timers
                        .schedule(fired.deadline + self.timings.settle, Stage::Cleanup);
                }
                Stage::Cleanup | Stage::FallbackDone => {
                    surface.clear_effects();
                    surface.set_rotation(rotation_degrees);
                    self.finish();
                }
            }
        }

        fired_stages
    }

    fn finish(&mut self) {
        self.timers.clear();
        if let Some(mut session) = self.session.take() {
            log_debug!(
                "Arrow transition {} -> {} finished",
                session.from,
                session.to
            );
            if let Some(on_complete) = session.on_complete.take() {
                on_complete();
            }
        }
    }

    /// Abort the running transition without calling its completion callback.
    pub fn cancel(&mut self, surface: &mut dyn ArrowSurface) {
        self.cleanup();
        surface.clear_effects();
    }

    /// Drop every pending stage and the running session.
    pub fn cleanup(&mut self) {
        self.timers.clear();
        self.session = None;
    }
}

/// Event recorded by [`RecordingArrow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrowEvent {
    Played(ArrowEffect),
    Cleared,
    Rotated(u16),
}

#[derive(Debug, Default)]
struct ArrowRecord {
    rotation: Option<u16>,
    events: Vec<ArrowEvent>,
}

/// Arrow surface that keeps a log of everything applied to it.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingArrow {
    record: Arc<Mutex<ArrowRecord>>,
}

impl RecordingArrow {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut ArrowRecord) -> T) -> T {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }

    /// Static rotation last set on the hand.
    pub fn rotation(&self) -> Option<u16> {
        self.with_record(|record| record.rotation)
    }

    pub fn events(&self) -> Vec<ArrowEvent> {
        self.with_record(|record| record.events.clone())
    }

    pub fn clear_events(&self) {
        self.with_record(|record| record.events.clear());
    }

    /// Named animations played so far, in order.
    pub fn animations(&self) -> Vec<&'static str> {
        self.with_record(|record| {
            record
                .events
                .iter()
                .filter_map(|event| match event {
                    ArrowEvent::Played(ArrowEffect::Named { animation_id, .. }) => {
                        Some(*animation_id)
                    }
                    _ => None,
                })
                .collect()
        })
    }
}

impl ArrowSurface for RecordingArrow {
    fn play(&mut self, effect: ArrowEffect) {
        self.with_record(|record| record.events.push(ArrowEvent::Played(effect)));
    }

    fn clear_effects(&mut self) {
        self.with_record(|record| record.events.push(ArrowEvent::Cleared));
    }

    fn set_rotation(&mut self, degrees: u16) {
        self.with_record(|record| {
            record.rotation = Some(degrees);
            record.events.push(ArrowEvent::Rotated(degrees));
        });
    }
}
