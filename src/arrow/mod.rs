//! Clock-hand animation: path planning and the timed transition sequence.

pub mod animator;
pub mod planner;

pub use animator::{
    AnimationTimings, ArrowAnimator, ArrowEffect, ArrowEvent, ArrowSurface, OnComplete,
    RecordingArrow,
};
pub use planner::{TransitionKind, TransitionPlan, plan, plan_with_difference};
