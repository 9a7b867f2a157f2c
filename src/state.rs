//! Clock state and the night-counter rules.
//!
//! Moving forward into the increment segment starts a new night. Moving backward into the
//! segment just before it undoes that, but the counter never drops below the first night.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::MINIMUM_NIGHT;
use crate::segment::Segment;

/// Direction of a single clock step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Signed segment offset: `+1` or `-1`.
    pub fn offset(self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }

    /// Only `+1` and `-1` are valid clock steps.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            1 => Some(Direction::Forward),
            -1 => Some(Direction::Backward),
            _ => None,
        }
    }
}

/// Shared clock state as persisted in the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub current_segment: Segment,
    pub current_night: u32,
    pub visible: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            current_segment: Segment::Dusk,
            current_night: MINIMUM_NIGHT,
            visible: true,
        }
    }
}

impl ClockState {
    /// State after moving one segment in `direction`.
    pub fn step(&self, direction: Direction, increment_segment: Segment) -> ClockState {
        let current_segment = self.current_segment.offset(direction.offset());
        ClockState {
            current_segment,
            current_night: night_after_step(
                self.current_night,
                current_segment,
                direction,
                increment_segment,
            ),
            visible: self.visible,
        }
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (night {}, {})",
            self.current_segment.title(),
            self.current_night,
            if self.visible { "visible" } else { "hidden" }
        )
    }
}

/// Night counter after the clock arrived at `new_segment` by moving in `direction`.
pub fn night_after_step(
    night: u32,
    new_segment: Segment,
    direction: Direction,
    increment_segment: Segment,
) -> u32 {
    let night = clamp_night(night);
    match direction {
        Direction::Forward if new_segment == increment_segment => night.saturating_add(1),
        Direction::Backward if new_segment == increment_segment.previous() => {
            clamp_night(night - 1)
        }
        _ => night,
    }
}

/// Floor a night value at the first night.
pub fn clamp_night(night: u32) -> u32 {
    night.max(MINIMUM_NIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(segment: Segment, night: u32) -> ClockState {
        ClockState {
            current_segment: segment,
            current_night: night,
            visible: true,
        }
    }

    #[test]
    fn test_forward_into_increment_segment_starts_new_night() {
        let next = state(Segment::Twilight, 3).step(Direction::Forward, Segment::Dusk);
        assert_eq!(next.current_segment, Segment::Dusk);
        assert_eq!(next.current_night, 4);
    }

    #[test]
    fn test_backward_before_increment_segment_undoes_night() {
        let previous = state(Segment::Dusk, 4).step(Direction::Backward, Segment::Dusk);
        assert_eq!(previous.current_segment, Segment::Twilight);
        assert_eq!(previous.current_night, 3);
    }

    #[test]
    fn test_night_never_drops_below_one() {
        let previous = state(Segment::Midnight, 1).step(Direction::Backward, Segment::Midnight);
        assert_eq!(previous.current_segment, Segment::Evening);
        assert_eq!(previous.current_night, 1);
    }

    #[test]
    fn test_full_cycle_counts_one_night_and_reverses() {
        let increment = Segment::Midnight;
        let mut current = state(Segment::Midnight, 1);

        for _ in 0..6 {
            current = current.step(Direction::Forward, increment);
        }
        assert_eq!(current, state(Segment::Midnight, 2));

        for _ in 0..6 {
            current = current.step(Direction::Backward, increment);
            assert!(current.current_night >= 1);
        }
        assert_eq!(current, state(Segment::Midnight, 1));
    }

    #[test]
    fn test_other_segments_leave_night_alone() {
        let next = state(Segment::Dusk, 2).step(Direction::Forward, Segment::Midnight);
        assert_eq!(next.current_night, 2);
        let previous = state(Segment::Witching, 2).step(Direction::Backward, Segment::Midnight);
        assert_eq!(previous.current_night, 2);
    }

    #[test]
    fn test_direction_offsets() {
        assert_eq!(Direction::from_offset(1), Some(Direction::Forward));
        assert_eq!(Direction::from_offset(-1), Some(Direction::Backward));
        assert_eq!(Direction::from_offset(2), None);
        assert_eq!(Direction::Backward.offset(), -1);
    }
}
