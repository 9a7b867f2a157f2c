//! The six-segment night cycle.
//!
//! Segments are ordered and cyclic: `twilight` is followed by `dusk`. Each segment maps to
//! a clock-hand angle of `index * 60` degrees.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEGREES_PER_SEGMENT, SEGMENT_COUNT};

/// One slice of the in-fiction night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Dusk,
    Nightfall,
    Evening,
    Midnight,
    Witching,
    Twilight,
}

impl Segment {
    /// All segments in cycle order.
    pub const ALL: [Segment; SEGMENT_COUNT] = [
        Segment::Dusk,
        Segment::Nightfall,
        Segment::Evening,
        Segment::Midnight,
        Segment::Witching,
        Segment::Twilight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Symbolic name used in settings keys and choices.
    pub fn name(self) -> &'static str {
        match self {
            Segment::Dusk => "dusk",
            Segment::Nightfall => "nightfall",
            Segment::Evening => "evening",
            Segment::Midnight => "midnight",
            Segment::Witching => "witching",
            Segment::Twilight => "twilight",
        }
    }

    /// Capitalized name for menus and logs.
    pub fn title(self) -> &'static str {
        match self {
            Segment::Dusk => "Dusk",
            Segment::Nightfall => "Nightfall",
            Segment::Evening => "Evening",
            Segment::Midnight => "Midnight",
            Segment::Witching => "Witching",
            Segment::Twilight => "Twilight",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|segment| segment.name() == name)
    }

    /// Move `steps` segments around the cycle; negative steps go backwards.
    pub fn offset(self, steps: i32) -> Self {
        let index = (self.index() as i32 + steps).rem_euclid(SEGMENT_COUNT as i32);
        Self::ALL[index as usize]
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    pub fn previous(self) -> Self {
        self.offset(-1)
    }

    /// Static clock-hand angle for this segment.
    pub fn rotation_degrees(self) -> u16 {
        self.index() as u16 * DEGREES_PER_SEGMENT
    }

    /// Whether `other` is one step away in either direction.
    pub fn is_adjacent(self, other: Segment) -> bool {
        self.next() == other || self.previous() == other
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Segment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some(segment) = Self::from_name(&lowered) {
            return Ok(segment);
        }
        // Numeric indices are accepted on the command line
        if let Ok(index) = lowered.parse::<usize>()
            && let Some(segment) = Self::from_index(index)
        {
            return Ok(segment);
        }
        anyhow::bail!(
            "unknown segment '{}' (expected one of: {})",
            s,
            Self::ALL.map(|segment| segment.name()).join(", ")
        )
    }
}

/// Index of the segment called `name`, if any.
pub fn index_of(name: &str) -> Option<usize> {
    Segment::from_name(name).map(Segment::index)
}

/// Name of the segment at `index`, if any.
pub fn name_of(index: usize) -> Option<&'static str> {
    Segment::from_index(index).map(Segment::name)
}
