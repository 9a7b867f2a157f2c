//! Chooses the visual path the clock hand takes between two segments.
//!
//! The hand only ever moves one segment per action, so the reachable moves are the twelve
//! adjacent directed pairs plus the long-way variants of the `twilight`/`dusk` wrap. Every
//! reachable move has a named animation; anything else falls back to a plain rotation.

use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// One-step move with its own named animation.
    Direct,
    /// Long-way path around the dial for the 5 ↔ 0 pair.
    Wrap,
    /// No named animation: snap, or use the fallback rotation.
    None,
}

/// What the animator should play to reach `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub kind: TransitionKind,
    pub animation_id: Option<&'static str>,
    pub final_rotation_degrees: u16,
}

/// One animation id per adjacent directed pair, indexed by segment index.
const ADJACENT_ANIMATIONS: [(usize, usize, &str); 12] = [
    (0, 1, "segment-0-to-1"),
    (0, 5, "segment-0-to-5"),
    (1, 0, "segment-1-to-0"),
    (1, 2, "segment-1-to-2"),
    (2, 1, "segment-2-to-1"),
    (2, 3, "segment-2-to-3"),
    (3, 2, "segment-3-to-2"),
    (3, 4, "segment-3-to-4"),
    (4, 3, "segment-4-to-3"),
    (4, 5, "segment-4-to-5"),
    (5, 4, "segment-5-to-4"),
    (5, 0, "segment-5-to-0"),
];

const WRAP_TWILIGHT_TO_DUSK: &str = "segment-5-to-0-wrap";
const WRAP_DUSK_TO_TWILIGHT: &str = "segment-0-to-5-wrap";

/// Named animation for an adjacent directed pair.
pub fn animation_id(from: Segment, to: Segment) -> Option<&'static str> {
    ADJACENT_ANIMATIONS
        .iter()
        .find(|(a, b, _)| *a == from.index() && *b == to.index())
        .map(|(_, _, id)| *id)
}

/// Plan a move using the raw index difference `to - from`.
pub fn plan(from: Option<Segment>, to: Segment) -> TransitionPlan {
    let difference = from.map_or(0, |from| to.index() as i32 - from.index() as i32);
    plan_with_difference(from, to, difference)
}

/// Plan a move with an explicit signed difference.
///
/// Only the `twilight`/`dusk` pair looks at `difference`: the short wrap is taken when it
/// equals the raw index difference (−5 for 5 → 0, +5 for 0 → 5) and the long way otherwise.
pub fn plan_with_difference(from: Option<Segment>, to: Segment, difference: i32) -> TransitionPlan {
    let none = TransitionPlan {
        kind: TransitionKind::None,
        animation_id: None,
        final_rotation_degrees: to.rotation_degrees(),
    };

    let Some(from) = from else {
        return none;
    };
    if from == to {
        return none;
    }

    let (kind, id) = match (from, to) {
        (Segment::Twilight, Segment::Dusk) if difference != -5 => {
            (TransitionKind::Wrap, Some(WRAP_TWILIGHT_TO_DUSK))
        }
        (Segment::Dusk, Segment::Twilight) if difference != 5 => {
            (TransitionKind::Wrap, Some(WRAP_DUSK_TO_TWILIGHT))
        }
        _ => match animation_id(from, to) {
            Some(id) => (TransitionKind::Direct, Some(id)),
            None => return none,
        },
    };

    TransitionPlan {
        kind,
        animation_id: id,
        ..none
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_adjacent_pair_has_direct_animation() {
        for from in Segment::ALL {
            for to in [from.next(), from.previous()] {
                let plan = plan(Some(from), to);
                assert_eq!(plan.kind, TransitionKind::Direct, "{from} -> {to}");
                assert!(plan.animation_id.is_some(), "{from} -> {to}");
                assert_eq!(plan.final_rotation_degrees, to.rotation_degrees());
            }
        }
    }

    #[test]
    fn test_adjacency_table_is_exhaustive() {
        let pairs: usize = Segment::ALL
            .iter()
            .map(|from| {
                Segment::ALL
                    .iter()
                    .filter(|to| from.is_adjacent(**to))
                    .filter(|to| animation_id(*from, **to).is_some())
                    .count()
            })
            .sum();
        assert_eq!(pairs, ADJACENT_ANIMATIONS.len());
    }

    #[test]
    fn test_wrap_pair_short_way() {
        let forward = plan(Some(Segment::Twilight), Segment::Dusk);
        assert_eq!(forward.kind, TransitionKind::Direct);
        assert_eq!(forward.animation_id, Some("segment-5-to-0"));
        assert_eq!(forward.final_rotation_degrees, 0);

        let backward = plan(Some(Segment::Dusk), Segment::Twilight);
        assert_eq!(backward.kind, TransitionKind::Direct);
        assert_eq!(backward.animation_id, Some("segment-0-to-5"));
        assert_eq!(backward.final_rotation_degrees, 300);
    }

    #[test]
    fn test_wrap_pair_long_way() {
        let long = plan_with_difference(Some(Segment::Twilight), Segment::Dusk, 1);
        assert_eq!(long.kind, TransitionKind::Wrap);
        assert_eq!(long.animation_id, Some("segment-5-to-0-wrap"));

        let long = plan_with_difference(Some(Segment::Dusk), Segment::Twilight, -1);
        assert_eq!(long.kind, TransitionKind::Wrap);
        assert_eq!(long.animation_id, Some("segment-0-to-5-wrap"));
    }

    #[test]
    fn test_no_animation_without_movement() {
        let initial = plan(None, Segment::Midnight);
        assert_eq!(initial.kind, TransitionKind::None);
        assert_eq!(initial.final_rotation_degrees, 180);

        let same = plan(Some(Segment::Evening), Segment::Evening);
        assert_eq!(same.kind, TransitionKind::None);
        assert_eq!(same.animation_id, None);
    }

    #[test]
    fn test_non_adjacent_pair_falls_back() {
        let jump = plan(Some(Segment::Dusk), Segment::Midnight);
        assert_eq!(jump.kind, TransitionKind::None);
        assert_eq!(jump.animation_id, None);
        assert_eq!(jump.final_rotation_degrees, 180);
    }
}
