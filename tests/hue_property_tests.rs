use nightclock::Segment;
use nightclock::arrow::{TransitionKind, plan, plan_with_difference};
use nightclock::lighting::{
    LightingEnvironment, ease_in_out_quad, hue_distance, lerp, lerp_hue, normalize_hue,
};
use proptest::prelude::*;

fn hue_strategy() -> impl Strategy<Value = f64> {
    0.0..1.0
}

fn progress_strategy() -> impl Strategy<Value = f64> {
    0.0..=1.0
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    (0usize..6).prop_map(|index| Segment::ALL[index])
}

fn environment_strategy() -> impl Strategy<Value = LightingEnvironment> {
    (hue_strategy(), -1.0..=1.0, -1.0..=1.0, 0.0..=1.0, 0.0..=1.0).prop_map(
        |(hue, luminosity, saturation, shadows, intensity)| LightingEnvironment {
            hue,
            luminosity,
            saturation,
            shadows,
            intensity,
        },
    )
}

proptest! {
    /// Hue interpolation stays on the circle and never travels the long way round
    #[test]
    fn test_lerp_hue_takes_shorter_arc(
        start in hue_strategy(),
        end in hue_strategy(),
        progress in progress_strategy()
    ) {
        let hue = lerp_hue(start, end, progress);
        prop_assert!((0.0..1.0).contains(&hue));

        let travelled = hue_distance(start, hue);
        let total = hue_distance(start, end);
        prop_assert!(total <= 0.5 + 1e-12);
        prop_assert!(travelled <= total + 1e-9, "{travelled} > {total}");
    }

    #[test]
    fn test_lerp_hue_endpoints(start in hue_strategy(), end in hue_strategy()) {
        prop_assert!(hue_distance(lerp_hue(start, end, 0.0), start) < 1e-12);
        prop_assert_eq!(lerp_hue(start, end, 1.0), normalize_hue(end));
    }

    #[test]
    fn test_lerp_hue_identity(hue in hue_strategy(), progress in progress_strategy()) {
        prop_assert!(hue_distance(lerp_hue(hue, hue, progress), hue) < 1e-12);
    }

    #[test]
    fn test_normalize_hue_range(hue in -10.0f64..10.0) {
        let normalized = normalize_hue(hue);
        prop_assert!((0.0..1.0).contains(&normalized));
    }

    #[test]
    fn test_lerp_endpoints_and_bounds(
        start in -1.0f64..=1.0,
        end in -1.0f64..=1.0,
        progress in progress_strategy()
    ) {
        prop_assert_eq!(lerp(start, end, 0.0), start);
        prop_assert_eq!(lerp(start, end, 1.0), end);

        let value = lerp(start, end, progress);
        prop_assert!(value >= start.min(end) - 1e-12);
        prop_assert!(value <= start.max(end) + 1e-12);
    }

    #[test]
    fn test_easing_is_monotonic(a in progress_strategy(), b in progress_strategy()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ease_in_out_quad(low) <= ease_in_out_quad(high) + 1e-12);
    }

    #[test]
    fn test_environment_interpolation_reaches_target(
        from in environment_strategy(),
        to in environment_strategy()
    ) {
        prop_assert!(from.interpolate(&to, 1.0).approx_eq(&to, 1e-9));
        prop_assert!(from.interpolate(&to, 0.0).approx_eq(&from, 1e-9));
    }

    /// Adjacent moves always get a direct animation ending on the target
    #[test]
    fn test_adjacent_moves_are_direct(from in segment_strategy(), forward in any::<bool>()) {
        let to = if forward { from.next() } else { from.previous() };
        let plan = plan(Some(from), to);
        prop_assert_eq!(plan.kind, TransitionKind::Direct);
        prop_assert_eq!(plan.final_rotation_degrees, to.rotation_degrees());
    }

    /// Non-adjacent moves snap
    #[test]
    fn test_far_moves_have_no_animation(from in segment_strategy(), to in segment_strategy()) {
        prop_assume!(from != to && !from.is_adjacent(to));
        let plan = plan(Some(from), to);
        prop_assert_eq!(plan.kind, TransitionKind::None);
        prop_assert_eq!(plan.animation_id, None);
    }

    #[test]
    fn test_wrap_only_for_twilight_dusk(
        from in segment_strategy(),
        to in segment_strategy(),
        difference in -6i32..=6
    ) {
        let plan = plan_with_difference(Some(from), to, difference);
        if plan.kind == TransitionKind::Wrap {
            prop_assert!(
                matches!(
                    (from, to),
                    (Segment::Twilight, Segment::Dusk) | (Segment::Dusk, Segment::Twilight)
                )
            );
        }
    }
}
