//! The clock state machine.
//!
//! [`ClockController`] owns the arrow animator and the lighting interpolator and drives
//! them from three inputs: user actions on the overlay, state-sync messages from other
//! participants, and settings changes. All collaborators are passed in through a
//! [`ClockHost`]; nothing here reaches for global state.
//!
//! Only the authoritative participant (the GM) changes the shared clock. Everyone else
//! follows the broadcasts. Privileged requests from a non-authoritative participant are
//! ignored without an error.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::arrow::{AnimationTimings, ArrowAnimator};
use crate::constants::SETTINGS_NAMESPACE;
use crate::i18n::Localizer;
use crate::lighting::{
    Completion, CompletionState, InterpolationTimings, LightingInterpolator, Scene,
};
use crate::segment::Segment;
use crate::settings::registry::CLOCK_VISIBLE;
use crate::settings::{ClockSettings, SettingChange, SettingChanges};
use crate::state::{ClockState, Direction, clamp_night};
use crate::sync::{Channel, ClockMessage};
use crate::time_source::TimeSource;
use crate::view::{OverlayView, UserAction, overlay_markup};

/// Participant role. Only the game master writes shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "gm")]
    GameMaster,
    #[serde(rename = "player")]
    Player,
}

impl Role {
    pub fn is_authoritative(self) -> bool {
        matches!(self, Role::GameMaster)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::GameMaster => "gm",
            Role::Player => "player",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the controller needs from the host.
pub struct ClockHost {
    pub role: Role,
    pub settings: ClockSettings,
    pub scene: Box<dyn Scene>,
    pub channel: Box<dyn Channel>,
    pub view: Box<dyn OverlayView>,
    pub localizer: Box<dyn Localizer>,
    pub time: Arc<dyn TimeSource>,
}

/// Durations of the two animations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockTimings {
    pub animation: AnimationTimings,
    pub interpolation: InterpolationTimings,
}

pub struct ClockController {
    host: ClockHost,
    animator: ArrowAnimator,
    interpolator: LightingInterpolator,
    previous_segment: Option<Segment>,
    changes: SettingChanges,
    lighting: Option<Completion>,
}

impl ClockController {
    pub fn new(host: ClockHost) -> Self {
        Self::with_timings(host, ClockTimings::default())
    }

    pub fn with_timings(mut host: ClockHost, timings: ClockTimings) -> Self {
        let changes = host.settings.subscribe();
        Self {
            host,
            animator: ArrowAnimator::new(timings.animation),
            interpolator: LightingInterpolator::new(timings.interpolation),
            previous_segment: None,
            changes,
            lighting: None,
        }
    }

    pub fn role(&self) -> Role {
        self.host.role
    }

    pub fn is_authoritative(&self) -> bool {
        self.host.role.is_authoritative()
    }

    pub fn state(&self) -> ClockState {
        self.host.settings.state()
    }

    pub fn settings(&self) -> &ClockSettings {
        &self.host.settings
    }

    pub fn settings_mut(&mut self) -> &mut ClockSettings {
        &mut self.host.settings
    }

    /// Segment the arrow was last drawn at.
    pub fn previous_segment(&self) -> Option<Segment> {
        self.previous_segment
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn is_interpolating(&self) -> bool {
        self.interpolator.is_running()
    }

    /// State of the most recent lighting change, if there was one.
    pub fn lighting_state(&self) -> Option<CompletionState> {
        self.lighting.as_ref().map(Completion::state)
    }

    fn now(&self) -> Duration {
        self.host.time.now()
    }

    /// Remember the stored segment as the arrow's starting point.
    pub fn initialize(&mut self) {
        let state = self.state();
        self.previous_segment = Some(state.current_segment);
        log_decorated!(
            "Clock initialized as {} at {}",
            if self.is_authoritative() {
                "GM"
            } else {
                "player"
            },
            state
        );
    }

    /// The host scene became available: show the overlay and apply the current lighting.
    pub fn on_scene_ready(&mut self) -> Result<()> {
        if self.host.settings.clock_visible() {
            self.render();
        }

        if self.is_authoritative() {
            let current = self.host.settings.current_segment();
            self.handle_lighting_change(current, None)?;
        }
        Ok(())
    }

    /// Mount the overlay if needed and bring it up to date.
    pub fn render(&mut self) {
        if !self.host.view.is_rendered() {
            let markup = overlay_markup(
                &self.state(),
                self.host.settings.clock_scale(),
                self.is_authoritative(),
                self.host.localizer.as_ref(),
            );
            self.host.view.render(&markup);
        }
        self.refresh();
    }

    /// Update the arrow and the night text from the stored state.
    ///
    /// The arrow animates from the segment it was last drawn at. While the overlay is
    /// closed nothing is drawn, so the arrow simply starts from the current segment the
    /// next time it is shown.
    pub fn refresh(&mut self) {
        let state = self.state();

        if self.host.view.is_rendered() {
            let now = self.now();
            self.animator.handle_arrow_update(
                self.host.view.arrow(),
                self.previous_segment,
                state.current_segment,
                now,
            );
            self.host.view.set_night(state.current_night);
        }
        self.previous_segment = Some(state.current_segment);
    }

    /// Step the clock one segment. Ignored unless authoritative.
    pub fn change_time(&mut self, direction: Direction) -> Result<()> {
        if !self.is_authoritative() {
            log_debug!("Ignoring time change: not the GM");
            return Ok(());
        }

        let current = self.state();
        let increment_segment = self.host.settings.night_increment_segment();
        let next = current.step(direction, increment_segment);

        self.host.settings.set_current_segment(next.current_segment)?;
        self.host.settings.set_current_night(next.current_night)?;

        if let Err(e) =
            self.handle_lighting_change(next.current_segment, Some(current.current_segment))
        {
            log_warning!("Lighting change failed: {}", e);
        }

        self.broadcast(ClockMessage::UpdateTime {
            segment: next.current_segment.index() as u8,
            night: next.current_night,
        });

        log_decorated!(
            "{} → {} (night {})",
            current.current_segment.title(),
            next.current_segment.title(),
            next.current_night
        );

        self.refresh();
        Ok(())
    }

    /// Set the night counter by hand. Ignored unless authoritative.
    pub fn edit_night(&mut self, night: u32) -> Result<()> {
        if !self.is_authoritative() {
            log_debug!("Ignoring night edit: not the GM");
            return Ok(());
        }

        let night = clamp_night(night);
        if night == self.host.settings.current_night() {
            return Ok(());
        }

        self.host.settings.set_current_night(night)?;
        self.broadcast(ClockMessage::UpdateNight { night });
        log_decorated!("Night counter set to {}", night);

        self.refresh();
        Ok(())
    }

    /// Show or hide the overlay for this participant.
    pub fn toggle_visibility(&mut self) -> Result<()> {
        let visible = self.host.settings.clock_visible();
        self.host.settings.set_clock_visible(!visible)?;
        self.apply_visibility(!visible);
        Ok(())
    }

    fn apply_visibility(&mut self, visible: bool) {
        if visible {
            self.render();
        } else if self.host.view.is_rendered() {
            self.animator.cancel(self.host.view.arrow());
            self.host.view.close();
        }
    }

    pub fn handle_action(&mut self, action: UserAction) -> Result<()> {
        match action {
            UserAction::PreviousTime => self.change_time(Direction::Backward),
            UserAction::NextTime => self.change_time(Direction::Forward),
            UserAction::EditNight(night) => self.edit_night(night),
            UserAction::ToggleVisibility => self.toggle_visibility(),
        }
    }

    /// Interpolate the scene lighting from `old`'s baseline to `new`'s.
    ///
    /// Does nothing unless lighting integration is enabled and this participant is
    /// authoritative. Without `old` the new baseline is applied in a single write, and a
    /// failure of that write is returned.
    pub fn handle_lighting_change(&mut self, new: Segment, old: Option<Segment>) -> Result<()> {
        if !self.host.settings.lighting_integration() || !self.is_authoritative() {
            return Ok(());
        }

        let Some(target) = self.host.settings.environment_of(new.index()) else {
            return Ok(());
        };
        let source = old.and_then(|old| self.host.settings.environment_of(old.index()));

        let now = self.now();
        let completion =
            self.interpolator
                .transition(self.host.scene.as_mut(), target, source, now)?;
        self.lighting = Some(completion);
        Ok(())
    }

    /// React to a state-sync message from another participant.
    pub fn handle_message(&mut self, message: ClockMessage) -> Result<()> {
        match message {
            ClockMessage::UpdateTime { segment, night } => {
                if self.is_authoritative() {
                    // The GM is the only sender of time updates
                    log_debug!("Ignoring time update echo");
                    return Ok(());
                }
                let Some(segment) = Segment::from_index(usize::from(segment)) else {
                    anyhow::bail!("time update with invalid segment {}", segment);
                };

                let old = self.host.settings.current_segment();
                self.host.settings.set_current_segment(segment)?;
                self.host.settings.set_current_night(night)?;
                self.refresh();
                self.handle_lighting_change(segment, Some(old))?;
            }
            ClockMessage::UpdateNight { night } => {
                self.host.settings.set_current_night(night)?;
                self.refresh();
            }
        }
        Ok(())
    }

    /// Decode a raw channel payload and handle it.
    pub fn handle_json(&mut self, raw: &str) -> Result<()> {
        let message = ClockMessage::from_json(raw)?;
        self.handle_message(message)
    }

    fn broadcast(&mut self, message: ClockMessage) {
        if let Err(e) = self.host.channel.emit(&message) {
            log_warning!("Could not broadcast clock update: {}", e);
        }
    }

    /// Process settings changes and every timer that is due. Returns the number of
    /// animation stages and lighting ticks run.
    pub fn advance(&mut self) -> usize {
        let changes: Vec<SettingChange> = self
            .changes
            .try_iter()
            .filter(|change| change.namespace == SETTINGS_NAMESPACE)
            .collect();

        if let Some(visibility) = changes.iter().rev().find(|change| change.key == CLOCK_VISIBLE) {
            let visible = visibility.value.as_bool().unwrap_or(true);
            if visible != self.host.view.is_rendered() {
                self.apply_visibility(visible);
            }
        }
        if changes.iter().any(|change| change.key != CLOCK_VISIBLE) {
            self.refresh();
        }

        let now = self.now();
        self.animator.advance(self.host.view.arrow(), now)
            + self.interpolator.advance(self.host.scene.as_mut(), now)
    }

    /// Earliest pending animation or lighting deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.animator.next_deadline(), self.interpolator.next_deadline()) {
            (Some(arrow), Some(lighting)) => Some(arrow.min(lighting)),
            (arrow, lighting) => arrow.or(lighting),
        }
    }

    /// Stop both animations and close the overlay.
    pub fn shutdown(&mut self) {
        self.animator.cleanup();
        self.interpolator.cleanup();
        if self.host.view.is_rendered() {
            self.host.view.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::EnglishLocalizer;
    use crate::lighting::LightingEnvironment;
    use crate::lighting::scene::MemoryScene;
    use crate::settings::{FileSettingsStore, MemorySettingsStore};
    use crate::sync::MockChannel;
    use crate::time_source::ManualTimeSource;
    use crate::view::RecordingView;

    struct Harness {
        controller: ClockController,
        scene: MemoryScene,
        view: RecordingView,
        time: Arc<ManualTimeSource>,
    }

    fn harness(role: Role, channel: MockChannel, setup: impl FnOnce(&mut ClockSettings)) -> Harness {
        let mut settings = ClockSettings::new(Box::new(MemorySettingsStore::new()));
        setup(&mut settings);

        let scene = MemoryScene::new();
        let view = RecordingView::new();
        let time = Arc::new(ManualTimeSource::new());
        let host = ClockHost {
            role,
            settings,
            scene: Box::new(scene.clone()),
            channel: Box::new(channel),
            view: Box::new(view.clone()),
            localizer: Box::new(EnglishLocalizer),
            time: time.clone(),
        };

        let mut controller = ClockController::new(host);
        controller.initialize();
        Harness {
            controller,
            scene,
            view,
            time,
        }
    }

    fn silent_channel() -> MockChannel {
        let mut channel = MockChannel::new();
        channel.expect_emit().returning(|_| Ok(()));
        channel
    }

    #[test]
    fn test_forward_step_wraps_and_broadcasts() {
        let mut channel = MockChannel::new();
        channel
            .expect_emit()
            .withf(|message| {
                *message
                    == ClockMessage::UpdateTime {
                        segment: 0,
                        night: 4,
                    }
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut h = harness(Role::GameMaster, channel, |settings| {
            settings.set_current_segment(Segment::Twilight).unwrap();
            settings.set_current_night(3).unwrap();
            settings.set_night_increment_segment(Segment::Dusk).unwrap();
        });

        h.controller.change_time(Direction::Forward).unwrap();

        let state = h.controller.state();
        assert_eq!(state.current_segment, Segment::Dusk);
        assert_eq!(state.current_night, 4);
    }

    #[test]
    fn test_backward_step_undoes_night() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_current_segment(Segment::Dusk).unwrap();
            settings.set_current_night(4).unwrap();
            settings.set_night_increment_segment(Segment::Dusk).unwrap();
        });

        h.controller.render();
        h.controller.change_time(Direction::Backward).unwrap();

        assert_eq!(h.controller.previous_segment(), Some(Segment::Twilight));
        assert_eq!(h.controller.state().current_segment, Segment::Twilight);
        assert_eq!(h.controller.state().current_night, 3);
        assert_eq!(h.view.arrow_handle().animations(), vec!["segment-0-to-5"]);
    }

    #[test]
    fn test_player_cannot_change_time() {
        let mut channel = MockChannel::new();
        channel.expect_emit().never();

        let mut h = harness(Role::Player, channel, |_| {});
        h.controller.change_time(Direction::Forward).unwrap();
        h.controller.edit_night(5).unwrap();

        assert_eq!(h.controller.state(), ClockState::default());
    }

    #[test]
    fn test_unsaved_step_is_not_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        std::fs::write(&blocker, "").unwrap();
        let store = FileSettingsStore::open(blocker.join("settings.toml")).unwrap();

        let mut channel = MockChannel::new();
        channel.expect_emit().never();

        let host = ClockHost {
            role: Role::GameMaster,
            settings: ClockSettings::new(Box::new(store)),
            scene: Box::new(MemoryScene::new()),
            channel: Box::new(channel),
            view: Box::new(RecordingView::new()),
            localizer: Box::new(EnglishLocalizer),
            time: Arc::new(ManualTimeSource::new()),
        };
        let mut controller = ClockController::new(host);
        controller.initialize();

        assert!(controller.change_time(Direction::Forward).is_err());
        assert_eq!(controller.state(), ClockState::default());
        assert_eq!(controller.previous_segment(), Some(Segment::Dusk));
    }

    #[test]
    fn test_broadcast_failure_is_not_fatal() {
        let mut channel = MockChannel::new();
        channel
            .expect_emit()
            .returning(|_| Err(anyhow::anyhow!("socket closed")));

        let mut h = harness(Role::GameMaster, channel, |_| {});
        h.controller.change_time(Direction::Forward).unwrap();
        assert_eq!(h.controller.state().current_segment, Segment::Nightfall);
    }

    #[test]
    fn test_lighting_interpolates_when_enabled() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
        });

        h.controller.change_time(Direction::Forward).unwrap();
        assert!(h.controller.is_interpolating());
        assert_eq!(h.controller.lighting_state(), Some(CompletionState::Pending));

        h.time.advance(Duration::from_secs(8));
        h.controller.advance();

        assert_eq!(h.controller.lighting_state(), Some(CompletionState::Done));
        assert_eq!(h.scene.write_count(), 1000);
        assert_eq!(
            h.scene.last_write(),
            Some(LightingEnvironment::default_for(Segment::Nightfall))
        );
    }

    #[test]
    fn test_rapid_steps_supersede_lighting() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
        });

        h.controller.change_time(Direction::Forward).unwrap();
        h.time.advance(Duration::from_millis(750));
        h.controller.advance();
        h.controller.change_time(Direction::Forward).unwrap();
        h.time.advance(Duration::from_secs(8));
        h.controller.advance();

        assert_eq!(h.scene.write_count(), 100 + 1000);
        assert_eq!(
            h.scene.last_write(),
            Some(LightingEnvironment::default_for(Segment::Evening))
        );
    }

    #[test]
    fn test_lighting_disabled_or_player_never_writes() {
        let mut h = harness(Role::GameMaster, silent_channel(), |_| {});
        h.controller.change_time(Direction::Forward).unwrap();
        h.controller.on_scene_ready().unwrap();
        assert_eq!(h.scene.write_count(), 0);

        let mut h = harness(Role::Player, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
        });
        h.controller
            .handle_message(ClockMessage::UpdateTime {
                segment: 2,
                night: 1,
            })
            .unwrap();
        assert_eq!(h.scene.write_count(), 0);
        assert_eq!(h.controller.state().current_segment, Segment::Evening);
    }

    #[test]
    fn test_scene_ready_applies_lighting_once() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
            settings.set_current_segment(Segment::Midnight).unwrap();
        });

        h.controller.on_scene_ready().unwrap();
        assert!(h.view.is_rendered());
        assert_eq!(
            h.scene.writes(),
            vec![LightingEnvironment::default_for(Segment::Midnight)]
        );
        assert_eq!(h.controller.lighting_state(), Some(CompletionState::Done));
    }

    #[test]
    fn test_scene_ready_surfaces_immediate_write_failure() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
        });
        h.scene.set_active(false);

        assert!(h.controller.on_scene_ready().is_err());
    }

    #[test]
    fn test_gm_ignores_time_echo() {
        let mut h = harness(Role::GameMaster, silent_channel(), |_| {});
        h.controller
            .handle_message(ClockMessage::UpdateTime {
                segment: 4,
                night: 9,
            })
            .unwrap();
        assert_eq!(h.controller.state(), ClockState::default());
    }

    #[test]
    fn test_player_follows_updates_and_animates() {
        let mut h = harness(Role::Player, silent_channel(), |_| {});
        h.controller.render();

        h.controller
            .handle_json(r#"{"action":"updateTime","segment":1,"night":2}"#)
            .unwrap();
        assert_eq!(h.controller.state().current_segment, Segment::Nightfall);
        assert_eq!(h.view.night(), Some(2));
        assert!(h.controller.is_animating());

        h.time.advance(Duration::from_millis(2100));
        h.controller.advance();
        assert!(!h.controller.is_animating());
        assert_eq!(h.view.arrow_handle().rotation(), Some(60));

        h.controller
            .handle_message(ClockMessage::UpdateNight { night: 0 })
            .unwrap();
        assert_eq!(h.controller.state().current_night, 1);
        assert!(
            h.controller
                .handle_json(r#"{"action":"updateTime","segment":7,"night":1}"#)
                .is_err()
        );
    }

    #[test]
    fn test_edit_night_broadcasts_clamped_value() {
        let mut channel = MockChannel::new();
        channel
            .expect_emit()
            .withf(|message| *message == ClockMessage::UpdateNight { night: 5 })
            .times(1)
            .returning(|_| Ok(()));

        let mut h = harness(Role::GameMaster, channel, |_| {});
        h.controller.handle_action(UserAction::EditNight(5)).unwrap();
        // Same value again is a no-op
        h.controller.handle_action(UserAction::EditNight(5)).unwrap();
        assert_eq!(h.controller.state().current_night, 5);
    }

    #[test]
    fn test_toggle_visibility_closes_and_reopens() {
        let mut h = harness(Role::Player, silent_channel(), |_| {});
        h.controller.render();

        h.controller.handle_action(UserAction::ToggleVisibility).unwrap();
        assert!(!h.view.is_rendered());
        assert!(!h.controller.state().visible);

        h.controller.handle_action(UserAction::ToggleVisibility).unwrap();
        assert!(h.view.is_rendered());
        assert!(h.controller.state().visible);
        assert_eq!(h.view.render_count(), 2);
    }

    #[test]
    fn test_hidden_clock_does_not_animate() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_clock_visible(false).unwrap();
        });

        h.controller.change_time(Direction::Forward).unwrap();
        assert!(!h.controller.is_animating());
        assert_eq!(h.controller.previous_segment(), Some(Segment::Nightfall));

        h.controller.toggle_visibility().unwrap();
        assert!(h.view.markup().unwrap().contains("rotate(60deg)"));
        assert!(!h.controller.is_animating());
    }

    #[test]
    fn test_external_settings_change_refreshes_view() {
        let mut h = harness(Role::Player, silent_channel(), |_| {});
        h.controller.render();

        h.controller
            .settings_mut()
            .set_current_segment(Segment::Nightfall)
            .unwrap();
        h.controller.advance();

        assert!(h.controller.is_animating());
        assert_eq!(h.view.arrow_handle().animations(), vec!["segment-0-to-1"]);
    }

    #[test]
    fn test_next_deadline_tracks_both_timers() {
        let mut h = harness(Role::GameMaster, silent_channel(), |settings| {
            settings.set_lighting_integration(true).unwrap();
        });
        assert_eq!(h.controller.next_deadline(), None);

        h.controller.render();
        h.controller.change_time(Direction::Forward).unwrap();
        assert_eq!(
            h.controller.next_deadline(),
            Some(Duration::from_micros(7500))
        );

        h.controller.shutdown();
        assert_eq!(h.controller.next_deadline(), None);
        assert!(!h.view.is_rendered());
    }
}
