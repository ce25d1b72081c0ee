use std::path::{Path, PathBuf};

use crate::animation::tween::{Endpoint, Signal, Tween, TweenProperty, TweenSpec};
use crate::config::options::RecordingConfig;
use crate::encode::sink::FrameEncoder;
use crate::foundation::core::{EntityId, RecorderId, Vec3};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::recorder::constraint::CameraConstraint;
use crate::recorder::session::{RecordingSession, SessionStatus};
use crate::render::backend::FrameRGBA;
use crate::scene::controls::{
    ButtonAction, ButtonId, ControlPanel, FAILED_LABEL, PREVIEW_LABEL, PROCESSING_LABEL,
    RECORD_LABEL,
};
use crate::scene::entity::Entity;
use crate::scene::events::{EventBus, Subscription, TriggerEvent};
use crate::scene::world::SceneFlags;

/// Result of a successful `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// Camera path started without encoding.
    DryRun,
    /// Camera path started and the encoder is capturing.
    Recording,
}

/// Summary of a finalized recording.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishReport {
    /// Frames captured during the session.
    pub frames: u64,
    /// Elapsed time at the finishing tick (first value past the window).
    pub elapsed_ms: f64,
    /// Asset location reported by the encoder.
    pub output: Option<PathBuf>,
}

/// What one tick did for one recorder.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Not recording.
    Idle,
    /// One frame captured; `frame` is the 1-based count in this session.
    Captured {
        /// Frames captured so far.
        frame: u64,
    },
    /// The window elapsed and the encoder finalized.
    Finished(FinishReport),
}

/// Drives one camera recording: trigger handling, per-tick capture decisions and the
/// terminal finalize sequence.
///
/// Each instance owns its session, its encoder and its event subscriptions; several instances
/// may be attached to the same entity without sharing any of them.
pub struct RecordingController {
    id: RecorderId,
    entity: EntityId,
    config: RecordingConfig,
    session: RecordingSession,
    encoder: Box<dyn FrameEncoder>,
    constraint: CameraConstraint,
    position_from: Endpoint,
    rotation_from: Endpoint,
    subscriptions: Vec<Subscription>,
    record_button: Option<ButtonId>,
    preview_button: Option<ButtonId>,
    attached: bool,
    play_pending: bool,
    last_output: Option<PathBuf>,
}

impl std::fmt::Debug for RecordingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingController")
            .field("id", &self.id)
            .field("entity", &self.entity)
            .field("session", &self.session)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

impl RecordingController {
    /// Create a detached controller. The configuration is validated here.
    pub fn new(
        id: RecorderId,
        entity: EntityId,
        config: RecordingConfig,
        encoder: Box<dyn FrameEncoder>,
    ) -> RecorderResult<Self> {
        config.validate()?;
        Ok(Self {
            id,
            entity,
            config,
            session: RecordingSession::default(),
            encoder,
            constraint: CameraConstraint::default(),
            position_from: Endpoint::Unset,
            rotation_from: Endpoint::Unset,
            subscriptions: Vec::new(),
            record_button: None,
            preview_button: None,
            attached: false,
            play_pending: false,
            last_output: None,
        })
    }

    /// Init-time setup on the owning entity.
    ///
    /// Decides tween endpoints (an absent `from` snapshots the entity transform now), installs
    /// the look-at constraint, creates buttons when `show_controls` is set and subscribes to the
    /// `record-start` / `dry-run-start` events.
    #[tracing::instrument(skip_all, fields(recorder = %self.id))]
    pub fn attach(
        &mut self,
        entity: &mut Entity,
        events: &mut EventBus,
        panel: &mut ControlPanel,
    ) -> RecorderResult<()> {
        if self.attached {
            return Err(RecorderError::scene(format!(
                "{} is already attached",
                self.id
            )));
        }
        if entity.id() != self.entity {
            return Err(RecorderError::scene(format!(
                "{} belongs to {}, not {}",
                self.id,
                self.entity,
                entity.id()
            )));
        }

        {
            let Some(camera) = entity.camera.as_mut() else {
                return Err(RecorderError::scene(format!(
                    "{} has no camera to record from",
                    self.entity
                )));
            };
            self.constraint = CameraConstraint::new(self.config.look_at_target);
            if self.constraint.is_active() {
                camera.base_yaw_rad = std::f32::consts::PI;
            }
        }

        let snapshot = entity.transform;
        self.position_from = Endpoint::decide_from(
            self.config.position.from,
            self.config.position.to.is_some(),
            snapshot.position,
        );
        self.rotation_from = Endpoint::decide_from(
            self.config.rotation.from,
            self.config.rotation.to.is_some(),
            snapshot.rotation_deg(),
        );
        for (property, from, to) in [
            (
                TweenProperty::Position,
                self.position_from,
                self.config.position.to,
            ),
            (
                TweenProperty::Rotation,
                self.rotation_from,
                self.config.rotation.to,
            ),
        ] {
            if let (Some(from), Some(to)) = (from.value(), to) {
                entity.set_tween(self.tween(property, from, to));
            }
        }

        if self.config.show_controls {
            self.record_button = Some(panel.add_button(
                RECORD_LABEL,
                ButtonAction::Start {
                    recorder: self.id,
                    dry_run: false,
                },
            ));
            self.preview_button = Some(panel.add_button(
                PREVIEW_LABEL,
                ButtonAction::Start {
                    recorder: self.id,
                    dry_run: true,
                },
            ));
        }

        for event in [TriggerEvent::RecordStart, TriggerEvent::DryRunStart] {
            self.subscriptions
                .push(events.subscribe(self.entity, event, self.id));
        }

        self.attached = true;
        self.play_pending = true;
        tracing::debug!(
            window_ms = self.config.window_ms(),
            position_from = ?self.position_from,
            rotation_from = ?self.rotation_from,
            look_at = ?self.constraint.target(),
            "recorder attached"
        );
        Ok(())
    }

    fn tween(&self, property: TweenProperty, from: Vec3, to: Vec3) -> Tween {
        Tween::new(TweenSpec {
            property,
            from,
            to,
            delay_ms: self.config.hold_before_ms,
            duration_ms: self.config.total_duration_ms,
            ease: self.config.easing,
            trigger: Signal::AnimationBegin(self.id),
        })
    }

    /// `true` until the one-shot play-time setup has run.
    pub fn needs_play_setup(&self) -> bool {
        self.play_pending
    }

    /// One-shot play-time setup: disable manual input on the entity and the scene's VR-mode
    /// UI so nothing fights the scripted camera. Returns `false` if it already ran.
    pub fn play(&mut self, entity: &mut Entity, flags: &mut SceneFlags) -> bool {
        if !self.play_pending {
            return false;
        }
        self.play_pending = false;
        entity.controls.look = false;
        entity.controls.movement = false;
        flags.vr_mode_ui = false;
        tracing::debug!(recorder = %self.id, "competing input controls disabled");
        true
    }

    /// Trigger the camera path, and on a real start, begin capturing.
    ///
    /// Rejected with [`RecorderError::RecordingInProgress`] while a real session is active,
    /// for both real and dry starts.
    #[tracing::instrument(skip(self, entity), fields(recorder = %self.id))]
    pub fn start(&mut self, dry_run: bool, entity: &mut Entity) -> RecorderResult<StartOutcome> {
        if !self.attached {
            return Err(RecorderError::scene(format!("{} is not attached", self.id)));
        }
        if entity.id() != self.entity {
            return Err(RecorderError::scene(format!(
                "{} cannot start on {}",
                self.id,
                entity.id()
            )));
        }
        if self.session.is_busy() {
            tracing::warn!("start rejected: recording already in progress");
            return Err(RecorderError::RecordingInProgress);
        }

        let tweens = entity.emit(Signal::AnimationBegin(self.id));
        tracing::debug!(tweens, "animation-begin emitted");

        if dry_run {
            self.session.is_dry_run = true;
            tracing::info!("dry run started");
            return Ok(StartOutcome::DryRun);
        }

        if let Err(err) = self.encoder.start() {
            self.session.end(SessionStatus::Failed);
            tracing::error!(error = %err, "encoder failed to start");
            return Err(err);
        }
        self.session.begin();
        tracing::info!(window_ms = self.config.window_ms(), "recording started");
        Ok(StartOutcome::Recording)
    }

    /// Per-tick hook, called after the frame has been rendered.
    ///
    /// Captures `surface` once per tick while the accumulated time stays within the window.
    /// The tick that pushes the time past the window finalizes instead of capturing. Encoder
    /// failures end the session and are returned.
    pub fn on_tick(
        &mut self,
        delta_ms: f64,
        surface: Option<&FrameRGBA>,
        panel: &mut ControlPanel,
    ) -> RecorderResult<TickOutcome> {
        if !self.session.is_recording {
            return Ok(TickOutcome::Idle);
        }

        let delta_ms = if delta_ms.is_finite() && delta_ms >= 0.0 {
            delta_ms
        } else {
            tracing::warn!(recorder = %self.id, delta_ms, "ignoring invalid tick delta");
            0.0
        };
        self.session.elapsed_ms += delta_ms;

        if self.session.elapsed_ms > self.config.window_ms() {
            return self.finish(panel).map(TickOutcome::Finished);
        }

        let captured = match surface {
            Some(frame) => self.encoder.capture(frame),
            None => Err(RecorderError::encode("no rendered surface available")),
        };
        if let Err(err) = captured {
            return Err(self.fail(err, panel));
        }

        self.session.frames_captured += 1;
        Ok(TickOutcome::Captured {
            frame: self.session.frames_captured,
        })
    }

    fn finish(&mut self, panel: &mut ControlPanel) -> RecorderResult<FinishReport> {
        self.session.end(SessionStatus::Finalizing);

        let saved = match self.encoder.stop() {
            Ok(()) => self.encoder.save(),
            Err(err) => Err(err),
        };
        let output = match saved {
            Ok(output) => output,
            Err(err) => return Err(self.fail(err, panel)),
        };

        self.session.end(SessionStatus::Finished);
        self.session.completed += 1;
        if let Some(button) = self.record_button.and_then(|id| panel.button_mut(id)) {
            button.enabled = false;
            button.label = PROCESSING_LABEL.to_string();
        }
        self.last_output.clone_from(&output);

        tracing::info!(
            recorder = %self.id,
            frames = self.session.frames_captured,
            elapsed_ms = self.session.elapsed_ms,
            output = ?output,
            "recording finished"
        );
        Ok(FinishReport {
            frames: self.session.frames_captured,
            elapsed_ms: self.session.elapsed_ms,
            output,
        })
    }

    fn fail(&mut self, err: RecorderError, panel: &mut ControlPanel) -> RecorderError {
        self.session.end(SessionStatus::Failed);
        self.encoder.abort();
        if let Some(button) = self.record_button.and_then(|id| panel.button_mut(id)) {
            button.enabled = true;
            button.label = FAILED_LABEL.to_string();
        }
        tracing::error!(recorder = %self.id, error = %err, "recording failed");
        err
    }

    /// Stop an active recording without producing an asset. Returns `false` when idle.
    pub fn cancel(&mut self) -> bool {
        if !self.session.is_recording {
            return false;
        }
        self.session.end(SessionStatus::Cancelled);
        self.encoder.abort();
        tracing::info!(
            recorder = %self.id,
            frames = self.session.frames_captured,
            "recording cancelled"
        );
        true
    }

    /// Teardown: cancel any session, release subscriptions, buttons and this recorder's tweens.
    pub fn detach(
        &mut self,
        entity: Option<&mut Entity>,
        events: &mut EventBus,
        panel: &mut ControlPanel,
    ) {
        self.cancel();
        for sub in self.subscriptions.drain(..) {
            events.unsubscribe(sub);
        }
        for id in [self.record_button.take(), self.preview_button.take()]
            .into_iter()
            .flatten()
        {
            panel.remove(id);
        }
        if let Some(entity) = entity {
            entity.remove_tweens(Signal::AnimationBegin(self.id));
        }
        self.attached = false;
        self.play_pending = false;
        tracing::debug!(recorder = %self.id, "recorder detached");
    }

    /// Instance id.
    pub fn id(&self) -> RecorderId {
        self.id
    }

    /// Owning entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Immutable configuration.
    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Session state.
    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Look-at constraint installed at attach.
    pub fn constraint(&self) -> &CameraConstraint {
        &self.constraint
    }

    /// Position tween start as decided at attach.
    pub fn position_from(&self) -> Endpoint {
        self.position_from
    }

    /// Rotation tween start as decided at attach.
    pub fn rotation_from(&self) -> Endpoint {
        self.rotation_from
    }

    /// Live event subscriptions.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Record button, when controls are shown.
    pub fn record_button(&self) -> Option<ButtonId> {
        self.record_button
    }

    /// Preview button, when controls are shown.
    pub fn preview_button(&self) -> Option<ButtonId> {
        self.preview_button
    }

    /// Asset produced by the last completed session.
    pub fn last_output(&self) -> Option<&Path> {
        self.last_output.as_deref()
    }

    /// `true` between `attach` and `detach`.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
#[path = "../../tests/unit/recorder/controller.rs"]
mod tests;
