use super::*;
use crate::encode::sink::{EncoderCall, EncoderLog, InMemoryEncoder};
use crate::foundation::core::Transform3D;
use crate::foundation::math::approx_eq_vec3;
use crate::scene::entity::Camera;

struct Rig {
    entity: Entity,
    events: EventBus,
    panel: ControlPanel,
    flags: SceneFlags,
}

impl Rig {
    fn new() -> Self {
        let mut entity = Entity::new(
            EntityId(7),
            "camera-rig",
            Transform3D::from_position_rotation(Vec3::new(0.0, 1.6, 5.0), Vec3::ZERO),
        );
        entity.camera = Some(Camera::default());
        Self {
            entity,
            events: EventBus::default(),
            panel: ControlPanel::default(),
            flags: SceneFlags::default(),
        }
    }

    fn attach(&mut self, id: u32, config: RecordingConfig) -> (RecordingController, EncoderLog) {
        let (enc, log) = InMemoryEncoder::new();
        let mut rec =
            RecordingController::new(RecorderId(id), EntityId(7), config, Box::new(enc)).unwrap();
        rec.attach(&mut self.entity, &mut self.events, &mut self.panel)
            .unwrap();
        (rec, log)
    }
}

fn one_second() -> RecordingConfig {
    RecordingConfig {
        total_duration_ms: 1000.0,
        hold_before_ms: 0.0,
        hold_after_ms: 0.0,
        frame_rate: 60.0,
        ..RecordingConfig::default()
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA::solid(4, 4, [20, 40, 60, 255])
}

#[test]
fn new_rejects_invalid_config() {
    let (enc, _log) = InMemoryEncoder::new();
    let cfg = RecordingConfig {
        total_duration_ms: 0.0,
        ..RecordingConfig::default()
    };
    assert!(RecordingController::new(RecorderId(1), EntityId(7), cfg, Box::new(enc)).is_err());
}

#[test]
fn sixty_one_ticks_of_16_6ms_capture_sixty_then_finalize() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    let surface = frame();

    assert_eq!(
        rec.start(false, &mut rig.entity).unwrap(),
        StartOutcome::Recording
    );

    for tick in 1..=60u64 {
        let out = rec.on_tick(16.6, Some(&surface), &mut rig.panel).unwrap();
        assert_eq!(out, TickOutcome::Captured { frame: tick });
        assert!(rec.session().is_recording());
        assert!(rec.session().elapsed_ms() <= rec.config().window_ms());
    }

    let out = rec.on_tick(16.6, Some(&surface), &mut rig.panel).unwrap();
    let TickOutcome::Finished(report) = out else {
        panic!("tick 61 should finalize, got {out:?}");
    };
    assert_eq!(report.frames, 60);
    assert!(report.elapsed_ms > 1000.0);

    assert_eq!(log.captures(), 60);
    assert_eq!(log.saves(), 1);
    assert!(!rec.session().is_recording());
    assert_eq!(rec.session().status(), SessionStatus::Finished);

    // overshoot ticks neither capture nor finalize again
    for _ in 0..5 {
        assert_eq!(
            rec.on_tick(16.6, Some(&surface), &mut rig.panel).unwrap(),
            TickOutcome::Idle
        );
    }
    assert_eq!(log.captures(), 60);
    assert_eq!(log.saves(), 1);
}

#[test]
fn captures_one_frame_per_tick_until_window_is_exceeded() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    let surface = frame();
    rec.start(false, &mut rig.entity).unwrap();

    // uneven deltas; frame rate is only an output hint
    let deltas = [5.0, 40.0, 33.3, 250.0, 1.0, 400.0, 200.7];
    let total: f64 = deltas.iter().sum();
    assert!(total <= 1000.0);
    for d in deltas {
        rec.on_tick(d, Some(&surface), &mut rig.panel).unwrap();
    }
    assert_eq!(log.captures(), deltas.len());
    assert_eq!(log.saves(), 0);

    // exactly at the window is still inside it
    let remaining = 1000.0 - total;
    assert!(matches!(
        rec.on_tick(remaining, Some(&surface), &mut rig.panel).unwrap(),
        TickOutcome::Captured { .. }
    ));
    assert!(matches!(
        rec.on_tick(0.001, Some(&surface), &mut rig.panel).unwrap(),
        TickOutcome::Finished(_)
    ));
    assert_eq!(log.saves(), 1);
}

#[test]
fn real_start_calls_encoder_start_before_first_capture() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    rec.start(false, &mut rig.entity).unwrap();
    rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap();

    let calls = log.calls();
    assert_eq!(calls[0], EncoderCall::Start);
    assert!(matches!(calls[1], EncoderCall::Capture { .. }));
    assert_eq!(log.starts(), 1);
}

#[test]
fn finalize_calls_stop_then_save() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    rec.start(false, &mut rig.entity).unwrap();
    rec.on_tick(1001.0, Some(&frame()), &mut rig.panel).unwrap();
    assert_eq!(
        log.calls(),
        vec![EncoderCall::Start, EncoderCall::Stop, EncoderCall::Save]
    );
}

#[test]
fn dry_run_never_touches_the_encoder() {
    let mut rig = Rig::new();
    let cfg = RecordingConfig {
        position: crate::config::options::EndpointPair {
            from: None,
            to: Some(Vec3::new(0.0, 1.6, -5.0)),
        },
        ..one_second()
    };
    let (mut rec, log) = rig.attach(1, cfg);

    assert_eq!(
        rec.start(true, &mut rig.entity).unwrap(),
        StartOutcome::DryRun
    );
    assert!(rig.entity.tweens()[0].is_running());
    assert!(rec.session().is_dry_run());
    assert!(!rec.session().is_recording());

    for _ in 0..100 {
        assert_eq!(
            rec.on_tick(16.6, Some(&frame()), &mut rig.panel).unwrap(),
            TickOutcome::Idle
        );
    }
    assert!(log.calls().is_empty());

    // previews can be repeated
    assert!(rec.start(true, &mut rig.entity).is_ok());
    assert!(log.calls().is_empty());
}

#[test]
fn start_while_recording_is_rejected() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    rec.start(false, &mut rig.entity).unwrap();
    rec.on_tick(100.0, Some(&frame()), &mut rig.panel).unwrap();

    assert!(matches!(
        rec.start(false, &mut rig.entity),
        Err(RecorderError::RecordingInProgress)
    ));
    assert!(matches!(
        rec.start(true, &mut rig.entity),
        Err(RecorderError::RecordingInProgress)
    ));
    assert_eq!(log.starts(), 1);
    assert_eq!(rec.session().elapsed_ms(), 100.0);

    // a finished session can be started again, with elapsed time reset
    rec.on_tick(1000.0, Some(&frame()), &mut rig.panel).unwrap();
    rec.start(false, &mut rig.entity).unwrap();
    assert_eq!(rec.session().elapsed_ms(), 0.0);
    assert_eq!(rec.session().frames_captured(), 0);
    assert_eq!(log.starts(), 2);
}

#[test]
fn capture_failure_ends_session_and_is_returned() {
    let mut rig = Rig::new();
    let (enc, log) = InMemoryEncoder::new();
    let mut rec = RecordingController::new(
        RecorderId(1),
        EntityId(7),
        one_second(),
        Box::new(enc.with_capture_limit(2)),
    )
    .unwrap();
    rec.attach(&mut rig.entity, &mut rig.events, &mut rig.panel)
        .unwrap();
    rec.start(false, &mut rig.entity).unwrap();

    rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap();
    rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap();
    let err = rec
        .on_tick(16.0, Some(&frame()), &mut rig.panel)
        .unwrap_err();
    assert!(matches!(err, RecorderError::Encode(_)));

    assert!(!rec.session().is_recording());
    assert_eq!(rec.session().status(), SessionStatus::Failed);
    assert_eq!(log.calls().last(), Some(&EncoderCall::Abort));
    assert_eq!(log.saves(), 0);

    let button = rig.panel.button(rec.record_button().unwrap()).unwrap();
    assert_eq!(button.label, FAILED_LABEL);
    assert!(button.enabled);

    // no retry on later ticks
    assert_eq!(
        rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap(),
        TickOutcome::Idle
    );
}

#[test]
fn save_failure_ends_session_and_marks_button() {
    let mut rig = Rig::new();
    let (enc, log) = InMemoryEncoder::new();
    let mut rec = RecordingController::new(
        RecorderId(1),
        EntityId(7),
        one_second(),
        Box::new(enc.with_failing_save()),
    )
    .unwrap();
    rec.attach(&mut rig.entity, &mut rig.events, &mut rig.panel)
        .unwrap();
    rec.start(false, &mut rig.entity).unwrap();

    rec.on_tick(500.0, Some(&frame()), &mut rig.panel).unwrap();
    let err = rec
        .on_tick(600.0, Some(&frame()), &mut rig.panel)
        .unwrap_err();
    assert!(matches!(err, RecorderError::Encode(_)));

    assert!(!rec.session().is_recording());
    assert_eq!(rec.session().status(), SessionStatus::Failed);
    assert_eq!(rec.session().completed(), 0);
    assert_eq!(rec.last_output(), None);
    assert_eq!(
        log.calls(),
        vec![
            EncoderCall::Start,
            EncoderCall::Capture {
                width: 4,
                height: 4
            },
            EncoderCall::Stop,
            EncoderCall::Save,
            EncoderCall::Abort,
        ]
    );

    let button = rig.panel.button(rec.record_button().unwrap()).unwrap();
    assert_eq!(button.label, FAILED_LABEL);
    assert!(button.enabled);

    // the failed finalize is not repeated
    assert_eq!(
        rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap(),
        TickOutcome::Idle
    );
    assert_eq!(log.saves(), 1);
}

#[test]
fn start_failure_is_returned_and_leaves_instance_idle() {
    let mut rig = Rig::new();
    let (enc, log) = InMemoryEncoder::new();
    let mut rec = RecordingController::new(
        RecorderId(1),
        EntityId(7),
        one_second(),
        Box::new(enc.with_failing_start()),
    )
    .unwrap();
    rec.attach(&mut rig.entity, &mut rig.events, &mut rig.panel)
        .unwrap();

    let err = rec.start(false, &mut rig.entity).unwrap_err();
    assert!(matches!(err, RecorderError::Encode(_)));
    assert!(!rec.session().is_recording());
    assert!(!rec.session().is_busy());
    assert_eq!(rec.session().status(), SessionStatus::Failed);

    // nothing is captured on later ticks
    assert_eq!(
        rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap(),
        TickOutcome::Idle
    );
    assert_eq!(log.calls(), vec![EncoderCall::Start]);

    // the instance is not stuck: another start is attempted
    assert!(matches!(
        rec.start(false, &mut rig.entity),
        Err(RecorderError::Encode(_))
    ));
    assert_eq!(log.starts(), 2);
}

#[test]
fn missing_surface_is_a_recording_failure() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    rec.start(false, &mut rig.entity).unwrap();
    let err = rec.on_tick(16.0, None, &mut rig.panel).unwrap_err();
    assert!(matches!(err, RecorderError::Encode(_)));
    assert_eq!(log.captures(), 0);
    assert_eq!(rec.session().status(), SessionStatus::Failed);
}

#[test]
fn finish_disables_and_relabels_record_button() {
    let mut rig = Rig::new();
    let (mut rec, _log) = rig.attach(1, one_second());

    let record = rec.record_button().unwrap();
    let preview = rec.preview_button().unwrap();
    assert_eq!(rig.panel.button(record).unwrap().label, RECORD_LABEL);
    assert_eq!(rig.panel.button(preview).unwrap().label, PREVIEW_LABEL);
    assert_eq!(
        rig.panel.button(preview).unwrap().action,
        ButtonAction::Start {
            recorder: RecorderId(1),
            dry_run: true
        }
    );

    rec.start(false, &mut rig.entity).unwrap();
    // starting does not touch the UI
    assert!(rig.panel.button(record).unwrap().enabled);

    rec.on_tick(2000.0, Some(&frame()), &mut rig.panel).unwrap();
    let button = rig.panel.button(record).unwrap();
    assert!(!button.enabled);
    assert_eq!(button.label, PROCESSING_LABEL);
}

#[test]
fn hidden_controls_create_no_buttons() {
    let mut rig = Rig::new();
    let (rec, _log) = rig.attach(
        1,
        RecordingConfig {
            show_controls: false,
            ..one_second()
        },
    );
    assert!(rec.record_button().is_none());
    assert_eq!(rig.panel.buttons().count(), 0);
    assert_eq!(rec.subscriptions().len(), 2);
}

#[test]
fn implicit_from_snapshots_transform_at_attach_not_start() {
    let mut rig = Rig::new();
    let attach_position = rig.entity.transform.position;
    let cfg = RecordingConfig {
        position: crate::config::options::EndpointPair {
            from: None,
            to: Some(Vec3::new(10.0, 1.6, 5.0)),
        },
        ..one_second()
    };
    let (mut rec, _log) = rig.attach(1, cfg);
    assert_eq!(
        rec.position_from(),
        Endpoint::SnapshotAtAttach(attach_position)
    );
    assert_eq!(rec.rotation_from(), Endpoint::Unset);

    // the user moves the camera before starting
    rig.entity.transform.position = Vec3::new(-50.0, 0.0, 0.0);
    rec.start(true, &mut rig.entity).unwrap();
    rig.entity.advance_tweens(0.0);
    assert_eq!(rig.entity.transform.position, attach_position);
}

#[test]
fn explicit_from_wins_over_current_transform() {
    let mut rig = Rig::new();
    let from = Vec3::new(1.0, 2.0, 3.0);
    let cfg = RecordingConfig {
        rotation: crate::config::options::EndpointPair {
            from: Some(from),
            to: Some(Vec3::new(0.0, 45.0, 0.0)),
        },
        ..one_second()
    };
    let (rec, _log) = rig.attach(1, cfg);
    assert_eq!(rec.rotation_from(), Endpoint::Explicit(from));
    assert_eq!(rig.entity.tweens()[0].spec().from, from);
    assert_eq!(rig.entity.tweens()[0].spec().delay_ms, 0.0);
    assert_eq!(rig.entity.tweens()[0].spec().duration_ms, 1000.0);
}

#[test]
fn look_at_flips_camera_yaw_once_at_attach() {
    let mut rig = Rig::new();
    let target = Vec3::new(0.0, 0.0, -20.0);
    let (rec, _log) = rig.attach(
        1,
        RecordingConfig {
            look_at_target: Some(target),
            ..one_second()
        },
    );
    assert_eq!(rec.constraint().target(), Some(target));
    assert_eq!(
        rig.entity.camera.unwrap().base_yaw_rad,
        std::f32::consts::PI
    );

    rec.constraint().on_tick(&mut rig.entity);
    let forward = rig.entity.camera_forward().unwrap();
    let expected = (target - rig.entity.transform.position).normalize();
    assert!(approx_eq_vec3(forward, expected, 1e-5));
}

#[test]
fn without_look_at_camera_yaw_is_untouched() {
    let mut rig = Rig::new();
    let (rec, _log) = rig.attach(1, one_second());
    assert!(!rec.constraint().is_active());
    assert_eq!(rig.entity.camera.unwrap().base_yaw_rad, 0.0);
}

#[test]
fn attach_requires_a_camera_and_the_right_entity() {
    let mut rig = Rig::new();
    rig.entity.camera = None;
    let (enc, _log) = InMemoryEncoder::new();
    let mut rec =
        RecordingController::new(RecorderId(1), EntityId(7), one_second(), Box::new(enc))
            .unwrap();
    assert!(matches!(
        rec.attach(&mut rig.entity, &mut rig.events, &mut rig.panel),
        Err(RecorderError::Scene(_))
    ));

    let (enc, _log) = InMemoryEncoder::new();
    let mut other =
        RecordingController::new(RecorderId(2), EntityId(99), one_second(), Box::new(enc))
            .unwrap();
    rig.entity.camera = Some(Camera::default());
    assert!(
        other
            .attach(&mut rig.entity, &mut rig.events, &mut rig.panel)
            .is_err()
    );
}

#[test]
fn start_before_attach_is_rejected() {
    let mut rig = Rig::new();
    let (enc, log) = InMemoryEncoder::new();
    let mut rec =
        RecordingController::new(RecorderId(1), EntityId(7), one_second(), Box::new(enc))
            .unwrap();
    assert!(rec.start(false, &mut rig.entity).is_err());
    assert!(log.calls().is_empty());
}

#[test]
fn play_setup_runs_once() {
    let mut rig = Rig::new();
    let (mut rec, _log) = rig.attach(1, one_second());
    assert!(rec.needs_play_setup());
    assert!(rec.play(&mut rig.entity, &mut rig.flags));
    assert!(!rig.entity.controls.look);
    assert!(!rig.entity.controls.movement);
    assert!(!rig.flags.vr_mode_ui);

    rig.entity.controls.look = true;
    assert!(!rec.play(&mut rig.entity, &mut rig.flags));
    assert!(rig.entity.controls.look);
}

#[test]
fn cancel_aborts_without_saving() {
    let mut rig = Rig::new();
    let (mut rec, log) = rig.attach(1, one_second());
    assert!(!rec.cancel());

    rec.start(false, &mut rig.entity).unwrap();
    rec.on_tick(16.0, Some(&frame()), &mut rig.panel).unwrap();
    assert!(rec.cancel());
    assert_eq!(rec.session().status(), SessionStatus::Cancelled);
    assert_eq!(log.saves(), 0);
    assert_eq!(log.calls().last(), Some(&EncoderCall::Abort));
    assert!(rec.start(false, &mut rig.entity).is_ok());
}

#[test]
fn detach_releases_subscriptions_buttons_and_tweens() {
    let mut rig = Rig::new();
    let cfg = RecordingConfig {
        position: crate::config::options::EndpointPair {
            from: None,
            to: Some(Vec3::ONE),
        },
        ..one_second()
    };
    let (mut rec, _log) = rig.attach(1, cfg);
    assert_eq!(rig.events.len(), 2);
    assert_eq!(rig.panel.buttons().count(), 2);
    assert_eq!(rig.entity.tweens().len(), 1);

    rec.detach(Some(&mut rig.entity), &mut rig.events, &mut rig.panel);
    assert!(rig.events.is_empty());
    assert_eq!(rig.panel.buttons().count(), 0);
    assert!(rig.entity.tweens().is_empty());
    assert!(!rec.is_attached());
}
