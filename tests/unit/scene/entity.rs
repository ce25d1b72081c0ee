use super::*;
use crate::animation::ease::Ease;
use crate::animation::tween::TweenSpec;
use crate::foundation::core::RecorderId;
use crate::foundation::math::approx_eq_vec3;

fn tween(property: TweenProperty, recorder: u32, to: Vec3) -> Tween {
    Tween::new(TweenSpec {
        property,
        from: Vec3::ZERO,
        to,
        delay_ms: 0.0,
        duration_ms: 100.0,
        ease: Ease::Linear,
        trigger: Signal::AnimationBegin(RecorderId(recorder)),
    })
}

fn entity() -> Entity {
    Entity::new(EntityId(0), "rig", Transform3D::default())
}

#[test]
fn set_tween_replaces_same_property_and_trigger() {
    let mut e = entity();
    e.set_tween(tween(TweenProperty::Position, 1, Vec3::X));
    e.set_tween(tween(TweenProperty::Position, 1, Vec3::Y));
    e.set_tween(tween(TweenProperty::Rotation, 1, Vec3::Y));
    e.set_tween(tween(TweenProperty::Position, 2, Vec3::Z));

    assert_eq!(e.tweens().len(), 3);
    assert_eq!(e.tweens()[0].spec().to, Vec3::Y);
}

#[test]
fn emit_starts_only_matching_tweens() {
    let mut e = entity();
    e.set_tween(tween(TweenProperty::Position, 1, Vec3::new(10.0, 0.0, 0.0)));
    e.set_tween(tween(TweenProperty::Rotation, 2, Vec3::new(0.0, 90.0, 0.0)));

    assert_eq!(e.emit(Signal::AnimationBegin(RecorderId(1))), 1);
    e.advance_tweens(50.0);

    assert!(approx_eq_vec3(
        e.transform.position,
        Vec3::new(5.0, 0.0, 0.0),
        1e-5
    ));
    assert!(approx_eq_vec3(e.transform.rotation_deg(), Vec3::ZERO, 1e-4));
}

#[test]
fn rotation_tween_writes_orientation() {
    let mut e = entity();
    e.set_tween(tween(TweenProperty::Rotation, 1, Vec3::new(0.0, 45.0, 0.0)));
    e.emit(Signal::AnimationBegin(RecorderId(1)));
    e.advance_tweens(100.0);
    assert!(approx_eq_vec3(
        e.transform.rotation_deg(),
        Vec3::new(0.0, 45.0, 0.0),
        1e-3
    ));
}

#[test]
fn remove_tweens_drops_a_recorders_tweens() {
    let mut e = entity();
    e.set_tween(tween(TweenProperty::Position, 1, Vec3::X));
    e.set_tween(tween(TweenProperty::Position, 2, Vec3::X));
    e.remove_tweens(Signal::AnimationBegin(RecorderId(1)));
    assert_eq!(e.tweens().len(), 1);
}

#[test]
fn camera_with_half_turn_yaw_looks_where_entity_z_points() {
    let mut e = entity();
    e.camera = Some(Camera {
        base_yaw_rad: std::f32::consts::PI,
        ..Camera::default()
    });
    let target = Vec3::new(3.0, 1.0, -4.0);
    assert!(e.look_at(target));

    let forward = e.camera_forward().unwrap();
    assert!(approx_eq_vec3(forward, target.normalize(), 1e-5));
}

#[test]
fn look_at_own_position_is_refused() {
    let mut e = entity();
    let before = e.transform;
    assert!(!e.look_at(Vec3::ZERO));
    assert_eq!(e.transform, before);
}

#[test]
fn no_camera_means_no_view() {
    assert!(entity().camera_view().is_none());
}
