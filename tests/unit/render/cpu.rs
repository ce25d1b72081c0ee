use super::*;
use crate::foundation::core::Quat;
use crate::render::backend::CameraView;

const BG: [u8; 4] = [10, 12, 16, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn rasterizer() -> CpuRasterizer {
    CpuRasterizer::new(RenderSettings {
        canvas: Canvas {
            width: 64,
            height: 48,
        },
        clear_rgba: BG,
    })
    .unwrap()
}

fn camera() -> CameraView {
    CameraView {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
        fov_y_deg: 60.0,
        near: 0.05,
        far: 1000.0,
    }
}

fn marker(z: f32, color: [u8; 4]) -> Marker {
    Marker {
        position: Vec3::new(0.0, 0.0, z),
        size: 1.0,
        color,
    }
}

#[test]
fn rejects_zero_sized_canvas() {
    let err = CpuRasterizer::new(RenderSettings {
        canvas: Canvas {
            width: 0,
            height: 10,
        },
        clear_rgba: BG,
    });
    assert!(err.is_err());
}

#[test]
fn empty_scene_is_clear_color() {
    let mut r = rasterizer();
    let frame = r
        .render(RenderInput {
            camera: camera(),
            markers: &[],
        })
        .unwrap();
    assert_eq!(frame.data.len(), frame.expected_len());
    assert_eq!(frame.pixel(0, 0), Some(BG));
    assert_eq!(frame.pixel(63, 47), Some(BG));
}

#[test]
fn marker_in_front_lands_on_center() {
    let mut r = rasterizer();
    let markers = [marker(-5.0, RED)];
    let frame = r
        .render(RenderInput {
            camera: camera(),
            markers: &markers,
        })
        .unwrap();
    assert_eq!(frame.pixel(32, 24), Some(RED));
    assert_eq!(frame.pixel(0, 0), Some(BG));
}

#[test]
fn marker_behind_camera_is_culled() {
    let mut r = rasterizer();
    let markers = [marker(5.0, RED)];
    let frame = r
        .render(RenderInput {
            camera: camera(),
            markers: &markers,
        })
        .unwrap();
    assert_eq!(frame.pixel(32, 24), Some(BG));
}

#[test]
fn nearer_marker_occludes_farther_one() {
    let mut r = rasterizer();
    let markers = [marker(-2.0, BLUE), marker(-8.0, RED)];
    let frame = r
        .render(RenderInput {
            camera: camera(),
            markers: &markers,
        })
        .unwrap();
    assert_eq!(frame.pixel(32, 24), Some(BLUE));
}

#[test]
fn rotated_camera_sees_marker_behind_origin() {
    let mut r = rasterizer();
    let markers = [marker(5.0, RED)];
    let cam = CameraView {
        orientation: Quat::from_rotation_y(std::f32::consts::PI),
        ..camera()
    };
    let frame = r
        .render(RenderInput {
            camera: cam,
            markers: &markers,
        })
        .unwrap();
    assert_eq!(frame.pixel(32, 24), Some(RED));
}
