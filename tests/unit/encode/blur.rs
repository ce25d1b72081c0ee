use super::*;

fn gray(v: u8) -> FrameRGBA {
    FrameRGBA::solid(2, 1, [v, v, v, 255])
}

#[test]
fn disabled_blur_passes_frames_through() {
    let mut blur = MotionBlur::new(0);
    blur.apply(&gray(0));
    assert_eq!(blur.apply(&gray(200)), gray(200));
}

#[test]
fn first_frame_is_unblended() {
    let mut blur = MotionBlur::new(1);
    assert_eq!(blur.apply(&gray(100)), gray(100));
}

#[test]
fn one_blend_frame_averages_with_previous_capture() {
    let mut blur = MotionBlur::new(1);
    blur.apply(&gray(0));
    assert_eq!(blur.apply(&gray(200)).pixel(0, 0), Some([100, 100, 100, 255]));
    // only one frame of history is kept
    assert_eq!(blur.apply(&gray(100)).pixel(1, 0), Some([150, 150, 150, 255]));
}

#[test]
fn reset_and_size_change_drop_history() {
    let mut blur = MotionBlur::new(1);
    blur.apply(&gray(0));
    blur.reset();
    assert_eq!(blur.apply(&gray(200)), gray(200));

    let big = FrameRGBA::solid(4, 4, [40, 40, 40, 255]);
    assert_eq!(blur.apply(&big), big);
}
