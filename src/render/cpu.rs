use crate::foundation::core::{Canvas, Mat4, Vec3};
use crate::foundation::error::{RecorderError, RecorderResult};
use crate::render::backend::{FrameRGBA, Marker, RenderBackend, RenderInput, RenderSettings};

/// Software rasterizer drawing scene markers as depth-sorted, perspective-scaled squares.
///
/// Output is straight-alpha RGBA8.
#[derive(Debug)]
pub struct CpuRasterizer {
    settings: RenderSettings,
}

impl CpuRasterizer {
    /// Create a rasterizer for the configured canvas.
    pub fn new(settings: RenderSettings) -> RecorderResult<Self> {
        Canvas::new(settings.canvas.width, settings.canvas.height)?;
        Ok(Self { settings })
    }
}

struct Projected {
    depth: f32,
    cx: f32,
    cy: f32,
    half_px: f32,
    color: [u8; 4],
}

impl RenderBackend for CpuRasterizer {
    fn render(&mut self, input: RenderInput<'_>) -> RecorderResult<FrameRGBA> {
        let canvas = self.settings.canvas;
        let cam = input.camera;
        if !cam.position.is_finite() || !cam.orientation.is_finite() {
            return Err(RecorderError::scene("camera transform is not finite"));
        }

        let view = Mat4::from_rotation_translation(cam.orientation, cam.position).inverse();
        let proj = Mat4::perspective_rh(
            cam.fov_y_deg.to_radians(),
            canvas.aspect(),
            cam.near,
            cam.far,
        );
        let view_proj = proj * view;
        // proj.y_axis.y == 1 / tan(fov_y / 2)
        let focal = proj.y_axis.y * canvas.height as f32 * 0.5;

        let mut visible: Vec<Projected> = input
            .markers
            .iter()
            .filter_map(|m| project(m, view_proj, focal, canvas, cam.near, cam.far))
            .collect();
        // painter's order: farthest first
        visible.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let mut frame = FrameRGBA::solid(canvas.width, canvas.height, self.settings.clear_rgba);
        for p in &visible {
            fill_square(&mut frame, p);
        }
        Ok(frame)
    }

    fn canvas(&self) -> Canvas {
        self.settings.canvas
    }
}

fn project(
    marker: &Marker,
    view_proj: Mat4,
    focal: f32,
    canvas: Canvas,
    near: f32,
    far: f32,
) -> Option<Projected> {
    let clip = view_proj * marker.position.extend(1.0);
    if clip.w <= near || clip.w > far {
        return None;
    }
    let ndc = Vec3::new(clip.x, clip.y, clip.z) / clip.w;
    Some(Projected {
        depth: clip.w,
        cx: (ndc.x * 0.5 + 0.5) * canvas.width as f32,
        cy: (0.5 - ndc.y * 0.5) * canvas.height as f32,
        half_px: (marker.size * 0.5 * focal / clip.w).max(0.5),
        color: marker.color,
    })
}

fn fill_square(frame: &mut FrameRGBA, p: &Projected) {
    let w = frame.width as i64;
    let h = frame.height as i64;
    let x0 = ((p.cx - p.half_px).floor() as i64).clamp(0, w);
    let x1 = ((p.cx + p.half_px).ceil() as i64).clamp(0, w);
    let y0 = ((p.cy - p.half_px).floor() as i64).clamp(0, h);
    let y1 = ((p.cy + p.half_px).ceil() as i64).clamp(0, h);

    let a = u16::from(p.color[3]);
    let inv = 255 - a;
    for y in y0..y1 {
        for x in x0..x1 {
            let i = ((y * w + x) * 4) as usize;
            let dst = &mut frame.data[i..i + 4];
            for c in 0..3 {
                dst[c] = blend_channel(p.color[c], dst[c], a, inv);
            }
            dst[3] = (a + (u16::from(dst[3]) * inv + 127) / 255).min(255) as u8;
        }
    }
}

fn blend_channel(src: u8, dst: u8, a: u16, inv: u16) -> u8 {
    ((u16::from(src) * a + u16::from(dst) * inv + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
