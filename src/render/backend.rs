use crate::foundation::core::{Canvas, Quat, Vec3};
use crate::foundation::error::RecorderResult;

/// A rendered frame as RGBA8 pixels.
///
/// This is the raster surface handed to frame encoders on every captured tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// A frame filled with one straight-alpha color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: false,
        }
    }

    /// Expected byte length for the frame's dimensions.
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// World-space camera used to render one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    /// Camera position.
    pub position: Vec3,
    /// Camera orientation; the camera looks down its local `-Z`.
    pub orientation: Quat,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

/// A colored billboard square placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    /// World-space center.
    pub position: Vec3,
    /// World-space edge length.
    #[serde(default = "default_marker_size")]
    pub size: f32,
    /// Straight-alpha RGBA8 color.
    pub color: [u8; 4],
}

fn default_marker_size() -> f32 {
    1.0
}

/// Scene contents visible to a renderer for one frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    /// Active camera.
    pub camera: CameraView,
    /// Markers to draw.
    pub markers: &'a [Marker],
}

/// A renderer that turns the current scene state into a [`FrameRGBA`].
pub trait RenderBackend {
    /// Render one frame.
    fn render(&mut self, input: RenderInput<'_>) -> RecorderResult<FrameRGBA>;

    /// Output raster size.
    fn canvas(&self) -> Canvas;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// Software rasterizer; always available.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Output raster size.
    pub canvas: Canvas,
    /// Backends clear the target to this RGBA8 color before drawing.
    pub clear_rgba: [u8; 4],
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> RecorderResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuRasterizer::new(
            settings.clone(),
        )?)),
    }
}
