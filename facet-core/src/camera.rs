/// Orbit camera state and its mutation rules
use nalgebra::Vector2;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 6.0;
/// Pitch stops just shy of the poles so the view never flips over.
const MAX_PITCH_DEG: f32 = 89.0;
/// Model units of pan per full surface-extent drag at zoom 1.
const PAN_SENSITIVITY: f32 = 2.6;

const DEFAULT_YAW_DEG: f32 = 45.0;
const DEFAULT_PITCH_DEG: f32 = 25.0;

/// Canonical viewpoints reachable from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    Isometric,
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl ViewPreset {
    /// The (yaw, pitch) pair in degrees that lines the view up with the
    /// named axis. The Y presets sit at the pitch clamp rather than the
    /// pole itself.
    pub fn angles(self) -> (f32, f32) {
        match self {
            ViewPreset::Isometric => (DEFAULT_YAW_DEG, DEFAULT_PITCH_DEG),
            ViewPreset::PosX => (90.0, 0.0),
            ViewPreset::NegX => (-90.0, 0.0),
            ViewPreset::PosY => (0.0, MAX_PITCH_DEG),
            ViewPreset::NegY => (0.0, -MAX_PITCH_DEG),
            ViewPreset::PosZ => (0.0, 0.0),
            ViewPreset::NegZ => (180.0, 0.0),
        }
    }
}

/// Yaw/pitch orbit around the model origin with screen-space pan and a
/// zoom factor. Angles are degrees; pan is in normalized model units.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub pan: Vector2<f32>,
    pub zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            yaw_deg: DEFAULT_YAW_DEG,
            pitch_deg: DEFAULT_PITCH_DEG,
            pan: Vector2::zeros(),
            zoom: 1.0,
        }
    }

    /// Adds yaw and pitch deltas in degrees. Yaw is unbounded, pitch is
    /// clamped short of the poles.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw_deg += d_yaw;
        self.pitch_deg = (self.pitch_deg + d_pitch).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
    }

    /// Converts a pixel-space drag into pan. The drag is measured against
    /// the smaller surface dimension and scaled down by the current zoom;
    /// screen y grows downward, camera y upward.
    pub fn pan(&mut self, dx: f32, dy: f32, surface_w: f32, surface_h: f32) {
        let extent = surface_w.min(surface_h).max(1.0);
        let scale = PAN_SENSITIVITY / (extent * self.zoom);
        self.pan.x += dx * scale;
        self.pan.y -= dy * scale;
    }

    /// Multiplies zoom by `factor`, clamped to [`MIN_ZOOM`]..[`MAX_ZOOM`].
    /// Non-positive factors are ignored.
    pub fn zoom_by(&mut self, factor: f32) {
        if factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Jumps to a canonical viewpoint. Pan is cleared so the model is back
    /// on screen; zoom is deliberately left alone.
    pub fn apply_preset(&mut self, preset: ViewPreset) {
        let (yaw, pitch) = preset.angles();
        self.yaw_deg = yaw;
        self.pitch_deg = pitch;
        self.pan = Vector2::zeros();
    }

    /// Back to the isometric default, including zoom.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
