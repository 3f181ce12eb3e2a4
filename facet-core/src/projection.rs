/// Perspective projection of normalized model space onto the surface
use nalgebra::Point3;

use crate::camera::Camera;
use crate::mesh::MeshModel;

/// Focal length as a fraction of the smaller surface dimension.
const FOCAL_SCALE: f32 = 0.65;
/// Camera distance from the model origin at zoom 1, in normalized units.
const CAMERA_DISTANCE: f32 = 4.5;
/// Vertices at or behind this depth are behind the near plane.
const NEAR_EPSILON: f32 = 0.05;

/// Camera and surface parameters frozen for one frame.
///
/// Rotation is yaw about +y then pitch about the rotated x axis; pan
/// shifts the result in camera space. Depth is distance along the view
/// axis with the camera `CAMERA_DISTANCE / zoom` in front of the origin.
pub struct FrameTransform {
    cos_yaw: f32,
    sin_yaw: f32,
    cos_pitch: f32,
    sin_pitch: f32,
    center_x: f32,
    center_y: f32,
    focal: f32,
    camera_distance: f32,
    pan_x: f32,
    pan_y: f32,
}

impl FrameTransform {
    pub fn new(camera: &Camera, width: f32, height: f32) -> Self {
        let yaw = camera.yaw_deg.to_radians();
        let pitch = camera.pitch_deg.to_radians();
        Self {
            cos_yaw: yaw.cos(),
            sin_yaw: yaw.sin(),
            cos_pitch: pitch.cos(),
            sin_pitch: pitch.sin(),
            center_x: width * 0.5,
            center_y: height * 0.5,
            focal: width.min(height) * FOCAL_SCALE,
            camera_distance: CAMERA_DISTANCE / camera.zoom,
            pan_x: camera.pan.x,
            pan_y: camera.pan.y,
        }
    }

    fn camera_space(&self, x: f32, y: f32, z: f32) -> (f32, f32, f32) {
        let x1 = x * self.cos_yaw + z * self.sin_yaw;
        let z1 = -x * self.sin_yaw + z * self.cos_yaw;
        let y1 = y * self.cos_pitch - z1 * self.sin_pitch;
        let z2 = y * self.sin_pitch + z1 * self.cos_pitch;
        (x1 + self.pan_x, y1 + self.pan_y, z2)
    }

    /// Projects one point already in normalized model space. Used for the
    /// axis gizmo; returns `None` behind the near plane.
    pub fn project_point(&self, p: Point3<f32>) -> Option<[f32; 2]> {
        let (x, y, z) = self.camera_space(p.x, p.y, p.z);
        let depth = z + self.camera_distance;
        if depth <= NEAR_EPSILON {
            return None;
        }
        Some([
            self.center_x + x * self.focal / depth,
            self.center_y - y * self.focal / depth,
        ])
    }

    /// Projects every model vertex into `scratch`, normalizing by the
    /// model's centroid and radius on the fly.
    ///
    /// Depth and camera-space position are written for every vertex.
    /// Screen coordinates are only written where `visible` is set; slots
    /// left over from earlier frames must not be read.
    pub fn project_model(&self, model: &MeshModel, scratch: &mut RenderScratch) {
        let n = model.vertices.len();
        scratch.prepare(n);
        let inv_radius = 1.0 / model.radius;
        let c = model.centroid;
        for (i, v) in model.vertices.iter().enumerate() {
            let (x, y, z) = self.camera_space(
                (v.x - c.x) * inv_radius,
                (v.y - c.y) * inv_radius,
                (v.z - c.z) * inv_radius,
            );
            let depth = z + self.camera_distance;
            scratch.cam_x[i] = x;
            scratch.cam_y[i] = y;
            scratch.cam_z[i] = z;
            scratch.depth[i] = depth;
            if depth <= NEAR_EPSILON {
                scratch.visible[i] = false;
                continue;
            }
            scratch.visible[i] = true;
            scratch.screen_x[i] = self.center_x + x * self.focal / depth;
            scratch.screen_y[i] = self.center_y - y * self.focal / depth;
        }
    }
}

/// Per-frame projection buffers, reused across frames and grown but never
/// shrunk. One slot per vertex; `tri_order` holds (average depth, first
/// vertex index) pairs for the painter sort.
#[derive(Default)]
pub struct RenderScratch {
    pub cam_x: Vec<f32>,
    pub cam_y: Vec<f32>,
    pub cam_z: Vec<f32>,
    pub depth: Vec<f32>,
    pub screen_x: Vec<f32>,
    pub screen_y: Vec<f32>,
    pub visible: Vec<bool>,
    pub tri_order: Vec<(f32, u32)>,
    vertex_count: usize,
}

impl RenderScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertex slots filled by the last [`FrameTransform::project_model`].
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn prepare(&mut self, vertices: usize) {
        self.vertex_count = vertices;
        if self.cam_x.len() < vertices {
            self.cam_x.resize(vertices, 0.0);
            self.cam_y.resize(vertices, 0.0);
            self.cam_z.resize(vertices, 0.0);
            self.depth.resize(vertices, 0.0);
            self.screen_x.resize(vertices, 0.0);
            self.screen_y.resize(vertices, 0.0);
            self.visible.resize(vertices, false);
        }
        self.tri_order.clear();
    }
}
