/// Back-to-front software rasterization passes
use nalgebra::Point3;

use crate::projection::{FrameTransform, RenderScratch};

/// Fixed directional light for the shaded pass, deliberately unnormalized;
/// shading divides by the face normal length only.
const LIGHT: [f32; 3] = [0.45, 0.75, 0.48];
const AMBIENT: f32 = 0.45;
const DIFFUSE: f32 = 0.55;
/// Cross products below this mark a triangle too thin to shade.
const DEGENERATE_CROSS_EPSILON: f32 = 1e-6;
/// Length of each gizmo axis in normalized model units.
const AXIS_LENGTH: f32 = 1.8;

pub const BACKGROUND: Rgb = Rgb::new(0x11, 0x11, 0x1B);
pub const BODY: Rgb = Rgb::new(0x89, 0xB4, 0xFA);
pub const WIRE: Rgb = Rgb::new(0xBF, 0xDD, 0xFC);
pub const AXIS_X: Rgb = Rgb::new(0xF4, 0x5A, 0x5A);
pub const AXIS_Y: Rgb = Rgb::new(0x62, 0xED, 0x7A);
pub const AXIS_Z: Rgb = Rgb::new(0x5D, 0x94, 0xFA);

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel brightness scale, truncated and clamped to the byte
    /// range.
    pub fn scaled(self, factor: f32) -> Rgb {
        let scale = |c: u8| ((c as f32 * factor) as i32).clamp(0, 255) as u8;
        Rgb::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Shaded,
    Wireframe,
}

/// Draw target for the rasterizer. Coordinates are pixels, origin at the
/// top-left, y growing downward. Implementations clip to their own extent.
pub trait Canvas {
    fn clear(&mut self, color: Rgb);
    fn fill_triangle(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2], color: Rgb);
    fn draw_line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgb);
}

/// Draws the projected model in `scratch` in the requested mode.
pub fn draw_model<C: Canvas>(canvas: &mut C, scratch: &mut RenderScratch, mode: RenderMode) {
    match mode {
        RenderMode::Shaded => draw_shaded(canvas, scratch),
        RenderMode::Wireframe => draw_wireframe(canvas, scratch),
    }
}

/// Edge pass: triangles with any vertex behind the near plane are dropped
/// whole rather than drawn partially.
fn draw_wireframe<C: Canvas>(canvas: &mut C, scratch: &RenderScratch) {
    let n = scratch.vertex_count();
    for i in (0..n).step_by(3) {
        if !(scratch.visible[i] && scratch.visible[i + 1] && scratch.visible[i + 2]) {
            continue;
        }
        let a = [scratch.screen_x[i], scratch.screen_y[i]];
        let b = [scratch.screen_x[i + 1], scratch.screen_y[i + 1]];
        let c = [scratch.screen_x[i + 2], scratch.screen_y[i + 2]];
        canvas.draw_line(a, b, WIRE);
        canvas.draw_line(b, c, WIRE);
        canvas.draw_line(c, a, WIRE);
    }
}

/// Painter pass: visible triangles sorted by average depth, farthest
/// first, so nearer surfaces overdraw farther ones.
fn draw_shaded<C: Canvas>(canvas: &mut C, scratch: &mut RenderScratch) {
    let n = scratch.vertex_count();
    scratch.tri_order.clear();
    for i in (0..n).step_by(3) {
        if scratch.visible[i] && scratch.visible[i + 1] && scratch.visible[i + 2] {
            let avg = (scratch.depth[i] + scratch.depth[i + 1] + scratch.depth[i + 2]) / 3.0;
            scratch.tri_order.push((avg, i as u32));
        }
    }
    scratch.tri_order.sort_unstable_by(|a, b| b.0.total_cmp(&a.0));

    for &(_, base) in scratch.tri_order.iter() {
        let i = base as usize;
        // Face normal in camera space; the shared pan offset cancels in
        // the edge differences.
        let ux = scratch.cam_x[i + 1] - scratch.cam_x[i];
        let uy = scratch.cam_y[i + 1] - scratch.cam_y[i];
        let uz = scratch.cam_z[i + 1] - scratch.cam_z[i];
        let vx = scratch.cam_x[i + 2] - scratch.cam_x[i];
        let vy = scratch.cam_y[i + 2] - scratch.cam_y[i];
        let vz = scratch.cam_z[i + 2] - scratch.cam_z[i];
        let nx = uy * vz - uz * vy;
        let ny = uz * vx - ux * vz;
        let nz = ux * vy - uy * vx;
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        if len < DEGENERATE_CROSS_EPSILON {
            continue;
        }
        // Both winding directions light the same way.
        let lit = ((nx * LIGHT[0] + ny * LIGHT[1] + nz * LIGHT[2]) / len).abs();
        let color = BODY.scaled(AMBIENT + DIFFUSE * lit);
        canvas.fill_triangle(
            [scratch.screen_x[i], scratch.screen_y[i]],
            [scratch.screen_x[i + 1], scratch.screen_y[i + 1]],
            [scratch.screen_x[i + 2], scratch.screen_y[i + 2]],
            color,
        );
    }
}

/// Draws the world-axis gizmo: red +x, green +y, blue +z, projected with
/// the same transform as the model. Nothing is drawn when the origin is
/// behind the near plane; individual axes drop out the same way.
pub fn draw_axes<C: Canvas>(canvas: &mut C, frame: &FrameTransform) {
    let Some(origin) = frame.project_point(Point3::origin()) else {
        return;
    };
    let axes = [
        (Point3::new(AXIS_LENGTH, 0.0, 0.0), AXIS_X),
        (Point3::new(0.0, AXIS_LENGTH, 0.0), AXIS_Y),
        (Point3::new(0.0, 0.0, AXIS_LENGTH), AXIS_Z),
    ];
    for (tip, color) in axes {
        if let Some(end) = frame.project_point(tip) {
            canvas.draw_line(origin, end, color);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingCanvas;
    use super::*;
    use crate::camera::Camera;

    /// Builds a scratch holding one flat triangle per entry of `depths`,
    /// facing the camera, with `screen_x` encoding the triangle's index.
    fn scratch_with_depths(depths: &[f32]) -> RenderScratch {
        let mut scratch = RenderScratch::new();
        let camera = Camera::new();
        let frame = FrameTransform::new(&camera, 100.0, 100.0);
        // Size the buffers through the public path, then overwrite.
        let mut vertices = Vec::new();
        let mut normals = Vec::new();
        let mut bounds = crate::mesh::Bounds::empty();
        for _ in depths {
            for p in [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ] {
                bounds.update(&p);
                vertices.push(p);
                normals.push(nalgebra::Vector3::z());
            }
        }
        let model = crate::mesh::MeshModel::new(vertices, normals, bounds);
        frame.project_model(&model, &mut scratch);

        for (t, &d) in depths.iter().enumerate() {
            let base = t * 3;
            let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)];
            for (k, (cx, cy)) in corners.iter().enumerate() {
                scratch.cam_x[base + k] = *cx;
                scratch.cam_y[base + k] = *cy;
                scratch.cam_z[base + k] = d;
                scratch.depth[base + k] = d;
                scratch.visible[base + k] = true;
                scratch.screen_x[base + k] = t as f32;
                scratch.screen_y[base + k] = k as f32;
            }
        }
        scratch
    }

    #[test]
    fn test_shaded_sorts_back_to_front() {
        for depths in [
            [1.0, 2.0, 3.0],
            [1.0, 3.0, 2.0],
            [2.0, 1.0, 3.0],
            [2.0, 3.0, 1.0],
            [3.0, 1.0, 2.0],
            [3.0, 2.0, 1.0],
        ] {
            let mut scratch = scratch_with_depths(&depths);
            let mut canvas = RecordingCanvas::new();
            draw_model(&mut canvas, &mut scratch, RenderMode::Shaded);

            let drawn: Vec<f32> = canvas.fills().iter().map(|(c, _)| c[0][0]).collect();
            let mut expect: Vec<(f32, usize)> = depths
                .iter()
                .enumerate()
                .map(|(t, &d)| (d, t))
                .collect();
            expect.sort_by(|a, b| b.0.total_cmp(&a.0));
            let expect: Vec<f32> = expect.iter().map(|&(_, t)| t as f32).collect();
            assert_eq!(drawn, expect);
        }
    }

    #[test]
    fn test_shaded_skips_clipped_triangles() {
        let mut scratch = scratch_with_depths(&[1.0, 2.0]);
        scratch.visible[4] = false;
        let mut canvas = RecordingCanvas::new();
        draw_model(&mut canvas, &mut scratch, RenderMode::Shaded);
        let fills = canvas.fills();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].0[0][0], 0.0);
    }

    #[test]
    fn test_shaded_skips_degenerate_triangles() {
        let mut scratch = scratch_with_depths(&[1.0]);
        // Collapse the camera-space edges; screen coordinates are left
        // alone so only the normal test can reject it.
        for k in 0..3 {
            scratch.cam_x[k] = 0.5;
            scratch.cam_y[k] = 0.5;
            scratch.cam_z[k] = 1.0;
        }
        let mut canvas = RecordingCanvas::new();
        draw_model(&mut canvas, &mut scratch, RenderMode::Shaded);
        assert!(canvas.fills().is_empty());
    }

    #[test]
    fn test_shading_ignores_winding() {
        let mut forward = scratch_with_depths(&[1.0]);
        let mut canvas_fwd = RecordingCanvas::new();
        draw_model(&mut canvas_fwd, &mut forward, RenderMode::Shaded);

        let mut reversed = scratch_with_depths(&[1.0]);
        // Swap two vertices to flip the winding.
        reversed.cam_x.swap(1, 2);
        reversed.cam_y.swap(1, 2);
        reversed.cam_z.swap(1, 2);
        let mut canvas_rev = RecordingCanvas::new();
        draw_model(&mut canvas_rev, &mut reversed, RenderMode::Shaded);

        assert_eq!(canvas_fwd.fills()[0].1, canvas_rev.fills()[0].1);
    }

    #[test]
    fn test_shade_level_for_head_on_face() {
        let mut scratch = scratch_with_depths(&[1.0]);
        let mut canvas = RecordingCanvas::new();
        draw_model(&mut canvas, &mut scratch, RenderMode::Shaded);
        // Unit face normal is +z, so the diffuse term is the light's z
        // component taken as-is.
        let expected = BODY.scaled(0.45 + 0.55 * 0.48);
        assert_eq!(canvas.fills()[0].1, expected);
    }

    #[test]
    fn test_wireframe_draws_three_edges_per_triangle() {
        let mut scratch = scratch_with_depths(&[1.0, 2.0]);
        let mut canvas = RecordingCanvas::new();
        draw_model(&mut canvas, &mut scratch, RenderMode::Wireframe);
        let lines = canvas.lines();
        assert_eq!(lines.len(), 6);
        for (_, _, color) in &lines {
            assert_eq!(*color, WIRE);
        }
    }

    #[test]
    fn test_wireframe_drops_partially_clipped_triangles() {
        let mut scratch = scratch_with_depths(&[1.0, 2.0]);
        scratch.visible[1] = false;
        let mut canvas = RecordingCanvas::new();
        draw_model(&mut canvas, &mut scratch, RenderMode::Wireframe);
        let lines = canvas.lines();
        assert_eq!(lines.len(), 3);
        // Only the second triangle survives; its screen_x encodes 1.
        assert_eq!(lines[0].0[0], 1.0);
    }

    #[test]
    fn test_axes_colors_and_shared_origin() {
        let camera = Camera::new();
        let frame = FrameTransform::new(&camera, 100.0, 100.0);
        let mut canvas = RecordingCanvas::new();
        draw_axes(&mut canvas, &frame);
        let lines = canvas.lines();
        assert_eq!(lines.len(), 3);
        let colors: Vec<Rgb> = lines.iter().map(|l| l.2).collect();
        assert_eq!(colors, vec![AXIS_X, AXIS_Y, AXIS_Z]);
        for (from, _, _) in &lines {
            assert_eq!(*from, lines[0].0);
        }
    }

    #[test]
    fn test_axis_tip_behind_camera_drops_that_axis() {
        // Looking down -z from behind, zoomed in: the +z tip crosses the
        // near plane while x and y stay on screen.
        let mut camera = Camera::new();
        camera.apply_preset(crate::camera::ViewPreset::NegZ);
        camera.zoom_by(4.0);
        let frame = FrameTransform::new(&camera, 100.0, 100.0);
        let mut canvas = RecordingCanvas::new();
        draw_axes(&mut canvas, &frame);
        let colors: Vec<Rgb> = canvas.lines().iter().map(|l| l.2).collect();
        assert_eq!(colors, vec![AXIS_X, AXIS_Y]);
    }

    #[test]
    fn test_axes_skipped_when_origin_is_behind_camera() {
        // Out-of-range zoom pushes even the origin across the near plane;
        // the whole gizmo goes away rather than leaving stray lines.
        let mut camera = Camera::new();
        camera.zoom = 100.0;
        let frame = FrameTransform::new(&camera, 100.0, 100.0);
        let mut canvas = RecordingCanvas::new();
        draw_axes(&mut canvas, &frame);
        assert!(canvas.calls.is_empty());
    }

    #[test]
    fn test_scaled_color_clamps() {
        let c = Rgb::new(200, 10, 255);
        let bright = c.scaled(2.0);
        assert_eq!(bright, Rgb::new(255, 20, 255));
        let dark = c.scaled(0.0);
        assert_eq!(dark, Rgb::new(0, 0, 0));
    }
}
