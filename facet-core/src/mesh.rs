/// Triangle soup mesh with precomputed framing data
use nalgebra::{Point3, Vector3};

/// Fraction of the largest bounding-box extent used as the framing radius.
const RADIUS_SCALE: f32 = 0.6;
/// Radii below this count as degenerate (point-like mesh).
const MIN_RADIUS: f32 = 1e-3;
/// Replacement radius for degenerate meshes.
const FALLBACK_RADIUS: f32 = 1.0;

/// Axis-aligned bounding box, grown one point at a time.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    /// An inverted box that any real point will shrink onto.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn update(&mut self, p: &Point3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

/// An immutable triangle soup in the coordinates it was decoded with.
///
/// Vertices of triangle `i` sit at indices `3i..3i+3`; `normals` runs
/// parallel to `vertices` and `vertices.len()` is always a multiple of
/// three. `centroid` and `radius` let the projector map the mesh into a
/// unit-scale space without rescanning it: `radius` is 60% of the largest
/// bounding-box extent and never drops below [`MIN_RADIUS`].
#[derive(Debug, Clone)]
pub struct MeshModel {
    pub vertices: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub bounds: Bounds,
    pub centroid: Point3<f32>,
    pub radius: f32,
}

impl MeshModel {
    pub fn new(vertices: Vec<Point3<f32>>, normals: Vec<Vector3<f32>>, bounds: Bounds) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0);
        debug_assert_eq!(vertices.len(), normals.len());
        let extent = bounds.extent();
        let mut radius = extent.x.max(extent.y).max(extent.z) * RADIUS_SCALE;
        if !(radius >= MIN_RADIUS) {
            radius = FALLBACK_RADIUS;
        }
        Self {
            vertices,
            normals,
            centroid: bounds.center(),
            bounds,
            radius,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Axis-aligned cube centered on the origin, used as the built-in demo
    /// model and in tests.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        // One entry per face: outward normal plus the four corners in fan
        // order, split into triangles (0,1,2) and (0,2,3).
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // Front (+z)
            (
                [0.0, 0.0, 1.0],
                [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
            ),
            // Back (-z)
            (
                [0.0, 0.0, -1.0],
                [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]],
            ),
            // Top (+y)
            (
                [0.0, 1.0, 0.0],
                [[-h, h, -h], [-h, h, h], [h, h, h], [h, h, -h]],
            ),
            // Bottom (-y)
            (
                [0.0, -1.0, 0.0],
                [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
            ),
            // Right (+x)
            (
                [1.0, 0.0, 0.0],
                [[h, -h, -h], [h, h, -h], [h, h, h], [h, -h, h]],
            ),
            // Left (-x)
            (
                [-1.0, 0.0, 0.0],
                [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
            ),
        ];

        let mut vertices = Vec::with_capacity(36);
        let mut normals = Vec::with_capacity(36);
        let mut bounds = Bounds::empty();
        for (n, quad) in &faces {
            let normal = Vector3::new(n[0], n[1], n[2]);
            for idx in [0, 1, 2, 0, 2, 3] {
                let p = Point3::new(quad[idx][0], quad[idx][1], quad[idx][2]);
                bounds.update(&p);
                vertices.push(p);
                normals.push(normal);
            }
        }
        Self::new(vertices, normals, bounds)
    }
}
