/// STL decoding (binary and ASCII, autodetected)
use nalgebra::{Point3, Vector3};
use thiserror::Error;
use tracing::{debug, warn};

use crate::mesh::{Bounds, MeshModel};

/// 80-byte comment block plus the little-endian u32 triangle count.
const BINARY_HEADER_LEN: usize = 84;
/// Normal (12) + three vertices (36) + attribute byte count (2).
const RECORD_LEN: usize = 50;
/// Per-component threshold below which a stored normal counts as absent.
const ZERO_NORMAL_EPSILON: f32 = 1e-8;
/// Cross products shorter than this mark a degenerate triangle.
const DEGENERATE_CROSS_EPSILON: f32 = 1e-6;

/// Failures from [`decode`]. The first two variants are structural problems
/// with a binary buffer; [`DecodeError::EmptyMesh`] means the parse itself
/// went through but produced no geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("buffer holds {0} bytes, too short for a binary STL header")]
    HeaderTooShort(usize),
    #[error("binary STL truncated: {declared} triangles need {expected} bytes, buffer holds {actual}")]
    Truncated {
        declared: u32,
        expected: u64,
        actual: usize,
    },
    #[error("STL contains no triangles")]
    EmptyMesh,
}

/// Decodes an STL buffer, picking the binary or ASCII reader by inspection.
///
/// A buffer is treated as binary when the declared triangle count matches
/// the buffer length exactly; otherwise the `solid` keyword at the start of
/// the header selects ASCII. Everything else falls back to binary, so a
/// binary file whose comment happens to begin with `solid` still decodes.
pub fn decode(data: &[u8]) -> Result<MeshModel, DecodeError> {
    if looks_binary(data) {
        decode_binary(data)
    } else {
        decode_ascii(data)
    }
}

fn looks_binary(data: &[u8]) -> bool {
    if data.len() >= BINARY_HEADER_LEN {
        let declared = read_u32(data, 80);
        let expected = BINARY_HEADER_LEN as u64 + declared as u64 * RECORD_LEN as u64;
        if expected == data.len() as u64 {
            return true;
        }
    }
    let head = &data[..data.len().min(80)];
    !String::from_utf8_lossy(head).trim_start().starts_with("solid")
}

fn decode_binary(data: &[u8]) -> Result<MeshModel, DecodeError> {
    if data.len() < BINARY_HEADER_LEN {
        return Err(DecodeError::HeaderTooShort(data.len()));
    }
    let declared = read_u32(data, 80);
    let expected = BINARY_HEADER_LEN as u64 + declared as u64 * RECORD_LEN as u64;
    if expected > data.len() as u64 {
        return Err(DecodeError::Truncated {
            declared,
            expected,
            actual: data.len(),
        });
    }

    let count = declared as usize;
    let mut vertices = Vec::with_capacity(count * 3);
    let mut normals = Vec::with_capacity(count * 3);
    let mut bounds = Bounds::empty();
    let mut recovered = 0usize;

    let mut offset = BINARY_HEADER_LEN;
    for _ in 0..count {
        let stored = read_vector3(data, offset);
        let a = read_point3(data, offset + 12);
        let b = read_point3(data, offset + 24);
        let c = read_point3(data, offset + 36);
        offset += RECORD_LEN;

        let normal = if is_zero_normal(&stored) {
            recovered += 1;
            face_normal(&a, &b, &c)
        } else {
            stored
        };

        for p in [&a, &b, &c] {
            bounds.update(p);
        }
        vertices.push(a);
        vertices.push(b);
        vertices.push(c);
        normals.push(normal);
        normals.push(normal);
        normals.push(normal);
    }

    if vertices.is_empty() {
        return Err(DecodeError::EmptyMesh);
    }
    if recovered > 0 {
        warn!(
            triangles = recovered,
            "recomputed missing normals from vertex winding"
        );
    }
    debug!(triangles = count, flavor = "binary", "decoded STL");
    Ok(MeshModel::new(vertices, normals, bounds))
}

fn decode_ascii(data: &[u8]) -> Result<MeshModel, DecodeError> {
    let text = String::from_utf8_lossy(data);
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut bounds = Bounds::empty();
    // Facets that never state a normal inherit this default.
    let mut current_normal = Vector3::new(0.0, 0.0, 1.0);
    let mut malformed = 0usize;

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("facet") => {
                if tokens.next() == Some("normal") {
                    if let Some([x, y, z]) = take_floats(&mut tokens, &mut malformed) {
                        current_normal = Vector3::new(x, y, z);
                    }
                }
            }
            Some("vertex") => {
                if let Some([x, y, z]) = take_floats(&mut tokens, &mut malformed) {
                    let p = Point3::new(x, y, z);
                    bounds.update(&p);
                    vertices.push(p);
                    normals.push(current_normal);
                }
            }
            _ => {}
        }
    }

    // A vertex count that is not a multiple of three means the last facet
    // was cut off; drop the dangling vertices.
    let whole = vertices.len() - vertices.len() % 3;
    vertices.truncate(whole);
    normals.truncate(whole);

    if vertices.is_empty() {
        return Err(DecodeError::EmptyMesh);
    }
    if malformed > 0 {
        warn!(tokens = malformed, "unparseable coordinates read as 0.0");
    }
    debug!(
        triangles = vertices.len() / 3,
        flavor = "ascii",
        "decoded STL"
    );
    Ok(MeshModel::new(vertices, normals, bounds))
}

/// Pulls three whitespace tokens as floats, reading tokens that fail to
/// parse as 0.0. Returns `None` when fewer than three tokens remain, which
/// skips the line entirely.
fn take_floats<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    malformed: &mut usize,
) -> Option<[f32; 3]> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let token = tokens.next()?;
        *slot = match fast_float::parse(token) {
            Ok(value) => value,
            Err(_) => {
                *malformed += 1;
                0.0
            }
        };
    }
    Some(out)
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_point3(data: &[u8], offset: usize) -> Point3<f32> {
    Point3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

fn read_vector3(data: &[u8], offset: usize) -> Vector3<f32> {
    Vector3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

fn is_zero_normal(n: &Vector3<f32>) -> bool {
    n.x.abs() < ZERO_NORMAL_EPSILON
        && n.y.abs() < ZERO_NORMAL_EPSILON
        && n.z.abs() < ZERO_NORMAL_EPSILON
}

/// Unit normal from the triangle's winding, or +z when the triangle is too
/// thin to define one.
fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    let cross = (b - a).cross(&(c - a));
    let len = cross.norm();
    if len < DEGENERATE_CROSS_EPSILON {
        Vector3::new(0.0, 0.0, 1.0)
    } else {
        cross / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Builds a well-formed binary STL from (normal, [a, b, c]) triples.
    fn binary_stl(triangles: &[([f32; 3], [[f32; 3]; 3])]) -> Vec<u8> {
        let mut data = vec![0u8; 80];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for (normal, verts) in triangles {
            for f in normal {
                data.extend_from_slice(&f.to_le_bytes());
            }
            for vert in verts {
                for f in vert {
                    data.extend_from_slice(&f.to_le_bytes());
                }
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    const UNIT_TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn test_binary_roundtrip_layout() {
        let data = binary_stl(&[
            ([0.0, 0.0, 1.0], UNIT_TRI),
            (
                [1.0, 0.0, 0.0],
                [[2.0, 0.0, 0.0], [2.0, 1.0, 0.0], [2.0, 0.0, 1.0]],
            ),
        ]);
        let model = decode(&data).unwrap();
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.normals.len(), 6);
        assert_relative_eq!(model.vertices[4].y, 1.0);
        assert_relative_eq!(model.normals[3].x, 1.0);
    }

    #[test]
    fn test_binary_zero_triangles_is_empty() {
        let data = binary_stl(&[]);
        assert_eq!(data.len(), 84);
        assert_eq!(decode(&data).unwrap_err(), DecodeError::EmptyMesh);
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = binary_stl(&[([0.0, 0.0, 1.0], UNIT_TRI)]);
        // Claim a second triangle that is not there.
        data[80..84].copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(
            decode(&data).unwrap_err(),
            DecodeError::Truncated {
                declared: 2,
                expected: 184,
                actual: 134,
            }
        );
    }

    #[test]
    fn test_tiny_non_ascii_buffer_is_header_too_short() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        assert_eq!(decode(&data).unwrap_err(), DecodeError::HeaderTooShort(10));
    }

    #[test]
    fn test_binary_wins_detection_even_with_solid_header() {
        let mut data = binary_stl(&[([0.0, 0.0, 1.0], UNIT_TRI)]);
        data[..5].copy_from_slice(b"solid");
        let model = decode(&data).unwrap();
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn test_zero_normal_recomputed_from_winding() {
        let data = binary_stl(&[([0.0, 0.0, 0.0], UNIT_TRI)]);
        let model = decode(&data).unwrap();
        assert_relative_eq!(model.normals[0].z, 1.0);
        assert_relative_eq!(model.normals[0].norm(), 1.0);
    }

    #[test]
    fn test_recomputed_normal_follows_winding() {
        let flipped = [UNIT_TRI[0], UNIT_TRI[2], UNIT_TRI[1]];
        let data = binary_stl(&[([0.0, 0.0, 0.0], flipped)]);
        let model = decode(&data).unwrap();
        assert_relative_eq!(model.normals[0].z, -1.0);
    }

    #[test]
    fn test_degenerate_triangle_gets_default_normal() {
        let p = [3.0, 3.0, 3.0];
        let data = binary_stl(&[([0.0, 0.0, 0.0], [p, p, p])]);
        let model = decode(&data).unwrap();
        assert_relative_eq!(model.normals[0].z, 1.0);
        // Point-like mesh also exercises the radius fallback.
        assert_relative_eq!(model.radius, 1.0);
    }

    #[test]
    fn test_stored_normal_kept_verbatim() {
        // Non-unit stored normals pass through unnormalized.
        let data = binary_stl(&[([0.0, 0.0, 3.0], UNIT_TRI)]);
        let model = decode(&data).unwrap();
        assert_relative_eq!(model.normals[0].z, 3.0);
    }

    #[test]
    fn test_binary_framing_data() {
        let data = binary_stl(&[(
            [0.0, 0.0, 1.0],
            [[-2.0, 0.0, 0.0], [6.0, 0.0, 0.0], [0.0, 4.0, 0.0]],
        )]);
        let model = decode(&data).unwrap();
        assert_relative_eq!(model.centroid.x, 2.0);
        assert_relative_eq!(model.centroid.y, 2.0);
        // Largest extent is 8 along x.
        assert_relative_eq!(model.radius, 4.8);
    }

    const ASCII_TRIANGLE: &str = "\
solid unit
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid unit
";

    #[test]
    fn test_ascii_single_triangle() {
        let model = decode(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(model.triangle_count(), 1);
        for normal in &model.normals {
            assert_relative_eq!(normal.z, 1.0);
        }
        assert_relative_eq!(model.bounds.min.x, 0.0);
        assert_relative_eq!(model.bounds.max.x, 1.0);
        assert_relative_eq!(model.radius, 0.6);
    }

    #[test]
    fn test_ascii_crlf_line_endings() {
        let text = ASCII_TRIANGLE.replace('\n', "\r\n");
        let model = decode(text.as_bytes()).unwrap();
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn test_ascii_malformed_coordinate_reads_as_zero() {
        let text = ASCII_TRIANGLE.replace("vertex 1 0 0", "vertex 1 oops 0");
        let model = decode(text.as_bytes()).unwrap();
        assert_eq!(model.triangle_count(), 1);
        assert_relative_eq!(model.vertices[1].x, 1.0);
        assert_relative_eq!(model.vertices[1].y, 0.0);
    }

    #[test]
    fn test_ascii_short_vertex_line_skipped() {
        let text = ASCII_TRIANGLE.replace("vertex 0 1 0", "vertex 0 1");
        // Two surviving vertices are dropped as a partial facet.
        assert_eq!(decode(text.as_bytes()).unwrap_err(), DecodeError::EmptyMesh);
    }

    #[test]
    fn test_ascii_facet_without_normal_defaults_to_z() {
        let text = "solid s\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendsolid\n";
        let model = decode(text.as_bytes()).unwrap();
        assert_relative_eq!(model.normals[0].z, 1.0);
    }

    #[test]
    fn test_ascii_dangling_vertices_truncated() {
        let text = "solid s\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nvertex 9 9 9\nendsolid\n";
        let model = decode(text.as_bytes()).unwrap();
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn test_ascii_no_vertices_is_empty() {
        assert_eq!(
            decode(b"solid nothing\nendsolid nothing\n").unwrap_err(),
            DecodeError::EmptyMesh
        );
    }

    #[test]
    fn test_ascii_normal_updates_between_facets() {
        let text = "\
solid two
  facet normal 1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
  facet normal 0 1 0
    outer loop
      vertex 5 0 0
      vertex 6 0 0
      vertex 5 1 0
    endloop
  endfacet
endsolid two
";
        let model = decode(text.as_bytes()).unwrap();
        assert_relative_eq!(model.normals[0].x, 1.0);
        assert_relative_eq!(model.normals[3].y, 1.0);
    }
}
