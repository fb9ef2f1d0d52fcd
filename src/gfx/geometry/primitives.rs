//! # Primitive Shape Generation
//!
//! All shapes are Y-up: the floor lies in the XZ plane.

use super::GeometryData;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes and per-face
/// normals pointing outward.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|n| std::iter::repeat(*n).take(4))
        .collect();

    // Two triangles per face, counter-clockwise
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a horizontal plane in the XZ plane
///
/// # Arguments
/// * `width` - Size along X
/// * `depth` - Size along Z
/// * `width_segments` - Number of subdivisions along X
/// * `depth_segments` - Number of subdivisions along Z
///
/// Returns a plane centered at the origin with its normal pointing up (+Y),
/// wound counter-clockwise when viewed from above.
pub fn generate_ground_plane(
    width: f32,
    depth: f32,
    width_segments: u32,
    depth_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for z in 0..=d_segs {
        let v = z as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.push(i);
            data.indices.push(next_row);
            data.indices.push(i + 1);

            data.indices.push(next_row);
            data.indices.push(next_row + 1);
            data.indices.push(i + 1);
        }
    }

    data
}

/// Line geometry of a square reference grid, split by color role
#[derive(Debug, Clone, Default)]
pub struct GridLines {
    /// The two lines through the origin
    pub center: GeometryData,
    /// Every other division line
    pub lines: GeometryData,
}

/// Generate a square grid of line segments in the XZ plane
///
/// `divisions` cells per side; the two lines crossing the origin (present
/// when `divisions` is even) go to [`GridLines::center`].
pub fn generate_grid_lines(size: f32, divisions: u32) -> GridLines {
    let divisions = divisions.max(1);
    let half = size * 0.5;
    let step = size / divisions as f32;
    let center_index = if divisions % 2 == 0 {
        Some(divisions / 2)
    } else {
        None
    };

    let mut grid = GridLines::default();
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let target = if Some(i) == center_index {
            &mut grid.center
        } else {
            &mut grid.lines
        };
        push_segment(target, [-half, 0.0, k], [half, 0.0, k]);
        push_segment(target, [k, 0.0, -half], [k, 0.0, half]);
    }
    grid
}

fn push_segment(data: &mut GeometryData, a: [f32; 3], b: [f32; 3]) {
    let base = data.vertices.len() as u32;
    data.vertices.push(a);
    data.vertices.push(b);
    data.normals.push([0.0, 1.0, 0.0]);
    data.normals.push([0.0, 1.0, 0.0]);
    data.indices.push(base);
    data.indices.push(base + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.normals.len(), 24);
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_ground_plane_is_horizontal() {
        let plane = generate_ground_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_grid_splits_center_lines() {
        let grid = generate_grid_lines(10.0, 4);
        assert_eq!(grid.center.vertex_count(), 4);
        assert_eq!(grid.lines.vertex_count(), 4 * 4);
        assert!(grid.center.vertices.iter().all(|v| v[0] == 0.0 || v[2] == 0.0));
    }

    #[test]
    fn test_odd_grid_has_no_center_line() {
        let grid = generate_grid_lines(9.0, 3);
        assert!(grid.center.vertices.is_empty());
        assert_eq!(grid.lines.indices.len(), 4 * 2 * 2);
    }
}
