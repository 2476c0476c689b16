//! Wavefront OBJ mesh export.
//!
//! One `v x up y` line per cell and one 1-based `f i j k` line per triangle.
//! No normals, texture coordinates or materials.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::DVec3;

use crate::error::{Result, TerrainError};
use crate::geometry::Triangulation;

/// Vertex positions `(x, field * vertical_scale, y)` for each triangulation point.
pub fn mesh_vertices(tri: &Triangulation, field: &[f64], vertical_scale: f64) -> Result<Vec<DVec3>> {
    if field.len() != tri.points.len() {
        return Err(TerrainError::FieldLength {
            expected: tri.points.len(),
            actual: field.len(),
        });
    }
    Ok(tri
        .points
        .iter()
        .zip(field)
        .map(|(p, &v)| DVec3::new(p.x, v * vertical_scale, p.y))
        .collect())
}

/// Writes the mesh to any byte sink.
///
/// Coordinates use Rust's shortest round-trip float formatting, so parsing a
/// vertex back yields exactly `field[c] * vertical_scale`.
pub fn write_obj<W: Write>(writer: W, tri: &Triangulation, field: &[f64], vertical_scale: f64) -> Result<()> {
    let vertices = mesh_vertices(tri, field, vertical_scale)?;
    let mut out = BufWriter::new(writer);

    for v in &vertices {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for [a, b, c] in tri.iter_triangles() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the mesh to `path`.
pub fn export_obj(path: &Path, tri: &Triangulation, field: &[f64], vertical_scale: f64) -> Result<()> {
    let file = File::create(path)?;
    write_obj(file, tri, field, vertical_scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangulate_grid;
    use tempfile::tempdir;

    fn parse(text: &str) -> (Vec<[f64; 3]>, Vec<[usize; 3]>) {
        let mut verts = Vec::new();
        let mut faces = Vec::new();
        for line in text.lines() {
            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let v: Vec<f64> = parts.map(|p| p.parse().unwrap()).collect();
                    verts.push([v[0], v[1], v[2]]);
                }
                Some("f") => {
                    let f: Vec<usize> = parts.map(|p| p.parse().unwrap()).collect();
                    faces.push([f[0], f[1], f[2]]);
                }
                other => panic!("unexpected line {:?}", other),
            }
        }
        (verts, faces)
    }

    #[test]
    fn test_vertex_heights_round_trip() {
        let tri = triangulate_grid(4, 3).unwrap();
        let field: Vec<f64> = (0..12).map(|i| (i as f64 * 0.37).sin() * 1.1e-3 + 0.1).collect();
        let mut buf = Vec::new();
        write_obj(&mut buf, &tri, &field, 100.0).unwrap();

        let (verts, faces) = parse(&String::from_utf8(buf).unwrap());
        assert_eq!(verts.len(), 12);
        assert_eq!(faces.len(), tri.triangle_count());
        for (i, v) in verts.iter().enumerate() {
            assert_eq!(v[0], (i % 4) as f64);
            assert_eq!(v[2], (i / 4) as f64);
            assert_eq!(v[1], field[i] * 100.0);
        }
    }

    #[test]
    fn test_faces_are_one_based() {
        let tri = triangulate_grid(2, 2).unwrap();
        let mut buf = Vec::new();
        write_obj(&mut buf, &tri, &[0.0; 4], 1.0).unwrap();
        let (_, faces) = parse(&String::from_utf8(buf).unwrap());
        let all: Vec<usize> = faces.iter().flatten().copied().collect();
        assert!(all.iter().all(|&i| (1..=4).contains(&i)));
        assert!(all.contains(&4));
    }

    #[test]
    fn test_faces_point_up() {
        let tri = triangulate_grid(4, 4).unwrap();
        let field: Vec<f64> = (0..16).map(|i| (i % 3) as f64 * 0.2).collect();
        let verts = mesh_vertices(&tri, &field, 1.0).unwrap();
        for [a, b, c] in tri.iter_triangles() {
            let n = (verts[b] - verts[a]).cross(verts[c] - verts[a]);
            assert!(n.y > 0.0, "face {:?} normal {:?}", [a, b, c], n);
        }
    }

    #[test]
    fn test_field_length_mismatch() {
        let tri = triangulate_grid(3, 3).unwrap();
        let err = write_obj(Vec::new(), &tri, &[0.0; 5], 1.0).unwrap_err();
        assert!(matches!(err, TerrainError::FieldLength { expected: 9, actual: 5 }));
    }

    #[test]
    fn test_export_obj_file() {
        let tri = triangulate_grid(3, 3).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("mesh.obj");
        export_obj(&path, &tri, &[1.0; 9], 2.0).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 9);
        assert!(text.lines().next().unwrap().starts_with("v 0 2 0"));
    }

    #[test]
    fn test_rejected_write_is_reported() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let tri = triangulate_grid(2, 2).unwrap();
        let err = write_obj(Closed, &tri, &[0.0; 4], 1.0).unwrap_err();
        assert!(err.is_write_failure());
    }
}
