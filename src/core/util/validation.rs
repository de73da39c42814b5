//! Validation of a finished tetrahedralization given as flat arrays.
//!
//! These checks are quadratic and meant for tests and debugging, not for the
//! construction path.

use crate::core::algorithms::locate::corners;
use crate::core::tetrahedron::{FaceKey, OPPOSITE_FACE};
use crate::geometry::point::Point;
use crate::geometry::predicates::{to_circumsphere, to_plane};
use crate::geometry::traits::coordinate::CoordinateScalar;
use thiserror::Error;

/// Ways a tetrahedralization can fail validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A vertex lies strictly inside the circumsphere of a tetrahedron.
    #[error("Vertex {vertex} lies inside the circumsphere of tetrahedron {tetrahedron}")]
    DelaunayViolation {
        /// Index of the tetrahedron.
        tetrahedron: usize,
        /// Index of the offending vertex.
        vertex: usize,
    },

    /// A tetrahedron is not positively oriented.
    #[error("Tetrahedron {tetrahedron} is not positively oriented")]
    InvertedTetrahedron {
        /// Index of the tetrahedron.
        tetrahedron: usize,
    },

    /// The neighbor across a face does not link back through the same face.
    #[error("Adjacency of tetrahedron {tetrahedron} across face {face} is not symmetric")]
    AsymmetricAdjacency {
        /// Index of the tetrahedron.
        tetrahedron: usize,
        /// Local face index.
        face: usize,
    },

    /// A hull face has input vertices on its outer side, or the hull does not
    /// match the faces without neighbors.
    #[error("Hull face {face} is inconsistent with the tetrahedralization")]
    HullMismatch {
        /// Index of the face in the hull array.
        face: usize,
    },

    /// The arrays refer to vertices or tetrahedra that do not exist.
    #[error("Index {index} is out of range")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
    },

    /// The operation needs a spanning tetrahedralization.
    #[error("Validation requires dimension 3, found dimension {dimension}")]
    WrongDimension {
        /// The intrinsic dimension of the input.
        dimension: usize,
    },
}

fn tetrahedron_at(indices: &[usize], t: usize) -> [usize; 4] {
    let base = 4 * t;
    [indices[base], indices[base + 1], indices[base + 2], indices[base + 3]]
}

fn face_of(tetrahedron: [usize; 4], j: usize) -> [usize; 3] {
    OPPOSITE_FACE[j].map(|k| tetrahedron[k])
}

/// Checks that every tetrahedron is positively oriented and that no vertex
/// lies strictly inside any circumsphere.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_delaunay<T>(vertices: &[Point<T, 3>], indices: &[usize]) -> Result<(), ValidationError>
where
    T: CoordinateScalar,
{
    for t in 0..indices.len() / 4 {
        let tetrahedron = tetrahedron_at(indices, t);
        let [v0, v1, v2, v3] = corners(vertices, tetrahedron).ok_or(ValidationError::IndexOutOfRange {
            index: tetrahedron.into_iter().max().unwrap_or_default(),
        })?;
        if to_plane(v3, v0, v1, v2) <= 0 {
            return Err(ValidationError::InvertedTetrahedron { tetrahedron: t });
        }
        for (vertex, point) in vertices.iter().enumerate() {
            if !tetrahedron.contains(&vertex) && to_circumsphere(point, v0, v1, v2, v3) < 0 {
                return Err(ValidationError::DelaunayViolation {
                    tetrahedron: t,
                    vertex,
                });
            }
        }
    }
    Ok(())
}

/// Checks that every adjacency is mutual and that both sides name the same
/// face.
///
/// # Errors
///
/// Returns the first asymmetric link found.
pub fn validate_adjacencies(indices: &[usize], adjacencies: &[Option<usize>]) -> Result<(), ValidationError> {
    let count = indices.len() / 4;
    if adjacencies.len() != 4 * count {
        return Err(ValidationError::IndexOutOfRange {
            index: adjacencies.len(),
        });
    }
    for t in 0..count {
        let tetrahedron = tetrahedron_at(indices, t);
        for j in 0..4 {
            let Some(n) = adjacencies[4 * t + j] else {
                continue;
            };
            if n >= count {
                return Err(ValidationError::IndexOutOfRange { index: n });
            }
            let face = FaceKey::new(face_of(tetrahedron, j));
            let neighbor = tetrahedron_at(indices, n);
            let links_back = (0..4).any(|k| {
                adjacencies[4 * n + k] == Some(t) && FaceKey::new(face_of(neighbor, k)) == face
            });
            if !links_back {
                return Err(ValidationError::AsymmetricAdjacency {
                    tetrahedron: t,
                    face: j,
                });
            }
        }
    }
    Ok(())
}

/// Checks that `hull` lists exactly the faces without neighbors, each with
/// every vertex on or behind it.
///
/// # Errors
///
/// Returns `ValidationError::HullMismatch` naming the first bad face.
pub fn validate_hull<T>(
    vertices: &[Point<T, 3>],
    adjacencies: &[Option<usize>],
    hull: &[usize],
) -> Result<(), ValidationError>
where
    T: CoordinateScalar,
{
    let open_faces = adjacencies.iter().filter(|a| a.is_none()).count();
    if hull.len() != 3 * open_faces {
        return Err(ValidationError::HullMismatch { face: 0 });
    }
    for (face, triangle) in hull.chunks_exact(3).enumerate() {
        let [a, b, c] = corners(vertices, [triangle[0], triangle[1], triangle[2]])
            .ok_or(ValidationError::HullMismatch { face })?;
        if vertices.iter().any(|p| to_plane(p, a, b, c) > 0) {
            return Err(ValidationError::HullMismatch { face });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_simplex() -> Vec<Point<f64, 3>> {
        vec![
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn single_tetrahedron_is_valid() {
        let vertices = unit_simplex();
        let indices = [0, 1, 2, 3];
        assert_eq!(validate_delaunay(&vertices, &indices), Ok(()));
        assert_eq!(validate_adjacencies(&indices, &[None; 4]), Ok(()));
        let hull = [1, 2, 3, 0, 3, 2, 0, 1, 3, 0, 2, 1];
        assert_eq!(validate_hull(&vertices, &[None; 4], &hull), Ok(()));
    }

    #[test]
    fn detects_inverted_and_non_delaunay() {
        let mut vertices = unit_simplex();
        assert_eq!(
            validate_delaunay(&vertices, &[0, 2, 1, 3]),
            Err(ValidationError::InvertedTetrahedron { tetrahedron: 0 })
        );
        vertices.push(Point::new([0.2, 0.2, 0.2]));
        assert_eq!(
            validate_delaunay(&vertices, &[0, 1, 2, 3]),
            Err(ValidationError::DelaunayViolation {
                tetrahedron: 0,
                vertex: 4
            })
        );
    }

    #[test]
    fn detects_one_sided_adjacency() {
        let indices = [0, 1, 2, 3, 4, 1, 3, 2];
        let mut adjacencies = [Some(1), None, None, None, Some(0), None, None, None];
        assert_eq!(validate_adjacencies(&indices, &adjacencies), Ok(()));
        adjacencies[4] = None;
        assert_eq!(
            validate_adjacencies(&indices, &adjacencies),
            Err(ValidationError::AsymmetricAdjacency {
                tetrahedron: 0,
                face: 0
            })
        );
        adjacencies[4] = Some(0);
        adjacencies[0] = Some(7);
        assert_eq!(
            validate_adjacencies(&indices, &adjacencies),
            Err(ValidationError::IndexOutOfRange { index: 7 })
        );
    }

    #[test]
    fn detects_reversed_hull_face() {
        let vertices = unit_simplex();
        let hull = [1, 3, 2, 0, 3, 2, 0, 1, 3, 0, 2, 1];
        assert_eq!(
            validate_hull(&vertices, &[None; 4], &hull),
            Err(ValidationError::HullMismatch { face: 0 })
        );
    }
}
