//! Incremental vertex insertion.
//!
//! Each vertex is inserted in one of two ways, depending on where the walk in
//! [`locate`] finds it:
//!
//! - **Interior**: the conflict region grows from the containing tetrahedron.
//!   Its tetrahedra are removed and every boundary face that the new vertex
//!   sees from the inside is joined to it.
//! - **Hull**: the region is seeded from the tetrahedra behind hull faces that
//!   the vertex sees from the outside. Visible hull faces whose tetrahedron
//!   is not in conflict are joined to the vertex with reversed orientation.
//!
//! Both cases keep every tetrahedron positively oriented and the mesh a
//! Delaunay tetrahedralization of the vertices inserted so far.

use crate::core::algorithms::locate::{
    BoundaryBuffer, ConflictError, ConflictRegion, LocateError, LocateResult, corners, locate,
};
use crate::core::manifold_mesh::ManifoldMesh;
use crate::core::tetrahedron::{CellKey, FaceKey, TriangleKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::ExactPredicates;
use crate::geometry::traits::coordinate::CoordinateScalar;
use thiserror::Error;

/// Failures of the insertion engine.
///
/// All of these indicate an inconsistent mesh; none is expected for valid
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InsertionError {
    /// The seed tetrahedron could not be inserted into the mesh.
    #[error("Seed tetrahedron {vertices:?} was rejected by the mesh")]
    SeedRejected {
        /// Vertex indices of the seed.
        vertices: [usize; 4],
    },

    /// The mesh refused a new tetrahedron.
    #[error("Failed to insert tetrahedron {vertices:?}")]
    InsertionFailed {
        /// Vertex indices of the refused tetrahedron.
        vertices: [usize; 4],
    },

    /// A conflicting tetrahedron was not found for removal.
    #[error("Failed to remove tetrahedron {vertices:?}")]
    RemovalFailed {
        /// Vertex indices of the missing tetrahedron.
        vertices: [usize; 4],
    },

    /// A hull face does not match a face of its tetrahedron.
    #[error("Hull face {face:?} is not a face of its tetrahedron")]
    MissingHullFace {
        /// Sorted vertex indices of the face.
        face: [usize; 3],
    },

    /// The containing tetrahedron was not in conflict with the vertex.
    #[error("Vertex {vertex} produced an empty conflict region")]
    EmptyCavity {
        /// Index of the vertex being inserted.
        vertex: usize,
    },

    /// A vertex index does not refer to an input point.
    #[error("Vertex index {index} is out of range")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
    },

    /// Point location failed.
    #[error("Location error: {0}")]
    Locate(#[from] LocateError),

    /// Conflict region search failed.
    #[error("Conflict region error: {0}")]
    ConflictRegion(#[from] ConflictError),
}

/// Which case handled an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionCase {
    /// Inside the current convex hull (or on its boundary).
    Interior,
    /// Outside the current convex hull.
    Hull,
}

/// Outcome of [`insert_vertex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionInfo {
    /// The last tetrahedron created, a good hint for the next walk.
    pub last_created: CellKey,
    /// Which case handled the vertex.
    pub case: InsertionCase,
    /// Number of tetrahedra removed.
    pub removed: usize,
    /// Number of tetrahedra created.
    pub created: usize,
}

/// Inserts the seed tetrahedron, which must already be positively oriented.
///
/// # Errors
///
/// Returns `InsertionError::SeedRejected` if the mesh refuses it.
pub fn insert_seed(mesh: &mut ManifoldMesh, vertices: [usize; 4]) -> Result<CellKey, InsertionError> {
    mesh.insert(vertices)
        .ok_or(InsertionError::SeedRejected { vertices })
}

/// Inserts `points[index]` into `mesh`, starting the walk at `hint`.
///
/// # Errors
///
/// Returns `InsertionError` when the mesh is inconsistent: a walk that cycles,
/// a tetrahedron that cannot be removed or created, or a hull face that does
/// not belong to its tetrahedron.
pub fn insert_vertex<T>(
    mesh: &mut ManifoldMesh,
    points: &[Point<T, 3>],
    index: usize,
    hint: Option<CellKey>,
    predicates: &mut ExactPredicates,
) -> Result<InsertionInfo, InsertionError>
where
    T: CoordinateScalar,
{
    let point = points
        .get(index)
        .ok_or(InsertionError::VertexOutOfRange { index })?;

    match locate(mesh, points, point, hint, predicates)? {
        LocateResult::InsideCell(cell) => {
            insert_interior(mesh, points, index, point, cell, predicates)
        }
        LocateResult::Outside => insert_outside(mesh, points, index, point, predicates),
    }
}

fn insert_interior<T>(
    mesh: &mut ManifoldMesh,
    points: &[Point<T, 3>],
    index: usize,
    point: &Point<T, 3>,
    cell: CellKey,
    predicates: &mut ExactPredicates,
) -> Result<InsertionInfo, InsertionError>
where
    T: CoordinateScalar,
{
    let mut region = ConflictRegion::new();
    if !region.test(mesh, points, point, cell, predicates)? {
        return Err(InsertionError::EmptyCavity { vertex: index });
    }
    region.grow(mesh, points, point, predicates)?;

    let boundary = region.boundary(mesh)?;
    let removed = remove_region(mesh, &region)?;
    let (last_created, created) =
        fill_cavity(mesh, points, index, point, &boundary, &[], predicates)?;
    let last_created = last_created.ok_or(InsertionError::EmptyCavity { vertex: index })?;

    tracing::trace!(index, removed, created, "interior insertion");
    Ok(InsertionInfo {
        last_created,
        case: InsertionCase::Interior,
        removed,
        created,
    })
}

fn insert_outside<T>(
    mesh: &mut ManifoldMesh,
    points: &[Point<T, 3>],
    index: usize,
    point: &Point<T, 3>,
    predicates: &mut ExactPredicates,
) -> Result<InsertionInfo, InsertionError>
where
    T: CoordinateScalar,
{
    let mut region = ConflictRegion::new();
    let mut visible = BoundaryBuffer::new();

    for face in mesh.faces().filter(|face| face.is_boundary()) {
        let missing = InsertionError::MissingHullFace {
            face: *face.vertices(),
        };
        let Some(cell) = face.tetrahedra()[0] else {
            return Err(missing);
        };
        let tetra = mesh.get(cell).ok_or_else(|| missing.clone())?;
        let j = tetra
            .face_index(&FaceKey::new(*face.vertices()))
            .ok_or(missing)?;
        let directed = tetra.face(j);
        let [a, b, c] = corners(points, directed).ok_or(InsertionError::VertexOutOfRange {
            index: directed.into_iter().max().unwrap_or_default(),
        })?;

        if predicates.to_plane(point, a, b, c) > 0
            && !region.test(mesh, points, point, cell, predicates)?
        {
            visible.push(TriangleKey::new(directed));
        }
    }
    region.grow(mesh, points, point, predicates)?;

    let boundary = region.boundary(mesh)?;
    let removed = remove_region(mesh, &region)?;
    let (last_created, created) =
        fill_cavity(mesh, points, index, point, &boundary, &visible, predicates)?;
    let last_created = last_created.ok_or(InsertionError::EmptyCavity { vertex: index })?;

    tracing::trace!(index, removed, created, visible = visible.len(), "hull insertion");
    Ok(InsertionInfo {
        last_created,
        case: InsertionCase::Hull,
        removed,
        created,
    })
}

fn remove_region(mesh: &mut ManifoldMesh, region: &ConflictRegion) -> Result<usize, InsertionError> {
    let mut doomed = Vec::with_capacity(region.len());
    for &cell in region.cells() {
        let tetra = mesh
            .get(cell)
            .ok_or(ConflictError::InvalidCell { cell_key: cell })?;
        doomed.push(*tetra.vertices());
    }
    for vertices in &doomed {
        if !mesh.remove(*vertices) {
            return Err(InsertionError::RemovalFailed {
                vertices: *vertices,
            });
        }
    }
    Ok(doomed.len())
}

/// Joins `apex` to the cavity faces it sees from inside and to the visible
/// hull faces (reversed). Faces coplanar with the apex are skipped.
fn fill_cavity<T>(
    mesh: &mut ManifoldMesh,
    points: &[Point<T, 3>],
    apex: usize,
    point: &Point<T, 3>,
    boundary: &[TriangleKey],
    visible: &[TriangleKey],
    predicates: &mut ExactPredicates,
) -> Result<(Option<CellKey>, usize), InsertionError>
where
    T: CoordinateScalar,
{
    let mut last_created = None;
    let mut created = 0;

    for face in boundary {
        let [f0, f1, f2] = *face.vertices();
        let [a, b, c] = corners(points, [f0, f1, f2])
            .ok_or(InsertionError::VertexOutOfRange { index: f0.max(f1).max(f2) })?;
        if predicates.to_plane(point, a, b, c) < 0 {
            let vertices = [apex, f0, f1, f2];
            last_created = Some(
                mesh.insert(vertices)
                    .ok_or(InsertionError::InsertionFailed { vertices })?,
            );
            created += 1;
        }
    }

    for face in visible {
        let [f0, f1, f2] = *face.vertices();
        let vertices = [apex, f0, f2, f1];
        last_created = Some(
            mesh.insert(vertices)
                .ok_or(InsertionError::InsertionFailed { vertices })?,
        );
        created += 1;
    }

    Ok((last_created, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::predicates::{to_circumsphere, to_plane};

    fn p(x: f64, y: f64, z: f64) -> Point<f64, 3> {
        Point::new([x, y, z])
    }

    fn seeded(points: &[Point<f64, 3>]) -> ManifoldMesh {
        let mut mesh = ManifoldMesh::new();
        assert_eq!(to_plane(&points[3], &points[0], &points[1], &points[2]), 1);
        insert_seed(&mut mesh, [0, 1, 2, 3]).unwrap();
        mesh
    }

    fn assert_delaunay(mesh: &ManifoldMesh, points: &[Point<f64, 3>], inserted: usize) {
        mesh.validate_neighbors().unwrap();
        for (_, tetra) in mesh.tetrahedra() {
            let [v0, v1, v2, v3] = tetra.vertices().map(|v| &points[v]);
            assert_eq!(to_plane(v3, v0, v1, v2), 1, "negative tetrahedron");
            for (i, q) in points.iter().enumerate().take(inserted) {
                if !tetra.vertices().contains(&i) {
                    assert!(to_circumsphere(q, v0, v1, v2, v3) >= 0);
                }
            }
        }
    }

    #[test]
    fn interior_insertion_splits_tetrahedron() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(0.2, 0.2, 0.2),
        ];
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        let info = insert_vertex(&mut mesh, &points, 4, None, &mut predicates).unwrap();
        assert_eq!(info.case, InsertionCase::Interior);
        assert_eq!(info.removed, 1);
        assert_eq!(info.created, 4);
        assert!(mesh.contains(info.last_created));
        assert_eq!(mesh.len(), 4);
        assert_delaunay(&mesh, &points, 5);
    }

    #[test]
    fn hull_insertion_joins_visible_face() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(0.3, 0.3, -5.0),
        ];
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        let info = insert_vertex(&mut mesh, &points, 4, None, &mut predicates).unwrap();
        assert_eq!(info.case, InsertionCase::Hull);
        assert_eq!(mesh.len(), 2);
        assert_delaunay(&mesh, &points, 5);
    }

    #[test]
    fn hull_insertion_can_remove_seed() {
        // Close to the x = 0 face: the seed's circumsphere contains it.
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(-0.05, 0.3, 0.3),
        ];
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        let info = insert_vertex(&mut mesh, &points, 4, None, &mut predicates).unwrap();
        assert_eq!(info.case, InsertionCase::Hull);
        assert_eq!(info.removed, 1);
        assert_delaunay(&mesh, &points, 5);
    }

    #[test]
    fn point_on_hull_face_is_interior() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(0.25, 0.25, 0.0),
        ];
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        let info = insert_vertex(&mut mesh, &points, 4, None, &mut predicates).unwrap();
        assert_eq!(info.case, InsertionCase::Interior);
        // The face containing the point is dropped; three tetrahedra remain.
        assert_eq!(info.created, 3);
        assert_delaunay(&mesh, &points, 5);
    }

    #[test]
    fn sequence_of_insertions_stays_delaunay() {
        let mut points = vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(0.0, 0.0, 4.0),
        ];
        // Deterministic scatter in and around the seed.
        for i in 0..40_u32 {
            let f = f64::from(i);
            points.push(p(
                (f * 0.618_034).fract() * 6.0 - 1.0,
                (f * 0.414_214).fract() * 6.0 - 1.0,
                (f * 0.732_051).fract() * 6.0 - 1.0,
            ));
        }
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        let mut hint = None;
        for index in 4..points.len() {
            let info = insert_vertex(&mut mesh, &points, index, hint, &mut predicates).unwrap();
            hint = Some(info.last_created);
        }
        assert_delaunay(&mesh, &points, points.len());
    }

    #[test]
    fn seed_rejected_twice() {
        let mut mesh = ManifoldMesh::new();
        insert_seed(&mut mesh, [0, 1, 2, 3]).unwrap();
        assert_eq!(
            insert_seed(&mut mesh, [3, 2, 1, 0]),
            Err(InsertionError::SeedRejected {
                vertices: [3, 2, 1, 0]
            })
        );
    }

    #[test]
    fn out_of_range_vertex() {
        let points = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ];
        let mut mesh = seeded(&points);
        let mut predicates = ExactPredicates::new();
        assert_eq!(
            insert_vertex(&mut mesh, &points, 9, None, &mut predicates),
            Err(InsertionError::VertexOutOfRange { index: 9 })
        );
    }
}
