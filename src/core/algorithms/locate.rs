//! Point location and conflict regions.
//!
//! Implements the visibility walk for finding the tetrahedron containing a
//! query point, both on the live [`ManifoldMesh`] during construction and on
//! the finalized flat index/adjacency arrays, plus the conflict-region search
//! used by insertion.
//!
//! # Algorithm
//!
//! The walk starts from a hint tetrahedron and repeatedly:
//! 1. Tests the query point against each face with the exact `to_plane`
//!    predicate (faces are oriented with the outside on the positive side)
//! 2. Crosses the first face the point is strictly outside of
//! 3. Stops when no face separates the point from the tetrahedron, or when the
//!    face to cross is on the hull
//!
//! In a Delaunay tetrahedralization this walk cannot cycle, so it visits at
//! most as many tetrahedra as there are; exceeding that bound means the mesh
//! is corrupt.
//!
//! # References
//!
//! - O. Devillers, S. Pion, and M. Teillaud, "Walking in a Triangulation",
//!   International Journal of Foundations of Computer Science, 2001.

use crate::core::collections::{
    BOUNDARY_BUFFER_SIZE, CAVITY_BUFFER_SIZE, FastHashSet, SmallBuffer,
};
use crate::core::manifold_mesh::ManifoldMesh;
use crate::core::tetrahedron::{CellKey, TriangleKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{ExactPredicates, to_plane};
use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};

/// Buffer of tetrahedron keys sized for a typical cavity.
pub type CellKeyBuffer = SmallBuffer<CellKey, CAVITY_BUFFER_SIZE>;

/// Buffer of outward directed cavity faces.
pub type BoundaryBuffer = SmallBuffer<TriangleKey, BOUNDARY_BUFFER_SIZE>;

/// Result of a point location query on the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateResult {
    /// The point is inside or on the boundary of the tetrahedron
    InsideCell(CellKey),
    /// The point is strictly outside the convex hull
    Outside,
}

/// Error during point location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// Nothing to walk on
    #[error("Cannot locate in empty triangulation")]
    EmptyTriangulation,

    /// Point location needs a spanning tetrahedralization
    #[error("Point location requires dimension 3, found dimension {dimension}")]
    InvalidDimension {
        /// The intrinsic dimension of the input
        dimension: usize,
    },

    /// Cell reference is invalid
    #[error("Invalid cell reference: {cell_key:?}")]
    InvalidCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// A tetrahedron refers to a vertex outside the vertex array
    #[error("Vertex index {index} is out of range")]
    VertexOutOfRange {
        /// The offending index
        index: usize,
    },

    /// An adjacency refers to a tetrahedron outside the index array
    #[error("Tetrahedron index {index} is out of range")]
    TetrahedronOutOfRange {
        /// The offending index
        index: usize,
    },

    /// The walk visited more tetrahedra than exist
    #[error("Cycle detected after {steps} steps - the adjacency structure is inconsistent")]
    CycleDetected {
        /// Number of steps before cycle detection
        steps: usize,
    },
}

/// Error during conflict region finding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// A cell reached during the search does not exist
    #[error("Invalid cell in conflict region: {cell_key:?}")]
    InvalidCell {
        /// The invalid cell key
        cell_key: CellKey,
    },

    /// A tetrahedron refers to a vertex outside the vertex array
    #[error("Vertex index {index} is out of range")]
    VertexOutOfRange {
        /// The offending index
        index: usize,
    },
}

/// Resolves vertex indices to points.
pub(crate) fn corners<'p, T, const N: usize>(
    points: &'p [Point<T, 3>],
    vertices: [usize; N],
) -> Option<[&'p Point<T, 3>; N]>
where
    T: CoordinateScalar,
{
    if vertices.iter().any(|&v| v >= points.len()) {
        return None;
    }
    Some(vertices.map(|v| &points[v]))
}

fn first_out_of_range<const N: usize>(vertices: &[usize; N], len: usize) -> usize {
    vertices.iter().copied().find(|&v| v >= len).unwrap_or(len)
}

// =============================================================================
// WALK ON THE LIVE MESH
// =============================================================================

/// Locates `point` in `mesh` by walking from `hint`.
///
/// A missing or stale hint starts the walk at an arbitrary tetrahedron.
/// Points on a face, edge or vertex are reported inside an incident
/// tetrahedron.
///
/// # Errors
///
/// Returns `LocateError` if the mesh is empty, refers to vertices outside
/// `points`, or the walk exceeds one step per tetrahedron.
///
/// # Examples
///
/// ```rust
/// use tetra_delaunay::core::algorithms::locate::{LocateResult, locate};
/// use tetra_delaunay::core::manifold_mesh::ManifoldMesh;
/// use tetra_delaunay::geometry::point::Point;
/// use tetra_delaunay::geometry::predicates::ExactPredicates;
///
/// let points = [
///     Point::new([0.0, 0.0, 0.0]),
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ];
/// let mut mesh = ManifoldMesh::new();
/// let cell = mesh.insert([0, 1, 2, 3]).unwrap();
/// let mut predicates = ExactPredicates::new();
///
/// let inside = Point::new([0.1, 0.1, 0.1]);
/// assert_eq!(
///     locate(&mesh, &points, &inside, None, &mut predicates),
///     Ok(LocateResult::InsideCell(cell))
/// );
/// let outside = Point::new([2.0, 2.0, 2.0]);
/// assert_eq!(
///     locate(&mesh, &points, &outside, Some(cell), &mut predicates),
///     Ok(LocateResult::Outside)
/// );
/// ```
pub fn locate<T>(
    mesh: &ManifoldMesh,
    points: &[Point<T, 3>],
    point: &Point<T, 3>,
    hint: Option<CellKey>,
    predicates: &mut ExactPredicates,
) -> Result<LocateResult, LocateError>
where
    T: CoordinateScalar,
{
    let mut current = match hint {
        Some(key) if mesh.contains(key) => key,
        _ => mesh
            .tetrahedra()
            .next()
            .map(|(key, _)| key)
            .ok_or(LocateError::EmptyTriangulation)?,
    };

    let max_steps = mesh.len();
    'walk: for _ in 0..max_steps {
        let tetra = mesh.get(current).ok_or(LocateError::InvalidCell {
            cell_key: current,
        })?;

        for j in 0..4 {
            let face = tetra.face(j);
            let [a, b, c] = corners(points, face).ok_or(LocateError::VertexOutOfRange {
                index: first_out_of_range(&face, points.len()),
            })?;
            if predicates.to_plane(point, a, b, c) > 0 {
                match tetra.neighbor(j) {
                    Some(next) => {
                        current = next;
                        continue 'walk;
                    }
                    None => return Ok(LocateResult::Outside),
                }
            }
        }
        return Ok(LocateResult::InsideCell(current));
    }

    Err(LocateError::CycleDetected { steps: max_steps })
}

// =============================================================================
// CONFLICT REGION
// =============================================================================

/// The set of tetrahedra whose circumspheres contain (or pass through) a new
/// point.
///
/// Every tetrahedron is tested at most once; the result of the test is
/// remembered for both members and rejected tetrahedra, so seeding the region
/// from several starting cells and then growing it gives a consistent answer.
#[derive(Debug, Clone, Default)]
pub struct ConflictRegion {
    cells: CellKeyBuffer,
    members: FastHashSet<CellKey>,
    visited: FastHashSet<CellKey>,
}

impl ConflictRegion {
    /// Empty region.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tetrahedra in the region, in discovery order.
    #[must_use]
    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }

    /// Whether `cell` belongs to the region.
    #[must_use]
    pub fn contains(&self, cell: CellKey) -> bool {
        self.members.contains(&cell)
    }

    /// Number of tetrahedra in the region.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the region is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Tests `cell` against `point` (once) and adds it when
    /// `to_circumsphere <= 0`.
    ///
    /// # Errors
    ///
    /// Returns `ConflictError` if `cell` is not in `mesh` or refers to a
    /// vertex outside `points`.
    pub fn test<T>(
        &mut self,
        mesh: &ManifoldMesh,
        points: &[Point<T, 3>],
        point: &Point<T, 3>,
        cell: CellKey,
        predicates: &mut ExactPredicates,
    ) -> Result<bool, ConflictError>
    where
        T: CoordinateScalar,
    {
        if !self.visited.insert(cell) {
            return Ok(self.members.contains(&cell));
        }
        let tetra = mesh
            .get(cell)
            .ok_or(ConflictError::InvalidCell { cell_key: cell })?;
        let vertices = *tetra.vertices();
        let corners = corners(points, vertices).ok_or(ConflictError::VertexOutOfRange {
            index: first_out_of_range(&vertices, points.len()),
        })?;
        if predicates.to_circumsphere(point, corners) <= 0 {
            self.members.insert(cell);
            self.cells.push(cell);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Flood fills from the current members across shared faces.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`ConflictRegion::test`].
    pub fn grow<T>(
        &mut self,
        mesh: &ManifoldMesh,
        points: &[Point<T, 3>],
        point: &Point<T, 3>,
        predicates: &mut ExactPredicates,
    ) -> Result<(), ConflictError>
    where
        T: CoordinateScalar,
    {
        let mut stack: CellKeyBuffer = self.cells.clone();
        while let Some(cell) = stack.pop() {
            let tetra = mesh
                .get(cell)
                .ok_or(ConflictError::InvalidCell { cell_key: cell })?;
            for neighbor in tetra.neighbors().iter().flatten().copied() {
                if !self.visited.contains(&neighbor)
                    && self.test(mesh, points, point, neighbor, predicates)?
                {
                    stack.push(neighbor);
                }
            }
        }
        Ok(())
    }

    /// Faces of the region whose other side is outside it (another
    /// tetrahedron or nothing), oriented outward from the region.
    ///
    /// # Errors
    ///
    /// Returns `ConflictError::InvalidCell` if a member is no longer in `mesh`.
    pub fn boundary(&self, mesh: &ManifoldMesh) -> Result<BoundaryBuffer, ConflictError> {
        let mut boundary = BoundaryBuffer::new();
        for &cell in &self.cells {
            let tetra = mesh
                .get(cell)
                .ok_or(ConflictError::InvalidCell { cell_key: cell })?;
            for j in 0..4 {
                let is_boundary = tetra
                    .neighbor(j)
                    .is_none_or(|neighbor| !self.members.contains(&neighbor));
                if is_boundary {
                    boundary.push(TriangleKey::new(tetra.face(j)));
                }
            }
        }
        Ok(boundary)
    }
}

// =============================================================================
// WALK ON FLAT ARRAYS
// =============================================================================

/// Bookkeeping of a point location query on the finalized arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchInfo {
    /// Where the walk starts; reset to 0 when out of range.
    pub initial_tetrahedron: usize,
    /// Every tetrahedron visited, in order.
    pub path: Vec<usize>,
    /// The last tetrahedron visited.
    pub final_tetrahedron: Option<usize>,
    /// Vertices of the last tetrahedron. When the point is outside the hull,
    /// the first three are the hull face that was exited.
    pub final_v: [usize; 4],
}

impl SearchInfo {
    /// Search starting at `initial_tetrahedron`.
    #[must_use]
    pub fn starting_at(initial_tetrahedron: usize) -> Self {
        Self {
            initial_tetrahedron,
            ..Self::default()
        }
    }
}

/// Faces of the flat-array walk in table order: local vertices with the face
/// first, and the `to_plane` sign that means the face is crossed.
const WALK_FACES: [([usize; 4], i32); 4] = [
    ([1, 2, 3, 0], 1),
    ([0, 2, 3, 1], -1),
    ([0, 1, 3, 2], 1),
    ([0, 1, 2, 3], -1),
];

/// Finds the tetrahedron of the flat arrays containing `point`.
///
/// `indices[4 * t + k]` is vertex `k` of tetrahedron `t` and
/// `adjacencies[4 * t + k]` the tetrahedron across face `k`. Returns
/// `Ok(None)` when the walk leaves through a hull face; `search` then names
/// that face.
///
/// # Errors
///
/// Returns `LocateError` for empty arrays, vertex indices outside `vertices`,
/// adjacencies naming a missing tetrahedron, or a walk longer than the number
/// of tetrahedra.
pub fn locate_in_arrays<T>(
    vertices: &[Point<T, 3>],
    indices: &[usize],
    adjacencies: &[Option<usize>],
    point: &Point<T, 3>,
    search: &mut SearchInfo,
) -> Result<Option<usize>, LocateError>
where
    T: CoordinateScalar,
{
    let number_of_tetrahedra = indices.len() / 4;
    if number_of_tetrahedra == 0 {
        return Err(LocateError::EmptyTriangulation);
    }
    if search.initial_tetrahedron >= number_of_tetrahedra {
        search.initial_tetrahedron = 0;
    }
    search.path.clear();
    search.final_tetrahedron = None;

    let mut current = search.initial_tetrahedron;
    for _ in 0..number_of_tetrahedra {
        search.path.push(current);
        search.final_tetrahedron = Some(current);

        let base = 4 * current;
        let v: [usize; 4] = indices
            .get(base..base + 4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(LocateError::TetrahedronOutOfRange { index: current })?;
        search.final_v = v;
        let p = corners(vertices, v).ok_or(LocateError::VertexOutOfRange {
            index: first_out_of_range(&v, vertices.len()),
        })?;

        let crossed = WALK_FACES.iter().position(|&([a, b, c, _], side)| {
            to_plane(point, p[a], p[b], p[c]) * side > 0
        });
        let Some(face) = crossed else {
            return Ok(Some(current));
        };
        match adjacencies.get(base + face).copied().flatten() {
            Some(next) if next < number_of_tetrahedra => current = next,
            Some(next) => return Err(LocateError::TetrahedronOutOfRange { index: next }),
            None => {
                search.final_v = WALK_FACES[face].0.map(|k| v[k]);
                return Ok(None);
            }
        }
    }

    Err(LocateError::CycleDetected {
        steps: number_of_tetrahedra,
    })
}
