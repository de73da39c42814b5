//! Incremental 3D Delaunay tetrahedralization.
//!
//! [`Delaunay3`] classifies the input by intrinsic dimension and, when the
//! points span space, inserts them one at a time into a [`ManifoldMesh`].
//! Every topological decision is made by exact predicates, so the result
//! satisfies the empty-circumsphere property for any finite input, including
//! coplanar and cospherical configurations.
//!
//! The finished tetrahedralization is exposed as flat arrays:
//! `indices()[4 * t + k]` is vertex `k` of tetrahedron `t`, and
//! `adjacencies()[4 * t + k]` is the tetrahedron across the face opposite
//! that vertex, `None` on the hull.
//!
//! # Examples
//!
//! ```
//! use tetra_delaunay::prelude::*;
//!
//! let points = [
//!     Point::new([0.0, 0.0, 0.0]),
//!     Point::new([1.0, 0.0, 0.0]),
//!     Point::new([0.0, 1.0, 0.0]),
//!     Point::new([0.0, 0.0, 1.0]),
//!     Point::new([1.0, 1.0, 1.0]),
//! ];
//! let mut delaunay = Delaunay3::new();
//! assert!(delaunay.tetrahedralize(&points).unwrap());
//! assert_eq!(delaunay.dimension(), 3);
//! assert_eq!(delaunay.number_of_tetrahedra(), 2);
//! assert!(delaunay.is_valid());
//!
//! let mut search = SearchInfo::default();
//! let inside = Point::new([0.1, 0.1, 0.1]);
//! assert!(delaunay.containing_tetrahedron(&inside, &mut search).unwrap().is_some());
//! ```

use crate::core::algorithms::insertion::{InsertionError, insert_seed, insert_vertex};
use crate::core::algorithms::locate::{LocateError, SearchInfo, locate_in_arrays};
use crate::core::collections::{FastHashMap, fast_hash_map_with_capacity};
use crate::core::manifold_mesh::ManifoldMesh;
use crate::core::tetrahedron::{CellKey, OPPOSITE_FACE};
use crate::core::util::deduplication::VertexDeduplicator;
use crate::core::util::validation::{
    ValidationError, validate_adjacencies, validate_delaunay, validate_hull,
};
use crate::geometry::intrinsics::Intrinsics;
use crate::geometry::point::Point;
use crate::geometry::predicates::{ExactPredicates, PredicateStatistics};
use crate::geometry::primitives::{Line3, Plane3};
use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned by [`Delaunay3::tetrahedralize`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DelaunayError {
    /// No input points.
    #[error("Cannot tetrahedralize an empty point set")]
    EmptyInput,

    /// An input coordinate is NaN or infinite.
    #[error("Vertex {vertex_index} has a non-finite coordinate at index {coordinate_index}")]
    NonFiniteCoordinate {
        /// Index of the vertex in the input.
        vertex_index: usize,
        /// Index of the offending coordinate (0, 1 or 2).
        coordinate_index: usize,
    },

    /// The mesh became inconsistent during construction.
    #[error("Insertion failed: {0}")]
    Insertion(#[from] InsertionError),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Construction options for [`Delaunay3`].
///
/// # Examples
///
/// ```
/// use tetra_delaunay::core::delaunay3::Delaunay3ConfigBuilder;
///
/// let config = Delaunay3ConfigBuilder::<f64>::default()
///     .epsilon(1e-9)
///     .warm_start(false)
///     .build()
///     .unwrap();
/// assert!(!config.warm_start);
///
/// assert!(Delaunay3ConfigBuilder::<f64>::default().epsilon(-1.0).build().is_err());
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(bound = "T: CoordinateScalar")]
pub struct Delaunay3Config<T>
where
    T: CoordinateScalar,
{
    /// Relative tolerance of the dimension classification. Zero (the
    /// default) classifies exactly; a positive value treats nearly flat input
    /// as flat.
    #[builder(default = "T::zero()")]
    pub epsilon: T,
    /// Start each point location at the most recently created tetrahedron.
    #[builder(default = "true")]
    pub warm_start: bool,
}

impl<T> Delaunay3ConfigBuilder<T>
where
    T: CoordinateScalar,
{
    fn validate(&self) -> Result<(), String> {
        if let Some(epsilon) = self.epsilon
            && !(epsilon.is_finite() && epsilon >= T::zero())
        {
            return Err(format!("epsilon must be finite and non-negative, got {epsilon:?}"));
        }
        Ok(())
    }
}

impl<T> Default for Delaunay3Config<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        config_presets::exact()
    }
}

/// Ready-made configurations.
pub mod config_presets {
    use super::{CoordinateScalar, Delaunay3Config};

    /// Exact dimension classification with warm-started walks.
    #[must_use]
    pub fn exact<T: CoordinateScalar>() -> Delaunay3Config<T> {
        Delaunay3Config {
            epsilon: T::zero(),
            warm_start: true,
        }
    }

    /// Treats input flatter than the coordinate type's default tolerance as
    /// lower-dimensional.
    #[must_use]
    pub fn tolerant<T: CoordinateScalar>() -> Delaunay3Config<T> {
        Delaunay3Config {
            epsilon: T::default_tolerance(),
            warm_start: true,
        }
    }
}

// =============================================================================
// TETRAHEDRALIZATION
// =============================================================================

/// Delaunay tetrahedralization of a 3D point set.
///
/// The instance can be reused; every call to
/// [`tetrahedralize`](Self::tetrahedralize) starts from scratch.
#[derive(Clone, Debug)]
pub struct Delaunay3<T>
where
    T: CoordinateScalar,
{
    config: Delaunay3Config<T>,
    vertices: Vec<Point<T, 3>>,
    dimension: usize,
    line: Line3<T>,
    plane: Plane3<T>,
    duplicates: Vec<usize>,
    number_of_unique_vertices: usize,
    mesh: ManifoldMesh,
    indices: Vec<usize>,
    adjacencies: Vec<Option<usize>>,
    statistics: PredicateStatistics,
}

impl<T> Default for Delaunay3<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self::with_config(Delaunay3Config::default())
    }
}

impl<T> Delaunay3<T>
where
    T: CoordinateScalar,
{
    /// Empty tetrahedralization with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty tetrahedralization with `config`.
    #[must_use]
    pub fn with_config(config: Delaunay3Config<T>) -> Self {
        Self {
            config,
            vertices: Vec::new(),
            dimension: 0,
            line: Line3::default(),
            plane: Plane3::default(),
            duplicates: Vec::new(),
            number_of_unique_vertices: 0,
            mesh: ManifoldMesh::new(),
            indices: Vec::new(),
            adjacencies: Vec::new(),
            statistics: PredicateStatistics::default(),
        }
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.dimension = 0;
        self.line = Line3::default();
        self.plane = Plane3::default();
        self.duplicates.clear();
        self.number_of_unique_vertices = 0;
        self.clear_mesh();
        self.statistics = PredicateStatistics::default();
    }

    fn clear_mesh(&mut self) {
        self.mesh.clear();
        self.indices.clear();
        self.adjacencies.clear();
    }

    /// Tetrahedralizes `vertices`.
    ///
    /// Returns `Ok(true)` when the points span space. For lower-dimensional
    /// input it returns `Ok(false)` and describes the input through
    /// [`line`](Self::line) (dimension 0 or 1) or [`plane`](Self::plane)
    /// (dimension 2); the mesh outputs are then empty.
    ///
    /// # Errors
    ///
    /// Returns `DelaunayError::EmptyInput` or
    /// `DelaunayError::NonFiniteCoordinate` for invalid input, and
    /// `DelaunayError::Insertion` if construction hits an internal
    /// inconsistency, in which case the mesh outputs are cleared.
    pub fn tetrahedralize(&mut self, vertices: &[Point<T, 3>]) -> Result<bool, DelaunayError> {
        self.reset();
        if vertices.is_empty() {
            tracing::warn!("tetrahedralize called with no vertices");
            return Err(DelaunayError::EmptyInput);
        }
        for (vertex_index, point) in vertices.iter().enumerate() {
            if let Err(error) = point.validate() {
                let CoordinateValidationError::InvalidCoordinate {
                    coordinate_index, ..
                } = error;
                return Err(DelaunayError::NonFiniteCoordinate {
                    vertex_index,
                    coordinate_index,
                });
            }
        }
        self.vertices.extend_from_slice(vertices);

        let intrinsics = Intrinsics::compute(&self.vertices, self.config.epsilon);
        self.dimension = intrinsics.dimension;
        match intrinsics.dimension {
            0 => {
                self.line.origin = intrinsics.origin;
                tracing::warn!(vertices = vertices.len(), "all vertices coincide");
                return Ok(false);
            }
            1 => {
                self.line = Line3::new(intrinsics.origin, intrinsics.direction[0]);
                tracing::warn!(vertices = vertices.len(), "vertices are collinear");
                return Ok(false);
            }
            2 => {
                self.plane = Plane3::new(intrinsics.direction[2], intrinsics.origin);
                tracing::warn!(vertices = vertices.len(), "vertices are coplanar");
                return Ok(false);
            }
            _ => {}
        }

        match self.build(&intrinsics) {
            Ok(()) => {
                tracing::debug!(
                    vertices = self.vertices.len(),
                    unique_vertices = self.number_of_unique_vertices,
                    tetrahedra = self.number_of_tetrahedra(),
                    plane_queries = self.statistics.plane_queries,
                    sphere_queries = self.statistics.sphere_queries,
                    exact_fallbacks = self.statistics.exact_fallbacks(),
                    "tetrahedralization complete"
                );
                Ok(true)
            }
            Err(error) => {
                tracing::error!(%error, "tetrahedralization failed");
                self.clear_mesh();
                Err(error.into())
            }
        }
    }

    fn build(&mut self, intrinsics: &Intrinsics<T>) -> Result<(), InsertionError> {
        let mut extreme = intrinsics.extreme;
        if !intrinsics.extreme_ccw {
            extreme.swap(2, 3);
        }

        let mut predicates = ExactPredicates::new();
        let mut hint: Option<CellKey> = Some(insert_seed(&mut self.mesh, extreme)?);

        self.duplicates = (0..self.vertices.len()).collect();
        let mut processed = VertexDeduplicator::with_capacity(self.vertices.len());
        for &index in &extreme {
            processed.first_occurrence(index, self.vertices[index]);
        }

        for index in 0..self.vertices.len() {
            if let Some(first) = processed.first_occurrence(index, self.vertices[index]) {
                self.duplicates[index] = first;
                continue;
            }
            let start = if self.config.warm_start { hint } else { None };
            let info = insert_vertex(&mut self.mesh, &self.vertices, index, start, &mut predicates)?;
            hint = Some(info.last_created);
        }

        self.number_of_unique_vertices = processed.len();
        self.statistics = *predicates.statistics();
        self.finalize_arrays();
        Ok(())
    }

    /// Numbers the tetrahedra densely in mesh order and flattens them.
    fn finalize_arrays(&mut self) {
        let numbering: FastHashMap<CellKey, usize> = {
            let mut numbering = fast_hash_map_with_capacity(self.mesh.len());
            for (t, (key, _)) in self.mesh.tetrahedra().enumerate() {
                numbering.insert(key, t);
            }
            numbering
        };

        self.indices.reserve(4 * self.mesh.len());
        self.adjacencies.reserve(4 * self.mesh.len());
        for (_, tetra) in self.mesh.tetrahedra() {
            self.indices.extend_from_slice(tetra.vertices());
            self.adjacencies.extend(
                tetra
                    .neighbors()
                    .iter()
                    .map(|n| n.and_then(|key| numbering.get(&key).copied())),
            );
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &Delaunay3Config<T> {
        &self.config
    }

    /// Intrinsic dimension of the last input: 0, 1, 2 or 3.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// The common point (dimension 0) or the line containing the input
    /// (dimension 1).
    #[must_use]
    pub const fn line(&self) -> &Line3<T> {
        &self.line
    }

    /// The plane containing the input (dimension 2).
    #[must_use]
    pub const fn plane(&self) -> &Plane3<T> {
        &self.plane
    }

    /// Number of input vertices, duplicates included.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The input vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point<T, 3>] {
        &self.vertices
    }

    /// Number of distinct vertices in the tetrahedralization (0 unless the
    /// dimension is 3).
    #[must_use]
    pub const fn number_of_unique_vertices(&self) -> usize {
        self.number_of_unique_vertices
    }

    /// For each input vertex, the index of the first processed vertex with
    /// the same coordinates (itself when unique). Empty unless the dimension
    /// is 3.
    #[must_use]
    pub fn duplicates(&self) -> &[usize] {
        &self.duplicates
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn number_of_tetrahedra(&self) -> usize {
        self.indices.len() / 4
    }

    /// Four vertex indices per tetrahedron.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Four neighbors per tetrahedron, across the faces opposite its
    /// vertices.
    #[must_use]
    pub fn adjacencies(&self) -> &[Option<usize>] {
        &self.adjacencies
    }

    /// The mesh the flat arrays were built from.
    #[must_use]
    pub const fn mesh(&self) -> &ManifoldMesh {
        &self.mesh
    }

    /// Vertex indices of tetrahedron `t`.
    #[must_use]
    pub fn tetrahedron_indices(&self, t: usize) -> Option<[usize; 4]> {
        let chunk = self.indices.get(4 * t..4 * t + 4)?;
        Some([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    /// Neighbors of tetrahedron `t`.
    #[must_use]
    pub fn tetrahedron_adjacencies(&self, t: usize) -> Option<[Option<usize>; 4]> {
        let chunk = self.adjacencies.get(4 * t..4 * t + 4)?;
        Some([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    /// Hull faces, three vertex indices each, counterclockwise seen from
    /// outside. `None` unless the dimension is 3.
    #[must_use]
    pub fn hull(&self) -> Option<Vec<usize>> {
        if self.dimension != 3 {
            return None;
        }
        let mut hull = Vec::new();
        for (t, neighbors) in self.adjacencies.chunks_exact(4).enumerate() {
            let tetrahedron = self.tetrahedron_indices(t)?;
            for (j, neighbor) in neighbors.iter().enumerate() {
                if neighbor.is_none() {
                    hull.extend(OPPOSITE_FACE[j].map(|k| tetrahedron[k]));
                }
            }
        }
        Some(hull)
    }

    /// Finds the tetrahedron containing `point`, walking from
    /// `search.initial_tetrahedron`.
    ///
    /// Returns `Ok(None)` when `point` is outside the hull; `search.final_v`
    /// then starts with the hull face the walk left through.
    ///
    /// # Errors
    ///
    /// Returns `LocateError::InvalidDimension` unless the dimension is 3, and
    /// `LocateError::CycleDetected` if the walk does not terminate.
    pub fn containing_tetrahedron(
        &self,
        point: &Point<T, 3>,
        search: &mut SearchInfo,
    ) -> Result<Option<usize>, LocateError> {
        if self.dimension != 3 {
            return Err(LocateError::InvalidDimension {
                dimension: self.dimension,
            });
        }
        locate_in_arrays(
            &self.vertices,
            &self.indices,
            &self.adjacencies,
            point,
            search,
        )
    }

    /// Predicate counts of the last construction.
    #[must_use]
    pub const fn predicate_statistics(&self) -> &PredicateStatistics {
        &self.statistics
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn require_dimension_3(&self) -> Result<(), ValidationError> {
        if self.dimension == 3 {
            Ok(())
        } else {
            Err(ValidationError::WrongDimension {
                dimension: self.dimension,
            })
        }
    }

    /// Checks orientation and the empty-circumsphere property against every
    /// input vertex.
    ///
    /// # Errors
    ///
    /// Returns the first violation.
    pub fn validate_delaunay(&self) -> Result<(), ValidationError> {
        self.require_dimension_3()?;
        validate_delaunay(&self.vertices, &self.indices)
    }

    /// Checks that adjacencies are mutual.
    ///
    /// # Errors
    ///
    /// Returns the first asymmetric link.
    pub fn validate_adjacencies(&self) -> Result<(), ValidationError> {
        self.require_dimension_3()?;
        validate_adjacencies(&self.indices, &self.adjacencies)
    }

    /// Checks that every hull face has all vertices on or behind it.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistent face.
    pub fn validate_hull(&self) -> Result<(), ValidationError> {
        self.require_dimension_3()?;
        let hull = self.hull().unwrap_or_default();
        validate_hull(&self.vertices, &self.adjacencies, &hull)
    }

    /// Runs every check, including the mesh's own neighbor bookkeeping.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let valid = self.mesh.validate_neighbors().is_ok()
            && self.validate_adjacencies().is_ok()
            && self.validate_hull().is_ok()
            && self.validate_delaunay().is_ok();
        if !valid {
            tracing::debug!(dimension = self.dimension, "tetrahedralization is invalid");
        }
        valid
    }
}
