//! # tetra-delaunay
//!
//! Incremental Delaunay tetrahedralization of 3D point sets with exact
//! geometric predicates.
//!
//! # Features
//!
//! - Bowyer-Watson style incremental insertion with both interior and
//!   convex-hull-extension cases
//! - Exact `to_plane` / `to_circumsphere` signs: a conservative interval
//!   filter first, arbitrary-precision arithmetic only when it is ambiguous
//! - Intrinsic dimension detection: coincident, collinear and coplanar input
//!   is reported as a point, [`Line3`](geometry::primitives::Line3) or
//!   [`Plane3`](geometry::primitives::Plane3) instead of failing
//! - Flat index/adjacency output, convex hull extraction, duplicate tracking
//!   and point location by walking
//! - Generic floating-point coordinates (`f32`, `f64`)
//! - Serialization with [serde](https://serde.rs) for points, primitives,
//!   search records and configuration
//!
//! # Basic Usage
//!
//! ```rust
//! use tetra_delaunay::prelude::*;
//!
//! // Cube corners: every face's four corners are cospherical.
//! let mut points = Vec::new();
//! for x in [0.0, 1.0] {
//!     for y in [0.0, 1.0] {
//!         for z in [0.0, 1.0] {
//!             points.push(Point::new([x, y, z]));
//!         }
//!     }
//! }
//! points.push(Point::new([0.0, 0.0, 0.0])); // duplicate of points[0]
//!
//! let mut delaunay = Delaunay3::new();
//! assert!(delaunay.tetrahedralize(&points).unwrap());
//! assert_eq!(delaunay.number_of_unique_vertices(), 8);
//! assert_eq!(delaunay.duplicates()[8], 0);
//! assert!(delaunay.validate_delaunay().is_ok());
//!
//! // Each hull face is a triangle; the cube has 6 square faces.
//! let hull = delaunay.hull().unwrap();
//! assert_eq!(hull.len(), 3 * 12);
//! ```
//!
//! # Lower-dimensional input
//!
//! ```rust
//! use tetra_delaunay::prelude::*;
//!
//! let points = [
//!     Point::new([0.0, 0.0, 2.0]),
//!     Point::new([1.0, 0.0, 2.0]),
//!     Point::new([0.0, 1.0, 2.0]),
//!     Point::new([1.0, 1.0, 2.0]),
//! ];
//! let mut delaunay: Delaunay3<f64> = Delaunay3::new();
//! assert!(!delaunay.tetrahedralize(&points).unwrap());
//! assert_eq!(delaunay.dimension(), 2);
//! assert_eq!(delaunay.plane().constant.abs(), 2.0);
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`]: build summaries with predicate
//! statistics at `debug`, per-vertex insertions and exact fallbacks at
//! `trace`, degenerate input at `warn` and internal failures at `error`.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// Tetrahedral mesh, insertion and point location, and the [`Delaunay3`](core::delaunay3::Delaunay3) facade.
pub mod core {
    /// Construction and query algorithms.
    pub mod algorithms {
        /// Interior and hull-extension vertex insertion
        pub mod insertion;
        /// Point location by walking, and conflict regions
        pub mod locate;
    }
    /// Collection aliases and buffer sizes
    pub mod collections;
    /// The tetrahedralization facade
    pub mod delaunay3;
    /// Arena of tetrahedra with automatic face adjacency
    pub mod manifold_mesh;
    /// Tetrahedron, face and triangle keys
    pub mod tetrahedron;
    /// Deduplication and validation helpers.
    pub mod util {
        pub mod deduplication;
        pub mod validation;
        pub use deduplication::*;
        pub use validation::*;
    }
    pub use delaunay3::*;
    pub use manifold_mesh::*;
    pub use tetrahedron::*;
}

/// Points, vectors, exact predicates and dimension classification.
pub mod geometry {
    /// Arbitrary-precision binary floating-point numbers
    pub mod exact;
    /// Outward-rounded interval arithmetic
    pub mod interval;
    /// Intrinsic dimension and seed tetrahedron of a point set
    pub mod intrinsics;
    pub mod point;
    pub mod predicates;
    /// Lines and planes
    pub mod primitives;
    /// Fixed-size 3D vector helpers
    pub mod vector;
    /// Coordinate scalar traits.
    ///
    /// `CoordinateScalar` bundles the float operations, validation
    /// (`FiniteCheck`), equality (`OrderedEq`), hashing (`HashCoordinate`)
    /// and ulp stepping (`FloatStep`) the rest of the crate relies on.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use point::*;
    pub use predicates::*;
    pub use primitives::*;
    pub use traits::*;
}

/// A prelude module that re-exports commonly used types.
pub mod prelude {
    pub use crate::core::{
        algorithms::{
            insertion::InsertionError,
            locate::{LocateError, SearchInfo},
        },
        delaunay3::*,
        manifold_mesh::{ManifoldMesh, MeshValidationError},
        tetrahedron::{CellKey, Tetrahedron},
        util::validation::ValidationError,
    };

    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    pub use crate::geometry::{
        intrinsics::Intrinsics, point::*, predicates::*, primitives::*, traits::coordinate::*,
    };
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
