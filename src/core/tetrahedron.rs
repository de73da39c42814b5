//! Tetrahedra and their faces.
//!
//! # Orientation convention
//!
//! A tetrahedron `(v0, v1, v2, v3)` is positively oriented when
//! `to_plane(v3; v0, v1, v2) > 0`. Face `j` is the face opposite vertex `j`,
//! listed so that it is counterclockwise when seen from outside the
//! tetrahedron (the outside is the positive side of the face's plane):
//!
//! | face | vertices  |
//! |------|-----------|
//! | 0    | 1, 2, 3   |
//! | 1    | 0, 3, 2   |
//! | 2    | 0, 1, 3   |
//! | 3    | 0, 2, 1   |
//!
//! The neighbor across face `j` is stored in slot `j`.

use slotmap::new_key_type;

new_key_type! {
    /// Key of a tetrahedron in a [`ManifoldMesh`](crate::core::manifold_mesh::ManifoldMesh).
    ///
    /// Keys of removed tetrahedra are never reused for a live tetrahedron, so a
    /// stale key simply fails to resolve.
    pub struct CellKey;
}

/// Local vertex indices of face `j`, outward counterclockwise.
pub const OPPOSITE_FACE: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// A tetrahedron of the mesh: four vertex indices and the four neighbors
/// across its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tetrahedron {
    pub(crate) vertices: [usize; 4],
    pub(crate) neighbors: [Option<CellKey>; 4],
}

impl Tetrahedron {
    pub(crate) const fn new(vertices: [usize; 4]) -> Self {
        Self {
            vertices,
            neighbors: [None; 4],
        }
    }

    /// Vertex indices in stored order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[usize; 4] {
        &self.vertices
    }

    /// Neighbors across faces `0..4`; `None` on the hull.
    #[inline]
    #[must_use]
    pub const fn neighbors(&self) -> &[Option<CellKey>; 4] {
        &self.neighbors
    }

    /// Neighbor across face `j`.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, j: usize) -> Option<CellKey> {
        self.neighbors.get(j).copied().flatten()
    }

    /// Vertex indices of face `j`, outward counterclockwise.
    ///
    /// ```
    /// use tetra_delaunay::core::tetrahedron::Tetrahedron;
    /// use tetra_delaunay::core::manifold_mesh::ManifoldMesh;
    ///
    /// let mut mesh = ManifoldMesh::new();
    /// let key = mesh.insert([10, 11, 12, 13]).unwrap();
    /// let tetra: &Tetrahedron = mesh.get(key).unwrap();
    /// assert_eq!(tetra.face(1), [10, 13, 12]);
    /// ```
    #[inline]
    #[must_use]
    pub const fn face(&self, j: usize) -> [usize; 3] {
        let [a, b, c] = OPPOSITE_FACE[j];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// The face whose vertex set equals `face` (any order), if any.
    #[must_use]
    pub fn face_index(&self, face: &FaceKey) -> Option<usize> {
        (0..4).find(|&j| FaceKey::new(self.face(j)) == *face)
    }

    /// Sorted vertex indices identifying the tetrahedron.
    #[must_use]
    pub fn key(&self) -> TetrahedronKey {
        TetrahedronKey::new(self.vertices)
    }
}

/// Order-independent identity of a tetrahedron: its sorted vertex indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TetrahedronKey([usize; 4]);

impl TetrahedronKey {
    /// Sorts `vertices`.
    #[must_use]
    pub fn new(mut vertices: [usize; 4]) -> Self {
        vertices.sort_unstable();
        Self(vertices)
    }

    /// Whether two vertex indices coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.0.windows(2).any(|w| w[0] == w[1])
    }

    /// Sorted vertex indices.
    #[must_use]
    pub const fn vertices(&self) -> &[usize; 4] {
        &self.0
    }
}

/// Order-independent identity of a face: its sorted vertex indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceKey([usize; 3]);

impl FaceKey {
    /// Sorts `vertices`.
    #[must_use]
    pub fn new(mut vertices: [usize; 3]) -> Self {
        vertices.sort_unstable();
        Self(vertices)
    }

    /// Sorted vertex indices.
    #[must_use]
    pub const fn vertices(&self) -> &[usize; 3] {
        &self.0
    }
}

/// A directed triangle: an ordered vertex triple up to rotation.
///
/// `(a, b, c)`, `(b, c, a)` and `(c, a, b)` compare equal; `(a, c, b)` does
/// not. The stored rotation starts at the smallest index.
///
/// ```
/// use tetra_delaunay::core::tetrahedron::TriangleKey;
///
/// assert_eq!(TriangleKey::new([5, 1, 3]), TriangleKey::new([1, 3, 5]));
/// assert_ne!(TriangleKey::new([5, 1, 3]), TriangleKey::new([1, 5, 3]));
/// assert_eq!(TriangleKey::new([5, 1, 3]).vertices(), &[1, 3, 5]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleKey([usize; 3]);

impl TriangleKey {
    /// Rotates `vertices` so the smallest index comes first.
    #[must_use]
    pub const fn new(vertices: [usize; 3]) -> Self {
        let [a, b, c] = vertices;
        if a < b {
            if a < c { Self([a, b, c]) } else { Self([c, a, b]) }
        } else if b < c {
            Self([b, c, a])
        } else {
            Self([c, a, b])
        }
    }

    /// The vertices in normalized rotation.
    #[must_use]
    pub const fn vertices(&self) -> &[usize; 3] {
        &self.0
    }

    /// The same triangle with opposite orientation.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        let [a, b, c] = self.0;
        Self::new([a, c, b])
    }
}
