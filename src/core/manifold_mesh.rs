//! Manifold tetrahedral mesh with automatic face adjacency.
//!
//! [`ManifoldMesh`] stores tetrahedra in a slot map and keeps a map from every
//! face to the (at most two) tetrahedra sharing it. Inserting a tetrahedron
//! links it to the tetrahedra already sharing its faces; removing one unlinks
//! it. The face-sharing rule is checked before anything is mutated, so a
//! rejected insertion leaves the mesh untouched.
//!
//! The mesh is purely combinatorial: it knows vertex indices, not
//! coordinates, and never evaluates a geometric predicate.

use crate::core::collections::{Entry, FastHashMap, StorageMap};
use crate::core::tetrahedron::{CellKey, FaceKey, Tetrahedron, TetrahedronKey};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Structural defects reported by [`ManifoldMesh::validate_neighbors`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MeshValidationError {
    /// A neighbor link points at a tetrahedron that no longer exists.
    #[error("Tetrahedron {cell:?} has a dangling neighbor {neighbor:?} across face {face}")]
    DanglingNeighbor {
        /// The tetrahedron holding the link.
        cell: CellKey,
        /// The missing neighbor.
        neighbor: CellKey,
        /// Face index of the link.
        face: usize,
    },
    /// `a` links to `b` but `b` does not link back through the shared face.
    #[error("Neighbor link {cell:?} -> {neighbor:?} across face {face} is not mutual")]
    AsymmetricNeighbor {
        /// The tetrahedron holding the link.
        cell: CellKey,
        /// The neighbor that does not link back.
        neighbor: CellKey,
        /// Face index of the link.
        face: usize,
    },
    /// A face of a tetrahedron is missing from the face map, or the face map
    /// disagrees with the neighbor link.
    #[error("Face {face:?} of tetrahedron {cell:?} is inconsistent with the face map")]
    FaceMismatch {
        /// The tetrahedron.
        cell: CellKey,
        /// The face's sorted vertices.
        face: [usize; 3],
    },
}

// =============================================================================
// FACE
// =============================================================================

/// A face of the mesh and the tetrahedra sharing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    key: FaceKey,
    tetrahedra: [Option<CellKey>; 2],
}

impl Face {
    /// Sorted vertex indices.
    #[must_use]
    pub const fn vertices(&self) -> &[usize; 3] {
        self.key.vertices()
    }

    /// The one or two tetrahedra sharing the face; slot 0 is always filled.
    #[must_use]
    pub const fn tetrahedra(&self) -> &[Option<CellKey>; 2] {
        &self.tetrahedra
    }

    /// Whether exactly one tetrahedron has this face.
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.tetrahedra[1].is_none()
    }

    /// The tetrahedron on the other side from `cell`.
    #[must_use]
    pub fn other(&self, cell: CellKey) -> Option<CellKey> {
        match self.tetrahedra {
            [Some(a), b] if a == cell => b,
            [a, Some(b)] if b == cell => a,
            _ => None,
        }
    }
}

// =============================================================================
// MESH
// =============================================================================

/// Tetrahedra keyed by their vertex indices, with face adjacency maintained
/// on every insertion and removal.
///
/// # Examples
///
/// ```
/// use tetra_delaunay::core::manifold_mesh::ManifoldMesh;
///
/// let mut mesh = ManifoldMesh::new();
/// let a = mesh.insert([0, 1, 2, 3]).unwrap();
/// let b = mesh.insert([4, 1, 3, 2]).unwrap();
///
/// // Face {1, 2, 3} is shared, so the two tetrahedra are neighbors.
/// assert_eq!(mesh.get(a).unwrap().neighbor(0), Some(b));
/// assert_eq!(mesh.get(b).unwrap().neighbor(0), Some(a));
///
/// // Already present, in any vertex order.
/// assert!(mesh.insert([3, 2, 1, 0]).is_none());
///
/// assert!(mesh.remove([2, 3, 1, 4]));
/// assert_eq!(mesh.get(a).unwrap().neighbor(0), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManifoldMesh {
    cells: StorageMap<CellKey, Tetrahedron>,
    identities: FastHashMap<TetrahedronKey, CellKey>,
    faces: FastHashMap<FaceKey, Face>,
}

impl ManifoldMesh {
    /// Empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tetrahedra.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the mesh has no tetrahedra.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of distinct faces.
    #[must_use]
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// Looks up a tetrahedron by key.
    #[must_use]
    pub fn get(&self, key: CellKey) -> Option<&Tetrahedron> {
        self.cells.get(key)
    }

    /// Whether `key` refers to a live tetrahedron.
    #[must_use]
    pub fn contains(&self, key: CellKey) -> bool {
        self.cells.contains_key(key)
    }

    /// Key of the tetrahedron with these vertices, in any order.
    #[must_use]
    pub fn tetrahedron_key(&self, vertices: [usize; 4]) -> Option<CellKey> {
        self.identities.get(&TetrahedronKey::new(vertices)).copied()
    }

    /// All tetrahedra.
    pub fn tetrahedra(&self) -> impl Iterator<Item = (CellKey, &Tetrahedron)> {
        self.cells.iter()
    }

    /// All faces.
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    /// The face with these vertices, in any order.
    #[must_use]
    pub fn face(&self, vertices: [usize; 3]) -> Option<&Face> {
        self.faces.get(&FaceKey::new(vertices))
    }

    /// Inserts the tetrahedron `vertices`, linking it to the tetrahedra that
    /// share its faces.
    ///
    /// Returns `None`, without modifying the mesh, when a vertex index
    /// repeats, when the tetrahedron already exists, or when one of its faces
    /// is already shared by two tetrahedra.
    pub fn insert(&mut self, vertices: [usize; 4]) -> Option<CellKey> {
        let tetra = Tetrahedron::new(vertices);
        let identity = tetra.key();
        if identity.is_degenerate() || self.identities.contains_key(&identity) {
            return None;
        }

        let face_keys: [FaceKey; 4] = std::array::from_fn(|j| FaceKey::new(tetra.face(j)));
        if face_keys
            .iter()
            .any(|k| self.faces.get(k).is_some_and(|f| !f.is_boundary()))
        {
            return None;
        }

        let key = self.cells.insert(tetra);
        self.identities.insert(identity, key);

        for (j, face_key) in face_keys.into_iter().enumerate() {
            let shared_with = match self.faces.entry(face_key) {
                Entry::Vacant(slot) => {
                    slot.insert(Face {
                        key: face_key,
                        tetrahedra: [Some(key), None],
                    });
                    None
                }
                Entry::Occupied(mut slot) => {
                    let face = slot.get_mut();
                    face.tetrahedra[1] = Some(key);
                    face.tetrahedra[0]
                }
            };
            if let Some(other) = shared_with {
                self.link(key, j, other, &face_key);
            }
        }
        Some(key)
    }

    fn link(&mut self, key: CellKey, j: usize, other: CellKey, face_key: &FaceKey) {
        if let Some(other_tetra) = self.cells.get_mut(other)
            && let Some(k) = other_tetra.face_index(face_key)
        {
            other_tetra.neighbors[k] = Some(key);
            if let Some(tetra) = self.cells.get_mut(key) {
                tetra.neighbors[j] = Some(other);
            }
        }
    }

    /// Removes the tetrahedron with these vertices (any order) and unlinks
    /// its neighbors. Returns `false` if no such tetrahedron exists.
    pub fn remove(&mut self, vertices: [usize; 4]) -> bool {
        let Some(key) = self.identities.remove(&TetrahedronKey::new(vertices)) else {
            return false;
        };
        let Some(tetra) = self.cells.remove(key) else {
            return false;
        };

        for j in 0..4 {
            let face_key = FaceKey::new(tetra.face(j));
            let Entry::Occupied(mut slot) = self.faces.entry(face_key) else {
                continue;
            };
            let face = slot.get_mut();
            match face.other(key) {
                Some(other) => {
                    face.tetrahedra = [Some(other), None];
                    if let Some(other_tetra) = self.cells.get_mut(other)
                        && let Some(k) = other_tetra.face_index(&face_key)
                    {
                        other_tetra.neighbors[k] = None;
                    }
                }
                None => {
                    slot.remove();
                }
            }
        }
        true
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.identities.clear();
        self.faces.clear();
    }

    /// Whether every face is shared by exactly two tetrahedra.
    ///
    /// A finite tetrahedralization of a point set is never closed; a closed
    /// mesh has no hull.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.faces.values().all(|f| !f.is_boundary())
    }

    /// Checks that every neighbor link is mutual and agrees with the face map.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshValidationError`] found.
    pub fn validate_neighbors(&self) -> Result<(), MeshValidationError> {
        for (cell, tetra) in &self.cells {
            for j in 0..4 {
                let face_key = FaceKey::new(tetra.face(j));
                let face = self
                    .faces
                    .get(&face_key)
                    .ok_or(MeshValidationError::FaceMismatch {
                        cell,
                        face: *face_key.vertices(),
                    })?;
                if face.other(cell) != tetra.neighbors[j] {
                    return Err(MeshValidationError::FaceMismatch {
                        cell,
                        face: *face_key.vertices(),
                    });
                }
                let Some(neighbor) = tetra.neighbors[j] else {
                    continue;
                };
                let other = self
                    .cells
                    .get(neighbor)
                    .ok_or(MeshValidationError::DanglingNeighbor {
                        cell,
                        neighbor,
                        face: j,
                    })?;
                let back = other.face_index(&face_key).and_then(|k| other.neighbors[k]);
                if back != Some(cell) {
                    return Err(MeshValidationError::AsymmetricNeighbor {
                        cell,
                        neighbor,
                        face: j,
                    });
                }
            }
        }
        Ok(())
    }
}
