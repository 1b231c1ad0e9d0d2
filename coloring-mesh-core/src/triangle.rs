use serde::{Deserialize, Serialize};

/// Index of a triangle in the mesh triangle table.
pub type TriangleId = usize;

/// Index of a vertex in the mesh vertex table.
pub type VertexId = usize;

/// Triangle referencing three vertices by id, in counter-clockwise order.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    /// First vertex.
    pub a: VertexId,
    /// Second vertex.
    pub b: VertexId,
    /// Third vertex.
    pub c: VertexId,
}

impl Triangle {
    #[inline]
    pub fn new(a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self { a, b, c }
    }

    /// Vertex ids as array.
    #[inline]
    pub fn ids(&self) -> [VertexId; 3] {
        [self.a, self.b, self.c]
    }

    /// Directed edges `(a, b)`, `(b, c)`, `(c, a)`.
    #[inline]
    pub fn edges(&self) -> [(VertexId, VertexId); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }

    /// Check if triangle references given vertex.
    #[inline]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.a == id || self.b == id || self.c == id
    }
}

impl From<[VertexId; 3]> for Triangle {
    fn from([a, b, c]: [VertexId; 3]) -> Self {
        Self { a, b, c }
    }
}
