/// Geometry description referenced by surfaces and draw calls.
///
/// Vertex and index data live with the backend; the orchestration core only
/// needs the counts that end up in a [`crate::DrawCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub name: String,
    pub vertex_count: u32,
    /// `None` for non-indexed geometry.
    pub index_count: Option<u32>,
}

impl Geometry {
    #[must_use]
    pub fn new(name: &str, vertex_count: u32) -> Self {
        Self {
            name: name.to_string(),
            vertex_count,
            index_count: None,
        }
    }

    #[must_use]
    pub fn with_indices(mut self, index_count: u32) -> Self {
        self.index_count = Some(index_count);
        self
    }
}
