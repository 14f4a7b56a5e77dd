use crate::geometry::LinearRing;

/// A shell ring plus zero or more hole rings.
///
/// Holes are expected to nest inside the shell and no ring should self-intersect; neither is
/// checked here.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    shell: LinearRing,
    holes: Vec<LinearRing>,
}

impl Polygon {
    pub fn new(shell: LinearRing, holes: Vec<LinearRing>) -> Self {
        Self { shell, holes }
    }

    pub fn shell(&self) -> &LinearRing {
        &self.shell
    }

    pub fn holes(&self) -> &[LinearRing] {
        &self.holes
    }

    pub fn num_holes(&self) -> usize {
        self.holes.len()
    }

    /// The shell followed by every hole.
    pub fn rings(&self) -> impl Iterator<Item = &LinearRing> {
        std::iter::once(&self.shell).chain(self.holes.iter())
    }

    pub fn into_inner(self) -> (LinearRing, Vec<LinearRing>) {
        (self.shell, self.holes)
    }
}
