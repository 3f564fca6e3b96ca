//! Dense distance matrix.

/// A dense n×n distance matrix stored in row-major order.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::DistanceMatrix;
///
/// let mut dm = DistanceMatrix::new(3);
/// dm.set_symmetric(0, 1, 5.0);
/// dm.set_symmetric(0, 2, 8.0);
/// dm.set_symmetric(1, 2, 3.0);
/// assert_eq!(dm.get(2, 1), 3.0);
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.nearest_neighbor(0, &[1, 2]), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Sets the distance in both directions.
    pub fn set_symmetric(&mut self, a: usize, b: usize, distance: f64) {
        self.set(a, b, distance);
        self.set(b, a, distance);
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the nearest neighbor of `from` among the given candidates.
    ///
    /// Ties go to the candidate listed first. Returns `None` if `candidates`
    /// is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}
