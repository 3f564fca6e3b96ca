//! Named-address distance graph.

use std::collections::HashMap;

use super::DistanceMatrix;
use crate::error::GraphError;

/// Index of the hub: the first address supplied to a graph.
pub const HUB: usize = 0;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Immutable address-to-address distance lookup.
///
/// Addresses are matched after [`normalize_address`], so `"5383 South 900
/// East #104"` and `"5383 south 900 east #104 "` name the same location. The
/// first address is the hub every route starts and ends at.
///
/// # Examples
///
/// ```
/// use u_dispatch::distance::DistanceGraph;
///
/// let graph = DistanceGraph::from_lower_triangle(
///     vec!["4001 South 700 East".into(), "1060 Dalton Ave S".into(), "1330 2100 S".into()],
///     vec![
///         vec![Some(0.0)],
///         vec![Some(7.2), Some(0.0)],
///         vec![Some(3.8), Some(7.1), Some(0.0)],
///     ],
/// ).unwrap();
///
/// let dalton = graph.locate("1060 dalton ave s").unwrap();
/// assert_eq!(graph.distance(dalton, 2), 7.1);
/// assert_eq!(graph.distance_between("1330 2100 S", "4001 South 700 East"), Some(3.8));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceGraph {
    addresses: Vec<String>,
    index: HashMap<String, usize>,
    matrix: DistanceMatrix,
}

impl DistanceGraph {
    /// Builds a graph from a full square matrix.
    ///
    /// The matrix must be symmetric, non-negative and zero on the diagonal.
    pub fn from_matrix(addresses: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, GraphError> {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Some).collect())
            .collect();
        Self::build(addresses, rows, true)
    }

    /// Builds a graph from rows where only one half of the matrix is filled.
    ///
    /// Row `i` may hold fewer than `n` entries, and any entry may be `None`.
    /// A missing `d(i, j)` is taken from `d(j, i)`; if both are present they
    /// must agree.
    pub fn from_lower_triangle(
        addresses: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, GraphError> {
        Self::build(addresses, rows, false)
    }

    fn build(
        addresses: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
        square: bool,
    ) -> Result<Self, GraphError> {
        let n = addresses.len();
        if n == 0 {
            return Err(GraphError::Empty);
        }
        if rows.len() != n {
            return Err(GraphError::RowLength {
                row: rows.len().min(n),
                found: 0,
                expected: n,
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() > n || (square && row.len() != n) {
                return Err(GraphError::RowLength {
                    row: i,
                    found: row.len(),
                    expected: n,
                });
            }
        }

        let mut index = HashMap::with_capacity(n);
        for (i, address) in addresses.iter().enumerate() {
            if index.insert(normalize_address(address), i).is_some() {
                return Err(GraphError::DuplicateAddress(address.clone()));
            }
        }

        let entry = |i: usize, j: usize| rows[i].get(j).copied().flatten();
        let mut matrix = DistanceMatrix::new(n);
        for i in 0..n {
            for j in 0..=i {
                let value = match (entry(i, j), entry(j, i)) {
                    (Some(a), Some(b)) if (a - b).abs() > SYMMETRY_TOLERANCE => {
                        return Err(GraphError::Asymmetric {
                            a: addresses[i].clone(),
                            b: addresses[j].clone(),
                        });
                    }
                    (Some(d), _) | (None, Some(d)) => d,
                    (None, None) if i == j => 0.0,
                    (None, None) => {
                        return Err(GraphError::MissingDistance {
                            from: addresses[i].clone(),
                            to: addresses[j].clone(),
                        });
                    }
                };
                if !value.is_finite() || value < 0.0 {
                    return Err(GraphError::InvalidDistance {
                        from: addresses[i].clone(),
                        to: addresses[j].clone(),
                        value,
                    });
                }
                if i == j && value != 0.0 {
                    return Err(GraphError::NonZeroDiagonal(addresses[i].clone()));
                }
                matrix.set_symmetric(i, j, value);
            }
        }

        Ok(Self {
            addresses,
            index,
            matrix,
        })
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Always `false`: a graph holds at least the hub.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Address of the hub.
    pub fn hub_address(&self) -> &str {
        &self.addresses[HUB]
    }

    /// Index of `address`, if present.
    pub fn locate(&self, address: &str) -> Option<usize> {
        self.index.get(&normalize_address(address)).copied()
    }

    /// Address stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn address(&self, index: usize) -> &str {
        &self.addresses[index]
    }

    /// Distance between two indices.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.matrix.get(from, to)
    }

    /// Distance between two addresses, or `None` if either is unknown.
    pub fn distance_between(&self, from: &str, to: &str) -> Option<f64> {
        Some(self.distance(self.locate(from)?, self.locate(to)?))
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }
}

/// Canonical form of an address for lookups.
///
/// Lowercases, drops commas and periods, and collapses whitespace.
pub fn normalize_address(address: &str) -> String {
    address
        .to_lowercase()
        .replace([',', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
