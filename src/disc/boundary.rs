use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use super::grid::Grid;

pub mod segment;

pub use segment::{BoundaryPosition, DirichletSegment};

/// Mirror an index across the ends of `[0, n)`.
///
/// `reflect(-1, n) == 1` and `reflect(n, n) == n - 2`, i.e. the ghost value
/// outside an edge equals the value one node inside it. Substituting those
/// ghosts into the centred stencil gives the zero-flux Neumann condition.
/// Valid for `n >= 2` and `|k| <= 2(n-1)`; further out the mirror image
/// leaves the range again.
#[inline]
pub(crate) fn reflect(k: isize, n: usize) -> usize {
    let last = n as isize - 1;
    let r = last - (last - k.abs()).abs();
    debug_assert!(r >= 0, "reflect({k}, {n}) out of range");
    r as usize
}

/// Role of a node in the discrete operator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// Value pinned for all time; the operator row is zero.
    Dirichlet(f64),
    /// Edge node whose missing neighbours are mirrored.
    Neumann,
    Interior,
}
impl NodeKind {
    pub fn is_dirichlet(&self) -> bool {
        matches!(self, NodeKind::Dirichlet(_))
    }
}

/// Per-node classification, evaluated once and shared by the matrix-free and
/// the assembled operator.
#[derive(Clone, Debug)]
pub struct BoundaryMask {
    kinds: Array2<NodeKind>,
}
impl BoundaryMask {
    pub fn from_predicate<F>(grid: &Grid, predicate: F) -> Self
    where
        F: Fn(usize, usize, f64, f64) -> NodeKind,
    {
        let (hx, hy) = grid.spacing();
        let kinds = Array2::from_shape_fn(grid.shape(), |(i, j)| predicate(i, j, hx, hy));
        Self { kinds }
    }
    /// Every edge node is insulated, every other node is interior.
    pub fn insulated(grid: &Grid) -> Self {
        Self::from_segments(grid, &[])
    }
    /// Dirichlet wherever a segment covers the node (first match wins),
    /// Neumann on the remaining edge nodes.
    pub fn from_segments(grid: &Grid, segments: &[DirichletSegment]) -> Self {
        let (nx, ny) = grid.shape();
        Self::from_predicate(grid, |i, j, _, _| {
            if let Some(seg) = segments.iter().find(|seg| seg.contains(grid, i, j)) {
                NodeKind::Dirichlet(seg.value)
            } else if i == 0 || j == 0 || i == nx - 1 || j == ny - 1 {
                NodeKind::Neumann
            } else {
                NodeKind::Interior
            }
        })
    }
    #[inline]
    pub fn kind(&self, i: usize, j: usize) -> NodeKind {
        self.kinds[[i, j]]
    }
    pub fn kinds(&self) -> ArrayView2<'_, NodeKind> {
        self.kinds.view()
    }
    pub fn shape(&self) -> &[usize] {
        self.kinds.shape()
    }
    pub fn dirichlet_count(&self) -> usize {
        self.kinds.iter().filter(|k| k.is_dirichlet()).count()
    }
    /// Smallest and largest prescribed value, `None` without Dirichlet nodes.
    pub fn dirichlet_range(&self) -> Option<(f64, f64)> {
        self.kinds.iter().fold(None, |acc, kind| match (acc, kind) {
            (None, NodeKind::Dirichlet(v)) => Some((*v, *v)),
            (Some((lo, hi)), NodeKind::Dirichlet(v)) => Some((lo.min(*v), hi.max(*v))),
            (acc, _) => acc,
        })
    }
    /// Write the prescribed values into `field`.
    pub fn seed(&self, mut field: ArrayViewMut2<f64>) {
        for (u, kind) in field.iter_mut().zip(self.kinds.iter()) {
            if let NodeKind::Dirichlet(v) = kind {
                *u = *v;
            }
        }
    }
    pub fn is_consistent(&self, field: ArrayView2<f64>) -> bool {
        field
            .iter()
            .zip(self.kinds.iter())
            .all(|(u, kind)| match kind {
                NodeKind::Dirichlet(v) => u == v,
                _ => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_stays_in_range() {
        for n in 2..12usize {
            let n_i = n as isize;
            for k in -2 * (n_i - 1)..=2 * (n_i - 1) {
                let r = reflect(k, n);
                assert!(r < n, "reflect({k}, {n}) = {r}");
            }
            for k in 0..n_i {
                assert_eq!(reflect(k, n), k as usize);
            }
        }
    }

    #[test]
    fn reflect_is_symmetric_about_the_edges() {
        for n in 2..12usize {
            let n_i = n as isize;
            assert_eq!(reflect(-1, n), reflect(1, n));
            assert_eq!(reflect(n_i, n), reflect(n_i - 2, n));
        }
        assert_eq!(reflect(-1, 11), 1);
        assert_eq!(reflect(11, 11), 9);
        assert_eq!(reflect(-3, 5), 3);
        assert_eq!(reflect(6, 5), 2);
    }

    #[test]
    fn reflect_is_not_clamping() {
        // clamping would return 0 and n-1 here
        assert_ne!(reflect(-1, 5), 0);
        assert_ne!(reflect(5, 5), 4);
    }

    #[test]
    fn insulated_mask_marks_edges() {
        let grid = Grid::new(4, 3, [0.0, 0.0], [1.0, 1.0]).unwrap();
        let mask = BoundaryMask::insulated(&grid);
        assert_eq!(mask.kind(0, 1), NodeKind::Neumann);
        assert_eq!(mask.kind(3, 2), NodeKind::Neumann);
        assert_eq!(mask.kind(1, 1), NodeKind::Interior);
        assert_eq!(mask.dirichlet_count(), 0);
        assert_eq!(mask.dirichlet_range(), None);
    }

    #[test]
    fn predicate_receives_spacing() {
        let grid = Grid::new(5, 3, [0.0, 0.0], [2.0, 1.0]).unwrap();
        let mask = BoundaryMask::from_predicate(&grid, |i, j, hx, hy| {
            if (i as f64 * hx - 1.0).abs() < 1e-12 && (j as f64 * hy - 0.5).abs() < 1e-12 {
                NodeKind::Dirichlet(3.0)
            } else {
                NodeKind::Interior
            }
        });
        assert_eq!(mask.kind(2, 1), NodeKind::Dirichlet(3.0));
        assert_eq!(mask.dirichlet_count(), 1);
    }

    #[test]
    fn seed_makes_field_consistent() {
        let grid = Grid::new(3, 3, [0.0, 0.0], [1.0, 1.0]).unwrap();
        let mask = BoundaryMask::from_predicate(&grid, |i, _, _, _| {
            if i == 0 {
                NodeKind::Dirichlet(-2.0)
            } else if i == 2 {
                NodeKind::Dirichlet(5.0)
            } else {
                NodeKind::Interior
            }
        });
        let mut u = grid.new_scalar_field();
        assert!(!mask.is_consistent(u.view()));
        mask.seed(u.view_mut());
        assert!(mask.is_consistent(u.view()));
        assert_eq!(u[[0, 1]], -2.0);
        assert_eq!(u[[2, 2]], 5.0);
        assert_eq!(u[[1, 1]], 0.0);
        assert_eq!(mask.dirichlet_range(), Some((-2.0, 5.0)));
    }
}
