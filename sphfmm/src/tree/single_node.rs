//! Implementation of constructors for single node cell trees.
use itertools::Itertools;
use tracing::{debug, info_span};

use crate::{
    traits::{
        tree::Tree,
        types::{FmmError, RealScalar},
    },
    tree::{
        constants::{DEEPEST_LEVEL, NSIBLINGS},
        types::{Body, Cell, CellTree, Domain},
    },
};

impl<T> CellTree<T>
where
    T: RealScalar,
{
    /// Adopt an externally built cell arena, checking that it satisfies the tree contract with
    /// [`CellTree::validate`].
    ///
    /// # Arguments
    /// * `cells` - Arena of cells, the root is at index zero.
    /// * `bodies` - Body sequence referenced by the cells.
    pub fn new(cells: Vec<Cell<T>>, bodies: Vec<Body<T>>) -> Result<CellTree<T>, FmmError> {
        let Some(root) = cells.first() else {
            return Err(FmmError::InvalidTree("Empty cell arena".to_string()));
        };

        let domain = Domain {
            center: root.center,
            radius: root.radius,
        };

        let leaves = (0..cells.len())
            .filter(|&idx| cells[idx].is_leaf())
            .sorted_by_key(|&idx| cells[idx].body_start)
            .collect_vec();

        let mut tree = CellTree {
            global_indices: (0..bodies.len()).collect(),
            cells,
            bodies,
            leaves,
            depth: 0,
            domain,
        };
        tree.validate()?;

        // Children lie after their parents, so a single sweep finds every level
        let parents = tree.parents();
        let mut levels = vec![0u64; tree.cells.len()];
        for idx in 1..tree.cells.len() {
            if let Some(parent) = parents[idx] {
                levels[idx] = levels[parent] + 1;
            }
        }
        tree.depth = levels.iter().copied().max().unwrap_or(0);

        Ok(tree)
    }

    /// Check that the tree satisfies the contract the FMM relies on.
    ///
    /// The root is the cell at index zero. Every other cell must be the child of exactly one cell, the
    /// children of a cell must lie after it in the arena, every range must lie in bounds, the body
    /// ranges of the leaves must not overlap, `leaves` must list exactly the leaf cells sorted by the
    /// start of their body range, and `global_indices` must be a permutation of the bodies.
    pub fn validate(&self) -> Result<(), FmmError> {
        let cells = &self.cells;
        let n_cells = cells.len();
        let n_bodies = self.bodies.len();

        if n_cells == 0 {
            return Err(FmmError::InvalidTree("Empty cell arena".to_string()));
        }

        let mut parents = vec![None; n_cells];
        for (idx, cell) in cells.iter().enumerate() {
            let body_end = cell.body_start.checked_add(cell.n_bodies);
            if body_end.map_or(true, |end| end > n_bodies) {
                return Err(FmmError::InvalidTree(format!(
                    "Body range of cell {idx} starting at {} with {} bodies out of bounds, found {n_bodies} bodies",
                    cell.body_start, cell.n_bodies
                )));
            }

            if cell.is_leaf() {
                continue;
            }

            let child_end = cell.child_start.checked_add(cell.n_children);
            if cell.child_start <= idx || child_end.map_or(true, |end| end > n_cells) {
                return Err(FmmError::InvalidTree(format!(
                    "Children of cell {idx} starting at {} must lie after it and within the arena of {n_cells} cells",
                    cell.child_start
                )));
            }

            for child in cell.children() {
                if parents[child].replace(idx).is_some() {
                    return Err(FmmError::InvalidTree(format!(
                        "Cell {child} has more than one parent"
                    )));
                }
            }
        }

        if let Some(orphan) = (1..n_cells).find(|&idx| parents[idx].is_none()) {
            return Err(FmmError::InvalidTree(format!(
                "Cell {orphan} is not reachable from the root"
            )));
        }

        let leaves = (0..n_cells)
            .filter(|&idx| cells[idx].is_leaf())
            .sorted_by_key(|&idx| cells[idx].body_start)
            .collect_vec();

        for (&a, &b) in leaves.iter().tuple_windows() {
            if cells[a].body_start + cells[a].n_bodies > cells[b].body_start {
                return Err(FmmError::InvalidTree(format!(
                    "Body ranges of leaves {a} and {b} overlap"
                )));
            }
        }

        let mut listed = vec![false; n_cells];
        let mut previous_start = 0;
        for &leaf in self.leaves.iter() {
            if leaf >= n_cells
                || !cells[leaf].is_leaf()
                || std::mem::replace(&mut listed[leaf], true)
                || cells[leaf].body_start < previous_start
            {
                return Err(FmmError::InvalidTree(format!(
                    "Leaves must list every leaf cell once, sorted by the start of its body range, found {leaf} out of place"
                )));
            }
            previous_start = cells[leaf].body_start;
        }

        if self.leaves.len() != leaves.len() {
            return Err(FmmError::InvalidTree(format!(
                "Found {} leaves listed for {} leaf cells",
                self.leaves.len(),
                leaves.len()
            )));
        }

        let mut seen = vec![false; n_bodies];
        if self.global_indices.len() != n_bodies
            || self
                .global_indices
                .iter()
                .any(|&i| i >= n_bodies || std::mem::replace(&mut seen[i], true))
        {
            return Err(FmmError::InvalidTree(format!(
                "Global indices must be a permutation of {n_bodies} bodies"
            )));
        }

        Ok(())
    }

    /// Build a tree from a flat set of bodies by octant subdivision.
    ///
    /// The root cell is the bounding cube of the bodies. Cells are processed breadth first, any cell
    /// holding more than `n_crit` bodies is split into its non-empty octants, whose cells are allocated
    /// contiguously at the end of the arena with half the radius of their parent. Bodies are reordered
    /// so that each cell references a contiguous range, including all of its descendants' bodies.
    ///
    /// # Arguments
    /// * `bodies` - Bodies to partition, in input order.
    /// * `n_crit` - Maximum number of bodies per leaf cell.
    pub fn from_bodies(bodies: &[Body<T>], n_crit: usize) -> Result<CellTree<T>, FmmError> {
        let _span = info_span!("CellTree::from_bodies", n_bodies = bodies.len(), n_crit).entered();

        if bodies.is_empty() {
            return Err(FmmError::InvalidParameter(
                "Must have a positive number of bodies".to_string(),
            ));
        }

        if n_crit == 0 {
            return Err(FmmError::InvalidParameter(
                "Maximum number of bodies per leaf must be positive".to_string(),
            ));
        }

        let domain = Domain::from_bodies(bodies);
        let mut bodies = bodies.to_vec();
        let mut global_indices = (0..bodies.len()).collect_vec();

        let mut cells = vec![Cell {
            child_start: 0,
            n_children: 0,
            body_start: 0,
            n_bodies: bodies.len(),
            center: domain.center,
            radius: domain.radius,
        }];
        let mut levels = vec![0u64];

        let two = T::from(2.0).unwrap();
        let mut idx = 0;
        while idx < cells.len() {
            let cell = cells[idx];
            let level = levels[idx];
            idx += 1;

            if cell.n_bodies <= n_crit || level >= DEEPEST_LEVEL {
                continue;
            }

            // Counting sort of the cell's bodies by octant
            let range = cell.body_range();
            let octants = bodies[range.clone()]
                .iter()
                .map(|body| octant(&body.position, &cell.center))
                .collect_vec();

            let mut counts = [0usize; NSIBLINGS];
            octants.iter().for_each(|&o| counts[o] += 1);

            let mut offsets = [0usize; NSIBLINGS];
            for o in 1..NSIBLINGS {
                offsets[o] = offsets[o - 1] + counts[o - 1];
            }

            let mut sorted = vec![(Body::default(), 0usize); cell.n_bodies];
            let mut cursor = offsets;
            for (i, &o) in octants.iter().enumerate() {
                sorted[cursor[o]] = (bodies[range.start + i], global_indices[range.start + i]);
                cursor[o] += 1;
            }

            for (i, (body, global_index)) in sorted.into_iter().enumerate() {
                bodies[range.start + i] = body;
                global_indices[range.start + i] = global_index;
            }

            // Allocate the non-empty octants contiguously
            let child_start = cells.len();
            let radius = cell.radius / two;
            for o in (0..NSIBLINGS).filter(|&o| counts[o] > 0) {
                let mut center = cell.center;
                for (d, c) in center.iter_mut().enumerate() {
                    if (o >> d) & 1 == 1 {
                        *c += radius;
                    } else {
                        *c -= radius;
                    }
                }

                cells.push(Cell {
                    child_start: 0,
                    n_children: 0,
                    body_start: range.start + offsets[o],
                    n_bodies: counts[o],
                    center,
                    radius,
                });
                levels.push(level + 1);
            }

            cells[idx - 1].child_start = child_start;
            cells[idx - 1].n_children = cells.len() - child_start;
        }

        let leaves = (0..cells.len())
            .filter(|&idx| cells[idx].is_leaf())
            .sorted_by_key(|&idx| cells[idx].body_start)
            .collect_vec();

        let depth = levels.iter().copied().max().unwrap_or(0);

        debug!(
            n_cells = cells.len(),
            n_leaves = leaves.len(),
            depth,
            "built cell tree"
        );

        Ok(CellTree {
            cells,
            bodies,
            leaves,
            global_indices,
            depth,
            domain,
        })
    }

    /// Index of the parent of each cell, `None` for the root.
    pub fn parents(&self) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.cells.len()];
        for (idx, cell) in self.cells.iter().enumerate() {
            for child in cell.children() {
                parents[child] = Some(idx);
            }
        }
        parents
    }

    /// Cells in pre-order, every cell appears before its descendants. Computed with an explicit stack so
    /// that the depth of the tree is not bounded by the call stack.
    pub fn pre_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.cells.len());
        let mut stack = vec![self.root()];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children(idx).rev());
        }
        order
    }
}

/// Octant of a point relative to a centre, bit `d` is set when the point lies on the positive side of
/// the centre along axis `d`.
fn octant<T: RealScalar>(position: &[T; 3], center: &[T; 3]) -> usize {
    (0..3)
        .filter(|&d| position[d] >= center[d])
        .map(|d| 1usize << d)
        .sum()
}

impl<T> Tree for CellTree<T>
where
    T: RealScalar,
{
    type Scalar = T;

    fn root(&self) -> usize {
        0
    }

    fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    fn bodies(&self) -> &[Body<T>] {
        &self.bodies
    }

    fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    fn depth(&self) -> u64 {
        self.depth
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::{constants::DEFAULT_NCRIT, helpers::bodies_fixture};
    use num::Float;

    #[test]
    fn test_from_bodies() {
        let n_bodies = 5000;
        let bodies = bodies_fixture::<f64>(n_bodies, Some(-1.0), Some(1.0), Some(0), true);
        let tree = CellTree::from_bodies(&bodies, DEFAULT_NCRIT).unwrap();

        // Every body lands in exactly one leaf, and no leaf is over full
        let total: usize = tree.leaves.iter().map(|&l| tree.cells[l].n_bodies).sum();
        assert_eq!(total, n_bodies);
        assert!(tree
            .leaves
            .iter()
            .all(|&l| tree.cells[l].n_bodies <= DEFAULT_NCRIT));

        // Every body lies within the cube of its leaf
        for &leaf in tree.leaves.iter() {
            let cell = tree.cells[leaf];
            for body in tree.bodies[cell.body_range()].iter() {
                for d in 0..3 {
                    assert!(Float::abs(body.position[d] - cell.center[d]) <= cell.radius);
                }
            }
        }

        // Global indices are a permutation mapping tree order back to input order
        let mut seen = vec![false; n_bodies];
        for (body, &global_index) in tree.bodies.iter().zip(tree.global_indices.iter()) {
            assert!(!seen[global_index]);
            seen[global_index] = true;
            assert_eq!(*body, bodies[global_index]);
        }

        // Parent body ranges cover their children, children are contiguous after their parent
        for (idx, cell) in tree.cells.iter().enumerate() {
            if cell.is_leaf() {
                continue;
            }
            assert!(cell.child_start > idx);
            let covered: usize = cell.children().map(|c| tree.cells[c].n_bodies).sum();
            assert_eq!(covered, cell.n_bodies);
            for child in cell.children() {
                assert_eq!(tree.cells[child].radius, cell.radius / 2.0);
            }
        }

        // The externally validated constructor accepts the same arena
        let adopted = CellTree::new(tree.cells.clone(), tree.bodies.clone()).unwrap();
        assert_eq!(adopted.leaves, tree.leaves);
        assert_eq!(adopted.depth, tree.depth);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_single_leaf() {
        let bodies = bodies_fixture::<f64>(10, None, None, None, false);
        let tree = CellTree::from_bodies(&bodies, 64).unwrap();
        assert_eq!(tree.cells.len(), 1);
        assert_eq!(tree.leaves, vec![0]);
        assert_eq!(tree.depth, 0);
    }

    #[test]
    fn test_coincident_bodies_terminate() {
        let bodies = vec![Body::new([0.25, 0.25, 0.25], 1.0); 10];
        let tree = CellTree::from_bodies(&bodies, 1).unwrap();
        assert_eq!(tree.depth, DEEPEST_LEVEL);
        assert_eq!(tree.leaves.len(), 1);
    }

    #[test]
    fn test_pre_order() {
        let bodies = bodies_fixture::<f64>(2000, None, None, Some(1), false);
        let tree = CellTree::from_bodies(&bodies, 32).unwrap();
        let order = tree.pre_order();
        assert_eq!(order.len(), tree.cells.len());
        assert_eq!(order[0], 0);

        let mut position = vec![0; tree.cells.len()];
        order.iter().enumerate().for_each(|(i, &idx)| position[idx] = i);
        for (idx, parent) in tree.parents().iter().enumerate() {
            if let Some(parent) = parent {
                assert!(position[*parent] < position[idx]);
            }
        }
    }

    #[test]
    fn test_invalid_trees() {
        let bodies = vec![Body::new([0.0, 0.0, 0.0], 1.0), Body::new([1.0, 0.0, 0.0], 1.0)];
        let leaf = |body_start, n_bodies| Cell {
            child_start: 0,
            n_children: 0,
            body_start,
            n_bodies,
            center: [0.0; 3],
            radius: 1.0,
        };

        assert!(matches!(
            CellTree::<f64>::new(vec![], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // Body range out of bounds
        assert!(matches!(
            CellTree::new(vec![leaf(0, 3)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // Child before parent
        let mut root = leaf(0, 2);
        root.child_start = 0;
        root.n_children = 1;
        assert!(matches!(
            CellTree::new(vec![root, leaf(0, 2)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // Overlapping leaves
        let mut root = leaf(0, 2);
        root.child_start = 1;
        root.n_children = 2;
        assert!(matches!(
            CellTree::new(vec![root, leaf(0, 2), leaf(1, 1)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // Ranges whose end overflows
        assert!(matches!(
            CellTree::new(vec![leaf(usize::MAX, 2)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));
        let mut root = leaf(0, 2);
        root.child_start = 1;
        root.n_children = usize::MAX;
        assert!(matches!(
            CellTree::new(vec![root, leaf(0, 2)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // Orphaned cell
        let mut root = leaf(0, 2);
        root.child_start = 1;
        root.n_children = 1;
        assert!(matches!(
            CellTree::new(vec![root, leaf(0, 2), leaf(0, 0)], bodies.clone()),
            Err(FmmError::InvalidTree(_))
        ));

        // A valid two leaf tree
        let mut root = leaf(0, 2);
        root.child_start = 1;
        root.n_children = 2;
        let tree = CellTree::new(vec![root, leaf(1, 1), leaf(0, 1)], bodies).unwrap();
        assert_eq!(tree.leaves, vec![2, 1]);
        assert_eq!(tree.depth, 1);

        // Leaf lists and permutations edited after construction are caught
        let mut edited = tree.clone();
        edited.leaves = vec![1, 2];
        assert!(matches!(edited.validate(), Err(FmmError::InvalidTree(_))));

        let mut edited = tree.clone();
        edited.leaves = vec![2, 2];
        assert!(matches!(edited.validate(), Err(FmmError::InvalidTree(_))));

        let mut edited = tree.clone();
        edited.global_indices = vec![0, 2];
        assert!(matches!(edited.validate(), Err(FmmError::InvalidTree(_))));

        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            CellTree::<f64>::from_bodies(&[], 64),
            Err(FmmError::InvalidParameter(_))
        ));
        let bodies = bodies_fixture::<f64>(10, None, None, None, false);
        assert!(matches!(
            CellTree::from_bodies(&bodies, 0),
            Err(FmmError::InvalidParameter(_))
        ));
    }
}
