//! Dual tree traversal, deciding for every pair of cells whether to approximate their interaction,
//! compute it directly, or subdivide.
use tracing::{debug, info_span};

use crate::{
    fmm::types::InteractionLists,
    traits::{tree::Tree, types::RealScalar},
    tree::types::Cell,
};

/// Multipole acceptance criterion, two cells are well separated when `|d|^2 theta^2 > (R_i + R_j)^2`
/// for the displacement `d` between their centres, less the periodic offset.
///
/// # Arguments
/// * `target` - Target cell.
/// * `source` - Source cell.
/// * `theta` - Acceptance parameter, smaller values accept fewer pairs.
/// * `offset` - Periodic offset subtracted from the displacement.
pub fn is_well_separated<T: RealScalar>(
    target: &Cell<T>,
    source: &Cell<T>,
    theta: T,
    offset: &[T; 3],
) -> bool {
    let dx = [
        target.center[0] - source.center[0] - offset[0],
        target.center[1] - source.center[1] - offset[1],
        target.center[2] - source.center[2] - offset[2],
    ];
    let r2 = (dx[0] * dx[0] + dx[1] * dx[1] + dx[2] * dx[2]) * theta * theta;
    let radii = target.radius + source.radius;
    r2 > radii * radii
}

/// Traverse a tree against itself starting from `(root, root)`, recording every well separated pair
/// for M2L and every remaining pair of leaves for P2P.
///
/// A pair that is neither is split by subdividing the larger cell, or the only cell that is not a leaf.
/// Every ordered pair of leaves is therefore covered exactly once, either directly or through exactly
/// one pair of ancestors. Pairs are processed from an explicit stack, so the depth of the tree is not
/// bounded by the call stack.
///
/// # Arguments
/// * `tree` - Cell tree.
/// * `theta` - Acceptance parameter.
/// * `offset` - Periodic offset subtracted from every displacement.
pub fn dual_tree_traversal<T, Tr>(tree: &Tr, theta: T, offset: &[T; 3]) -> InteractionLists
where
    T: RealScalar,
    Tr: Tree<Scalar = T>,
{
    let _span = info_span!("dual_tree_traversal", n_cells = tree.n_cells()).entered();

    let cells = tree.cells();
    let mut interactions = InteractionLists::new(cells.len());
    let mut stack = vec![(tree.root(), tree.root())];

    while let Some((i, j)) = stack.pop() {
        let (ci, cj) = (&cells[i], &cells[j]);
        let (i_leaf, j_leaf) = (tree.is_leaf(i), tree.is_leaf(j));

        if is_well_separated(ci, cj, theta, offset) {
            interactions.m2l[i].push(j);
        } else if i_leaf && j_leaf {
            interactions.p2p[i].push(j);
        } else if j_leaf || (!i_leaf && ci.radius >= cj.radius) {
            stack.extend(tree.children(i).rev().map(|child| (child, j)));
        } else {
            stack.extend(tree.children(j).rev().map(|child| (i, child)));
        }
    }

    debug!(
        n_m2l = interactions.n_m2l(),
        n_p2p = interactions.n_p2p(),
        "built interaction lists"
    );

    interactions
}

impl InteractionLists {
    /// Empty lists for a tree of `n_cells` cells.
    pub fn new(n_cells: usize) -> Self {
        Self {
            m2l: vec![Vec::new(); n_cells],
            p2p: vec![Vec::new(); n_cells],
        }
    }

    /// Number of M2L translations.
    pub fn n_m2l(&self) -> usize {
        self.m2l.iter().map(Vec::len).sum()
    }

    /// Number of P2P interactions between pairs of leaves.
    pub fn n_p2p(&self) -> usize {
        self.p2p.iter().map(Vec::len).sum()
    }

    /// All `(target, source)` pairs approximated with M2L.
    pub fn m2l_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.m2l
            .iter()
            .enumerate()
            .flat_map(|(target, sources)| sources.iter().map(move |&source| (target, source)))
    }

    /// All `(target, source)` pairs of leaves evaluated directly.
    pub fn p2p_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.p2p
            .iter()
            .enumerate()
            .flat_map(|(target, sources)| sources.iter().map(move |&source| (target, source)))
    }
}
