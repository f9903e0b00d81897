//! Data structures for the spherical harmonic FMM.
use num_complex::Complex;

use crate::{traits::types::RealScalar, tree::types::CellTree};

/// Tables that depend only on the expansion order, shared read only by every translation operator.
///
/// Tables over degree and order pairs are addressed by the full index `n * n + n + m` for
/// `m` in `[-n, n]`, see [`full_index`](crate::fmm::helpers::full_index).
///
/// # Fields
/// - `expansion_order` - Number of degrees retained in each expansion, `P`.
///
/// - `n_coeffs` - Number of stored coefficients per expansion, `P(P+1)/2`.
///
/// - `prefactor` - Normalisation `sqrt((n-|m|)! / (n+|m|)!)` for degrees `n < 2P`.
///
/// - `anm` - Sign and factorial ratios `(-1)^n / sqrt((n+m)! (n-m)!)` for degrees `n < 2P`.
///
/// - `cnm` - M2L translation table of `P^4` entries, row `jk` holds the weights of every source
///   coefficient `nm` contributing to target coefficient `jk`.
#[derive(Debug, Clone, Default)]
pub struct KernelContext<T>
where
    T: RealScalar,
{
    /// Expansion order
    pub expansion_order: usize,

    /// Number of stored coefficients per expansion
    pub n_coeffs: usize,

    /// Normalisation factors
    pub prefactor: Vec<T>,

    /// Sign and factorial ratios
    pub anm: Vec<T>,

    /// M2L translation table
    pub cnm: Vec<Complex<T>>,
}

/// Decisions recorded by the dual tree traversal, grouped by target cell.
///
/// `m2l[i]` lists the source cells whose multipole expansions are translated into the local
/// expansion of cell `i`, `p2p[i]` lists the leaves interacting directly with the bodies of leaf `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionLists {
    /// Well separated sources of each target cell.
    pub m2l: Vec<Vec<usize>>,

    /// Near field sources of each target leaf.
    pub p2p: Vec<Vec<usize>>,
}

/// A spherical harmonic FMM for the Laplace kernel `1/r` on a single node.
///
/// # Fields
/// - `tree` - Cell tree, its bodies receive the evaluated potentials and forces.
///
/// - `kernel` - Precomputed tables for the expansion order.
///
/// - `theta` - Multipole acceptance criterion.
///
/// - `periodic_offset` - Coordinate offset subtracted from every source position.
///
/// - `interactions` - Result of the dual tree traversal.
///
/// - `pre_order` - Cells ordered so that every parent precedes its descendants.
///
/// - `multipoles` - Flat buffer of multipole coefficients, `n_coeffs` per cell in arena order.
///
/// - `locals` - Flat buffer of local coefficients, `n_coeffs` per cell in arena order.
///
/// - `potentials` - Potential at each body, in tree order.
///
/// - `forces` - Force at each body, in tree order.
#[derive(Debug, Clone)]
pub struct SphericalFmm<T>
where
    T: RealScalar,
{
    /// Cell tree
    pub tree: CellTree<T>,

    /// Kernel tables
    pub kernel: KernelContext<T>,

    /// Multipole acceptance criterion
    pub theta: T,

    /// Periodic coordinate offset
    pub periodic_offset: [T; 3],

    /// Expansion order
    pub expansion_order: usize,

    /// Number of stored coefficients per expansion
    pub n_coeffs: usize,

    /// Interaction lists
    pub interactions: InteractionLists,

    /// Pre-order of the cells
    pub pre_order: Vec<usize>,

    /// Multipole data
    pub multipoles: Vec<Complex<T>>,

    /// Local data
    pub locals: Vec<Complex<T>>,

    /// Potential data
    pub potentials: Vec<T>,

    /// Force data
    pub forces: Vec<[T; 3]>,
}

/// Builder for single node spherical harmonic FMMs.
///
/// # Example
/// ```
/// use sphfmm::{fmm::types::SingleNodeBuilder, traits::fmm::Fmm, tree::helpers::bodies_fixture};
///
/// let bodies = bodies_fixture::<f64>(500, None, None, Some(0), true);
/// let mut fmm = SingleNodeBuilder::new()
///     .tree(&bodies, Some(32))
///     .unwrap()
///     .parameters(8, Some(0.5))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// fmm.evaluate().unwrap();
/// assert_eq!(fmm.potentials().len(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct SingleNodeBuilder<T>
where
    T: RealScalar,
{
    /// Cell tree
    pub tree: Option<CellTree<T>>,

    /// Expansion order
    pub expansion_order: Option<usize>,

    /// Multipole acceptance criterion
    pub theta: Option<T>,

    /// Periodic coordinate offset
    pub periodic_offset: Option<[T; 3]>,

    /// Number of periodic image levels
    pub images: usize,
}
