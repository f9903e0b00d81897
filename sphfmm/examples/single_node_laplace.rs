use std::f64::consts::PI;

use sphfmm::fmm::{
    direct::direct,
    helpers::{relative_error_potential, relative_l2_error_force, sample_targets},
};
use sphfmm::tree::helpers::bodies_fixture;
use sphfmm::{Fmm, SingleNodeBuilder, Tree};

fn main() {
    // Charge neutral bodies in a cube of side 2 pi
    let n_bodies = 1000;
    let bodies = bodies_fixture::<f64>(n_bodies, Some(-PI), Some(PI), Some(0), true);

    // FMM parameters
    let expansion_order = 10;
    let theta = Some(0.4);
    let n_crit = Some(64);

    let mut fmm = SingleNodeBuilder::new()
        .tree(&bodies, n_crit)
        .unwrap()
        .parameters(expansion_order, theta)
        .unwrap()
        .build()
        .unwrap();

    fmm.evaluate().unwrap();

    println!(
        "cells: {}, leaves: {}, depth: {}, M2L: {}, P2P: {}",
        fmm.tree().n_cells(),
        fmm.tree().n_leaves(),
        fmm.tree().depth(),
        fmm.interactions().n_m2l(),
        fmm.interactions().n_p2p()
    );

    // Compare against direct summation over a sample of targets
    let n_targets = 10;
    let stride = n_bodies / n_targets;
    let mut exact = sample_targets(fmm.tree().bodies(), n_targets);
    direct(&mut exact, fmm.tree().bodies(), &[0.0; 3]);

    let approx = (0..n_targets)
        .map(|i| fmm.tree().bodies()[i * stride])
        .collect::<Vec<_>>();

    let approx_forces = approx.iter().map(|b| b.force).collect::<Vec<_>>();
    let exact_forces = exact.iter().map(|b| b.force).collect::<Vec<_>>();

    println!(
        "Rel. L2 Error (p) : {:8.5e}",
        relative_error_potential(&approx, &exact)
    );
    println!(
        "Rel. L2 Error (F) : {:8.5e}",
        relative_l2_error_force(&approx_forces, &exact_forces)
    );
}
