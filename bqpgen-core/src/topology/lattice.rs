//! Explicit adjacency generation for defect-free chimera lattices.

use super::site::{ChimeraCoordinate, SHORE_SIZE, Shore, SiteId};

/// Enumerates every coupler of a full-yield lattice as raw endpoint pairs.
///
/// Each unit cell is a complete bipartite K4,4 between its vertical and
/// horizontal shores. Vertical qubit `k` additionally links to vertical qubit
/// `k` of the cell one row down, and horizontal qubit `k` to horizontal qubit
/// `k` of the cell one column right. Pairs are emitted cell by cell in
/// row-major order; callers canonicalize them.
pub(super) fn chimera_arcs(degree: usize) -> Vec<(SiteId, SiteId)> {
    let mut arcs = Vec::new();
    for row in 0..degree {
        for col in 0..degree {
            for k in 0..SHORE_SIZE {
                let vertical = ChimeraCoordinate::new(row, col, Shore::Vertical, k);
                let horizontal = ChimeraCoordinate::new(row, col, Shore::Horizontal, k);
                for other in 0..SHORE_SIZE {
                    let across = ChimeraCoordinate::new(row, col, Shore::Horizontal, other);
                    push_arc(&mut arcs, vertical, across, degree);
                }
                if row + 1 < degree {
                    let below = ChimeraCoordinate::new(row + 1, col, Shore::Vertical, k);
                    push_arc(&mut arcs, vertical, below, degree);
                }
                if col + 1 < degree {
                    let right = ChimeraCoordinate::new(row, col + 1, Shore::Horizontal, k);
                    push_arc(&mut arcs, horizontal, right, degree);
                }
            }
        }
    }
    arcs
}

/// Enumerates every site of a full-yield lattice in ascending order.
pub(super) fn chimera_sites(degree: usize) -> Vec<SiteId> {
    let mut sites = Vec::new();
    for row in 0..degree {
        for col in 0..degree {
            for shore in [Shore::Vertical, Shore::Horizontal] {
                for k in 0..SHORE_SIZE {
                    if let Some(site) = ChimeraCoordinate::new(row, col, shore, k).to_site(degree)
                    {
                        sites.push(site);
                    }
                }
            }
        }
    }
    sites
}

fn push_arc(
    arcs: &mut Vec<(SiteId, SiteId)>,
    from: ChimeraCoordinate,
    to: ChimeraCoordinate,
    degree: usize,
) {
    if let (Some(a), Some(b)) = (from.to_site(degree), to.to_site(degree)) {
        arcs.push((a, b));
    }
}
