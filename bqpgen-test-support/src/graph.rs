//! Graph assertions over plain integer site ids.
//!
//! Helpers here take raw `u32` ids and `f64` weights so they can check
//! generator output without depending on the core crate's types.

use std::collections::{BTreeMap, BTreeSet};

/// Union-find with path compression and union by rank.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Creates `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of the set holding `node`.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }
        root
    }

    /// Merges the sets holding `left` and `right`. Returns `false` when they
    /// were already joined.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return false;
        }
        if self.rank[left] < self.rank[right] {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if self.rank[left] == self.rank[right] {
            self.rank[left] = self.rank[left].saturating_add(1);
        }
        true
    }
}

/// Contracts `chain_edges` and numbers the resulting components densely in
/// order of their smallest site.
///
/// Sites mentioned only by `chain_edges` are included.
///
/// # Examples
/// ```
/// use bqpgen_test_support::graph::contract;
///
/// let groups = contract(&[0, 4, 5, 12], &[(0, 4), (5, 12)]);
/// assert_eq!(groups[&0], groups[&4]);
/// assert_eq!(groups[&5], 1);
/// ```
#[must_use]
pub fn contract(sites: &[u32], chain_edges: &[(u32, u32)]) -> BTreeMap<u32, usize> {
    let all: BTreeSet<u32> = sites
        .iter()
        .copied()
        .chain(chain_edges.iter().flat_map(|(a, b)| [*a, *b]))
        .collect();
    let index: BTreeMap<u32, usize> = all.iter().enumerate().map(|(i, s)| (*s, i)).collect();
    let mut sets = DisjointSet::new(all.len());
    for (a, b) in chain_edges {
        sets.union(index[a], index[b]);
    }
    let mut dense = BTreeMap::new();
    let mut groups = BTreeMap::new();
    for site in &all {
        let root = sets.find(index[site]);
        let next = dense.len();
        let group = *dense.entry(root).or_insert(next);
        groups.insert(*site, group);
    }
    groups
}

/// Returns whether `edges` connect every pair of the `nodes` logical nodes.
///
/// Self edges and duplicates are ignored.
#[must_use]
pub fn is_complete(nodes: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> bool {
    let pairs: BTreeSet<(usize, usize)> = edges
        .into_iter()
        .filter(|(a, b)| a != b && *a < nodes && *b < nodes)
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();
    pairs.len() == nodes * nodes.saturating_sub(1) / 2
}

/// Product of the weight signs around `cycle`, closing edge included.
///
/// Returns `None` when an edge is missing or has zero weight.
#[must_use]
pub fn cycle_sign_product(cycle: &[u32], weight: impl Fn(u32, u32) -> Option<f64>) -> Option<f64> {
    if cycle.len() < 2 {
        return None;
    }
    let mut product = 1.0;
    for (a, b) in cycle.iter().zip(cycle.iter().cycle().skip(1)) {
        let value = weight((*a).min(*b), (*a).max(*b))?;
        if value == 0.0 {
            return None;
        }
        product *= value.signum();
    }
    Some(product)
}
