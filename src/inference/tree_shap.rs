//! Path-dependent TreeSHAP (Lundberg et al., Algorithm 2).
//!
//! Exact Shapley values of a single tree's output for one instance, using
//! node covers as the background distribution. Runs in O(L·D²) per tree.

use super::boosted_trees::{Node, Tree};
use super::ModelError;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// Add the tree's contributions for `x` into `phi`.
pub(crate) fn accumulate(
    tree: &Tree,
    tree_index: usize,
    x: &[f64],
    phi: &mut [f64],
) -> Result<(), ModelError> {
    let mut walker = Walker {
        tree,
        tree_index,
        x,
        phi,
    };
    walker.recurse(0, &[], 0, 1.0, 1.0, None)
}

struct Walker<'a> {
    tree: &'a Tree,
    tree_index: usize,
    x: &'a [f64],
    phi: &'a mut [f64],
}

impl Walker<'_> {
    fn recurse(
        &mut self,
        node_index: usize,
        parent_path: &[PathElement],
        depth: usize,
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) -> Result<(), ModelError> {
        let mut path = parent_path[..depth].to_vec();
        path.push(PathElement {
            feature,
            zero_fraction,
            one_fraction,
            weight: 0.0,
        });
        extend(&mut path, depth);

        let tree = self.tree;
        match tree.node(self.tree_index, node_index)? {
            Node::Leaf { leaf, .. } => {
                for i in 1..=depth {
                    let w = unwound_sum(&path, depth, i);
                    let el = path[i];
                    if let Some(f) = el.feature {
                        self.phi[f] += w * (el.one_fraction - el.zero_fraction) * leaf;
                    }
                }
                Ok(())
            }
            Node::Split {
                feature: split,
                threshold,
                left,
                right,
                cover,
            } => {
                let value = self.x.get(*split).copied().ok_or(ModelError::Dimension {
                    expected: split + 1,
                    actual: self.x.len(),
                })?;
                let (hot, cold) = if value < *threshold {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let hot_zero = tree.node(self.tree_index, hot)?.cover() / cover;
                let cold_zero = tree.node(self.tree_index, cold)?.cover() / cover;

                let mut incoming_zero = 1.0;
                let mut incoming_one = 1.0;
                let mut depth = depth;

                // A feature already on the path is undone before re-splitting.
                if let Some(k) = (1..=depth).find(|&k| path[k].feature == Some(*split)) {
                    incoming_zero = path[k].zero_fraction;
                    incoming_one = path[k].one_fraction;
                    unwind(&mut path, depth, k);
                    depth -= 1;
                }

                self.recurse(
                    hot,
                    &path,
                    depth + 1,
                    hot_zero * incoming_zero,
                    incoming_one,
                    Some(*split),
                )?;
                self.recurse(
                    cold,
                    &path,
                    depth + 1,
                    cold_zero * incoming_zero,
                    0.0,
                    Some(*split),
                )
            }
        }
    }
}

fn extend(path: &mut [PathElement], depth: usize) {
    let zero = path[depth].zero_fraction;
    let one = path[depth].one_fraction;
    path[depth].weight = if depth == 0 { 1.0 } else { 0.0 };

    let d = depth as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one * path[i].weight * (i as f64 + 1.0) / (d + 1.0);
        path[i].weight = zero * path[i].weight * (d - i as f64) / (d + 1.0);
    }
}

fn unwind(path: &mut [PathElement], depth: usize, index: usize) {
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = depth as f64;
    let mut next_one = path[depth].weight;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one * (d + 1.0) / ((i as f64 + 1.0) * one);
            next_one = tmp - path[i].weight * zero * (d - i as f64) / (d + 1.0);
        } else {
            path[i].weight = path[i].weight * (d + 1.0) / (zero * (d - i as f64));
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight of the path with element `index` removed.
fn unwound_sum(path: &[PathElement], depth: usize, index: usize) -> f64 {
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let d = depth as f64;
    let mut next_one = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = next_one * (d + 1.0) / ((i as f64 + 1.0) * one);
            total += tmp;
            next_one = path[i].weight - tmp * zero * ((d - i as f64) / (d + 1.0));
        } else {
            total += (path[i].weight / zero) / ((d - i as f64) / (d + 1.0));
        }
    }
    total
}
