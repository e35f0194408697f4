//! Covariance matrices of sample genotypes and branch lengths.
//!
//! Two independent formulas are kept on purpose: a vectorized
//! production path ([`genotype_covariance`]) and an explicit
//! brute-force path ([`naive_genotype_covariance`]) that serves
//! as ground truth for [`crate::verify_site_paths`].

use crate::genotypes::{GenotypeMatrix, GenotypesError, GenotypesResult};
use crate::trees::{Tree, TreeSequence, TreesError, TreesResult};
use ndarray::{Array2, Axis};
use relatts_core::NodeId;

/// Compute the sample-by-sample genotype covariance matrix.
///
/// With `G` the (sites, samples) genotype matrix, the result is
/// `centered(Gᵗ)·centered(Gᵗ)ᵗ`, where centering subtracts the
/// per-site mean across samples from every sample's genotype
/// vector. No normalization by the number of sites is applied;
/// callers that want an average divide themselves.
///
/// # Errors
///
/// * [`GenotypesError::EmptyGenotypeMatrix`] if `genotypes` has
///   zero sites or zero samples, since the per-site mean is
///   undefined.
/// * [`GenotypesError::MissingGenotypes`] if missing data is
///   present.
pub fn genotype_covariance(genotypes: &GenotypeMatrix) -> GenotypesResult<Array2<f64>> {
    if genotypes.num_sites() == 0 || genotypes.num_samples() == 0 {
        return Err(GenotypesError::EmptyGenotypeMatrix);
    }
    if let Some((site, sample)) = genotypes.first_missing() {
        return Err(GenotypesError::MissingGenotypes { site, sample });
    }
    let g = genotypes.as_array().mapv(f64::from);
    let site_means = g
        .mean_axis(Axis(1))
        .ok_or(GenotypesError::EmptyGenotypeMatrix)?;
    let centered = g.t().to_owned() - &site_means;
    Ok(centered.dot(&centered.t()))
}

/// Brute-force form of [`genotype_covariance`].
///
/// Iterates all sample pairs and sites explicitly. Deliberately
/// inefficient; kept as an independently derived cross-check.
pub fn naive_genotype_covariance(genotypes: &GenotypeMatrix) -> GenotypesResult<Array2<f64>> {
    let num_sites = genotypes.num_sites();
    let num_samples = genotypes.num_samples();
    if num_sites == 0 || num_samples == 0 {
        return Err(GenotypesError::EmptyGenotypeMatrix);
    }
    if let Some((site, sample)) = genotypes.first_missing() {
        return Err(GenotypesError::MissingGenotypes { site, sample });
    }
    let g = genotypes.as_array();
    let mut means = vec![0.0; num_sites];
    for (site, mean) in means.iter_mut().enumerate() {
        let mut total = 0.0;
        for sample in 0..num_samples {
            total += f64::from(g[[site, sample]]);
        }
        *mean = total / num_samples as f64;
    }
    let mut cov = Array2::<f64>::zeros((num_samples, num_samples));
    for i in 0..num_samples {
        for j in i..num_samples {
            let mut total = 0.0;
            for site in 0..num_sites {
                total += (f64::from(g[[site, i]]) - means[site])
                    * (f64::from(g[[site, j]]) - means[site]);
            }
            cov[[i, j]] = total;
            cov[[j, i]] = total;
        }
    }
    Ok(cov)
}

/// Check the topology preconditions of [`naive_tree_covariance`]:
/// a single root, and no unary node in the root's subtree.
fn check_covariance_tree_inputs(tree: &Tree, samples: &[NodeId]) -> TreesResult<NodeId> {
    let root = tree.root(samples)?;
    for index in 0..tree.num_nodes() {
        let node = NodeId::try_from(index).map_err(|_| TreesError::NodeIdOutOfRange)?;
        if tree.num_children(node)? != 1 {
            continue;
        }
        let mut terminus = node;
        for ancestor in tree.parents(node)? {
            terminus = ancestor;
        }
        if terminus == root {
            return Err(TreesError::UnaryNode { node });
        }
    }
    Ok(root)
}

/// Compute the branch covariance matrix for `samples` on one tree.
///
/// The covariance between a pair of samples is the distance from
/// the root to their most recent common ancestor; diagonal entries
/// are root-to-sample distances.
///
/// # Errors
///
/// * [`TreesError::MultipleRoots`] if the samples' ancestry has
///   more than one root.
/// * [`TreesError::UnaryNode`] if any node in the root's subtree
///   has exactly one child; the root-to-MRCA reading of covariance
///   is undefined on such trees.
pub fn naive_tree_covariance(tree: &Tree, samples: &[NodeId]) -> TreesResult<Array2<f64>> {
    let root = check_covariance_tree_inputs(tree, samples)?;
    let root_time = f64::from(tree.time(root)?);
    let n = samples.len();
    let mut cov = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let mrca = tree.mrca(samples[i], samples[j])?;
            let value = root_time - f64::from(tree.time(mrca)?);
            cov[[i, j]] = value;
            cov[[j, i]] = value;
        }
    }
    Ok(cov)
}

/// Compute the branch covariance matrix for a tree sequence.
///
/// The per-tree covariance matrices of [`naive_tree_covariance`]
/// are weighted by tree span and divided by the sequence length.
///
/// # Errors
///
/// [`TreesError::NoTrees`] for a site-only tree sequence, else as
/// [`naive_tree_covariance`] for the first offending tree.
pub fn naive_branch_covariance(ts: &TreeSequence) -> TreesResult<Array2<f64>> {
    if ts.trees().is_empty() {
        return Err(TreesError::NoTrees);
    }
    let n = ts.num_samples();
    let mut cov = Array2::<f64>::zeros((n, n));
    for tree in ts.trees() {
        let tree_cov = naive_tree_covariance(tree, ts.samples())?;
        cov += &(tree_cov * tree.span() as f64);
    }
    Ok(cov / f64::from(ts.sequence_length()))
}

#[cfg(test)]
mod test_covariance {
    use super::*;
    use approx::assert_abs_diff_eq;
    use relatts_core::{Position, Time};

    #[test]
    fn test_single_site_scenario() {
        // one site, six samples, multi-allelic; mean 0.5
        let g = GenotypeMatrix::from_rows(&[vec![0, 0, 0, 0, 1, 2]]).unwrap();
        let cov = genotype_covariance(&g).unwrap();
        assert_eq!(cov.dim(), (6, 6));
        assert_abs_diff_eq!(cov[[0, 0]], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[[0, 4]], -0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[[4, 5]], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[[5, 5]], 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_fast_and_naive_agree() {
        let g = GenotypeMatrix::from_rows(&[
            vec![0, 1, 1, 0],
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 1],
            vec![2, 0, 1, 0],
        ])
        .unwrap();
        let fast = genotype_covariance(&g).unwrap();
        let naive = naive_genotype_covariance(&g).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(fast[[i, j]], naive[[i, j]], epsilon = 1e-12);
                assert_abs_diff_eq!(fast[[i, j]], fast[[j, i]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let g = GenotypeMatrix::from_rows(&[]).unwrap();
        assert_eq!(
            genotype_covariance(&g).err(),
            Some(GenotypesError::EmptyGenotypeMatrix)
        );
        assert_eq!(
            naive_genotype_covariance(&g).err(),
            Some(GenotypesError::EmptyGenotypeMatrix)
        );
    }

    #[test]
    fn test_missing_data_rejected() {
        let g = GenotypeMatrix::from_rows(&[vec![0, -1, 1]]).unwrap();
        assert_eq!(
            genotype_covariance(&g).err(),
            Some(GenotypesError::MissingGenotypes { site: 0, sample: 1 })
        );
    }

    fn balanced_four_leaf_tree() -> Tree {
        // 6            times 0 x4, then 1, 1, 2
        // +---+
        // 4   5
        // +-+ +-+
        // 0 1 2 3
        let parent: Vec<NodeId> = [4, 4, 5, 5, 6, 6, -1].iter().map(|v| NodeId::from(*v)).collect();
        let time: Vec<Time> = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0]
            .iter()
            .map(|t| Time::from(*t))
            .collect();
        Tree::new(parent, time, Position::new_valid(0), Position::new_valid(10)).unwrap()
    }

    #[test]
    fn test_tree_covariance_values() {
        let tree = balanced_four_leaf_tree();
        let samples: Vec<NodeId> = [0, 1, 2, 3].iter().map(|v| NodeId::from(*v)).collect();
        let cov = naive_tree_covariance(&tree, &samples).unwrap();
        // same cherry: root to MRCA at time 1
        assert_abs_diff_eq!(cov[[0, 1]], 1.0, epsilon = 1e-12);
        // across cherries: MRCA is the root
        assert_abs_diff_eq!(cov[[0, 2]], 0.0, epsilon = 1e-12);
        // diagonal: root-to-sample distance
        assert_abs_diff_eq!(cov[[3, 3]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unary_node_rejected() {
        // 3 is a unary node above the root of the cherry
        let parent: Vec<NodeId> = [2, 2, 3, -1].iter().map(|v| NodeId::from(*v)).collect();
        let time: Vec<Time> = [0.0, 0.0, 1.0, 2.0]
            .iter()
            .map(|t| Time::from(*t))
            .collect();
        let tree = Tree::new(parent, time, Position::new_valid(0), Position::new_valid(1)).unwrap();
        let samples: Vec<NodeId> = [0, 1].iter().map(|v| NodeId::from(*v)).collect();
        assert_eq!(
            naive_tree_covariance(&tree, &samples).err(),
            Some(TreesError::UnaryNode {
                node: NodeId::from(3)
            })
        );
    }
}
