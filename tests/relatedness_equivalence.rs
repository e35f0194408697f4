//! Cross-checks of every site-mode relatedness reduction path
//! against the genotype covariance matrix.


use random_trees::*;
use relatts::*;

fn verify(ts: &TreeSequence) {
    verify_site_paths(ts, DEFAULT_RELATIVE_TOLERANCE).unwrap();
}

#[test]
fn test_single_coalescent_tree() {
    let ts = random_tree_sequence(TopologyParams {
        num_samples: 10,
        num_trees: 1,
        sites_per_tree: 20,
        max_children: 2,
        seed: 1,
    });
    assert_eq!(ts.num_trees(), 1);
    verify(&ts);
}

#[test]
fn test_recombinant_trees() {
    let ts = random_tree_sequence(TopologyParams {
        num_samples: 8,
        num_trees: 5,
        sites_per_tree: 4,
        max_children: 2,
        seed: 1,
    });
    assert!(ts.num_trees() > 2);
    verify(&ts);
}

#[test]
fn test_internal_samples() {
    // Nine nodes; node 5 is both a sample and an ancestor of
    // sample 1. Three marginal trees over [0, 10).
    let times: Vec<Time> = [0.0, 0.1, 0.1, 0.2, 0.4, 0.5, 0.7, 1.0, 0.8]
        .iter()
        .map(|t| Time::from(*t))
        .collect();
    let parents = |pairs: &[(usize, i32)]| -> Vec<NodeId> {
        let mut parent = vec![NodeId::NULL; 9];
        for (child, p) in pairs {
            parent[*child] = NodeId::from(*p);
        }
        parent
    };
    // [0, 2): 4 -> {2, 3}, 5 -> {1, 4}, 7 -> {0, 5}
    let tree0 = Tree::new(
        parents(&[(2, 4), (3, 4), (1, 5), (4, 5), (0, 7), (5, 7)]),
        times.clone(),
        Position::new_valid(0),
        Position::new_valid(2),
    )
    .unwrap();
    // [2, 8): 4 -> {0, 2}, 5 -> {1, 4}, 8 -> {3, 5}
    let tree1 = Tree::new(
        parents(&[(0, 4), (2, 4), (1, 5), (4, 5), (3, 8), (5, 8)]),
        times.clone(),
        Position::new_valid(2),
        Position::new_valid(8),
    )
    .unwrap();
    // [8, 10): 4 -> {2, 3}, 5 -> {1, 4}, 6 -> {0, 5}
    let tree2 = Tree::new(
        parents(&[(2, 4), (3, 4), (1, 5), (4, 5), (0, 6), (5, 6)]),
        times,
        Position::new_valid(8),
        Position::new_valid(10),
    )
    .unwrap();
    let samples: Vec<NodeId> = [1, 2, 3, 5].iter().map(|v| NodeId::from(*v)).collect();
    // mutations on node 1 (tree 0), node 3 (tree 1), node 5 (tree 2)
    let genotypes = GenotypeMatrix::from_rows(&[
        vec![1, 0, 0, 0],
        vec![0, 0, 1, 0],
        vec![1, 1, 1, 1],
    ])
    .unwrap();
    let ts = TreeSequence::new(
        vec![tree0, tree1, tree2],
        genotypes,
        samples,
        Position::new_valid(10),
    )
    .unwrap();
    verify(&ts);
}

fn validate_trees(num_samples: usize) {
    for seed in 1..10 {
        let ts = random_tree_sequence(TopologyParams {
            num_samples,
            num_trees: 3,
            sites_per_tree: 5,
            max_children: 2,
            seed,
        });
        assert!(ts.num_trees() > 2);
        verify(&ts);
    }
}

#[test]
fn test_sample_5() {
    validate_trees(5);
}

#[test]
fn test_sample_10() {
    validate_trees(10);
}

#[test]
fn test_sample_20() {
    validate_trees(20);
}

fn validate_nonbinary_trees(num_samples: usize) {
    for seed in 1..10 {
        let ts = random_tree_sequence(TopologyParams {
            num_samples,
            num_trees: 2,
            sites_per_tree: 8,
            max_children: 5,
            seed,
        });
        // Check if this is really nonbinary
        assert!(has_multifurcation(&ts));
        verify(&ts);
    }
}

#[test]
fn test_non_binary_sample_10() {
    validate_nonbinary_trees(10);
}

#[test]
fn test_non_binary_sample_20() {
    validate_nonbinary_trees(20);
}

#[test]
fn test_single_site_multiallelic_scenario() {
    let genotypes = GenotypeMatrix::from_rows(&[vec![0, 0, 0, 0, 1, 2]]).unwrap();
    let ts = TreeSequence::from_genotypes(genotypes, Position::new_valid(1)).unwrap();
    verify(&ts);
    let covariance = genotype_covariance(ts.genotype_matrix()).unwrap();
    assert!((covariance[[0, 0]] - 0.25).abs() < 1e-12);
    assert!((covariance[[0, 4]] + 0.25).abs() < 1e-12);
    assert!((covariance[[4, 5]] - 0.75).abs() < 1e-12);
}
