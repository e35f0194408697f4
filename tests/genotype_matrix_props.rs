//! Property-based checks over arbitrary genotype matrices:
//! every site-mode reduction path agrees with the covariance
//! matrix, which is symmetric, for any tree-free input.

use proptest::prelude::*;
use relatts::*;

fn genotype_rows() -> impl Strategy<Value = Vec<Vec<i32>>> {
    (1_usize..25, 2_usize..10).prop_flat_map(|(sites, samples)| {
        prop::collection::vec(prop::collection::vec(0..=2_i32, samples), sites)
    })
}

proptest! {
    #[test]
    fn test_site_paths_agree(rows in genotype_rows()) {
        let genotypes = GenotypeMatrix::from_rows(&rows).unwrap();
        let ts = TreeSequence::from_genotypes(genotypes, Position::new_valid(1)).unwrap();
        verify_site_paths(&ts, DEFAULT_RELATIVE_TOLERANCE).unwrap();
    }

    #[test]
    fn test_covariance_symmetric(rows in genotype_rows()) {
        let genotypes = GenotypeMatrix::from_rows(&rows).unwrap();
        let cov = genotype_covariance(&genotypes).unwrap();
        check_symmetric("genotype covariance", &cov, DEFAULT_RELATIVE_TOLERANCE).unwrap();
    }

    #[test]
    fn test_singleton_partition_is_lossless(rows in genotype_rows()) {
        // the finest partition must reproduce the per-sample
        // covariance matrix exactly, with no aggregation loss
        let genotypes = GenotypeMatrix::from_rows(&rows).unwrap();
        let num_samples = genotypes.num_samples();
        let cov = genotype_covariance(&genotypes).unwrap();
        let ts = TreeSequence::from_genotypes(genotypes, Position::new_valid(1)).unwrap();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        prop_assert_eq!(sets.num_sets(), num_samples);
        let relatedness = genotype_relatedness(&ts, &sets).unwrap();
        compare_matrices(
            "genotype covariance",
            &cov,
            "genotype relatedness",
            &relatedness,
            DEFAULT_RELATIVE_TOLERANCE,
        )
        .unwrap();
    }
}
