//! Relatedness statistics built on the sample-count engine.
//!
//! Three formulations of the same pairwise statistic live here,
//! on purpose: the native index-pair form
//! ([`TreeSequence::genetic_relatedness`]), the full-matrix
//! centered form ([`genotype_relatedness`]), and the index-pair
//! form carrying its normalization inside the summary
//! ([`pairwise_genotype_relatedness`]). [`crate::verify_site_paths`]
//! holds them, and the genotype covariance, to the same numbers.
//!
//! Two constants are fixed conventions, not parameters: the
//! division by two that reconciles unpolarised summaries with the
//! polarised covariance definition, and the fixation guard in
//! [`count_product_relatedness`] that zeroes sites where every
//! sample carries the derived state.

use crate::sample_sets::SampleSets;
use crate::stats::{StatFlags, StatMode, StatsError, StatsResult};
use crate::trees::TreeSequence;
use ndarray::Array2;

fn validate_indexes(indexes: &[(usize, usize)], num_sets: usize) -> StatsResult<()> {
    for &(i, j) in indexes {
        if i >= num_sets || j >= num_sets {
            return Err(StatsError::IndexPairOutOfRange { found: (i, j) });
        }
    }
    Ok(())
}

/// All index pairs `(i, j)` with `i <= j < n`, row by row.
///
/// This is the order expected by [`expand_upper_triangle`].
pub fn upper_triangle_indexes(n: usize) -> Vec<(usize, usize)> {
    let mut indexes = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            indexes.push((i, j));
        }
    }
    indexes
}

/// Expand upper-triangular values into a full symmetric matrix.
///
/// Only the upper triangle of a symmetric statistic is computed;
/// the rest follows by reflecting across the diagonal
/// (`M + Mᵗ − diag(diag(M))`).
///
/// # Errors
///
/// [`StatsError::OutputDimensionMismatch`] if `values` is not of
/// length `n(n+1)/2`.
pub fn expand_upper_triangle(values: &[f64], n: usize) -> StatsResult<Array2<f64>> {
    let expected = n * (n + 1) / 2;
    if values.len() != expected {
        return Err(StatsError::OutputDimensionMismatch {
            expected,
            found: values.len(),
        });
    }
    let mut matrix = Array2::<f64>::zeros((n, n));
    let mut next = 0;
    for i in 0..n {
        for j in i..n {
            matrix[[i, j]] = values[next];
            matrix[[j, i]] = values[next];
            next += 1;
        }
    }
    Ok(matrix)
}

fn reshape_square(values: Vec<f64>, n: usize) -> StatsResult<Array2<f64>> {
    let found = values.len();
    Array2::from_shape_vec((n, n), values).map_err(|_| StatsError::OutputDimensionMismatch {
        expected: n * n,
        found,
    })
}

impl TreeSequence {
    /// The native pairwise genetic relatedness statistic.
    ///
    /// For each requested pair `(i, j)` of sample set indices,
    /// reduces `(x[i] − mean(x))·(x[j] − mean(x))` over sites or
    /// branches, unpolarised, with `mean(x) = sum(x) / num_sets`.
    ///
    /// Being unpolarised, the result is twice the polarised
    /// covariance; callers comparing against
    /// [`crate::genotype_covariance`] divide by two.
    ///
    /// # Errors
    ///
    /// [`StatsError::IndexPairOutOfRange`] for a bad index pair,
    /// else as [`TreeSequence::sample_count_stat`].
    pub fn genetic_relatedness(
        &self,
        sample_sets: &SampleSets,
        indexes: &[(usize, usize)],
        mode: StatMode,
        span_normalise: bool,
    ) -> StatsResult<Vec<f64>> {
        let num_sets = sample_sets.num_sets();
        validate_indexes(indexes, num_sets)?;
        let pairs = indexes.to_vec();
        let scale = num_sets as f64;
        let summary = move |x: &[f64]| {
            let mean = x.iter().sum::<f64>() / scale;
            pairs
                .iter()
                .map(|&(i, j)| (x[i] - mean) * (x[j] - mean))
                .collect()
        };
        let mut flags = StatFlags::empty();
        if span_normalise {
            flags |= StatFlags::SPAN_NORMALISE;
        }
        self.sample_count_stat(sample_sets, summary, indexes.len(), mode, flags)
    }
}

/// The full relatedness matrix from centered site counts.
///
/// Reduces `(x[i] − mean(x))·(x[j] − mean(x))` over all sites for
/// every ordered pair of sets, unpolarised, then divides by two.
/// Over singleton sample sets this reproduces the genotype
/// covariance matrix exactly.
pub fn genotype_relatedness(
    ts: &TreeSequence,
    sample_sets: &SampleSets,
) -> StatsResult<Array2<f64>> {
    let n = sample_sets.num_sets();
    let scale = n as f64;
    let summary = move |x: &[f64]| {
        let mean = x.iter().sum::<f64>() / scale;
        let mut out = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                out.push((x[i] - mean) * (x[j] - mean));
            }
        }
        out
    };
    let values = ts.sample_count_stat(sample_sets, summary, n * n, StatMode::Site, StatFlags::empty())?;
    let mut matrix = reshape_square(values, n)?;
    matrix.mapv_inplace(|v| v / 2.0);
    Ok(matrix)
}

/// Index-pair relatedness with the division by two carried
/// inside the summary function.
///
/// Numerically interchangeable with halving the output of
/// [`TreeSequence::genetic_relatedness`]; kept as a separate
/// formulation for the cross-checks. Runs non-strict: the
/// summary does not map full counts to zero in general.
pub fn pairwise_genotype_relatedness(
    ts: &TreeSequence,
    sample_sets: &SampleSets,
    indexes: &[(usize, usize)],
) -> StatsResult<Vec<f64>> {
    let num_sets = sample_sets.num_sets();
    validate_indexes(indexes, num_sets)?;
    let pairs = indexes.to_vec();
    let scale = num_sets as f64;
    let summary = move |x: &[f64]| {
        let mut sum = 0.0;
        for value in x {
            sum += value;
        }
        let mean = sum / scale;
        pairs
            .iter()
            .map(|&(i, j)| (x[i] - mean) * (x[j] - mean) / 2.0)
            .collect()
    };
    ts.sample_count_stat(
        sample_sets,
        summary,
        indexes.len(),
        StatMode::Site,
        StatFlags::empty(),
    )
}

/// The count-product relatedness matrix with the fixation guard.
///
/// For every pair of sets, reduces `x[i]·x[j]` weighted by sites
/// or branches, polarised and span-normalised, zeroing any count
/// vector whose total reaches the number of samples: a site (or
/// branch) carried by every sample no longer partitions them, and
/// its term is defined away rather than left to degenerate.
///
/// In branch mode over singleton sets this reproduces the
/// root-to-MRCA covariance of
/// [`crate::naive_branch_covariance`].
pub fn count_product_relatedness(
    ts: &TreeSequence,
    sample_sets: &SampleSets,
    mode: StatMode,
) -> StatsResult<Array2<f64>> {
    let n = sample_sets.num_sets();
    let num_samples = sample_sets.num_members() as f64;
    let summary = move |x: &[f64]| {
        let total: f64 = x.iter().sum();
        let mut out = Vec::with_capacity(n * n);
        if total == num_samples {
            out.resize(n * n, 0.0);
            return out;
        }
        for i in 0..n {
            for j in 0..n {
                out.push(x[i] * x[j]);
            }
        }
        out
    };
    let values = ts.sample_count_stat(
        sample_sets,
        summary,
        n * n,
        mode,
        StatFlags::POLARISED | StatFlags::SPAN_NORMALISE | StatFlags::STRICT,
    )?;
    reshape_square(values, n)
}

#[cfg(test)]
mod test_relatedness {
    use super::*;
    use crate::covariance::genotype_covariance;
    use crate::genotypes::GenotypeMatrix;
    use approx::assert_abs_diff_eq;
    use relatts_core::Position;

    fn single_site_ts() -> TreeSequence {
        let g = GenotypeMatrix::from_rows(&[vec![0, 0, 0, 0, 1, 2]]).unwrap();
        TreeSequence::from_genotypes(g, Position::new_valid(1)).unwrap()
    }

    #[test]
    fn test_upper_triangle_roundtrip() {
        let indexes = upper_triangle_indexes(3);
        assert_eq!(indexes, vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]);
        let matrix = expand_upper_triangle(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
        assert_eq!(matrix[[0, 2]], 3.0);
        assert_eq!(matrix[[2, 0]], 3.0);
        assert_eq!(matrix[[1, 1]], 4.0);
    }

    #[test]
    fn test_expand_length_checked() {
        assert!(matches!(
            expand_upper_triangle(&[1.0, 2.0], 3),
            Err(StatsError::OutputDimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_centered_matrix_reproduces_covariance() {
        let ts = single_site_ts();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        let relatedness = genotype_relatedness(&ts, &sets).unwrap();
        let covariance = genotype_covariance(ts.genotype_matrix()).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                assert_abs_diff_eq!(
                    relatedness[[i, j]],
                    covariance[[i, j]],
                    epsilon = 1e-12
                );
            }
        }
        assert_abs_diff_eq!(relatedness[[4, 5]], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_native_pairs_match_matrix() {
        let ts = single_site_ts();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        let n = sets.num_sets();
        let indexes = upper_triangle_indexes(n);
        let halved: Vec<f64> = ts
            .genetic_relatedness(&sets, &indexes, StatMode::Site, false)
            .unwrap()
            .iter()
            .map(|v| v / 2.0)
            .collect();
        let native = expand_upper_triangle(&halved, n).unwrap();
        let matrix = genotype_relatedness(&ts, &sets).unwrap();
        for i in 0..n {
            for j in 0..n {
                assert_abs_diff_eq!(native[[i, j]], matrix[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_pairwise_carries_its_own_halving() {
        let ts = single_site_ts();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        let n = sets.num_sets();
        let indexes = upper_triangle_indexes(n);
        let pairwise =
            expand_upper_triangle(&pairwise_genotype_relatedness(&ts, &sets, &indexes).unwrap(), n)
                .unwrap();
        let matrix = genotype_relatedness(&ts, &sets).unwrap();
        for i in 0..n {
            for j in 0..n {
                assert_abs_diff_eq!(pairwise[[i, j]], matrix[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_bad_index_pair_rejected() {
        let ts = single_site_ts();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        let result = ts.genetic_relatedness(&sets, &[(0, 6)], StatMode::Site, false);
        assert_eq!(
            result.err(),
            Some(StatsError::IndexPairOutOfRange { found: (0, 6) })
        );
    }

    #[test]
    fn test_fixation_guard_zeroes_fixed_sites() {
        // second site is carried by every sample
        let g = GenotypeMatrix::from_rows(&[vec![1, 0, 0], vec![1, 1, 1]]).unwrap();
        let ts = TreeSequence::from_genotypes(g, Position::new_valid(1)).unwrap();
        let sets = SampleSets::singletons(ts.samples()).unwrap();
        let guarded = count_product_relatedness(&ts, &sets, StatMode::Site).unwrap();
        // only the first site contributes: x = (1, 0, 0)
        assert_abs_diff_eq!(guarded[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(guarded[[1, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(guarded[[0, 1]], 0.0, epsilon = 1e-12);
    }
}
