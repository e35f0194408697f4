//! Cross-checks between independently derived reduction paths.
//!
//! Every statistic here can be computed at least two ways; these
//! helpers hold the ways to the same numbers. Failures are final:
//! a divergence invalidates the whole result, so it surfaces as an
//! error naming both paths and the first offending cell, never as
//! a partial answer.

use crate::covariance::{genotype_covariance, naive_branch_covariance, naive_genotype_covariance};
use crate::genotypes::GenotypesError;
use crate::relatedness::{
    count_product_relatedness, expand_upper_triangle, genotype_relatedness,
    pairwise_genotype_relatedness, upper_triangle_indexes,
};
use crate::sample_sets::{SampleSets, SampleSetsError};
use crate::stats::{StatMode, StatsError};
use crate::trees::{TreeSequence, TreesError};
use log::{debug, warn};
use ndarray::Array2;
use thiserror::Error;

/// The default relative tolerance for path comparisons.
///
/// Chosen for floating accumulation over many sites; tighter
/// tolerances start tripping on benign summation-order noise.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-7;

/// Error type for equivalence checking.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Two reduction paths disagree beyond tolerance.
    #[error(
        "{left_name}[{row}, {col}] = {left} diverges from {right_name}[{row}, {col}] = {right}"
    )]
    Divergence {
        /// Label of the first path.
        left_name: &'static str,
        /// Label of the second path.
        right_name: &'static str,
        /// Row of the first divergent cell.
        row: usize,
        /// Column of the first divergent cell.
        col: usize,
        /// Value from the first path.
        left: f64,
        /// Value from the second path.
        right: f64,
    },
    /// A result matrix is not symmetric.
    #[error("{name} is not symmetric at [{row}, {col}]")]
    Asymmetric {
        /// Label of the offending matrix.
        name: &'static str,
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
    },
    /// Two paths produced different shapes.
    #[error("{left_name} and {right_name} differ in shape")]
    ShapeMismatch {
        /// Label of the first path.
        left_name: &'static str,
        /// Label of the second path.
        right_name: &'static str,
    },
    /// A redirection of a [``StatsError``].
    #[error("{value:?}")]
    StatsError {
        /// The redirected error
        #[from]
        value: StatsError,
    },
    /// A redirection of a [``TreesError``].
    #[error("{value:?}")]
    TreesError {
        /// The redirected error
        #[from]
        value: TreesError,
    },
    /// A redirection of a [``GenotypesError``].
    #[error("{value:?}")]
    GenotypesError {
        /// The redirected error
        #[from]
        value: GenotypesError,
    },
    /// A redirection of a [``SampleSetsError``].
    #[error("{value:?}")]
    SampleSetsError {
        /// The redirected error
        #[from]
        value: SampleSetsError,
    },
}

/// Result type for equivalence checking.
pub type VerifyResult<T> = std::result::Result<T, VerifyError>;

fn close(left: f64, right: f64, rtol: f64) -> bool {
    let scale = left.abs().max(right.abs()).max(1.0);
    (left - right).abs() <= rtol * scale
}

/// Compare two matrices elementwise within relative tolerance.
///
/// # Errors
///
/// [`VerifyError::ShapeMismatch`] or [`VerifyError::Divergence`]
/// at the first offending cell.
pub fn compare_matrices(
    left_name: &'static str,
    left: &Array2<f64>,
    right_name: &'static str,
    right: &Array2<f64>,
    rtol: f64,
) -> VerifyResult<()> {
    if left.dim() != right.dim() {
        return Err(VerifyError::ShapeMismatch {
            left_name,
            right_name,
        });
    }
    for ((row, col), &value) in left.indexed_iter() {
        let other = right[[row, col]];
        if !close(value, other, rtol) {
            warn!(
                "{} and {} diverge at ({}, {}): {} vs {}",
                left_name, right_name, row, col, value, other
            );
            return Err(VerifyError::Divergence {
                left_name,
                right_name,
                row,
                col,
                left: value,
                right: other,
            });
        }
    }
    debug!("{} and {} agree within {:e}", left_name, right_name, rtol);
    Ok(())
}

/// Require a matrix to equal its own transpose within tolerance.
pub fn check_symmetric(name: &'static str, matrix: &Array2<f64>, rtol: f64) -> VerifyResult<()> {
    for ((row, col), &value) in matrix.indexed_iter() {
        if !close(value, matrix[[col, row]], rtol) {
            return Err(VerifyError::Asymmetric { name, row, col });
        }
    }
    Ok(())
}

/// Verify that every site-mode reduction path reproduces the
/// genotype covariance matrix over singleton sample sets.
///
/// Paths compared: the vectorized covariance, the brute-force
/// covariance, the full centered relatedness matrix, the native
/// pairwise statistic (halved and reflected), and the pairwise
/// statistic with internal halving.
pub fn verify_site_paths(ts: &TreeSequence, rtol: f64) -> VerifyResult<()> {
    let reference = genotype_covariance(ts.genotype_matrix())?;
    check_symmetric("genotype covariance", &reference, rtol)?;

    let brute = naive_genotype_covariance(ts.genotype_matrix())?;
    compare_matrices(
        "genotype covariance",
        &reference,
        "naive genotype covariance",
        &brute,
        rtol,
    )?;

    let sets = SampleSets::singletons(ts.samples())?;
    let centered = genotype_relatedness(ts, &sets)?;
    check_symmetric("genotype relatedness", &centered, rtol)?;
    compare_matrices(
        "genotype covariance",
        &reference,
        "genotype relatedness",
        &centered,
        rtol,
    )?;

    let n = sets.num_sets();
    let indexes = upper_triangle_indexes(n);
    let halved: Vec<f64> = ts
        .genetic_relatedness(&sets, &indexes, StatMode::Site, false)?
        .iter()
        .map(|v| v / 2.0)
        .collect();
    let native = expand_upper_triangle(&halved, n)?;
    compare_matrices(
        "genotype covariance",
        &reference,
        "genetic relatedness",
        &native,
        rtol,
    )?;

    let pairwise =
        expand_upper_triangle(&pairwise_genotype_relatedness(ts, &sets, &indexes)?, n)?;
    compare_matrices(
        "genotype covariance",
        &reference,
        "pairwise genotype relatedness",
        &pairwise,
        rtol,
    )?;

    debug!(
        "site paths agree: {} samples, {} sites, {} trees",
        ts.num_samples(),
        ts.num_sites(),
        ts.num_trees()
    );
    Ok(())
}

/// Verify that the branch-mode count-product statistic reproduces
/// the root-to-MRCA covariance over singleton sample sets.
pub fn verify_branch_paths(ts: &TreeSequence, rtol: f64) -> VerifyResult<()> {
    let naive = naive_branch_covariance(ts)?;
    check_symmetric("naive branch covariance", &naive, rtol)?;
    let sets = SampleSets::singletons(ts.samples())?;
    let stat = count_product_relatedness(ts, &sets, StatMode::Branch)?;
    compare_matrices(
        "naive branch covariance",
        &naive,
        "branch count-product relatedness",
        &stat,
        rtol,
    )
}
