#![warn(missing_docs)]

//! Rust library for genetic relatedness and covariance
//! statistics on tree sequence data.
//!
//! # Overview
//!
//! The input is an immutable, fully materialized view of a tree
//! sequence: a genotype matrix, an ordered sample list, and
//! (for branch statistics) the marginal trees. This library
//! computes pairwise relatedness/covariance over that view by
//! several independently derived reduction paths and can hold
//! the paths to the same numbers.
//!
//! The model differs from `tskit` in some important ways:
//!
//! 1. There are no node/edge/site/mutation tables and no
//!    succinct encoding. An external collaborator owns those
//!    and hands over materialized arrays; nothing here mutates,
//!    iterates, or seeks.
//! 2. Genomic locations are integers (see [``Position``]).
//!    In `tskit`, they are C `double`, the equivalent of [``f64``].
//! 3. Site statistics reduce derived-allele *dosages*, which for
//!    0/1 genotype data coincide with carrying-sample counts.
//!
//! # Entry points
//!
//! * [`genotype_covariance`] — the vectorized covariance reducer.
//! * [`TreeSequence::sample_count_stat`] — the generic
//!   summary-function engine.
//! * [`TreeSequence::genetic_relatedness`],
//!   [`genotype_relatedness`], [`count_product_relatedness`] —
//!   the concrete statistics.
//! * [`verify_site_paths`] / [`verify_branch_paths`] — the
//!   equivalence checks.

pub use relatts_core::NodeId;
pub use relatts_core::Position;
pub use relatts_core::Time;

mod covariance;
mod error;
mod genotypes;
pub mod prelude;
mod relatedness;
mod sample_sets;
mod stats;
mod trees;
mod verify;

pub use covariance::*;
pub use error::RelattsError;
pub use genotypes::*;
pub use relatedness::*;
pub use sample_sets::*;
pub use stats::*;
pub use trees::*;
pub use verify::*;

/// Get the relatts version number.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
