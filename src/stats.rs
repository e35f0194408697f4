//! The generic sample-count statistic engine.
//!
//! A statistic is defined by a summary function over per-set
//! allele counts. The engine walks sites (or branches), builds
//! the count vector for each, applies the summary, and reduces
//! by summation. Every concrete relatedness statistic in this
//! crate is expressed through this one entry point,
//! [`TreeSequence::sample_count_stat`].

use crate::genotypes::GenotypesError;
use crate::sample_sets::{SampleSets, SampleSetsError};
use crate::trees::{TreeSequence, TreesError};
use bitflags::bitflags;
use log::trace;
use relatts_core::NodeId;
use std::collections::HashMap;
use thiserror::Error;

bitflags! {
    /// Options modifying [`TreeSequence::sample_count_stat`].
    #[derive(Default)]
    pub struct StatFlags: u32 {
        /// Divide the reduced statistic by the sequence length.
        const SPAN_NORMALISE = 1 << 0;
        /// Apply the summary function to derived counts only.
        ///
        /// Without this flag the ancestral complement of every
        /// count vector contributes as well, which doubles
        /// symmetric summaries; the relatedness statistics
        /// reconcile that with a fixed division by two.
        const POLARISED = 1 << 1;
        /// Require the summary function to map the all-zero
        /// count vector, and the full set sizes, to zero.
        const STRICT = 1 << 2;
    }
}

/// Selects the weighting scheme of a statistic.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StatMode {
    /// Sum over sites of the genotype matrix.
    Site,
    /// Sum over branches, weighted by branch length and
    /// tree span.
    Branch,
}

/// Error type related to sample count statistics.
#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    /// Returned when the summary function output length
    /// does not match the requested output dimension.
    #[error("Summary output length {found} does not match output dimension {expected}")]
    OutputDimensionMismatch {
        /// The requested dimension.
        expected: usize,
        /// The observed output length.
        found: usize,
    },
    /// Returned under [`StatFlags::STRICT`] when the summary
    /// function maps the zero vector or the set sizes to a
    /// nonzero value.
    #[error("Summary function must map zero counts and full counts to zero")]
    StrictViolation,
    /// Returned when an index pair refers to a sample set
    /// beyond the partition.
    #[error("Sample set index pair out of range: {found:?}")]
    IndexPairOutOfRange {
        /// The offending `(i, j)`.
        found: (usize, usize),
    },
    /// Returned when a sample set member is not in the
    /// tree sequence sample list.
    #[error("Sample {sample} is not in the sample list")]
    UnknownSample {
        /// The unknown sample.
        sample: NodeId,
    },
    /// A redirection of a [``SampleSetsError``].
    #[error("{value:?}")]
    SampleSetsError {
        /// The redirected error
        #[from]
        value: SampleSetsError,
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
}

/// Result type for sample count statistics.
pub type StatsResult<T> = std::result::Result<T, StatsError>;

fn accumulate(total: &mut [f64], values: &[f64], weight: f64) -> StatsResult<()> {
    if values.len() != total.len() {
        return Err(StatsError::OutputDimensionMismatch {
            expected: total.len(),
            found: values.len(),
        });
    }
    for (t, v) in total.iter_mut().zip(values.iter()) {
        *t += weight * v;
    }
    Ok(())
}

fn is_zero(values: &[f64]) -> bool {
    values.iter().all(|v| v.abs() <= 1e-9)
}

impl TreeSequence {
    /// Map each genotype column to the index of the sample set
    /// containing it, if any.
    fn column_assignment(&self, sample_sets: &SampleSets) -> StatsResult<Vec<Option<usize>>> {
        let column_of: HashMap<NodeId, usize> = self
            .samples()
            .iter()
            .enumerate()
            .map(|(column, sample)| (*sample, column))
            .collect();
        let mut assignment = vec![None; self.num_samples()];
        for (set, members) in sample_sets.sets().iter().enumerate() {
            for sample in members {
                match column_of.get(sample) {
                    Some(&column) => assignment[column] = Some(set),
                    None => return Err(StatsError::UnknownSample { sample: *sample }),
                }
            }
        }
        Ok(assignment)
    }

    fn site_count_stat<F>(
        &self,
        sample_sets: &SampleSets,
        summary: &F,
        total: &mut [f64],
        flags: StatFlags,
    ) -> StatsResult<()>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let assignment = self.column_assignment(sample_sets)?;
        let sizes = sample_sets.set_sizes();
        let polarised = flags.contains(StatFlags::POLARISED);
        let num_sets = sample_sets.num_sets();
        let mut counts = vec![0.0; num_sets];
        let mut complement = vec![0.0; num_sets];
        for (site, row) in self.genotype_matrix().as_array().outer_iter().enumerate() {
            counts.fill(0.0);
            let mut max_allele = 0_i32;
            for (column, &value) in row.iter().enumerate() {
                if value < 0 {
                    return Err(StatsError::GenotypesError {
                        value: GenotypesError::MissingGenotypes {
                            site,
                            sample: column,
                        },
                    });
                }
                if let Some(set) = assignment[column] {
                    counts[set] += f64::from(value);
                    max_allele = max_allele.max(value);
                }
            }
            accumulate(total, &summary(&counts), 1.0)?;
            if !polarised {
                // the ancestral complement of the count vector
                for (k, x) in complement.iter_mut().enumerate() {
                    *x = sizes[k] * f64::from(max_allele) - counts[k];
                }
                accumulate(total, &summary(&complement), 1.0)?;
            }
        }
        trace!(
            "site statistic reduced over {} sites, {} sets",
            self.num_sites(),
            num_sets
        );
        Ok(())
    }

    fn branch_count_stat<F>(
        &self,
        sample_sets: &SampleSets,
        summary: &F,
        total: &mut [f64],
        flags: StatFlags,
    ) -> StatsResult<()>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        if self.trees().is_empty() {
            return Err(StatsError::TreesError {
                value: TreesError::NoTrees,
            });
        }
        // membership validation only; branch counts key off node ids
        self.column_assignment(sample_sets)?;
        let sizes = sample_sets.set_sizes();
        let polarised = flags.contains(StatFlags::POLARISED);
        let num_sets = sample_sets.num_sets();
        let mut complement = vec![0.0; num_sets];
        for tree in self.trees() {
            let num_nodes = tree.num_nodes();
            // per-node sample set counts, flattened (node, set)
            let mut counts = vec![0.0; num_nodes * num_sets];
            for (set, members) in sample_sets.sets().iter().enumerate() {
                for sample in members {
                    for node in tree.parents(*sample)? {
                        counts[node.into_raw() as usize * num_sets + set] += 1.0;
                    }
                }
            }
            let span = tree.span() as f64;
            for node in 0..num_nodes {
                let u = NodeId::try_from(node).map_err(|_| StatsError::TreesError {
                    value: TreesError::NodeIdOutOfRange,
                })?;
                let parent = tree.parent(u)?;
                if parent.is_null() {
                    continue;
                }
                let branch_length = f64::from(tree.time(parent)?) - f64::from(tree.time(u)?);
                let weight = branch_length * span;
                let x = &counts[node * num_sets..(node + 1) * num_sets];
                accumulate(total, &summary(x), weight)?;
                if !polarised {
                    for (k, value) in complement.iter_mut().enumerate() {
                        *value = sizes[k] - x[k];
                    }
                    accumulate(total, &summary(&complement), weight)?;
                }
            }
        }
        trace!(
            "branch statistic reduced over {} trees, {} sets",
            self.num_trees(),
            num_sets
        );
        Ok(())
    }

    /// Reduce a summary function of per-set allele counts over
    /// the tree sequence.
    ///
    /// # Parameters
    ///
    /// * `sample_sets`: the partition the counts are taken over.
    /// * `summary`: a pure function mapping a count vector of
    ///   length `sample_sets.num_sets()` to `output_dim` values.
    ///   Only counts may matter to it, never which samples
    ///   produced them.
    /// * `output_dim`: the length of the result.
    /// * `mode`: site-based or branch-based weighting.
    /// * `flags`: see [`StatFlags`].
    ///
    /// In site mode the count vector of a site holds the summed
    /// derived-allele dosage per set; for 0/1 genotypes this is
    /// the number of carrying samples. In branch mode the count
    /// vector of a branch holds the number of set members in the
    /// subtree below it, and contributions are weighted by branch
    /// length and tree span.
    ///
    /// # Errors
    ///
    /// * [`StatsError::OutputDimensionMismatch`] if `summary`
    ///   returns the wrong length.
    /// * [`StatsError::StrictViolation`] under [`StatFlags::STRICT`].
    /// * [`StatsError::UnknownSample`] if a set member is not a
    ///   sample of this tree sequence.
    /// * [`GenotypesError::MissingGenotypes`] (redirected) on
    ///   missing data in site mode.
    /// * [`TreesError::NoTrees`] (redirected) in branch mode on a
    ///   site-only tree sequence.
    pub fn sample_count_stat<F>(
        &self,
        sample_sets: &SampleSets,
        summary: F,
        output_dim: usize,
        mode: StatMode,
        flags: StatFlags,
    ) -> StatsResult<Vec<f64>>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        if flags.contains(StatFlags::STRICT) {
            let zeros = vec![0.0; sample_sets.num_sets()];
            if !is_zero(&summary(&zeros)) || !is_zero(&summary(&sample_sets.set_sizes())) {
                return Err(StatsError::StrictViolation);
            }
        }
        let mut total = vec![0.0; output_dim];
        match mode {
            StatMode::Site => self.site_count_stat(sample_sets, &summary, &mut total, flags)?,
            StatMode::Branch => self.branch_count_stat(sample_sets, &summary, &mut total, flags)?,
        }
        if flags.contains(StatFlags::SPAN_NORMALISE) {
            let length = f64::from(self.sequence_length());
            for value in total.iter_mut() {
                *value /= length;
            }
        }
        Ok(total)
    }
}
