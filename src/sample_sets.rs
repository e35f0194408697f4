use relatts_core::NodeId;
use std::collections::HashSet;
use thiserror::Error;

/// Error type related to [``SampleSets``].
#[derive(Error, Debug, PartialEq)]
pub enum SampleSetsError {
    /// Returned when a partition contains no sets.
    #[error("No sample sets")]
    NoSampleSets,
    /// Returned when a set contains no samples.
    #[error("Empty sample set: {set}")]
    EmptySampleSet {
        /// The index of the empty set.
        set: usize,
    },
    /// Returned when a sample appears in more than one
    /// set, or more than once in the same set.
    #[error("Duplicate sample: {sample}")]
    DuplicateSample {
        /// The duplicated sample.
        sample: NodeId,
    },
    /// Returned when a sample id is NULL.
    #[error("Invalid sample")]
    InvalidSample,
}

/// Result type for operations on sample sets.
pub type SampleSetsResult<T> = std::result::Result<T, SampleSetsError>;

/// An ordered partition of samples into disjoint,
/// non-empty sets.
///
/// Statistics are reduced over per-set allele counts, so
/// the same reducers serve per-sample queries (singleton
/// sets, see [`SampleSets::singletons`]) and per-population
/// queries (one set per population).
#[derive(Clone, Debug)]
pub struct SampleSets {
    sets: Vec<Vec<NodeId>>,
    num_members: usize,
}

impl SampleSets {
    /// Create a partition from explicit member lists.
    ///
    /// # Errors
    ///
    /// * [`SampleSetsError::NoSampleSets`] for an empty partition.
    /// * [`SampleSetsError::EmptySampleSet`] for an empty member list.
    /// * [`SampleSetsError::InvalidSample`] for a NULL member.
    /// * [`SampleSetsError::DuplicateSample`] if any sample occurs twice.
    pub fn new(sets: Vec<Vec<NodeId>>) -> SampleSetsResult<Self> {
        if sets.is_empty() {
            return Err(SampleSetsError::NoSampleSets);
        }
        let mut seen = HashSet::new();
        let mut num_members = 0;
        for (index, set) in sets.iter().enumerate() {
            if set.is_empty() {
                return Err(SampleSetsError::EmptySampleSet { set: index });
            }
            for sample in set {
                if sample.is_null() {
                    return Err(SampleSetsError::InvalidSample);
                }
                if !seen.insert(*sample) {
                    return Err(SampleSetsError::DuplicateSample { sample: *sample });
                }
                num_members += 1;
            }
        }
        Ok(Self { sets, num_members })
    }

    /// Create the finest partition: one singleton set per sample,
    /// in the order given.
    pub fn singletons(samples: &[NodeId]) -> SampleSetsResult<Self> {
        Self::new(samples.iter().map(|s| vec![*s]).collect())
    }

    /// Number of sets in the partition.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Total number of samples across all sets.
    pub fn num_members(&self) -> usize {
        self.num_members
    }

    /// Return the member lists.
    pub fn sets(&self) -> &[Vec<NodeId>] {
        &self.sets
    }

    /// The size of each set, as floating point weights.
    pub fn set_sizes(&self) -> Vec<f64> {
        self.sets.iter().map(|s| s.len() as f64).collect()
    }
}
