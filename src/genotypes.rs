use ndarray::{Array2, ArrayView1};
use thiserror::Error;

/// The marker value for missing genotype data.
pub const MISSING_GENOTYPE: i32 = -1;

/// Error type related to [``GenotypeMatrix``].
#[derive(Error, Debug, PartialEq)]
pub enum GenotypesError {
    /// Returned when a statistic is requested for a
    /// matrix with zero sites or zero samples.
    #[error("Empty genotype matrix")]
    EmptyGenotypeMatrix,
    /// Returned when a genotype value below
    /// [``MISSING_GENOTYPE``] is encountered.
    #[error("Invalid genotype value at site {site}, sample {sample}: {found}")]
    InvalidGenotype {
        /// The site (row) of the invalid value.
        site: usize,
        /// The sample (column) of the invalid value.
        sample: usize,
        /// The invalid value.
        found: i32,
    },
    /// Returned when row input has inconsistent lengths.
    #[error("Ragged genotype rows: expected {expected} samples, found {found}")]
    RaggedGenotypeRows {
        /// The expected row length.
        expected: usize,
        /// The offending row length.
        found: usize,
    },
    /// Returned by statistics that cannot be computed
    /// in the presence of missing data.
    #[error("Missing genotype data is not supported: site {site}, sample {sample}")]
    MissingGenotypes {
        /// The site (row) of the missing value.
        site: usize,
        /// The sample (column) of the missing value.
        sample: usize,
    },
}

/// Result type for operations on genotype matrices.
pub type GenotypesResult<T> = std::result::Result<T, GenotypesError>;

/// An immutable genotype matrix with shape (sites, samples).
///
/// Values are 0 for the ancestral state, positive for the
/// derived-allele dosage, and [``MISSING_GENOTYPE``] for
/// missing data. The matrix is produced by an external
/// collaborator and is never mutated here.
#[derive(Clone, Debug, PartialEq)]
pub struct GenotypeMatrix {
    data: Array2<i32>,
}

impl GenotypeMatrix {
    /// Create a new genotype matrix.
    ///
    /// # Errors
    ///
    /// [`GenotypesError::InvalidGenotype`] if any value is
    /// below [``MISSING_GENOTYPE``].
    pub fn new(data: Array2<i32>) -> GenotypesResult<Self> {
        for ((site, sample), &value) in data.indexed_iter() {
            if value < MISSING_GENOTYPE {
                return Err(GenotypesError::InvalidGenotype {
                    site,
                    sample,
                    found: value,
                });
            }
        }
        Ok(Self { data })
    }

    /// Create a genotype matrix from one row per site.
    ///
    /// # Errors
    ///
    /// [`GenotypesError::RaggedGenotypeRows`] if the rows differ
    /// in length, else as [`GenotypeMatrix::new`].
    pub fn from_rows(rows: &[Vec<i32>]) -> GenotypesResult<Self> {
        let num_samples = rows.first().map_or(0, |r| r.len());
        let mut flat = Vec::with_capacity(rows.len() * num_samples);
        for row in rows {
            if row.len() != num_samples {
                return Err(GenotypesError::RaggedGenotypeRows {
                    expected: num_samples,
                    found: row.len(),
                });
            }
            flat.extend_from_slice(row);
        }
        let data = Array2::from_shape_vec((rows.len(), num_samples), flat).map_err(|_| {
            GenotypesError::RaggedGenotypeRows {
                expected: num_samples,
                found: 0,
            }
        })?;
        Self::new(data)
    }

    /// Number of sites (rows).
    pub fn num_sites(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    pub fn num_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Return the genotypes of one site.
    pub fn site(&self, site: usize) -> Option<ArrayView1<'_, i32>> {
        if site < self.num_sites() {
            Some(self.data.row(site))
        } else {
            None
        }
    }

    /// Return the underlying array.
    pub fn as_array(&self) -> &Array2<i32> {
        &self.data
    }

    /// The location of the first missing value, if any.
    pub fn first_missing(&self) -> Option<(usize, usize)> {
        self.data
            .indexed_iter()
            .find(|(_, &value)| value == MISSING_GENOTYPE)
            .map(|(index, _)| index)
    }
}
