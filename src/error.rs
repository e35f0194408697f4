///! Error handling
use thiserror::Error;

/// Primary error type.
///
/// Some members of this enum implement ``From``
/// in order to redirect other error types.
#[derive(Error, Debug)]
pub enum RelattsError {
    /// A redirection of a [``crate::GenotypesError``].
    #[error("{value:?}")]
    GenotypesError {
        /// The redirected error
        #[from]
        value: crate::GenotypesError,
    },
    /// A redirection of a [``crate::SampleSetsError``].
    #[error("{value:?}")]
    SampleSetsError {
        /// The redirected error
        #[from]
        value: crate::SampleSetsError,
    },
    /// A redirection of a [``crate::TreesError``].
    #[error("{value:?}")]
    TreesError {
        /// The redirected error
        #[from]
        value: crate::TreesError,
    },
    /// A redirection of a [``crate::StatsError``].
    #[error("{value:?}")]
    StatsError {
        /// The redirected error
        #[from]
        value: crate::StatsError,
    },
    /// A redirection of a [``crate::VerifyError``].
    #[error("{value:?}")]
    VerifyError {
        /// The redirected error
        #[from]
        value: crate::VerifyError,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    fn return_trees_error(f: bool) -> Result<(), crate::TreesError> {
        if f {
            Ok(())
        } else {
            Err(crate::TreesError::NoTrees)
        }
    }

    fn redirect() -> Result<(), RelattsError> {
        return_trees_error(false)?;
        Ok(())
    }

    #[test]
    fn test_trees_error_propagation() {
        match redirect() {
            Ok(_) => panic!(),
            Err(e) => match e {
                RelattsError::TreesError { value } => {
                    assert_eq!(value.to_string(), "Tree sequence carries no trees")
                }
                _ => panic!(),
            },
        };
    }
}
