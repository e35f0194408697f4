//! The crate prelude
//!
//! # Example
//! ```
//! use relatts::prelude::*;
//! ```

pub use crate::covariance::*;
pub use crate::genotypes::*;
pub use crate::relatedness::*;
pub use crate::sample_sets::*;
pub use crate::stats::*;
pub use crate::trees::*;
pub use crate::verify::*;
pub use relatts_core::NodeId;
pub use relatts_core::Position;
pub use relatts_core::Time;
