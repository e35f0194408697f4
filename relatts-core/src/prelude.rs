//! # Prelude
//!
//! Contains definitions that are useful to
//! have global
//!
//! ## Examples
//!
//! ```
//! use relatts_core::prelude::*;
//! ```

pub use crate::NodeId;
pub use crate::Position;
pub use crate::Time;
