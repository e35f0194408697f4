//! Core types shared by the `relatts` statistics crates.
//!
//! The types here are thin, validated newtypes over the
//! low-level representations used throughout the workspace:
//!
//! 1. [`NodeId`] identifies a node of a marginal tree.
//!    Negative values collapse to [`NodeId::NULL`].
//! 2. [`Position`] is a non-negative integer genome coordinate.
//! 3. [`Time`] is a floating point node time.
//!    Time increases into the past, as in `tskit`:
//!    parents are older than their children.

use thiserror::Error;

mod node_id;
mod position;
pub mod prelude;
mod time;

pub use node_id::NodeId;
pub use position::Position;
pub use time::Time;

/// Error type for conversions into core newtypes.
#[derive(Error, Debug)]
pub enum Error {
    /// A negative or otherwise invalid genome position.
    #[error("{0:?}")]
    PositionError(i64),
    /// A value not representable as a [`NodeId`].
    #[error("{0:?}")]
    NodeIdError(i64),
}
