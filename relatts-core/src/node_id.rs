/// The identifier of a node in a marginal tree.
///
/// Node ids are array indexes into per-tree node data.
/// The special value [`NodeId::NULL`] marks the absence
/// of a node, e.g. the parent of a root.
///
/// ```
/// # use relatts_core::NodeId;
/// let n = NodeId::from(-1);
/// assert!(n.is_null());
/// let p = NodeId::from(7);
/// assert_eq!(p, 7); // can be compared to i32
/// assert_eq!(usize::try_from(p).unwrap(), 7);
/// ```
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, std::hash::Hash)]
pub struct NodeId(i32);

impl NodeId {
    /// NULL value for the type.
    pub const NULL: NodeId = NodeId(-1);

    /// Return `true` if `self` is [`NodeId::NULL`].
    pub fn is_null(&self) -> bool {
        self.0 < 0
    }

    /// Return the underlying value.
    pub fn into_raw(self) -> i32 {
        self.0
    }
}

impl From<i32> for NodeId {
    fn from(value: i32) -> Self {
        if value >= 0 {
            Self(value)
        } else {
            Self::NULL
        }
    }
}

impl From<NodeId> for i32 {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl TryFrom<NodeId> for usize {
    type Error = crate::Error;

    fn try_from(value: NodeId) -> Result<Self, Self::Error> {
        usize::try_from(value.0).map_err(|_| crate::Error::NodeIdError(i64::from(value.0)))
    }
}

impl TryFrom<usize> for NodeId {
    type Error = crate::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        let raw = i32::try_from(value).map_err(|_| {
            crate::Error::NodeIdError(i64::try_from(value).unwrap_or(i64::MAX))
        })?;
        Ok(Self(raw))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<i32> for NodeId {
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

impl PartialEq<NodeId> for i32 {
    fn eq(&self, other: &NodeId) -> bool {
        *self == other.0
    }
}

impl PartialOrd<i32> for NodeId {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialOrd<NodeId> for i32 {
    fn partial_cmp(&self, other: &NodeId) -> Option<std::cmp::Ordering> {
        self.partial_cmp(&other.0)
    }
}
