use crate::genotypes::GenotypeMatrix;
use relatts_core::{NodeId, Position, Time};
use std::collections::HashSet;
use thiserror::Error;

/// Error type related to [``Tree``] and [``TreeSequence``].
#[derive(Error, Debug, PartialEq)]
pub enum TreesError {
    /// Returned when a [`NodeId`] is not present
    /// in a [`Tree`].
    #[error("Node ID out of range")]
    NodeIdOutOfRange,
    /// Returned if a tree sequence is initialized
    /// with no samples.
    #[error("No samples found")]
    NoSamples,
    /// Returned if sample lists contain duplicate [`NodeId`].
    #[error("Duplicate samples")]
    DuplicateSamples,
    /// Returned if a sample list contains [`NodeId::NULL`].
    #[error("Invalid samples")]
    InvalidSamples,
    /// Returned when parent and time arrays differ in length.
    #[error("Topology arrays differ in length")]
    TopologyLengthMismatch,
    /// Returned when a tree interval is empty or inverted.
    #[error("Invalid tree interval: {found:?}")]
    InvalidTreeInterval {
        /// The invalid `(left, right)`.
        found: (Position, Position),
    },
    /// Returned when a child is not strictly younger
    /// than its parent.
    #[error("Node time order violation")]
    NodeTimesUnordered,
    /// Returned when a node time is not finite.
    #[error("Invalid node time")]
    InvalidNodeTime,
    /// Returned by statistics requiring a single root.
    #[error("Trees must have one root (found {found})")]
    MultipleRoots {
        /// The number of roots found.
        found: usize,
    },
    /// Returned by statistics that do not support
    /// nodes with exactly one child.
    #[error("Unary nodes are not supported (node {node})")]
    UnaryNode {
        /// The offending node.
        node: NodeId,
    },
    /// Returned by branch statistics on a tree sequence
    /// built without trees.
    #[error("Tree sequence carries no trees")]
    NoTrees,
    /// Returned when trees do not tile the genome
    /// contiguously from zero to the sequence length.
    #[error("Trees do not tile the genome")]
    TreesNotContiguous,
    /// Returned when the genotype matrix width does not
    /// match the sample list.
    #[error("Genotype matrix has {found} columns for {expected} samples")]
    GenotypeDimensionMismatch {
        /// The number of samples.
        expected: usize,
        /// The number of genotype columns.
        found: usize,
    },
}

/// Result type for operations on trees and tree sequences.
pub type TreesResult<T> = std::result::Result<T, TreesError>;

/// A materialized marginal tree over the half-open genome
/// interval `[left, right)`.
///
/// A tree is described by one parent and one time entry per
/// node. Roots carry [`NodeId::NULL`] parents. Time increases
/// into the past: every child is strictly younger than its
/// parent, which also rules out topology cycles.
///
/// Trees are immutable once built. There is no incremental
/// edge insertion/removal here; an external collaborator owns
/// the succinct encoding and hands over materialized trees.
pub struct Tree {
    parent: Vec<NodeId>,
    time: Vec<Time>,
    num_children: Vec<u32>,
    left: Position,
    right: Position,
}

impl Tree {
    /// Create a tree from parent and time arrays.
    ///
    /// # Parameters
    ///
    /// * `parent`: the parent of each node, [`NodeId::NULL`] for roots.
    /// * `time`: the time of each node.
    /// * `left`, `right`: the genome interval covered.
    ///
    /// # Errors
    ///
    /// * [`TreesError::TopologyLengthMismatch`] if the arrays differ in length.
    /// * [`TreesError::InvalidTreeInterval`] if `right <= left`.
    /// * [`TreesError::InvalidNodeTime`] for non-finite times.
    /// * [`TreesError::NodeIdOutOfRange`] for a parent beyond the node count.
    /// * [`TreesError::NodeTimesUnordered`] if a child is not strictly
    ///   younger than its parent.
    pub fn new(
        parent: Vec<NodeId>,
        time: Vec<Time>,
        left: Position,
        right: Position,
    ) -> TreesResult<Self> {
        if parent.len() != time.len() {
            return Err(TreesError::TopologyLengthMismatch);
        }
        if right <= left {
            return Err(TreesError::InvalidTreeInterval {
                found: (left, right),
            });
        }
        for t in &time {
            if !t.is_finite() {
                return Err(TreesError::InvalidNodeTime);
            }
        }
        let mut num_children = vec![0_u32; parent.len()];
        for (child, p) in parent.iter().enumerate() {
            if p.is_null() {
                continue;
            }
            let pi = usize::try_from(*p).map_err(|_| TreesError::NodeIdOutOfRange)?;
            if pi >= parent.len() {
                return Err(TreesError::NodeIdOutOfRange);
            }
            if time[child] >= time[pi] {
                return Err(TreesError::NodeTimesUnordered);
            }
            num_children[pi] += 1;
        }
        Ok(Self {
            parent,
            time,
            num_children,
            left,
            right,
        })
    }

    fn index<N: Into<NodeId>>(&self, u: N) -> TreesResult<usize> {
        let i = usize::try_from(u.into()).map_err(|_| TreesError::NodeIdOutOfRange)?;
        if i >= self.parent.len() {
            return Err(TreesError::NodeIdOutOfRange);
        }
        Ok(i)
    }

    /// The number of nodes in the tree.
    pub fn num_nodes(&self) -> usize {
        self.parent.len()
    }

    /// Return the parent of node `u`.
    pub fn parent<N: Into<NodeId> + Copy>(&self, u: N) -> TreesResult<NodeId> {
        Ok(self.parent[self.index(u)?])
    }

    /// Return the time of node `u`.
    pub fn time<N: Into<NodeId> + Copy>(&self, u: N) -> TreesResult<Time> {
        Ok(self.time[self.index(u)?])
    }

    /// Return the number of children of node `u`.
    pub fn num_children<N: Into<NodeId> + Copy>(&self, u: N) -> TreesResult<usize> {
        Ok(self.num_children[self.index(u)?] as usize)
    }

    /// Return the length of this tree along the genome.
    pub fn span(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    /// Return the `[left, right)` [`Position`] for
    /// which this tree is the genealogy.
    pub fn range(&self) -> (Position, Position) {
        (self.left, self.right)
    }

    /// Return an [`Iterator`] from node `u` to the top of its
    /// ancestry chain, starting at `u` itself.
    ///
    /// # Errors
    ///
    /// [`TreesError::NodeIdOutOfRange`] if `u` is out of range.
    pub fn parents<N: Into<NodeId> + Copy>(
        &self,
        u: N,
    ) -> TreesResult<impl Iterator<Item = NodeId> + '_> {
        self.index(u)?;
        Ok(AncestorsIterator {
            tree: self,
            next_node: u.into(),
        })
    }

    /// Return the single root of the ancestry of `samples`.
    ///
    /// The root is the shared terminus of every sample's
    /// parent chain. Nodes unreachable from any sample are
    /// ignored.
    ///
    /// # Errors
    ///
    /// * [`TreesError::NoSamples`] for an empty sample list.
    /// * [`TreesError::MultipleRoots`] if the chains end in
    ///   more than one node.
    pub fn root(&self, samples: &[NodeId]) -> TreesResult<NodeId> {
        if samples.is_empty() {
            return Err(TreesError::NoSamples);
        }
        let mut roots: Vec<NodeId> = vec![];
        for sample in samples {
            let mut terminus = *sample;
            for ancestor in self.parents(*sample)? {
                terminus = ancestor;
            }
            if !roots.contains(&terminus) {
                roots.push(terminus);
            }
        }
        match roots.len() {
            1 => Ok(roots[0]),
            found => Err(TreesError::MultipleRoots { found }),
        }
    }

    /// Return the most recent common ancestor of `u` and `v`,
    /// or [`NodeId::NULL`] if they share none.
    ///
    /// # Errors
    ///
    /// [`TreesError::NodeIdOutOfRange`] if either node is out of range.
    pub fn mrca<N: Into<NodeId> + Copy>(&self, u: N, v: N) -> TreesResult<NodeId> {
        let mut on_path = vec![false; self.num_nodes()];
        for ancestor in self.parents(u)? {
            on_path[ancestor.into_raw() as usize] = true;
        }
        for ancestor in self.parents(v)? {
            if on_path[ancestor.into_raw() as usize] {
                return Ok(ancestor);
            }
        }
        Ok(NodeId::NULL)
    }
}

struct AncestorsIterator<'tree> {
    tree: &'tree Tree,
    next_node: NodeId,
}

impl Iterator for AncestorsIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next_node.is_null() {
            None
        } else {
            let current = self.next_node;
            self.next_node = self.tree.parent[current.into_raw() as usize];
            Some(current)
        }
    }
}

/// An immutable, fully materialized view of a tree sequence:
/// marginal trees, a genotype matrix, and an ordered sample
/// list over a genome of known length.
///
/// This type is the fixed call surface into the statistics:
/// [`TreeSequence::samples`], [`TreeSequence::genotype_matrix`],
/// [`TreeSequence::sample_count_stat`] and
/// [`TreeSequence::genetic_relatedness`].
/// It does not own node/edge/site/mutation tables and offers
/// no mutation, iteration, or seeking.
pub struct TreeSequence {
    trees: Vec<Tree>,
    genotypes: GenotypeMatrix,
    samples: Vec<NodeId>,
    sequence_length: Position,
}

impl TreeSequence {
    fn validate_samples(samples: &[NodeId]) -> TreesResult<()> {
        if samples.is_empty() {
            return Err(TreesError::NoSamples);
        }
        let mut seen = HashSet::new();
        for s in samples {
            if s.is_null() {
                return Err(TreesError::InvalidSamples);
            }
            if !seen.insert(*s) {
                return Err(TreesError::DuplicateSamples);
            }
        }
        Ok(())
    }

    /// Create a new tree sequence.
    ///
    /// # Parameters
    ///
    /// * `trees`: the marginal trees, ordered left to right.
    /// * `genotypes`: one column per entry of `samples`, in order.
    /// * `samples`: the ordered sample nodes.
    /// * `sequence_length`: the genome length.
    ///
    /// # Errors
    ///
    /// * [`TreesError::NoSamples`], [`TreesError::InvalidSamples`],
    ///   [`TreesError::DuplicateSamples`] for a bad sample list.
    /// * [`TreesError::GenotypeDimensionMismatch`] if the matrix
    ///   width differs from the sample count.
    /// * [`TreesError::NoTrees`] for an empty tree list.
    /// * [`TreesError::TreesNotContiguous`] or
    ///   [`TreesError::InvalidTreeInterval`] if the trees do not
    ///   tile `[0, sequence_length)` in order.
    /// * [`TreesError::NodeIdOutOfRange`] if a sample is missing
    ///   from some tree.
    pub fn new(
        trees: Vec<Tree>,
        genotypes: GenotypeMatrix,
        samples: Vec<NodeId>,
        sequence_length: Position,
    ) -> TreesResult<Self> {
        Self::validate_samples(&samples)?;
        if genotypes.num_samples() != samples.len() {
            return Err(TreesError::GenotypeDimensionMismatch {
                expected: samples.len(),
                found: genotypes.num_samples(),
            });
        }
        if trees.is_empty() {
            return Err(TreesError::NoTrees);
        }
        let mut expected_left = Position::new_valid(0);
        for tree in &trees {
            let (left, right) = tree.range();
            if left != expected_left {
                return Err(TreesError::TreesNotContiguous);
            }
            if right > sequence_length {
                return Err(TreesError::InvalidTreeInterval {
                    found: (left, right),
                });
            }
            for s in &samples {
                tree.time(*s)?;
            }
            expected_left = right;
        }
        if expected_left != sequence_length {
            return Err(TreesError::TreesNotContiguous);
        }
        Ok(Self {
            trees,
            genotypes,
            samples,
            sequence_length,
        })
    }

    /// Create a site-only tree sequence from a genotype matrix.
    ///
    /// Samples are numbered `0..num_samples` in column order.
    /// Branch-mode statistics on the result fail with
    /// [`TreesError::NoTrees`].
    pub fn from_genotypes(
        genotypes: GenotypeMatrix,
        sequence_length: Position,
    ) -> TreesResult<Self> {
        if genotypes.num_samples() == 0 {
            return Err(TreesError::NoSamples);
        }
        let samples = (0..genotypes.num_samples())
            .map(|i| NodeId::try_from(i).map_err(|_| TreesError::NodeIdOutOfRange))
            .collect::<TreesResult<Vec<_>>>()?;
        Ok(Self {
            trees: vec![],
            genotypes,
            samples,
            sequence_length,
        })
    }

    /// The ordered sample nodes.
    pub fn samples(&self) -> &[NodeId] {
        &self.samples
    }

    /// The genotype matrix, one column per sample.
    pub fn genotype_matrix(&self) -> &GenotypeMatrix {
        &self.genotypes
    }

    /// The marginal trees, ordered left to right.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// The number of samples.
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    /// The number of sites in the genotype matrix.
    pub fn num_sites(&self) -> usize {
        self.genotypes.num_sites()
    }

    /// The number of marginal trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// The genome length.
    pub fn sequence_length(&self) -> Position {
        self.sequence_length
    }
}
