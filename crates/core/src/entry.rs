//! Record slots.
//!
//! An `Entry` is what a record column holds while a row flows through the operator
//! pipeline: either a constant value or a reference to a graph entity. Entity
//! references must be dereferenced through the runtime context before they can take
//! part in arithmetic.

use crate::field_data::FieldData;
use alloc::vec::Vec;
use core::fmt;

/// Identifier of a vertex in the graph store.
pub type NodeId = i64;

/// Identifier of an edge: its endpoints plus the edge id between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId {
    pub src: NodeId,
    pub dst: NodeId,
    pub id: i64,
}

impl EdgeId {
    pub fn new(src: NodeId, dst: NodeId, id: i64) -> Self {
        Self { src, dst, id }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.src, self.dst, self.id)
    }
}

/// A single record slot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Entry {
    /// A value computed by an expression or bound as a literal
    Constant(FieldData),
    /// Live reference to a vertex; only valid while its iterator is positioned
    Node(NodeId),
    /// Live reference to an edge
    Relationship(EdgeId),
    /// Edges matched by a variable-length pattern, in path order
    VarLenRelationship(Vec<EdgeId>),
    /// Materialized vertex that outlives the iterator it came from
    NodeSnapshot(NodeId),
    /// Materialized edge
    RelpSnapshot(EdgeId),
    /// Slot not bound yet
    #[default]
    Unknown,
}

impl Entry {
    /// Returns a Null constant.
    #[inline]
    pub fn null() -> Self {
        Entry::Constant(FieldData::null())
    }

    /// Wraps anything convertible into `FieldData` as a constant.
    pub fn constant(v: impl Into<FieldData>) -> Self {
        Entry::Constant(v.into())
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Entry::Constant(_))
    }

    /// Returns true for a Null constant.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Entry::Constant(c) if c.is_null())
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Entry::Unknown)
    }

    /// Returns true for live or snapshotted vertices.
    pub fn is_node(&self) -> bool {
        matches!(self, Entry::Node(_) | Entry::NodeSnapshot(_))
    }

    /// Returns true for live or snapshotted edges.
    pub fn is_relationship(&self) -> bool {
        matches!(self, Entry::Relationship(_) | Entry::RelpSnapshot(_))
    }

    /// Returns true for any graph-entity variant.
    pub fn is_entity(&self) -> bool {
        self.is_node() || self.is_relationship() || matches!(self, Entry::VarLenRelationship(_))
    }

    pub fn as_constant(&self) -> Option<&FieldData> {
        match self {
            Entry::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_constant(self) -> Option<FieldData> {
        match self {
            Entry::Constant(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the vertex id for node entries.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Entry::Node(id) | Entry::NodeSnapshot(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the edge id for relationship entries.
    pub fn edge_id(&self) -> Option<EdgeId> {
        match self {
            Entry::Relationship(e) | Entry::RelpSnapshot(e) => Some(*e),
            _ => None,
        }
    }

    /// Converts live entity references into snapshots so the value survives
    /// iterator invalidation. Constants and snapshots are returned unchanged.
    pub fn snapshot(&self) -> Entry {
        match self {
            Entry::Node(id) => Entry::NodeSnapshot(*id),
            Entry::Relationship(e) => Entry::RelpSnapshot(*e),
            other => other.clone(),
        }
    }

    /// Short kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entry::Constant(c) => c.type_name(),
            Entry::Node(_) => "Node",
            Entry::Relationship(_) => "Relationship",
            Entry::VarLenRelationship(_) => "VarLenRelationship",
            Entry::NodeSnapshot(_) => "NodeSnapshot",
            Entry::RelpSnapshot(_) => "RelpSnapshot",
            Entry::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Constant(c) => write!(f, "{}", c),
            Entry::Node(id) | Entry::NodeSnapshot(id) => write!(f, "V[{}]", id),
            Entry::Relationship(e) | Entry::RelpSnapshot(e) => write!(f, "E[{}]", e),
            Entry::VarLenRelationship(edges) => {
                write!(f, "[")?;
                for (i, e) in edges.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "E[{}]", e)?;
                }
                write!(f, "]")
            }
            Entry::Unknown => write!(f, "__UNKNOWN__"),
        }
    }
}

impl From<FieldData> for Entry {
    fn from(v: FieldData) -> Self {
        Entry::Constant(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_display() {
        assert_eq!(Entry::Node(7).to_string(), "V[7]");
        assert_eq!(Entry::Relationship(EdgeId::new(1, 2, 0)).to_string(), "E[1_2_0]");
        assert_eq!(Entry::constant(5i64).to_string(), "5");
        assert_eq!(
            Entry::VarLenRelationship(vec![EdgeId::new(1, 2, 0), EdgeId::new(2, 3, 1)]).to_string(),
            "[E[1_2_0],E[2_3_1]]"
        );
    }

    #[test]
    fn test_snapshot() {
        assert_eq!(Entry::Node(3).snapshot(), Entry::NodeSnapshot(3));
        let e = EdgeId::new(1, 2, 9);
        assert_eq!(Entry::Relationship(e).snapshot(), Entry::RelpSnapshot(e));
        assert_eq!(Entry::constant(1i64).snapshot(), Entry::constant(1i64));
        // snapshot keeps the same identity and display
        assert_eq!(Entry::Node(3).snapshot().to_string(), "V[3]");
        assert_eq!(Entry::NodeSnapshot(3).node_id(), Some(3));
    }

    #[test]
    fn test_null_and_kinds() {
        assert!(Entry::null().is_null());
        assert!(!Entry::Unknown.is_null());
        assert!(Entry::Unknown.is_unknown());
        assert!(Entry::NodeSnapshot(1).is_entity());
        assert!(!Entry::null().is_entity());
        assert_eq!(Entry::default(), Entry::Unknown);
    }
}
