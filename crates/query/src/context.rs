//! Runtime context for expression evaluation.
//!
//! The evaluator never touches storage directly. Entity fields, labels and the
//! validity of entity references are read through `GraphAccess`; functions that are
//! not built in are forwarded to an optional `PluginHost`.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{EdgeId, Entry, Error, FieldData, NodeId, Result};

/// Read access to graph entities referenced from records.
pub trait GraphAccess {
    /// Returns a property of a node or relationship, Null if absent or stale.
    fn entity_field(&self, entity: &Entry, field: &str) -> Result<FieldData>;

    /// Returns true if the node carries the label.
    fn has_label(&self, entity: &Entry, label: &str) -> Result<bool>;

    /// Returns the labels of a node.
    fn labels(&self, entity: &Entry) -> Result<Vec<String>>;

    /// Returns the type of a relationship.
    fn relationship_type(&self, entity: &Entry) -> Result<String>;

    /// Returns all properties of a node or relationship.
    fn properties(&self, entity: &Entry) -> Result<BTreeMap<String, FieldData>>;

    /// Returns true if the entity reference still points at a live graph element.
    fn is_valid(&self, entity: &Entry) -> bool;
}

/// User-defined function dispatch.
pub trait PluginHost {
    /// Calls plugin `name`. Returns `Ok(None)` if no such plugin is registered.
    fn call(&self, name: &str, args: &[FieldData]) -> Result<Option<FieldData>>;
}

/// Everything an evaluator needs beyond the record itself.
pub struct RuntimeContext<'a> {
    graph: &'a dyn GraphAccess,
    plugins: Option<&'a dyn PluginHost>,
    parameters: BTreeMap<String, FieldData>,
}

impl<'a> RuntimeContext<'a> {
    /// Creates a context over the given graph, with no plugins and no parameters.
    pub fn new(graph: &'a dyn GraphAccess) -> Self {
        Self {
            graph,
            plugins: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Sets the plugin host.
    pub fn with_plugins(mut self, plugins: &'a dyn PluginHost) -> Self {
        self.plugins = Some(plugins);
        self
    }

    /// Binds a query parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<FieldData>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    #[inline]
    pub fn graph(&self) -> &'a dyn GraphAccess {
        self.graph
    }

    #[inline]
    pub fn plugins(&self) -> Option<&'a dyn PluginHost> {
        self.plugins
    }

    /// Returns a bound parameter.
    pub fn parameter(&self, name: &str) -> Option<&FieldData> {
        self.parameters.get(name)
    }
}

/// Node stored in an `InMemoryGraph`.
#[derive(Clone, Debug, Default)]
struct NodeData {
    labels: Vec<String>,
    properties: BTreeMap<String, FieldData>,
}

/// Edge stored in an `InMemoryGraph`.
#[derive(Clone, Debug, Default)]
struct EdgeData {
    rel_type: String,
    properties: BTreeMap<String, FieldData>,
}

/// In-memory graph for testing.
///
/// `invalidate_*` marks live references as stale, modelling a storage iterator that
/// has moved on; snapshot entries stay readable as long as the element exists.
#[derive(Default)]
pub struct InMemoryGraph {
    nodes: BTreeMap<NodeId, NodeData>,
    edges: BTreeMap<EdgeId, EdgeData>,
    stale_nodes: BTreeSet<NodeId>,
    stale_edges: BTreeSet<EdgeId>,
}

impl InMemoryGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with labels and properties.
    pub fn add_node<L, K>(
        &mut self,
        id: NodeId,
        labels: impl IntoIterator<Item = L>,
        properties: impl IntoIterator<Item = (K, FieldData)>,
    ) where
        L: Into<String>,
        K: Into<String>,
    {
        self.nodes.insert(
            id,
            NodeData {
                labels: labels.into_iter().map(Into::into).collect(),
                properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            },
        );
    }

    /// Adds an edge with a type and properties.
    pub fn add_edge<K: Into<String>>(
        &mut self,
        id: EdgeId,
        rel_type: impl Into<String>,
        properties: impl IntoIterator<Item = (K, FieldData)>,
    ) {
        self.edges.insert(
            id,
            EdgeData {
                rel_type: rel_type.into(),
                properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            },
        );
    }

    /// Marks live references to a node as stale.
    pub fn invalidate_node(&mut self, id: NodeId) {
        self.stale_nodes.insert(id);
    }

    /// Marks live references to an edge as stale.
    pub fn invalidate_edge(&mut self, id: EdgeId) {
        self.stale_edges.insert(id);
    }

    fn node(&self, entity: &Entry) -> Option<&NodeData> {
        if !self.is_valid(entity) {
            return None;
        }
        entity.node_id().and_then(|id| self.nodes.get(&id))
    }

    fn edge(&self, entity: &Entry) -> Option<&EdgeData> {
        if !self.is_valid(entity) {
            return None;
        }
        entity.edge_id().and_then(|id| self.edges.get(&id))
    }
}

fn not_an_entity(op: &str, entity: &Entry) -> Error {
    Error::type_mismatch(op, alloc::format!("expected graph entity, got {}", entity.kind_name()))
}

impl GraphAccess for InMemoryGraph {
    fn entity_field(&self, entity: &Entry, field: &str) -> Result<FieldData> {
        let props = if entity.is_node() {
            self.node(entity).map(|n| &n.properties)
        } else if entity.is_relationship() {
            self.edge(entity).map(|e| &e.properties)
        } else {
            return Err(not_an_entity("GetField", entity));
        };
        Ok(props
            .and_then(|p| p.get(field))
            .cloned()
            .unwrap_or_else(FieldData::null))
    }

    fn has_label(&self, entity: &Entry, label: &str) -> Result<bool> {
        if !entity.is_node() {
            return Err(not_an_entity("IsLabeled", entity));
        }
        Ok(self
            .node(entity)
            .is_some_and(|n| n.labels.iter().any(|l| l == label)))
    }

    fn labels(&self, entity: &Entry) -> Result<Vec<String>> {
        if !entity.is_node() {
            return Err(not_an_entity("labels", entity));
        }
        Ok(self.node(entity).map(|n| n.labels.clone()).unwrap_or_default())
    }

    fn relationship_type(&self, entity: &Entry) -> Result<String> {
        if !entity.is_relationship() {
            return Err(not_an_entity("type", entity));
        }
        Ok(self.edge(entity).map(|e| e.rel_type.clone()).unwrap_or_default())
    }

    fn properties(&self, entity: &Entry) -> Result<BTreeMap<String, FieldData>> {
        if entity.is_node() {
            Ok(self.node(entity).map(|n| n.properties.clone()).unwrap_or_default())
        } else if entity.is_relationship() {
            Ok(self.edge(entity).map(|e| e.properties.clone()).unwrap_or_default())
        } else {
            Err(not_an_entity("properties", entity))
        }
    }

    fn is_valid(&self, entity: &Entry) -> bool {
        match entity {
            Entry::Node(id) => self.nodes.contains_key(id) && !self.stale_nodes.contains(id),
            Entry::NodeSnapshot(id) => self.nodes.contains_key(id),
            Entry::Relationship(e) => self.edges.contains_key(e) && !self.stale_edges.contains(e),
            Entry::RelpSnapshot(e) => self.edges.contains_key(e),
            Entry::VarLenRelationship(edges) => edges.iter().all(|e| self.edges.contains_key(e)),
            Entry::Constant(_) | Entry::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn graph() -> InMemoryGraph {
        let mut g = InMemoryGraph::new();
        g.add_node(1, ["Person"], [("age", FieldData::from(30i64))]);
        g.add_node(2, ["Person", "Admin"], Vec::<(&str, FieldData)>::new());
        g.add_edge(EdgeId::new(1, 2, 0), "KNOWS", [("since", FieldData::from(2020i64))]);
        g
    }

    #[test]
    fn test_entity_field() {
        let g = graph();
        assert_eq!(
            g.entity_field(&Entry::Node(1), "age").unwrap(),
            FieldData::from(30i64)
        );
        assert!(g.entity_field(&Entry::Node(1), "missing").unwrap().is_null());
        assert_eq!(
            g.entity_field(&Entry::Relationship(EdgeId::new(1, 2, 0)), "since").unwrap(),
            FieldData::from(2020i64)
        );
        assert!(g.entity_field(&Entry::constant(1i64), "x").is_err());
    }

    #[test]
    fn test_labels_and_type() {
        let g = graph();
        assert!(g.has_label(&Entry::Node(2), "Admin").unwrap());
        assert!(!g.has_label(&Entry::Node(1), "Admin").unwrap());
        assert_eq!(g.labels(&Entry::Node(2)).unwrap(), vec!["Person", "Admin"]);
        assert_eq!(
            g.relationship_type(&Entry::Relationship(EdgeId::new(1, 2, 0))).unwrap(),
            "KNOWS"
        );
    }

    #[test]
    fn test_stale_reference() {
        let mut g = graph();
        g.invalidate_node(1);
        assert!(!g.is_valid(&Entry::Node(1)));
        assert!(g.is_valid(&Entry::NodeSnapshot(1)));
        assert!(g.entity_field(&Entry::Node(1), "age").unwrap().is_null());
        assert_eq!(
            g.entity_field(&Entry::NodeSnapshot(1), "age").unwrap(),
            FieldData::from(30i64)
        );
        assert!(!g.is_valid(&Entry::Node(99)));
    }

    #[test]
    fn test_context_parameters() {
        let g = graph();
        let ctx = RuntimeContext::new(&g).with_parameter("limit", 10i64);
        assert_eq!(ctx.parameter("limit"), Some(&FieldData::from(10i64)));
        assert!(ctx.parameter("other").is_none());
        assert!(ctx.plugins().is_none());
    }
}
