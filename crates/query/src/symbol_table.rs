//! Symbol table mapping query variables to record columns.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// What a variable is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Node,
    Relationship,
    Constant,
    Parameter,
    NamedPath,
}

#[derive(Clone, Debug)]
struct Symbol {
    index: usize,
    kind: SymbolKind,
}

/// Maps variable names to dense, 0-based column indices.
///
/// Built once when a query is compiled and read-only during execution; operators and
/// evaluators over the same records must share one table.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    names: Vec<String>,
    paths: HashMap<String, Vec<String>>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a variable and returns its column index.
    ///
    /// Re-inserting a known name returns the existing index and keeps its kind.
    pub fn insert(&mut self, name: impl Into<String>, kind: SymbolKind) -> usize {
        let name = name.into();
        if let Some(sym) = self.symbols.get(&name) {
            return sym.index;
        }
        let index = self.names.len();
        self.names.push(name.clone());
        self.symbols.insert(name, Symbol { index, kind });
        index
    }

    /// Registers a named path over the given element aliases.
    pub fn define_path<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        elements: impl IntoIterator<Item = S>,
    ) -> usize {
        let name = name.into();
        let index = self.insert(name.clone(), SymbolKind::NamedPath);
        self.paths
            .insert(name, elements.into_iter().map(Into::into).collect());
        index
    }

    /// Looks up a variable.
    pub fn resolve(&self, name: &str) -> Option<(usize, SymbolKind)> {
        self.symbols.get(name).map(|s| (s.index, s.kind))
    }

    /// Returns the element aliases of a named path.
    pub fn path_elements(&self, name: &str) -> Option<&[String]> {
        self.paths.get(name).map(Vec::as_slice)
    }

    /// Returns the name bound to a column.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_indices() {
        let mut table = SymbolTable::new();
        assert_eq!(table.insert("a", SymbolKind::Node), 0);
        assert_eq!(table.insert("r", SymbolKind::Relationship), 1);
        assert_eq!(table.insert("k", SymbolKind::Constant), 2);
        assert_eq!(table.insert("a", SymbolKind::Constant), 0);
        assert_eq!(table.len(), 3);
        assert_eq!(table.resolve("a"), Some((0, SymbolKind::Node)));
        assert_eq!(table.resolve("missing"), None);
        assert_eq!(table.name_of(2), Some("k"));
    }

    #[test]
    fn test_named_path() {
        let mut table = SymbolTable::new();
        table.insert("a", SymbolKind::Node);
        table.insert("r", SymbolKind::Relationship);
        table.insert("b", SymbolKind::Node);
        let idx = table.define_path("p", ["a", "r", "b"]);
        assert_eq!(idx, 3);
        assert_eq!(table.resolve("p"), Some((3, SymbolKind::NamedPath)));
        assert_eq!(table.path_elements("p").unwrap().len(), 3);
    }
}
