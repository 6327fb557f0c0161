// TimeTrail - core/tree.rs
//
// Deduplicating tree builder.
// Core layer: pure in-memory construction, no I/O.
//
// Nodes live in an arena keyed by a content-addressed id
// (SHA-512 of "lineage_path:classification"). Insertion is insert-if-absent,
// so a node keeps the parent it was first attached to for the rest of the
// run. Identical chains seen on different lines of the same file collapse
// onto the same nodes.

use crate::core::model::{Classification, OperationRecord, ParsedLine};
use crate::util::constants::{ROOT_LINEAGE, ROOT_OPERATION, ROOT_TIMESTAMP};
use crate::util::error::TreeError;
use sha2::{Digest, Sha512};
use std::collections::HashMap;

// =============================================================================
// Node identity
// =============================================================================

/// Hex-encoded SHA-512 digest identifying one (lineage, classification) slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Derive the id for a lineage position.
    pub fn derive(lineage_path: &str, classification: Classification) -> Self {
        let mut hasher = Sha512::new();
        hasher.update(lineage_path.as_bytes());
        hasher.update(b":");
        hasher.update(classification.label().as_bytes());
        NodeId(format!("{:x}", hasher.finalize()))
    }

    /// Id of the node a record maps to.
    pub fn of(record: &OperationRecord) -> Self {
        Self::derive(&record.lineage_path, record.classification)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Node
// =============================================================================

/// One deduplicated operation slot in a file's tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    /// Verbatim operation text (`ROOT` for the root).
    pub operation: String,
    pub lineage_path: String,
    /// Canonical timestamp label (`NOW` for the root).
    pub timestamp: String,
    /// Display actions; the root holds the file path as its only action.
    pub actions: Vec<String>,
    pub origin_state: bool,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Child ids in attachment order.
    pub children: Vec<NodeId>,
}

impl Node {
    fn from_record(record: &OperationRecord, parent: NodeId) -> Self {
        Self {
            id: NodeId::of(record),
            operation: record.operation_text.clone(),
            lineage_path: record.lineage_path.clone(),
            timestamp: record.timestamp.clone(),
            actions: record.actions.clone(),
            origin_state: record.classification.is_origin(),
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    fn root(file_path: &str) -> Self {
        Self {
            id: NodeId::derive(ROOT_LINEAGE, Classification::Normal),
            operation: ROOT_OPERATION.to_string(),
            lineage_path: ROOT_LINEAGE.to_string(),
            timestamp: ROOT_TIMESTAMP.to_string(),
            actions: vec![file_path.to_string()],
            origin_state: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// =============================================================================
// Tree
// =============================================================================

/// The provenance tree of one filesystem object.
#[derive(Debug, Clone)]
pub struct Tree {
    file_path: String,
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl Tree {
    /// Create a tree holding only the `NOW` root for `file_path`.
    pub fn new(file_path: &str) -> Self {
        let root = Node::root(file_path);
        let root_id = root.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            file_path: file_path.to_string(),
            root: root_id,
            nodes,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn root(&self) -> &Node {
        &self.nodes[&self.root]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The node a record maps to, if it has been added.
    pub fn node_for(&self, record: &OperationRecord) -> Option<&Node> {
        self.nodes.get(&NodeId::of(record))
    }

    pub fn parent_of(&self, id: &NodeId) -> Option<&Node> {
        self.nodes
            .get(id)
            .and_then(|n| n.parent.as_ref())
            .and_then(|p| self.nodes.get(p))
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is present from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add `record` under `parent` (or under the root when `None`).
    ///
    /// Returns `Ok(true)` if a node was created and `Ok(false)` if the id
    /// already existed, in which case no edge is added. Fails with
    /// [`TreeError::MissingParent`] if `parent` has no node.
    pub fn add_node(
        &mut self,
        record: &OperationRecord,
        parent: Option<&OperationRecord>,
    ) -> Result<bool, TreeError> {
        let parent_id = match parent {
            None => self.root.clone(),
            Some(p) => {
                let id = NodeId::of(p);
                if !self.nodes.contains_key(&id) {
                    return Err(TreeError::MissingParent {
                        file_path: self.file_path.clone(),
                        lineage_path: p.lineage_path.clone(),
                        classification: p.classification.label(),
                    });
                }
                id
            }
        };

        let id = NodeId::of(record);
        if self.nodes.contains_key(&id) {
            tracing::trace!(file = %self.file_path, node = %id, "Node reused");
            return Ok(false);
        }

        self.nodes
            .insert(id.clone(), Node::from_record(record, parent_id.clone()));
        if let Some(parent_node) = self.nodes.get_mut(&parent_id) {
            parent_node.children.push(id);
        }
        Ok(true)
    }

    /// Fold one parsed line into the tree.
    ///
    /// The attachment cursor starts at the root for every line and only
    /// advances on normal records. Returns the number of nodes created.
    pub fn add_line(&mut self, records: &[OperationRecord]) -> Result<usize, TreeError> {
        let mut cursor: Option<&OperationRecord> = None;
        let mut created = 0;
        for record in records {
            if self.add_node(record, cursor)? {
                created += 1;
            }
            if record.classification == Classification::Normal {
                cursor = Some(record);
            }
        }
        Ok(created)
    }

    /// Pre-order traversal: root first, children in attachment order.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![&self.root],
        }
    }
}

/// Pre-order iterator over a [`Tree`].
pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<&'a NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(id)?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// =============================================================================
// Forest
// =============================================================================

/// File path -> tree, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: Vec<Tree>,
    index: HashMap<String, usize>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree for `file_path`, created on first use.
    pub fn tree_mut(&mut self, file_path: &str) -> &mut Tree {
        let idx = match self.index.get(file_path) {
            Some(&idx) => idx,
            None => {
                self.trees.push(Tree::new(file_path));
                let idx = self.trees.len() - 1;
                self.index.insert(file_path.to_string(), idx);
                idx
            }
        };
        &mut self.trees[idx]
    }

    pub fn get(&self, file_path: &str) -> Option<&Tree> {
        self.index.get(file_path).map(|&idx| &self.trees[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Node count across all trees, roots included.
    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(Tree::len).sum()
    }
}

/// Fold parsed lines, in order, into one tree per file path.
pub fn generate_trees(lines: &[ParsedLine]) -> Result<Forest, TreeError> {
    let mut forest = Forest::new();
    for line in lines {
        let tree = forest.tree_mut(&line.file_path);
        let created = tree.add_line(&line.records)?;
        tracing::trace!(
            line = line.line_number,
            file = %line.file_path,
            created,
            "Line folded into tree"
        );
    }

    tracing::debug!(
        files = forest.len(),
        nodes = forest.total_nodes(),
        "Trees generated"
    );

    Ok(forest)
}
