// TimeTrail - core/export.rs
//
// JSON and CSV export of the tree forest for downstream renderers.
// Core layer: writes to any Write trait object.
//
// The renderer walks each file from its root, draws one box per node and an
// edge from each child to its parent. Presentation (colours, placeholders
// for unknown ancestors) stays with the renderer; this module only exposes
// the read-only node fields plus the state lists it needs.

use crate::core::model::StateSet;
use crate::core::tree::{Forest, Node};
use crate::util::constants::{APP_NAME, APP_VERSION};
use crate::util::error::ExportError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Output format of the export step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Per-action forgery flags, aligned with `node.actions`.
///
/// An action is forged when its full label, volume qualifier included,
/// is a forgery state. The root's only action is the file path and is
/// never flagged.
pub fn forged_actions(node: &Node, forgery_states: &StateSet) -> Vec<bool> {
    if node.is_root() {
        return vec![false; node.actions.len()];
    }
    node.actions
        .iter()
        .map(|action| forgery_states.contains(action))
        .collect()
}

/// True if at least one action of `node` is forged.
pub fn is_forgery(node: &Node, forgery_states: &StateSet) -> bool {
    forged_actions(node, forgery_states).contains(&true)
}

#[derive(Serialize)]
struct ForestDocument<'a> {
    generator: &'static str,
    version: &'static str,
    origin_states: &'a [String],
    forgery_states: &'a [String],
    files: Vec<FileDocument<'a>>,
}

#[derive(Serialize)]
struct FileDocument<'a> {
    file_path: &'a str,
    root: &'a str,
    nodes: Vec<NodeDocument<'a>>,
}

#[derive(Serialize)]
struct NodeDocument<'a> {
    id: &'a str,
    parent: Option<&'a str>,
    operation: &'a str,
    timestamp: &'a str,
    actions: &'a [String],
    origin_state: bool,
    forgery: bool,
    forged_actions: Vec<bool>,
    children: Vec<&'a str>,
}

impl<'a> NodeDocument<'a> {
    fn new(node: &'a Node, forgery_states: &StateSet) -> Self {
        let flags = forged_actions(node, forgery_states);
        Self {
            id: node.id.as_str(),
            parent: node.parent.as_ref().map(|p| p.as_str()),
            operation: &node.operation,
            timestamp: &node.timestamp,
            actions: &node.actions,
            origin_state: node.origin_state,
            forgery: flags.contains(&true),
            forged_actions: flags,
            children: node.children.iter().map(|c| c.as_str()).collect(),
        }
    }
}

/// Export the forest as one JSON document. Returns the number of nodes written.
pub fn export_json<W: Write>(
    forest: &Forest,
    origin_states: &StateSet,
    forgery_states: &StateSet,
    writer: W,
    pretty: bool,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let files: Vec<FileDocument<'_>> = forest
        .iter()
        .map(|tree| FileDocument {
            file_path: tree.file_path(),
            root: tree.root().id.as_str(),
            nodes: tree
                .walk()
                .map(|node| NodeDocument::new(node, forgery_states))
                .collect(),
        })
        .collect();
    let count: usize = files.iter().map(|f| f.nodes.len()).sum();

    let document = ForestDocument {
        generator: APP_NAME,
        version: APP_VERSION,
        origin_states: origin_states.as_slice(),
        forgery_states: forgery_states.as_slice(),
        files,
    };

    let result = if pretty {
        serde_json::to_writer_pretty(writer, &document)
    } else {
        serde_json::to_writer(writer, &document)
    };
    result.map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Export the forest as flat CSV, one row per node in pre-order.
///
/// Writes: file, id, parent, timestamp, origin_state, forgery, operation,
/// actions, forged_actions. Both action columns are joined with " | "; the
/// last one lists only the forged labels.
pub fn export_csv<W: Write>(
    forest: &Forest,
    forgery_states: &StateSet,
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "file",
            "id",
            "parent",
            "timestamp",
            "origin_state",
            "forgery",
            "operation",
            "actions",
            "forged_actions",
        ])
        .map_err(csv_err)?;

    let mut count = 0;
    for tree in forest.iter() {
        for node in tree.walk() {
            let parent = node.parent.as_ref().map(|p| p.as_str()).unwrap_or("");
            let actions = node.actions.join(" | ");
            let origin_state = if node.origin_state { "true" } else { "false" };
            let flags = forged_actions(node, forgery_states);
            let forged = node
                .actions
                .iter()
                .zip(&flags)
                .filter(|&(_, &hit)| hit)
                .map(|(action, _)| action.as_str())
                .collect::<Vec<_>>()
                .join(" | ");
            let forgery = if forged.is_empty() { "false" } else { "true" };
            csv_writer
                .write_record([
                    tree.file_path(),
                    node.id.as_str(),
                    parent,
                    node.timestamp.as_str(),
                    origin_state,
                    forgery,
                    node.operation.as_str(),
                    actions.as_str(),
                    forged.as_str(),
                ])
                .map_err(csv_err)?;
            count += 1;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Write {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
