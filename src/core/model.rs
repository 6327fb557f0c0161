// TimeTrail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary between the line parser, the
// tree builder, and the export layer.

use std::collections::HashSet;

// =============================================================================
// Operation kind
// =============================================================================

/// The temporal qualifier an operation starts with.
///
/// `At` and `After` carry one timestamp; `From` and `Between` usually carry
/// two, but the grammar accepts either form for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    At,
    From,
    Between,
    After,
}

impl OperationKind {
    /// The keyword as it appears in the analyser output.
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationKind::At => "At",
            OperationKind::From => "From",
            OperationKind::Between => "Between",
            OperationKind::After => "After",
        }
    }

    /// Resolve a keyword matched by the operation grammar.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "At" => Some(OperationKind::At),
            "From" => Some(OperationKind::From),
            "Between" => Some(OperationKind::Between),
            "After" => Some(OperationKind::After),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Which bucket a record's actions were routed to.
///
/// One operation yields zero, one, or two records: an `Origin` record for
/// actions found in the origin-state set and a `Normal` record for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Actions describing a known initial state; terminates provenance.
    Origin,
    /// Any other action; extends the lineage chain.
    Normal,
}

impl Classification {
    /// Label used in node identity and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Origin => "origin",
            Classification::Normal => "normal",
        }
    }

    pub fn is_origin(&self) -> bool {
        matches!(self, Classification::Origin)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Records
// =============================================================================

/// One classified slice of an operation occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    /// Verbatim operation text as matched by the grammar.
    pub operation_text: String,

    /// Normal-chain lineage ending in this operation, e.g.
    /// ` <- (At ...: Copy) <- (At ...: Create)`.
    pub lineage_path: String,

    /// Canonical `<TIMESTAMP ...>` string.
    pub timestamp: String,

    /// Non-empty, ordered action labels including volume qualifiers.
    pub actions: Vec<String>,

    pub classification: Classification,
}

/// The parse result of one accepted input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// 1-based line number in the input.
    pub line_number: u64,

    /// Relative path of the filesystem object, or empty if the line has
    /// no path marker.
    pub file_path: String,

    /// Records in chain order (most recent operation first).
    pub records: Vec<OperationRecord>,
}

// =============================================================================
// State labels
// =============================================================================

/// Insertion-ordered, duplicate-free set of state labels.
///
/// Used for origin states (fed to the classifier) and forgery states
/// (passed through to the renderer). Labels carry no volume qualifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet {
    labels: Vec<String>,
    index: HashSet<String>,
}

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Returns false if it was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.index.contains(&label) {
            return false;
        }
        self.index.insert(label.clone());
        self.labels.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl<S: Into<String>> FromIterator<S> for StateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StateSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}
