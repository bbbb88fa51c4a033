//! Canonical catalog tree.
//!
//! ```text
//! Tournament
//! └── Event
//!     └── Category
//!         └── Market
//!             ├── Line (only when the market has more than one line)
//!             │   └── Selection
//!             └── Selection
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::id::LineId;
use super::selection::{LineKey, LineValue, MarketClass};

/// Level of a node in the catalog tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Tournament,
    Event,
    Category,
    Market,
    Line,
    Selection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventData {
    pub starts_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketData {
    pub status: Option<String>,
    pub class: MarketClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineData {
    pub line: Option<LineValue>,
    pub key: LineKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionData {
    /// Settlement line id; `None` means the selection cannot be wagered on.
    pub external_id: Option<LineId>,
    pub display_name: String,
    pub odds: Option<f64>,
    pub display_odds: Option<String>,
    pub stake: Option<f64>,
    pub line: Option<LineValue>,
    pub line_key: LineKey,
    pub raw: Value,
}

/// Kind-specific payload of a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    Tournament,
    Event(EventData),
    Category,
    Market(MarketData),
    Line(LineData),
    Selection(SelectionData),
}

/// One level of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub data: NodeData,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Tournament => NodeKind::Tournament,
            NodeData::Event(_) => NodeKind::Event,
            NodeData::Category => NodeKind::Category,
            NodeData::Market(_) => NodeKind::Market,
            NodeData::Line(_) => NodeKind::Line,
            NodeData::Selection(_) => NodeKind::Selection,
        }
    }

    /// Depth-first, pre-order iterator over this node and its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of nodes of `kind` in this subtree, including `self`.
    #[must_use]
    pub fn count(&self, kind: NodeKind) -> usize {
        self.descendants().filter(|n| n.kind() == kind).count()
    }

    /// First direct child with the given id.
    #[must_use]
    pub fn child(&self, id: &str) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.id == id)
    }
}

/// Count nodes of `kind` across a forest.
#[must_use]
pub fn count_kind(roots: &[TreeNode], kind: NodeKind) -> usize {
    roots.iter().map(|r| r.count(kind)).sum()
}
