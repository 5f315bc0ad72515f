//! The survey tree: the compiler's output artifact.
//!
//! Nodes live in an arena (`Vec<SurveyNode>`) and reference their children
//! by index. The compiler's scope stack holds node ids rather than borrows,
//! so a container can still be amended (generated table-list labels, repeat
//! count calculates) after it has been attached to its parent.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::choice::{Choice, ChoiceLists};
use crate::value::CellValue;

/// Index of a node in its [`SurveyTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// A single node of the survey tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyNode {
    /// Output tag: `text`, `integer`, `group`, `repeat`, `select one`, ...
    pub kind: String,
    /// XML-tag-valid name; empty only on the survey root.
    pub name: String,
    pub label: Option<CellValue>,
    pub hint: Option<CellValue>,
    /// Output-binding attributes (`calculate`, `relevant`, `readonly`, ...).
    pub bind: BTreeMap<String, CellValue>,
    /// Presentation attributes (`appearance`, `jr:count`, ...).
    pub control: BTreeMap<String, CellValue>,
    pub media: BTreeMap<String, CellValue>,
    pub action: BTreeMap<String, CellValue>,
    pub default: Option<CellValue>,
    pub trigger: Option<String>,
    pub choice_filter: Option<String>,
    pub itemset: Option<String>,
    pub list_name: Option<String>,
    /// External-select query reference (`select one external` only).
    pub query: Option<String>,
    pub choices: Vec<Choice>,
    /// Loop columns: the choice rows a `begin loop ... over` repeats over.
    pub columns: Vec<Choice>,
    /// OSM tag set copied onto `osm` nodes.
    pub tags: Vec<Choice>,
    pub parameters: BTreeMap<String, String>,
    /// Set on containers by the legacy `flat` setting.
    pub flat: bool,
    /// Ordered children; only meaningful for container kinds.
    pub children: Vec<NodeId>,
    /// Unrecognized columns, passed through unchanged.
    pub extra: BTreeMap<String, CellValue>,
}

impl SurveyNode {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        SurveyNode {
            kind: kind.into(),
            name: name.into(),
            ..SurveyNode::default()
        }
    }
}

/// Arena of survey nodes. Node 0 is always the survey root.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyTree {
    nodes: Vec<SurveyNode>,
}

impl SurveyTree {
    pub fn new(root: SurveyNode) -> Self {
        SurveyTree { nodes: vec![root] }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &SurveyNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SurveyNode {
        &mut self.nodes[id.0]
    }

    /// Allocate a node without attaching it anywhere.
    pub fn push(&mut self, node: SurveyNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Allocate a node and append it to `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, node: SurveyNode) -> NodeId {
        let id = self.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The completed compilation artifact: the tree, the root-level settings
/// merged in, and any choice lists published for downstream lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Survey {
    pub tree: SurveyTree,
    pub settings: BTreeMap<String, CellValue>,
    pub choices: ChoiceLists,
}

impl Survey {
    pub fn root(&self) -> &SurveyNode {
        self.tree.node(self.tree.root_id())
    }

    /// Top-level children of the survey root, in source row order.
    pub fn root_children(&self) -> impl Iterator<Item = &SurveyNode> {
        self.tree
            .children_of(self.tree.root_id())
            .iter()
            .map(|&id| self.tree.node(id))
    }

    pub fn setting(&self, key: &str) -> Option<&CellValue> {
        self.settings.get(key)
    }
}

struct NodeRef<'a> {
    tree: &'a SurveyTree,
    id: NodeId,
}

fn serialize_node_fields<S: SerializeMap>(
    map: &mut S,
    tree: &SurveyTree,
    node: &SurveyNode,
) -> Result<(), S::Error> {
    if let Some(label) = &node.label {
        map.serialize_entry("label", label)?;
    }
    if let Some(hint) = &node.hint {
        map.serialize_entry("hint", hint)?;
    }
    if !node.bind.is_empty() {
        map.serialize_entry("bind", &node.bind)?;
    }
    if !node.control.is_empty() {
        map.serialize_entry("control", &node.control)?;
    }
    if !node.media.is_empty() {
        map.serialize_entry("media", &node.media)?;
    }
    if !node.action.is_empty() {
        map.serialize_entry("action", &node.action)?;
    }
    if let Some(default) = &node.default {
        map.serialize_entry("default", default)?;
    }
    if let Some(trigger) = &node.trigger {
        map.serialize_entry("trigger", trigger)?;
    }
    if let Some(choice_filter) = &node.choice_filter {
        map.serialize_entry("choice_filter", choice_filter)?;
    }
    if let Some(itemset) = &node.itemset {
        map.serialize_entry("itemset", itemset)?;
    }
    if let Some(list_name) = &node.list_name {
        map.serialize_entry("list_name", list_name)?;
    }
    if let Some(query) = &node.query {
        map.serialize_entry("query", query)?;
    }
    if !node.choices.is_empty() {
        map.serialize_entry("choices", &node.choices)?;
    }
    if !node.columns.is_empty() {
        map.serialize_entry("columns", &node.columns)?;
    }
    if !node.tags.is_empty() {
        map.serialize_entry("tags", &node.tags)?;
    }
    if !node.parameters.is_empty() {
        map.serialize_entry("parameters", &node.parameters)?;
    }
    if node.flat {
        map.serialize_entry("flat", &true)?;
    }
    for (key, value) in &node.extra {
        map.serialize_entry(key, value)?;
    }
    if !node.children.is_empty() {
        let children: Vec<NodeRef<'_>> = node
            .children
            .iter()
            .map(|&id| NodeRef { tree, id })
            .collect();
        map.serialize_entry("children", &children)?;
    }
    Ok(())
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.tree.node(self.id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &node.kind)?;
        map.serialize_entry("name", &node.name)?;
        serialize_node_fields(&mut map, self.tree, node)?;
        map.end()
    }
}

impl Serialize for Survey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let root = self.root();
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &root.kind)?;
        map.serialize_entry("name", &root.name)?;
        for (key, value) in &self.settings {
            map.serialize_entry(key, value)?;
        }
        if !self.choices.is_empty() {
            map.serialize_entry("choices", &self.choices)?;
        }
        serialize_node_fields(&mut map, &self.tree, root)?;
        map.end()
    }
}
