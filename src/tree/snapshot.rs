//! Flat exchange format for an outline.
//!
//! Each node becomes one record holding its id, text, parent id (`-1` for the
//! root) and ordered child ids. The standard document wraps the records as
//! `{"data": [...]}`; a bare array is still accepted on load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::tree::id::NodeId;
use crate::tree::model::NodeTree;

/// One node in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub value: String,
    #[serde(default, with = "parent_ref")]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

/// The outer shape of a snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Envelope {
    /// `{"data": [...]}`
    #[default]
    Wrapped,
    /// `[...]`
    Bare,
}

impl Envelope {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "wrapped" => Some(Self::Wrapped),
            "bare" => Some(Self::Bare),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrapped => "wrapped",
            Self::Bare => "bare",
        }
    }
}

/// A cycle-free, flat copy of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<NodeRecord>,
    /// Envelope the snapshot was read from (`Wrapped` for captured trees).
    pub envelope: Envelope,
}

#[derive(Serialize)]
struct WrappedRef<'a> {
    data: &'a [NodeRecord],
}

impl Snapshot {
    /// Flatten `tree` in collection order.
    pub fn capture(tree: &NodeTree) -> Self {
        let records = tree
            .iter()
            .map(|node| NodeRecord {
                id: node.id(),
                value: node.value().to_string(),
                parent: node.parent(),
                children: node.children().to_vec(),
            })
            .collect();
        Self {
            records,
            envelope: Envelope::Wrapped,
        }
    }

    /// Compact JSON in the given envelope.
    pub fn to_json(&self, envelope: Envelope) -> TreeResult<String> {
        let text = match envelope {
            Envelope::Wrapped => serde_json::to_string(&WrappedRef {
                data: &self.records,
            })?,
            Envelope::Bare => serde_json::to_string(&self.records)?,
        };
        Ok(text)
    }

    /// Indented JSON with a trailing newline, for files.
    pub fn to_json_pretty(&self, envelope: Envelope) -> TreeResult<String> {
        let mut text = match envelope {
            Envelope::Wrapped => serde_json::to_string_pretty(&WrappedRef {
                data: &self.records,
            })?,
            Envelope::Bare => serde_json::to_string_pretty(&self.records)?,
        };
        text.push('\n');
        Ok(text)
    }

    /// Parse either envelope. Structure is not checked until [`Snapshot::to_tree`].
    pub fn from_json(text: &str) -> TreeResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let (envelope, data) = match value {
            serde_json::Value::Array(items) => (Envelope::Bare, serde_json::Value::Array(items)),
            serde_json::Value::Object(mut map) => match map.remove("data") {
                Some(data) => (Envelope::Wrapped, data),
                None => return Err(TreeError::malformed("object has no \"data\" field")),
            },
            _ => {
                return Err(TreeError::malformed(
                    "expected an array of nodes or an object with a \"data\" array",
                ));
            }
        };
        let records: Vec<NodeRecord> = serde_json::from_value(data)?;
        Ok(Self { records, envelope })
    }

    /// Rebuild a tree: every node first (keeping its id), then the links.
    ///
    /// The result is a fresh tree, so a failure leaves whatever tree the
    /// caller already holds untouched.
    pub fn to_tree(&self) -> TreeResult<NodeTree> {
        if self.records.is_empty() {
            return Err(TreeError::malformed("snapshot holds no nodes"));
        }

        let mut tree = NodeTree::empty();
        for record in &self.records {
            tree.add_node(record.value.clone(), Some(record.id))
                .map_err(|_| TreeError::malformed(format!("duplicate id {}", record.id)))?;
        }

        let by_id: HashMap<NodeId, &NodeRecord> =
            self.records.iter().map(|r| (r.id, r)).collect();

        // A parent that points nowhere is read as "no parent".
        let roots: Vec<NodeId> = self
            .records
            .iter()
            .filter(|r| r.parent.is_none_or(|p| !by_id.contains_key(&p)))
            .map(|r| r.id)
            .collect();
        let root = match roots.as_slice() {
            [only] => *only,
            [] => return Err(TreeError::malformed("no root node (every node has a parent)")),
            many => {
                let list = many
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(TreeError::malformed(format!(
                    "several nodes have no parent: {list}"
                )));
            }
        };
        tree.set_root(root);

        for record in &self.records {
            for child in &record.children {
                let Some(child_record) = by_id.get(child) else {
                    return Err(TreeError::malformed(format!(
                        "child {child} of node {} has no record",
                        record.id
                    )));
                };
                if child_record.parent != Some(record.id) {
                    return Err(TreeError::malformed(format!(
                        "node {child} is listed under {} but names a different parent",
                        record.id
                    )));
                }
                tree.attach(*child, record.id).map_err(|err| {
                    TreeError::malformed(format!(
                        "cannot link node {child} under {}: {err}",
                        record.id
                    ))
                })?;
            }
        }

        for record in &self.records {
            if let Some(parent) = record.parent
                && by_id.contains_key(&parent)
                && tree.parent(record.id) != Some(parent)
            {
                return Err(TreeError::malformed(format!(
                    "node {} names parent {parent}, which does not list it",
                    record.id
                )));
            }
        }

        tree.validate()?;

        let max = self.records.iter().map(|r| r.id).max().unwrap_or(root);
        tree.ids_mut().reset_after(max);
        debug!(nodes = tree.len(), root = %root, "snapshot rebuilt");
        Ok(tree)
    }
}

impl NodeTree {
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Parse and rebuild in one step.
    pub fn from_json(text: &str) -> TreeResult<NodeTree> {
        Snapshot::from_json(text)?.to_tree()
    }
}

/// `parent` on the wire: any `u64` id, or a negative number/`null`/missing
/// for none.
mod parent_ref {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::tree::id::NodeId;

    pub fn serialize<S: Serializer>(parent: &Option<NodeId>, s: S) -> Result<S::Ok, S::Error> {
        match parent {
            Some(id) => s.serialize_u64(id.0),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NodeId>, D::Error> {
        let Some(raw) = Option::<serde_json::Number>::deserialize(d)? else {
            return Ok(None);
        };
        if let Some(id) = raw.as_u64() {
            return Ok(Some(NodeId(id)));
        }
        match raw.as_i64() {
            Some(_) => Ok(None),
            None => Err(D::Error::custom(format!(
                "parent must be an integer id or -1, found {raw}"
            ))),
        }
    }
}
