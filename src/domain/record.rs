//! Flat, id-addressed record form of a tree, as persisted by the codecs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// One node of a flattened tree. `children` holds the ids of the child records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord<P> {
    pub id: u32,
    pub payload: P,
    #[serde(default)]
    pub children: Vec<u32>,
}

/// Top-level persisted document. Record 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument<P> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<NodeRecord<P>>,
}

impl<P> Default for TreeDocument<P> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<P> From<Vec<NodeRecord<P>>> for TreeDocument<P> {
    fn from(nodes: Vec<NodeRecord<P>>) -> Self {
        Self { nodes }
    }
}

/// Build the id lookup for `records` after checking that they describe a tree.
///
/// Rejects duplicate ids, child ids without a record, children referenced by
/// more than one parent (or more than once) and references back to the root.
pub(crate) fn index_records<P>(records: &[NodeRecord<P>]) -> DomainResult<HashMap<u32, usize>> {
    let mut by_id = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        if by_id.insert(record.id, pos).is_some() {
            return Err(malformed(format!("duplicate record id {}", record.id)));
        }
    }

    let root_id = records.first().map(|r| r.id);
    let mut referenced = HashSet::new();
    for record in records {
        for &child in &record.children {
            if !by_id.contains_key(&child) {
                return Err(malformed(format!(
                    "record {} references unknown child {}",
                    record.id, child
                )));
            }
            if Some(child) == root_id {
                return Err(malformed(format!(
                    "record {} references the root {} as a child",
                    record.id, child
                )));
            }
            if !referenced.insert(child) {
                return Err(malformed(format!("record {} has more than one parent", child)));
            }
        }
    }
    Ok(by_id)
}

fn malformed(reason: String) -> DomainError {
    DomainError::MalformedRecords { reason }
}
