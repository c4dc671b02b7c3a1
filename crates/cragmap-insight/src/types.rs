use cragmap_core::Record;
use serde::Serialize;

/// A group of nearby records.
///
/// Never empty: the first member is the anchor every later member was
/// measured against, and it never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    members: Vec<Record>,
}

impl Cluster {
    /// Start a cluster anchored at `anchor`.
    pub fn new(anchor: Record) -> Self {
        Self {
            members: vec![anchor],
        }
    }

    pub fn anchor(&self) -> &Record {
        &self.members[0]
    }

    pub fn members(&self) -> &[Record] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// A cluster is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_members(self) -> Vec<Record> {
        self.members
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.members.push(record);
    }
}

/// Aggregate view of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSummary {
    pub member_count: usize,
    /// Sum of every member's `total`, in `i128` so it cannot overflow.
    pub total_routes: i128,
    /// Title of the most popular member; the earliest wins ties.
    pub title: String,
    pub average_popularity: f64,
    pub max_popularity: i64,
}
