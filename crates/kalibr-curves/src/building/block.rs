//! Curve building blocks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One curve's slice of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Curve name.
    pub name: String,
    /// First column of the curve's quotes.
    pub start: usize,
    /// Number of quotes (and parameters) of the curve.
    pub count: usize,
}

/// Ordered list of the curves whose quotes a Jacobian's columns refer to.
///
/// Entries are contiguous: each starts where the previous one ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveBuildingBlock {
    entries: Vec<BlockEntry>,
}

impl CurveBuildingBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a curve, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, count: usize) -> Self {
        self.push(name, count);
        self
    }

    /// Appends a curve after the existing entries.
    pub fn push(&mut self, name: impl Into<String>, count: usize) {
        let start = self.total();
        self.entries.push(BlockEntry {
            name: name.into(),
            start,
            count,
        });
    }

    /// Entries in column order.
    #[must_use]
    pub fn entries(&self) -> &[BlockEntry] {
        &self.entries
    }

    /// Entry of one curve.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&BlockEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Total number of quotes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.last().map_or(0, |e| e.start + e.count)
    }

    /// Curve names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

impl fmt::Display for CurveBuildingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|e| format!("{}[{}..{}]", e.name, e.start, e.start + e.count))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
