//! First-match-wins range table.

use sp_core::config::RouteRule;
use sp_core::error::{Result, SpError};
use std::path::Path;

/// An ordered set of closed identifier intervals, each mapped to one
/// destination directory.
///
/// Entries are evaluated in declaration order and the first containing
/// match wins, so deliberately overlapping ranges express priority. The
/// table is immutable after construction; for a fixed table, `route` is a
/// pure function of the identifier.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    rules: Vec<RouteRule>,
}

impl RoutingTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Map an identifier to its destination. `None` means the document is
    /// not routed and not archived — it stays in place for manual handling.
    pub fn route(&self, id: u32) -> Option<&RouteRule> {
        let rule = self.rules.iter().find(|rule| rule.contains(id));
        match rule {
            Some(rule) => {
                tracing::debug!(id, dest = %rule.dest.display(), "routed");
            }
            None => {
                tracing::debug!(id, "no matching range");
            }
        }
        rule
    }

    /// Like [`route`](Self::route), but produces the pipeline error for an
    /// unrouted identifier.
    pub fn route_or_err(&self, id: u32) -> Result<&RouteRule> {
        self.route(id).ok_or(SpError::RouteNotFound { id })
    }

    /// Create every destination directory up front, so the first delivery
    /// of a cycle does not race directory creation with the copy.
    pub fn ensure_destinations(&self) -> Result<()> {
        for rule in &self.rules {
            ensure_dir(&rule.dest)?;
        }
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| SpError::Access(format!("create {}: {e}", path.display())))
}
