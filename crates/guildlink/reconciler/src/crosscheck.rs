//! Crosscheck: roster entries with no corresponding linked member record.

use guildlink_types::RosterEntry;

/// Which ranks to skip and how to paginate the report.
#[derive(Debug, Clone)]
pub struct CrosscheckConfig {
    /// Ranks whose members are expected to be unlinked.
    pub excluded_ranks: Vec<String>,
    pub page_size: usize,
}

impl Default for CrosscheckConfig {
    fn default() -> Self {
        Self {
            excluded_ranks: vec!["Legacy Member".to_string()],
            page_size: 10,
        }
    }
}

impl CrosscheckConfig {
    pub fn is_excluded(&self, rank: &str) -> bool {
        self.excluded_ranks
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(rank))
    }
}

/// Paginated read-only report for the presentation layer.
#[derive(Debug, Clone)]
pub struct CrosscheckReport {
    pub unlinked: Vec<RosterEntry>,
    page_size: usize,
}

impl CrosscheckReport {
    pub fn new(unlinked: Vec<RosterEntry>, page_size: usize) -> Self {
        Self {
            unlinked,
            page_size: page_size.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unlinked.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.unlinked.len().div_ceil(self.page_size)
    }

    pub fn pages(&self) -> impl Iterator<Item = &[RosterEntry]> {
        self.unlinked.chunks(self.page_size)
    }
}
