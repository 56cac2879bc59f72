//! Real-world application checklist gating the test.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    total: usize,
    visited: BTreeSet<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferVisit {
    New { visited: usize, total: usize },
    Repeat,
    OutOfRange,
    /// Visits only count while the transfer screen is open.
    NotAvailable,
}

impl TransferProgress {
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            visited: BTreeSet::new(),
        }
    }

    pub fn visit(&mut self, app: usize) -> TransferVisit {
        if app >= self.total {
            return TransferVisit::OutOfRange;
        }
        if self.visited.insert(app) {
            TransferVisit::New {
                visited: self.visited.len(),
                total: self.total,
            }
        } else {
            TransferVisit::Repeat
        }
    }

    #[must_use]
    pub fn is_visited(&self, app: usize) -> bool {
        self.visited.contains(&app)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.visited.len() == self.total
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_only_with_every_app() {
        let mut progress = TransferProgress::new(4);
        for app in 0..3 {
            assert!(matches!(progress.visit(app), TransferVisit::New { .. }));
        }
        assert!(!progress.is_complete());
        assert!(progress.is_visited(2));
        assert!(!progress.is_visited(3));
        assert_eq!(progress.visit(1), TransferVisit::Repeat);
        assert_eq!(progress.visit(9), TransferVisit::OutOfRange);
        assert!(!progress.is_visited(9));
        assert_eq!(
            progress.visit(3),
            TransferVisit::New {
                visited: 4,
                total: 4
            }
        );
        assert!(progress.is_complete());
    }
}
