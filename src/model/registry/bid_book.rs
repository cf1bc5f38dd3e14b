use std::collections::{HashMap, HashSet};

use crate::model::common::AccountId;

/// Index of a module in its registry's arena, which is also its processing
/// order during allocation.
pub type ModuleIndex = usize;

/// Append-only record of who bid for what, and in which order.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    /// Bidders of each module, in first-bid order.
    bidders: Vec<Vec<AccountId>>,
    /// The same bidders as a set, for membership checks.
    members: Vec<HashSet<AccountId>>,
    /// Modules each student bid for, in first-bid order.
    bids: HashMap<AccountId, Vec<ModuleIndex>>,
}

impl BidBook {
    /// Open an empty bidder list for a freshly registered module.
    pub fn open(&mut self) -> ModuleIndex {
        self.bidders.push(Vec::new());
        self.members.push(HashSet::new());
        self.bidders.len() - 1
    }

    /// Record a bid. Returns `false` if the student had already bid for the
    /// module, in which case nothing changes.
    pub fn place(&mut self, student: &AccountId, module: ModuleIndex) -> bool {
        if !self.members[module].insert(student.clone()) {
            return false;
        }
        self.bidders[module].push(student.clone());
        self.bids.entry(student.clone()).or_default().push(module);
        true
    }

    pub fn bidders(&self, module: ModuleIndex) -> &[AccountId] {
        &self.bidders[module]
    }

    pub fn bids_of(&self, student: &AccountId) -> &[ModuleIndex] {
        self.bids.get(student).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bidder lists of every module, in module order.
    pub fn all_bidders(&self) -> impl Iterator<Item = &[AccountId]> {
        self.bidders.iter().map(Vec::as_slice)
    }
}
