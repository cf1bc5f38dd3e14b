use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::common::{AccountId, Amount, ModuleCode};

use super::bid_book::ModuleIndex;

/// Pick the winners of one module.
///
/// `stakes[i]` is the live stake of the `i`th bidder in first-bid order.
/// Bidders are ranked by stake, highest first, with the earlier bidder
/// winning ties; the first `quota` of that ranking win. Returns bidder
/// positions in rank order.
pub fn select_winners(stakes: &[Amount], quota: usize) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..stakes.len()).collect();
    // Stable sort, so equal stakes stay in first-bid order.
    ranked.sort_by_key(|&position| Reverse(stakes[position]));
    ranked.truncate(quota);
    ranked
}

/// The current allocation table of a registry.
#[derive(Debug, Clone, Default)]
pub struct Allocation {
    /// Winners of each module, in rank order.
    winners: Vec<Vec<AccountId>>,
    /// Modules each student won, in module order.
    won: HashMap<AccountId, Vec<ModuleIndex>>,
}

impl Allocation {
    /// Build a table from per-module winner lists, given in module order.
    pub fn from_winners(winners: Vec<Vec<AccountId>>) -> Self {
        let mut won: HashMap<AccountId, Vec<ModuleIndex>> = HashMap::new();
        for (module, module_winners) in winners.iter().enumerate() {
            for student in module_winners {
                won.entry(student.clone()).or_default().push(module);
            }
        }
        Self { winners, won }
    }

    /// Winners of `module`; empty until the first allocation run.
    pub fn winners(&self, module: ModuleIndex) -> &[AccountId] {
        self.winners
            .get(module)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn won_by(&self, student: &AccountId) -> &[ModuleIndex] {
        self.won.get(student).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Outcome for a single module, as reported after an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAllocation {
    pub code: ModuleCode,
    pub quota: u32,
    /// All bidders, in first-bid order.
    pub bidders: Vec<AccountId>,
    /// Winning bidders, in rank order.
    pub allocated: Vec<AccountId>,
}
