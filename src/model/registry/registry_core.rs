use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{AccountId, ModuleCode},
    ledger::StakeLedger,
};

use super::{
    allocation::{select_winners, Allocation, ModuleAllocation},
    bid_book::{BidBook, ModuleIndex},
};

/// A module offered for bidding. Immutable once registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub code: ModuleCode,
    /// Maximum number of students the module is allocated to.
    pub quota: u32,
}

/// Module registry, bid book and allocation table of one allocator instance.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    owner: AccountId,
    modules: Vec<Module>,
    index: HashMap<ModuleCode, ModuleIndex>,
    book: BidBook,
    allocation: Allocation,
}

impl ModuleRegistry {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            modules: Vec::new(),
            index: HashMap::new(),
            book: BidBook::default(),
            allocation: Allocation::default(),
        }
    }

    /// Registered modules, in registration order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Register a batch of modules. Either every module in the batch is
    /// registered or, on any error, none is.
    pub fn register_modules(&mut self, caller: &AccountId, batch: &[Module]) -> Result<()> {
        self.ensure_owner(caller)?;

        let mut seen = HashSet::with_capacity(batch.len());
        for module in batch {
            if module.quota == 0 {
                return Err(Error::InvalidQuota(module.code));
            }
            if self.index.contains_key(&module.code) || !seen.insert(module.code) {
                return Err(Error::DuplicateModule(module.code));
            }
        }

        for module in batch {
            let position = self.book.open();
            debug_assert_eq!(position, self.modules.len());
            self.index.insert(module.code, position);
            self.modules.push(*module);
            info!("Registered module {} with quota {}", module.code, module.quota);
        }
        Ok(())
    }

    /// Bid for a module. Bidding again for the same module is a no-op and
    /// keeps the original queue position.
    pub fn bid(&mut self, student: &AccountId, code: &ModuleCode) -> Result<()> {
        let module = self.lookup(code)?;
        if self.book.place(student, module) {
            debug!("{student} bid for {code}");
        } else {
            debug!("{student} already bid for {code}");
        }
        Ok(())
    }

    pub fn module_quota(&self, code: &ModuleCode) -> Result<u32> {
        let module = self.lookup(code)?;
        Ok(self.modules[module].quota)
    }

    /// Modules the student bid for, in first-bid order.
    pub fn bid_modules(&self, student: &AccountId) -> Vec<ModuleCode> {
        self.codes(self.book.bids_of(student))
    }

    /// Modules allocated to the student by the latest allocation run, in
    /// module processing order.
    pub fn allocated_modules(&self, student: &AccountId) -> Vec<ModuleCode> {
        self.codes(self.allocation.won_by(student))
    }

    /// Recompute the allocation of every module from the current bids and
    /// live stake balances, replacing the previous table.
    pub fn allocate<L>(&mut self, caller: &AccountId, ledger: &L) -> Result<Vec<ModuleAllocation>>
    where
        L: StakeLedger + ?Sized,
    {
        self.ensure_owner(caller)?;

        // Snapshot every stake before touching the table.
        let winners = self
            .modules
            .iter()
            .zip(self.book.all_bidders())
            .map(|(module, bidders)| {
                let stakes = bidders
                    .iter()
                    .map(|bidder| ledger.balance_of(bidder))
                    .collect::<Vec<_>>();
                select_winners(&stakes, module.quota as usize)
                    .into_iter()
                    .map(|position| bidders[position].clone())
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        self.allocation = Allocation::from_winners(winners);
        let table = self.allocation_table();
        let seats: usize = table.iter().map(|entry| entry.allocated.len()).sum();
        info!(
            "Allocated {seats} seats across {} modules",
            self.modules.len()
        );
        Ok(table)
    }

    /// The current allocation table, one entry per module in processing
    /// order.
    pub fn allocation_table(&self) -> Vec<ModuleAllocation> {
        self.modules
            .iter()
            .enumerate()
            .map(|(position, module)| ModuleAllocation {
                code: module.code,
                quota: module.quota,
                bidders: self.book.bidders(position).to_vec(),
                allocated: self.allocation.winners(position).to_vec(),
            })
            .collect()
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.owner {
            return Err(Error::OwnerOnly);
        }
        Ok(())
    }

    fn lookup(&self, code: &ModuleCode) -> Result<ModuleIndex> {
        self.index
            .get(code)
            .copied()
            .ok_or(Error::ModuleNotFound(*code))
    }

    fn codes(&self, modules: &[ModuleIndex]) -> Vec<ModuleCode> {
        modules
            .iter()
            .map(|&module| self.modules[module].code)
            .collect()
    }
}
