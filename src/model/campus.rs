use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::{
    common::{AccountId, Amount, ElectionId, RegistryId},
    election::{Election, ElectionSpec, RewardReport, Vote},
    ledger::InMemoryLedger,
    registry::{ModuleAllocation, ModuleRegistry},
};

/// The campus behind a single lock. Holding the lock is what totally orders
/// every operation.
pub type SharedCampus = Mutex<Campus>;

/// Every deployed allocator and election instance, plus the ledger they
/// share.
#[derive(Debug, Default)]
pub struct Campus {
    ledger: InMemoryLedger,
    registries: Vec<ModuleRegistry>,
    elections: Vec<Election>,
}

impl Campus {
    pub fn new(ledger: InMemoryLedger) -> Self {
        Self {
            ledger,
            ..Default::default()
        }
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn deploy_registry(&mut self, owner: AccountId) -> RegistryId {
        self.registries.push(ModuleRegistry::new(owner));
        (self.registries.len() - 1) as RegistryId
    }

    pub fn deploy_election(&mut self, owner: AccountId, spec: ElectionSpec) -> Result<ElectionId> {
        let id = self.elections.len() as ElectionId;
        let election = Election::new(owner, AccountId::for_election(id), spec)?;
        self.elections.push(election);
        Ok(id)
    }

    pub fn registry(&self, id: RegistryId) -> Result<&ModuleRegistry> {
        self.registries
            .get(id as usize)
            .ok_or_else(|| Error::not_found(format!("Module registry {id}")))
    }

    pub fn registry_mut(&mut self, id: RegistryId) -> Result<&mut ModuleRegistry> {
        self.registries
            .get_mut(id as usize)
            .ok_or_else(|| Error::not_found(format!("Module registry {id}")))
    }

    pub fn election(&self, id: ElectionId) -> Result<&Election> {
        self.elections
            .get(id as usize)
            .ok_or_else(|| Error::not_found(format!("Election {id}")))
    }

    pub fn election_mut(&mut self, id: ElectionId) -> Result<&mut Election> {
        self.elections
            .get_mut(id as usize)
            .ok_or_else(|| Error::not_found(format!("Election {id}")))
    }

    pub fn allocate(&mut self, id: RegistryId, caller: &AccountId) -> Result<Vec<ModuleAllocation>> {
        let registry = self
            .registries
            .get_mut(id as usize)
            .ok_or_else(|| Error::not_found(format!("Module registry {id}")))?;
        registry.allocate(caller, &self.ledger)
    }

    pub fn vote(&mut self, id: ElectionId, voter: &AccountId, option_index: usize) -> Result<Vote> {
        let (election, ledger) = self.election_with_ledger(id)?;
        election.vote(voter, option_index, &*ledger)
    }

    pub fn issue_voting_reward(&mut self, id: ElectionId, caller: &AccountId) -> Result<RewardReport> {
        let (election, ledger) = self.election_with_ledger(id)?;
        election.issue_voting_reward(caller, ledger)
    }

    pub fn withdraw(&mut self, id: ElectionId, caller: &AccountId) -> Result<Amount> {
        let (election, ledger) = self.election_with_ledger(id)?;
        election.withdraw(caller, ledger)
    }

    fn election_with_ledger(
        &mut self,
        id: ElectionId,
    ) -> Result<(&mut Election, &mut InMemoryLedger)> {
        let election = self
            .elections
            .get_mut(id as usize)
            .ok_or_else(|| Error::not_found(format!("Election {id}")))?;
        Ok((election, &mut self.ledger))
    }
}
