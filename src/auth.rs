// 3.0 auth.rs: the authorization gate seam. the gate only answers "is this caller
// the vault's manager"; the borrower check is an identity comparison the engine
// does itself against stored state.

use crate::types::AccountId;

pub trait AuthorizationGate {
    fn is_manager(&self, caller: AccountId) -> bool;
}

// one manager per vault. covers every current deployment shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleManager {
    manager: AccountId,
}

impl SingleManager {
    pub fn new(manager: AccountId) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> AccountId {
        self.manager
    }
}

impl AuthorizationGate for SingleManager {
    fn is_manager(&self, caller: AccountId) -> bool {
        caller == self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_manager_gate() {
        let gate = SingleManager::new(AccountId(5));

        assert!(gate.is_manager(AccountId(5)));
        assert!(!gate.is_manager(AccountId(6)));
        assert!(!gate.is_manager(AccountId::EMPTY));
    }
}
