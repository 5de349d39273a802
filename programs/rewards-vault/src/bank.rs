use anchor_lang::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::VaultErrorCode;

/// Token custody collaborator. The vault moves assets and reward tokens only
/// through this trait; a failed transfer aborts the calling operation.
pub trait TokenBank {
    fn transfer(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64;
}

/// Balances keyed by (mint, owner). Frozen owners can neither send nor
/// receive, which is how tests force a transfer to fail mid-operation.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenBank {
    balances: BTreeMap<(Pubkey, Pubkey), u64>,
    frozen: BTreeSet<Pubkey>,
}

impl MemoryTokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint_to(&mut self, mint: &Pubkey, owner: &Pubkey, amount: u64) -> Result<()> {
        let balance = self.balances.entry((*mint, *owner)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(VaultErrorCode::MathOverflow)?;
        Ok(())
    }

    pub fn freeze(&mut self, owner: &Pubkey) {
        self.frozen.insert(*owner);
    }

    pub fn thaw(&mut self, owner: &Pubkey) {
        self.frozen.remove(owner);
    }

    pub fn supply(&self, mint: &Pubkey) -> u128 {
        self.balances
            .iter()
            .filter(|((m, _), _)| m == mint)
            .map(|(_, amount)| *amount as u128)
            .sum()
    }
}

impl TokenBank for MemoryTokenBank {
    fn transfer(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        require!(!self.frozen.contains(from), VaultErrorCode::TokenAccountFrozen);
        require!(!self.frozen.contains(to), VaultErrorCode::TokenAccountFrozen);
        if amount == 0 || from == to {
            return Ok(());
        }

        let from_balance = self.balance_of(mint, from);
        require!(from_balance >= amount, VaultErrorCode::InsufficientBalance);
        let to_balance = self
            .balance_of(mint, to)
            .checked_add(amount)
            .ok_or(VaultErrorCode::MathOverflow)?;

        self.balances.insert((*mint, *from), from_balance - amount);
        self.balances.insert((*mint, *to), to_balance);
        Ok(())
    }

    fn balance_of(&self, mint: &Pubkey, owner: &Pubkey) -> u64 {
        self.balances.get(&(*mint, *owner)).copied().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    pub mint: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

/// Records every transfer made on behalf of the vault during one operation
/// so a failed operation can hand the tokens back in reverse order.
pub struct TransferJournal<'a, B: TokenBank> {
    bank: &'a mut B,
    vault_authority: Pubkey,
    entries: Vec<TransferRecord>,
}

impl<'a, B: TokenBank> TransferJournal<'a, B> {
    pub fn new(bank: &'a mut B, vault_authority: Pubkey) -> Self {
        Self {
            bank,
            vault_authority,
            entries: Vec::new(),
        }
    }

    /// Moves `amount` of `mint` from `from` into the vault.
    pub fn pull(&mut self, mint: &Pubkey, from: &Pubkey, amount: u64) -> Result<()> {
        let to = self.vault_authority;
        self.transfer(mint, from, &to, amount)
    }

    /// Moves `amount` of `mint` out of the vault to `to`.
    pub fn push(&mut self, mint: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        let from = self.vault_authority;
        self.transfer(mint, &from, to, amount)
    }

    pub fn on_hand(&self, mint: &Pubkey) -> u64 {
        self.bank.balance_of(mint, &self.vault_authority)
    }

    pub fn entries(&self) -> &[TransferRecord] {
        &self.entries
    }

    fn transfer(&mut self, mint: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.bank.transfer(mint, from, to, amount)?;
        self.entries.push(TransferRecord {
            mint: *mint,
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    pub fn commit(self) -> usize {
        self.entries.len()
    }

    /// Reverses every recorded transfer, newest first. All of them are
    /// attempted; if any fails the bank no longer matches the restored state
    /// and the failed records are reported through `StateCorrupted`.
    pub fn rollback(self) -> Result<()> {
        let mut failed = Vec::new();
        for entry in self.entries.iter().rev() {
            if let Err(err) = self
                .bank
                .transfer(&entry.mint, &entry.to, &entry.from, entry.amount)
            {
                msg!(
                    "Compensating transfer of {} {} from {} failed: {}",
                    entry.amount,
                    entry.mint,
                    entry.to,
                    err
                );
                failed.push(*entry);
            }
        }
        if !failed.is_empty() {
            msg!("{} of {} compensating transfers failed", failed.len(), self.entries.len());
            return Err(error!(VaultErrorCode::StateCorrupted));
        }
        Ok(())
    }
}
