//! # rewards vault - Reward-Bearing Share Ledger
//!
//! ## Business Process Flow
//!
//! 1. Initial Setup:
//!    - Owner picks the asset token, the vault authority account that will
//!      custody tokens, and the lock schedule (cliff + unlock duration)
//!    - Optionally configures a claim fee (receiver, basis points, token)
//!
//! 2. Deposit Flow:
//!    - Holder deposits assets (or mints an exact share amount)
//!    - Pending rewards at the old balance are banked
//!    - Shares are minted and the holder's lock window restarts
//!
//! 3. Reward Flow:
//!    - Owner adds an amount of a reward token (up to 10 distinct tokens)
//!    - The token's per-share accumulator rises; no holder is iterated
//!    - Holders claim all, some, or an exact amount of their rewards,
//!      less the configured fee and capped at what the vault holds
//!
//! 4. Withdrawal Flow:
//!    a. Nothing is withdrawable before the cliff
//!    b. The position unlocks linearly over the unlock duration
//!    c. Withdraw/redeem pays out all pending rewards, then burns shares
//!
//! Every mutating entry point runs inside one transaction boundary: a
//! reentrancy flag, a state snapshot, and a transfer journal. Any error
//! restores the state and hands back every token moved during the call.

pub mod bank;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod ledger;
pub mod lock;
pub mod processor;
pub mod rewards;
pub mod state;


use anchor_lang::prelude::*;
use bank::{TokenBank, TransferJournal};
use config::{FeeConfig, VaultConfig};
use guard::{CallContext, ReentrancyGuard};
use lock::LockPhase;
use rewards::{RewardClaim, RewardQuote};
use state::{HolderPosition, RewardStream, VaultState};

#[derive(Debug)]
pub struct RewardsVault {
    state: VaultState,
    guard: ReentrancyGuard,
}

impl RewardsVault {
    pub fn initialize(config: VaultConfig) -> Result<Self> {
        Ok(Self::from_state(processor::initialize(config)?))
    }

    pub fn from_state(state: VaultState) -> Self {
        Self {
            state,
            guard: ReentrancyGuard::default(),
        }
    }

    pub fn load(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_state(VaultState::from_bytes(bytes)?))
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        self.state.to_bytes()
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }

    /// Runs `op` with all-or-nothing semantics over both the vault state and
    /// the token bank. If the bank refuses a compensating transfer the state
    /// is still restored and the call fails with `StateCorrupted`.
    fn atomic<B, T, F>(&mut self, bank: &mut B, op: F) -> Result<T>
    where
        B: TokenBank,
        F: FnOnce(&mut VaultState, &mut TransferJournal<'_, B>) -> Result<T>,
    {
        self.guard.enter()?;
        let snapshot = self.state.clone();
        let mut journal = TransferJournal::new(bank, self.state.vault_authority);

        let result = match op(&mut self.state, &mut journal) {
            Ok(value) => {
                journal.commit();
                Ok(value)
            }
            Err(err) => {
                msg!("Operation reverted: {}", err);
                self.state = snapshot;
                journal.rollback().and(Err(err))
            }
        };

        self.guard.exit();
        result
    }

    /// Same boundary for operations that move no tokens.
    fn atomic_local<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut VaultState) -> Result<T>,
    {
        self.guard.enter()?;
        let snapshot = self.state.clone();
        let result = op(&mut self.state);
        if result.is_err() {
            self.state = snapshot;
        }
        self.guard.exit();
        result
    }

    // ========== SHARE LEDGER ==========

    /// Deposits `assets` from the caller and mints shares to `receiver`.
    /// Returns the shares minted.
    pub fn deposit<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        assets: u64,
        receiver: Pubkey,
    ) -> Result<u64> {
        self.atomic(bank, |state, journal| {
            processor::deposit(state, journal, ctx, assets, receiver)
        })
    }

    /// Mints exactly `shares` to `receiver`. Returns the assets pulled.
    pub fn mint<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        shares: u64,
        receiver: Pubkey,
    ) -> Result<u64> {
        self.atomic(bank, |state, journal| {
            processor::mint(state, journal, ctx, shares, receiver)
        })
    }

    /// Withdraws exactly `assets` of `owner`'s unlocked position. Returns the
    /// shares burned.
    pub fn withdraw<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        assets: u64,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<u64> {
        self.atomic(bank, |state, journal| {
            processor::withdraw(state, journal, ctx, assets, receiver, owner)
        })
    }

    /// Burns `shares` of `owner`'s unlocked position. Returns the assets sent.
    pub fn redeem<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        shares: u64,
        receiver: Pubkey,
        owner: Pubkey,
    ) -> Result<u64> {
        self.atomic(bank, |state, journal| {
            processor::redeem(state, journal, ctx, shares, receiver, owner)
        })
    }

    pub fn total_assets(&self) -> u64 {
        self.state.total_assets
    }

    pub fn total_shares(&self) -> u64 {
        self.state.total_shares
    }

    pub fn convert_to_shares(&self, assets: u64) -> Result<u64> {
        ledger::convert_to_shares(&self.state, assets, ledger::Rounding::Floor)
    }

    pub fn convert_to_assets(&self, shares: u64) -> Result<u64> {
        ledger::convert_to_assets(&self.state, shares, ledger::Rounding::Floor)
    }

    pub fn preview_deposit(&self, assets: u64) -> Result<u64> {
        ledger::preview_deposit(&self.state, assets)
    }

    pub fn preview_mint(&self, shares: u64) -> Result<u64> {
        ledger::preview_mint(&self.state, shares)
    }

    pub fn preview_withdraw(&self, assets: u64) -> Result<u64> {
        ledger::preview_withdraw(&self.state, assets)
    }

    pub fn preview_redeem(&self, shares: u64) -> Result<u64> {
        ledger::preview_redeem(&self.state, shares)
    }

    pub fn max_deposit(&self, _receiver: &Pubkey) -> u64 {
        ledger::max_deposit(&self.state)
    }

    pub fn max_mint(&self, _receiver: &Pubkey) -> u64 {
        ledger::max_mint(&self.state)
    }

    pub fn max_withdraw(&self, owner: &Pubkey, now: i64) -> Result<u64> {
        ledger::max_withdraw(&self.state, owner, now)
    }

    pub fn max_redeem(&self, owner: &Pubkey, now: i64) -> Result<u64> {
        ledger::max_redeem(&self.state, owner, now)
    }

    /// Assets per share scaled by 1e9.
    pub fn exchange_rate(&self) -> Result<u64> {
        ledger::exchange_rate(&self.state)
    }

    pub fn position(&self, holder: &Pubkey) -> Option<&HolderPosition> {
        self.state.position(holder)
    }

    // ========== REWARD DISTRIBUTOR ==========

    /// Owner only. Pulls `amount` of `token` from the caller and distributes
    /// it over current holders. Returns the token's new accumulator.
    pub fn add_reward<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        token: Pubkey,
        amount: u64,
    ) -> Result<u128> {
        self.atomic(bank, |state, journal| {
            processor::add_reward(state, journal, ctx, token, amount)
        })
    }

    pub fn claim_all_rewards<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        receiver: Pubkey,
    ) -> Result<Vec<RewardClaim>> {
        self.atomic(bank, |state, journal| {
            processor::claim_all_rewards(state, journal, ctx, receiver)
        })
    }

    pub fn claim_specific_rewards<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        tokens: &[Pubkey],
        receiver: Pubkey,
    ) -> Result<Vec<RewardClaim>> {
        self.atomic(bank, |state, journal| {
            processor::claim_specific_rewards(state, journal, ctx, tokens, receiver)
        })
    }

    /// Pays exactly `amount` to `receiver` after the fee. Bounded by what
    /// `get_user_reward` reports.
    pub fn claim_exact_reward<B: TokenBank>(
        &mut self,
        ctx: &CallContext,
        bank: &mut B,
        token: Pubkey,
        receiver: Pubkey,
        amount: u64,
    ) -> Result<RewardClaim> {
        self.atomic(bank, |state, journal| {
            processor::claim_exact_reward(state, journal, ctx, token, receiver, amount)
        })
    }

    /// Net reward `user` would receive for `token` if they claimed now.
    pub fn get_user_reward<B: TokenBank>(&self, bank: &B, user: &Pubkey, token: &Pubkey) -> Result<u64> {
        Ok(self.quote_reward(bank, user, token)?.net)
    }

    pub fn quote_reward<B: TokenBank>(
        &self,
        bank: &B,
        user: &Pubkey,
        token: &Pubkey,
    ) -> Result<RewardQuote> {
        let on_hand = bank.balance_of(token, &self.state.vault_authority);
        rewards::quote(&self.state, user, token, on_hand)
    }

    pub fn get_all_rewards<B: TokenBank>(&self, bank: &B, user: &Pubkey) -> Result<Vec<RewardQuote>> {
        self.state
            .reward_token_ids()
            .iter()
            .map(|token| self.quote_reward(bank, user, token))
            .collect()
    }

    pub fn reward_tokens(&self) -> &[RewardStream] {
        &self.state.reward_tokens
    }

    // ========== LOCK SCHEDULER ==========

    pub fn unlocked_of(&self, holder: &Pubkey, now: i64) -> Result<u64> {
        lock::unlocked_of(&self.state, holder, now)
    }

    pub fn locked_of(&self, holder: &Pubkey, now: i64) -> Result<u64> {
        lock::locked_of(&self.state, holder, now)
    }

    pub fn lock_phase(&self, holder: &Pubkey, now: i64) -> Option<LockPhase> {
        lock::lock_phase(&self.state, holder, now)
    }

    pub fn set_shares_lock_time(&mut self, ctx: &CallContext, new_duration: i64) -> Result<()> {
        self.atomic_local(|state| processor::set_shares_lock_time(state, ctx, new_duration))
    }

    pub fn set_lock_cliff(&mut self, ctx: &CallContext, new_cliff: i64) -> Result<()> {
        self.atomic_local(|state| processor::set_lock_cliff(state, ctx, new_cliff))
    }

    // ========== ADMINISTRATION ==========

    pub fn pause(&mut self, ctx: &CallContext, paused: bool) -> Result<()> {
        self.atomic_local(|state| processor::pause(state, ctx, paused))
    }

    pub fn update_fee_config(&mut self, ctx: &CallContext, fee: Option<FeeConfig>) -> Result<()> {
        self.atomic_local(|state| processor::update_fee_config(state, ctx, fee))
    }

    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: Pubkey) -> Result<()> {
        self.atomic_local(|state| processor::transfer_ownership(state, ctx, new_owner))
    }
}
