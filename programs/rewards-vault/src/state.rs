use anchor_lang::prelude::*;
use std::collections::BTreeMap;

use crate::config::FeeConfig;

pub const MAX_REWARD_TOKENS: usize = 10; // max number of registered reward streams
pub const MAX_LOCK_PERIOD: i64 = 31536000; // 365 days in seconds
pub const MAX_FEE_BPS: u16 = 10_000;
pub const BPS_DENOMINATOR: u128 = 10_000;
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000; // 1e18 fixed point
pub const EXCHANGE_RATE_SCALE: u128 = 1_000_000_000; // 1e9

/// Root record of the vault. Owned exclusively by `RewardsVault`; every
/// mutation goes through a processor handler.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct VaultState {
    pub asset: Pubkey,
    pub vault_authority: Pubkey,
    pub owner: Pubkey,
    pub total_assets: u64,
    pub total_shares: u64,
    pub lock_cliff: i64,
    pub unlock_duration: i64,
    pub fee: Option<FeeConfig>,
    pub reward_dust_floor: bool,
    pub paused: bool,
    pub last_update_ts: i64,
    pub reward_tokens: Vec<RewardStream>,
    pub holders: BTreeMap<Pubkey, HolderPosition>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq)]
pub struct HolderPosition {
    pub shares: u64,
    pub total_locked: u64,   // cumulative assets deposited
    pub total_released: u64, // cumulative assets withdrawn
    pub deposit_ts: i64,     // lock checkpoint, reset on every deposit
    pub released_at_checkpoint: u64, // total_released when deposit_ts was last reset
    pub exists: bool,
    pub rewards: BTreeMap<Pubkey, RewardCheckpoint>,
}

impl HolderPosition {
    /// Assets still held in the vault for this position.
    pub fn currently_locked(&self) -> u64 {
        self.total_locked.saturating_sub(self.total_released)
    }

    /// Balance the current lock window vests over: everything held when the
    /// checkpoint was last reset.
    pub fn vesting_base(&self) -> u64 {
        self.total_locked.saturating_sub(self.released_at_checkpoint)
    }

    /// Assets withdrawn since the checkpoint; they count against what has vested.
    pub fn released_since_checkpoint(&self) -> u64 {
        self.total_released.saturating_sub(self.released_at_checkpoint)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct RewardStream {
    pub token: Pubkey,
    pub reward_per_share: u128, // scaled by REWARD_PRECISION, only grows
    pub exists: bool,           // inactive streams are hidden until rewarded again
    pub total_added: u64,
    pub total_claimed: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardCheckpoint {
    pub last_reward_per_share: u128,
    pub banked: u64,
}

impl VaultState {
    pub fn position(&self, holder: &Pubkey) -> Option<&HolderPosition> {
        self.holders.get(holder)
    }

    pub fn shares_of(&self, holder: &Pubkey) -> u64 {
        self.position(holder).map(|p| p.shares).unwrap_or(0)
    }

    pub fn stream(&self, token: &Pubkey) -> Option<&RewardStream> {
        self.reward_tokens
            .iter()
            .find(|s| s.exists && s.token == *token)
    }

    /// Active streams, in registration order.
    pub fn reward_token_ids(&self) -> Vec<Pubkey> {
        self.reward_tokens
            .iter()
            .filter(|s| s.exists)
            .map(|s| s.token)
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)
            .map_err(|_| error!(crate::error::VaultErrorCode::StateCorrupted))?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::try_from_slice(bytes).map_err(|_| error!(crate::error::VaultErrorCode::StateCorrupted))
    }
}
