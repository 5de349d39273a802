use anchor_lang::prelude::*;

use crate::error::VaultErrorCode;
use crate::state::{MAX_FEE_BPS, MAX_LOCK_PERIOD};

/// Fee taken from rewards at claim time. `token = None` charges every
/// reward stream, `Some(t)` only stream `t`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq)]
pub struct FeeConfig {
    pub receiver: Pubkey,
    pub fee_bps: u16,
    pub token: Option<Pubkey>,
}

impl FeeConfig {
    pub fn validate(&self) -> Result<()> {
        require_keys_neq!(self.receiver, Pubkey::default(), VaultErrorCode::InvalidFeeConfig);
        require!(self.fee_bps <= MAX_FEE_BPS, VaultErrorCode::InvalidFeeConfig);
        if let Some(token) = self.token {
            require_keys_neq!(token, Pubkey::default(), VaultErrorCode::InvalidFeeConfig);
        }
        Ok(())
    }

    pub fn applies_to(&self, token: &Pubkey) -> bool {
        self.token.map_or(true, |t| t == *token)
    }
}

/// Parameters accepted by `RewardsVault::initialize`:
/// - asset: the token users deposit
/// - owner: the account allowed to add rewards and change settings
/// - vault_authority: the bank account holding deposits and reward tokens
/// - lock_cliff / unlock_duration: seconds, each within `0..=MAX_LOCK_PERIOD`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct VaultConfig {
    pub asset: Pubkey,
    pub owner: Pubkey,
    pub vault_authority: Pubkey,
    pub lock_cliff: i64,
    pub unlock_duration: i64,
    pub fee: Option<FeeConfig>,
    pub reward_dust_floor: bool,
}

impl VaultConfig {
    pub fn new(asset: Pubkey, owner: Pubkey, vault_authority: Pubkey) -> Self {
        Self {
            asset,
            owner,
            vault_authority,
            lock_cliff: 0,
            unlock_duration: 0,
            fee: None,
            reward_dust_floor: false,
        }
    }

    pub fn with_lock(mut self, lock_cliff: i64, unlock_duration: i64) -> Self {
        self.lock_cliff = lock_cliff;
        self.unlock_duration = unlock_duration;
        self
    }

    pub fn with_fee(mut self, fee: FeeConfig) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn with_reward_dust_floor(mut self, enabled: bool) -> Self {
        self.reward_dust_floor = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_keys_neq!(self.asset, Pubkey::default(), VaultErrorCode::InvalidConfig);
        require_keys_neq!(self.owner, Pubkey::default(), VaultErrorCode::InvalidConfig);
        require_keys_neq!(
            self.vault_authority,
            Pubkey::default(),
            VaultErrorCode::InvalidConfig
        );
        require_keys_neq!(self.asset, self.vault_authority, VaultErrorCode::InvalidConfig);
        validate_lock_period(self.lock_cliff)?;
        validate_lock_period(self.unlock_duration)?;
        if let Some(fee) = &self.fee {
            fee.validate()?;
        }
        Ok(())
    }
}

pub fn validate_lock_period(period: i64) -> Result<()> {
    require!(period >= 0, VaultErrorCode::InvalidLockPeriod);
    require!(period <= MAX_LOCK_PERIOD, VaultErrorCode::InvalidLockPeriod);
    Ok(())
}
