use anchor_lang::prelude::*;

#[event]
pub struct DepositEvent {
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub lock_checkpoint: i64,
}

#[event]
pub struct WithdrawEvent {
    pub caller: Pubkey,
    pub receiver: Pubkey,
    pub owner: Pubkey,
    pub assets: u64,
    pub shares: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub totals_last_update_ts: i64,
}

#[event]
pub struct RewardAdded {
    pub admin: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
    pub reward_per_share: u128,
    pub total_assets: u64,
    pub new_stream: bool,
    pub totals_last_update_ts: i64,
}

#[event]
pub struct RewardClaimed {
    pub holder: Pubkey,
    pub receiver: Pubkey,
    pub token: Pubkey,
    pub amount: u64,
    pub fee: u64,
    pub banked_remaining: u64,
}

#[event]
pub struct LockPeriodUpdated {
    pub admin: Pubkey,
    pub old_cliff: i64,
    pub new_cliff: i64,
    pub old_duration: i64,
    pub new_duration: i64,
}

#[event]
pub struct FeeConfigUpdated {
    pub admin: Pubkey,
    pub receiver: Option<Pubkey>,
    pub fee_bps: u16,
    pub token: Option<Pubkey>,
}

#[event]
pub struct PauseUpdated {
    pub admin: Pubkey,
    pub paused: bool,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}
