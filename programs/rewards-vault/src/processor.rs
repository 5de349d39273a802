use crate::bank::{TokenBank, TransferJournal};
use crate::config::{validate_lock_period, FeeConfig, VaultConfig};
use crate::error::*;
use crate::events::*;
use crate::guard::{advance_clock, validate_holder, validate_owner, CallContext};
use crate::ledger;
use crate::rewards::{self, RewardClaim};
use crate::state::VaultState;
use anchor_lang::prelude::*;
use std::collections::BTreeMap;

/*
# Entry Point Ordering

deposit / mint:
  validate -> pull assets from caller -> bank receiver rewards at the old
  balance -> mint shares -> restart receiver lock window

withdraw / redeem:
  validate against the unlocked ceiling -> pay out (or bank) every reward
  stream of the owner at the old balance -> push assets -> burn shares

add_reward:
  validate -> pull reward tokens -> raise the accumulator

Handlers assume they run inside the transaction boundary in lib.rs: any
error they return discards every state change and token transfer made so
far, so validation may be interleaved with mutation.
 */

pub fn initialize(config: VaultConfig) -> Result<VaultState> {
    config.validate()?;
    msg!(
        "Initializing vault for asset {} with cliff {}s and unlock {}s",
        config.asset,
        config.lock_cliff,
        config.unlock_duration
    );
    Ok(VaultState {
        asset: config.asset,
        vault_authority: config.vault_authority,
        owner: config.owner,
        total_assets: 0,
        total_shares: 0,
        lock_cliff: config.lock_cliff,
        unlock_duration: config.unlock_duration,
        fee: config.fee,
        reward_dust_floor: config.reward_dust_floor,
        paused: false,
        last_update_ts: 0,
        reward_tokens: Vec::new(),
        holders: BTreeMap::new(),
    })
}

pub fn pause(state: &mut VaultState, ctx: &CallContext, paused: bool) -> Result<()> {
    validate_owner(state, &ctx.caller)?;
    advance_clock(state, ctx.now)?;
    state.paused = paused;

    msg!("Protocol paused: {}", paused);
    emit!(PauseUpdated {
        admin: ctx.caller,
        paused,
    });
    Ok(())
}

pub fn transfer_ownership(state: &mut VaultState, ctx: &CallContext, new_owner: Pubkey) -> Result<()> {
    validate_owner(state, &ctx.caller)?;
    require_keys_neq!(new_owner, Pubkey::default(), VaultErrorCode::InvalidConfig);
    advance_clock(state, ctx.now)?;
    let previous_owner = state.owner;
    state.owner = new_owner;

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner,
    });
    Ok(())
}

/// Changes the unlock duration vault-wide. Holders mid-vest move to the new
/// curve immediately; elapsed time is not grandfathered.
pub fn set_shares_lock_time(state: &mut VaultState, ctx: &CallContext, new_duration: i64) -> Result<()> {
    validate_owner(state, &ctx.caller)?;
    validate_lock_period(new_duration)?;
    advance_clock(state, ctx.now)?;
    let old_duration = state.unlock_duration;
    state.unlock_duration = new_duration;

    msg!("Unlock duration updated: {} -> {}", old_duration, new_duration);
    emit!(LockPeriodUpdated {
        admin: ctx.caller,
        old_cliff: state.lock_cliff,
        new_cliff: state.lock_cliff,
        old_duration,
        new_duration,
    });
    Ok(())
}

pub fn set_lock_cliff(state: &mut VaultState, ctx: &CallContext, new_cliff: i64) -> Result<()> {
    validate_owner(state, &ctx.caller)?;
    validate_lock_period(new_cliff)?;
    advance_clock(state, ctx.now)?;
    let old_cliff = state.lock_cliff;
    state.lock_cliff = new_cliff;

    msg!("Lock cliff updated: {} -> {}", old_cliff, new_cliff);
    emit!(LockPeriodUpdated {
        admin: ctx.caller,
        old_cliff,
        new_cliff,
        old_duration: state.unlock_duration,
        new_duration: state.unlock_duration,
    });
    Ok(())
}

pub fn update_fee_config(state: &mut VaultState, ctx: &CallContext, fee: Option<FeeConfig>) -> Result<()> {
    validate_owner(state, &ctx.caller)?;
    if let Some(fee) = &fee {
        fee.validate()?;
    }
    advance_clock(state, ctx.now)?;
    state.fee = fee;

    emit!(FeeConfigUpdated {
        admin: ctx.caller,
        receiver: fee.map(|f| f.receiver),
        fee_bps: fee.map(|f| f.fee_bps).unwrap_or(0),
        token: fee.and_then(|f| f.token),
    });
    Ok(())
}

pub fn deposit<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    assets: u64,
    receiver: Pubkey,
) -> Result<u64> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(assets > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    require!(
        assets <= ledger::max_deposit(state),
        VaultErrorCode::ExceedsMaxDeposit
    );
    advance_clock(state, ctx.now)?;

    msg!("Current total_assets: {}", state.total_assets);
    msg!("Current total_shares: {}", state.total_shares);
    msg!("Deposit amount: {}", assets);

    let shares = ledger::preview_deposit(state, assets)?;
    msg!("Shares to mint calculated: {}", shares);
    require!(shares > 0, VaultErrorCode::ZeroShares);

    enter_position(state, bank, ctx, receiver, assets, shares)?;
    Ok(shares)
}

pub fn mint<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    shares: u64,
    receiver: Pubkey,
) -> Result<u64> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(shares > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    require!(shares <= ledger::max_mint(state), VaultErrorCode::ExceedsMaxDeposit);
    advance_clock(state, ctx.now)?;

    let assets = ledger::preview_mint(state, shares)?;
    msg!("Mint {} shares for {} assets", shares, assets);
    require!(assets > 0, VaultErrorCode::ZeroAssets);
    require!(
        assets <= ledger::max_deposit(state),
        VaultErrorCode::ExceedsMaxDeposit
    );

    enter_position(state, bank, ctx, receiver, assets, shares)?;
    Ok(assets)
}

fn enter_position<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    receiver: Pubkey,
    assets: u64,
    shares: u64,
) -> Result<()> {
    let asset = state.asset;
    bank.pull(&asset, &ctx.caller, assets)?;

    rewards::checkpoint_holder(state, &receiver)?;
    ledger::credit(state, &receiver, assets, shares, ctx.now)?;

    emit!(DepositEvent {
        caller: ctx.caller,
        receiver,
        assets,
        shares,
        total_assets: state.total_assets,
        total_shares: state.total_shares,
        lock_checkpoint: ctx.now,
    });
    Ok(())
}

pub fn withdraw<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    assets: u64,
    receiver: Pubkey,
    owner: Pubkey,
) -> Result<u64> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(assets > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    validate_holder(&ctx.caller, &owner)?;
    advance_clock(state, ctx.now)?;

    let max_assets = ledger::max_withdraw(state, &owner, ctx.now)?;
    msg!("Withdraw {} assets, unlocked ceiling {}", assets, max_assets);
    require!(assets <= max_assets, VaultErrorCode::ExceedsUnlocked);

    let shares = ledger::preview_withdraw(state, assets)?;
    msg!("Shares to burn calculated: {}", shares);
    require!(shares > 0, VaultErrorCode::ZeroShares);
    require!(
        shares <= state.shares_of(&owner),
        VaultErrorCode::InsufficientShares
    );

    exit_position(state, bank, ctx, receiver, owner, assets, shares)?;
    Ok(shares)
}

pub fn redeem<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    shares: u64,
    receiver: Pubkey,
    owner: Pubkey,
) -> Result<u64> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(shares > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    validate_holder(&ctx.caller, &owner)?;
    advance_clock(state, ctx.now)?;

    let max_shares = ledger::max_redeem(state, &owner, ctx.now)?;
    msg!("Redeem {} shares, unlocked ceiling {}", shares, max_shares);
    require!(shares <= max_shares, VaultErrorCode::ExceedsUnlocked);

    let assets = ledger::preview_redeem(state, shares)?;
    msg!("Amount to withdraw calculated: {}", assets);
    require!(assets > 0, VaultErrorCode::ZeroAssets);

    exit_position(state, bank, ctx, receiver, owner, assets, shares)?;
    Ok(assets)
}

fn exit_position<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    receiver: Pubkey,
    owner: Pubkey,
    assets: u64,
    shares: u64,
) -> Result<()> {
    // rewards earned on the shares about to burn go to the owner first
    let tokens = state.reward_token_ids();
    for token in tokens.iter() {
        settle_reward(state, bank, &owner, token, &owner, None)?;
    }

    let asset = state.asset;
    bank.push(&asset, &receiver, assets)?;
    ledger::debit(state, &owner, assets, shares)?;

    emit!(WithdrawEvent {
        caller: ctx.caller,
        receiver,
        owner,
        assets,
        shares,
        total_assets: state.total_assets,
        total_shares: state.total_shares,
        totals_last_update_ts: ctx.now,
    });
    Ok(())
}

pub fn add_reward<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    token: Pubkey,
    amount: u64,
) -> Result<u128> {
    validate_owner(state, &ctx.caller)?;
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(amount > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(token, Pubkey::default(), VaultErrorCode::InvalidRewardToken);
    require_keys_neq!(token, state.asset, VaultErrorCode::RewardTokenIsAsset);
    require!(state.total_assets > 0, VaultErrorCode::NoDepositors);
    rewards::ensure_registrable(state, &token)?;
    advance_clock(state, ctx.now)?;

    let delta = rewards::reward_per_share_delta(amount, state.total_assets)?;
    msg!("Reward per share delta calculated: {}", delta);
    require!(delta > 0, VaultErrorCode::RewardTooSmall);

    bank.pull(&token, &ctx.caller, amount)?;
    let (reward_per_share, new_stream) = rewards::accrue(state, &token, amount, delta)?;

    msg!("Publishing {} of reward token {}", amount, token);
    emit!(RewardAdded {
        admin: ctx.caller,
        token,
        amount,
        reward_per_share,
        total_assets: state.total_assets,
        new_stream,
        totals_last_update_ts: ctx.now,
    });
    Ok(reward_per_share)
}

/// Claims every registered stream for the caller. Only streams that paid
/// something appear in the result.
pub fn claim_all_rewards<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    receiver: Pubkey,
) -> Result<Vec<RewardClaim>> {
    let tokens = state.reward_token_ids();
    claim_specific_rewards(state, bank, ctx, &tokens, receiver)
}

pub fn claim_specific_rewards<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    tokens: &[Pubkey],
    receiver: Pubkey,
) -> Result<Vec<RewardClaim>> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    advance_clock(state, ctx.now)?;

    let mut claims = Vec::with_capacity(tokens.len());
    for token in tokens {
        let claim = settle_reward(state, bank, &ctx.caller, token, &receiver, None)?;
        if claim.amount > 0 {
            claims.push(claim);
        }
    }
    Ok(claims)
}

pub fn claim_exact_reward<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    ctx: &CallContext,
    token: Pubkey,
    receiver: Pubkey,
    amount: u64,
) -> Result<RewardClaim> {
    require!(!state.paused, VaultErrorCode::ProtocolPaused);
    require!(amount > 0, VaultErrorCode::InvalidAmount);
    require_keys_neq!(receiver, Pubkey::default(), VaultErrorCode::InvalidReceiver);
    advance_clock(state, ctx.now)?;

    settle_reward(state, bank, &ctx.caller, &token, &receiver, Some(amount))
}

/// Pays `holder`'s reward for `token` to `receiver`: the whole available
/// amount, or exactly `requested` after the fee. The fee goes to the fee
/// receiver and whatever is left of the entitlement stays banked.
fn settle_reward<B: TokenBank>(
    state: &mut VaultState,
    bank: &mut TransferJournal<'_, B>,
    holder: &Pubkey,
    token: &Pubkey,
    receiver: &Pubkey,
    requested: Option<u64>,
) -> Result<RewardClaim> {
    let quote = rewards::quote(state, holder, token, bank.on_hand(token))?;
    let amount = match requested {
        Some(net) => {
            require!(net <= quote.net, VaultErrorCode::InsufficientReward);
            rewards::gross_for_net(state, token, net)?
        }
        None => quote.available,
    };

    let (fee, fee_receiver) = rewards::fee_for(state, token, amount)?;
    let net = amount - fee;
    let banked_remaining = rewards::record_claim(state, holder, token, quote.entitled, amount)?;

    if amount > 0 {
        bank.push(token, receiver, net)?;
        if let Some(fee_receiver) = fee_receiver {
            bank.push(token, &fee_receiver, fee)?;
        }
        msg!("Claimed {} of {} for {} (fee {})", amount, token, holder, fee);
        emit!(RewardClaimed {
            holder: *holder,
            receiver: *receiver,
            token: *token,
            amount,
            fee,
            banked_remaining,
        });
    }

    Ok(RewardClaim {
        token: *token,
        amount,
        fee,
        net,
        banked_remaining,
    })
}
