use anchor_lang::prelude::*;
use num_traits::ToPrimitive;

use crate::error::VaultErrorCode;
use crate::lock;
use crate::state::{VaultState, EXCHANGE_RATE_SCALE};

/*
# Share Ledger Rounding

Every conversion that decides how much the vault hands out or takes in rounds
in the vault's favor:

- deposit: shares = floor(assets * total_shares / total_assets)
- mint:    assets = ceil(shares * total_assets / total_shares)
- withdraw: shares = ceil(assets * total_shares / total_assets)
- redeem:  assets = floor(shares * total_assets / total_shares)

An empty vault (no shares outstanding) converts 1:1. The asymmetry is what
stops a holder from extracting value by cycling small deposits and
withdrawals.
 */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

pub fn mul_div(value: u64, numerator: u64, denominator: u64, rounding: Rounding) -> Result<u64> {
    require!(denominator > 0, VaultErrorCode::DivisionByZero);
    let product = (value as u128)
        .checked_mul(numerator as u128)
        .ok_or(VaultErrorCode::MathOverflow)?;
    let denominator = denominator as u128;
    let mut quotient = product / denominator;
    if rounding == Rounding::Ceil && product % denominator != 0 {
        quotient += 1;
    }
    Ok(quotient.to_u64().ok_or(VaultErrorCode::MathOverflow)?)
}

pub fn convert_to_shares(state: &VaultState, assets: u64, rounding: Rounding) -> Result<u64> {
    if state.total_shares == 0 {
        return Ok(assets);
    }
    mul_div(assets, state.total_shares, state.total_assets, rounding)
}

pub fn convert_to_assets(state: &VaultState, shares: u64, rounding: Rounding) -> Result<u64> {
    if state.total_shares == 0 {
        return Ok(shares);
    }
    mul_div(shares, state.total_assets, state.total_shares, rounding)
}

pub fn preview_deposit(state: &VaultState, assets: u64) -> Result<u64> {
    convert_to_shares(state, assets, Rounding::Floor)
}

pub fn preview_mint(state: &VaultState, shares: u64) -> Result<u64> {
    convert_to_assets(state, shares, Rounding::Ceil)
}

pub fn preview_withdraw(state: &VaultState, assets: u64) -> Result<u64> {
    convert_to_shares(state, assets, Rounding::Ceil)
}

pub fn preview_redeem(state: &VaultState, shares: u64) -> Result<u64> {
    convert_to_assets(state, shares, Rounding::Floor)
}

/// No deposit cap beyond keeping the totals inside `u64`. Zero while paused.
pub fn max_deposit(state: &VaultState) -> u64 {
    if state.paused {
        return 0;
    }
    u64::MAX - state.total_assets
}

pub fn max_mint(state: &VaultState) -> u64 {
    if state.paused {
        return 0;
    }
    u64::MAX - state.total_shares
}

pub fn max_withdraw(state: &VaultState, owner: &Pubkey, now: i64) -> Result<u64> {
    if state.paused {
        return Ok(0);
    }
    let unlocked = lock::unlocked_of(state, owner, now)?;
    let held = convert_to_assets(state, state.shares_of(owner), Rounding::Floor)?;
    Ok(unlocked.min(held))
}

pub fn max_redeem(state: &VaultState, owner: &Pubkey, now: i64) -> Result<u64> {
    if state.paused {
        return Ok(0);
    }
    let unlocked = lock::unlocked_of(state, owner, now)?;
    let unlocked_shares = convert_to_shares(state, unlocked, Rounding::Floor)?;
    Ok(unlocked_shares.min(state.shares_of(owner)))
}

/// Assets per share scaled by 1e9.
pub fn exchange_rate(state: &VaultState) -> Result<u64> {
    if state.total_shares == 0 {
        return Ok(EXCHANGE_RATE_SCALE as u64);
    }
    let rate = (state.total_assets as u128)
        .checked_mul(EXCHANGE_RATE_SCALE)
        .ok_or(VaultErrorCode::MathOverflow)?
        .checked_div(state.total_shares as u128)
        .ok_or(VaultErrorCode::DivisionByZero)?;
    Ok(rate.to_u64().ok_or(VaultErrorCode::MathOverflow)?)
}

/// Books `assets`/`shares` into the totals and the receiver's position and
/// restarts the receiver's lock window at `now`. Rewards must already be
/// checkpointed for the receiver.
pub fn credit(
    state: &mut VaultState,
    receiver: &Pubkey,
    assets: u64,
    shares: u64,
    now: i64,
) -> Result<()> {
    state.total_assets = state
        .total_assets
        .checked_add(assets)
        .ok_or(VaultErrorCode::MathOverflow)?;
    state.total_shares = state
        .total_shares
        .checked_add(shares)
        .ok_or(VaultErrorCode::MathOverflow)?;

    let position = state.holders.entry(*receiver).or_default();
    position.exists = true;
    position.shares = position
        .shares
        .checked_add(shares)
        .ok_or(VaultErrorCode::MathOverflow)?;
    position.total_locked = position
        .total_locked
        .checked_add(assets)
        .ok_or(VaultErrorCode::MathOverflow)?;
    position.deposit_ts = now;
    position.released_at_checkpoint = position.total_released;
    Ok(())
}

/// Removes `shares` from the owner and `assets` from the totals. Rewards
/// must already be settled for the owner.
pub fn debit(state: &mut VaultState, owner: &Pubkey, assets: u64, shares: u64) -> Result<()> {
    let position = state
        .holders
        .get_mut(owner)
        .ok_or(VaultErrorCode::InsufficientShares)?;
    position.shares = position
        .shares
        .checked_sub(shares)
        .ok_or(VaultErrorCode::InsufficientShares)?;
    position.total_released = position
        .total_released
        .checked_add(assets)
        .ok_or(VaultErrorCode::MathOverflow)?;
    require!(
        position.total_released <= position.total_locked,
        VaultErrorCode::ExceedsUnlocked
    );

    state.total_assets = state
        .total_assets
        .checked_sub(assets)
        .ok_or(VaultErrorCode::MathOverflow)?;
    state.total_shares = state
        .total_shares
        .checked_sub(shares)
        .ok_or(VaultErrorCode::InsufficientShares)?;
    Ok(())
}
