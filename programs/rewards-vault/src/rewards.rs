use anchor_lang::prelude::*;
use num_traits::ToPrimitive;

use crate::error::VaultErrorCode;
use crate::state::{
    RewardCheckpoint, RewardStream, VaultState, BPS_DENOMINATOR, MAX_REWARD_TOKENS,
    REWARD_PRECISION,
};

/*
# Reward Accumulators

Each reward token keeps one global `reward_per_share` accumulator. Adding
`amount` when the vault holds `total_assets` raises it by
`amount * 1e18 / total_assets`; holders are never iterated.

A holder's entitlement for a token is

    (reward_per_share - checkpoint.last_reward_per_share) * shares / 1e18
        + checkpoint.banked

Any operation that changes a holder's share balance first moves the
checkpoint to the current accumulator, either paying the entitlement out
or banking it. Skipping that step would apply the new balance to rewards
accrued under the old one.
 */

/// What a holder could claim for one token right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardQuote {
    pub token: Pubkey,
    /// Accrued plus banked, before the on-hand cap.
    pub entitled: u64,
    /// `entitled` capped by the vault's on-hand balance of the token.
    pub available: u64,
    pub fee: u64,
    pub net: u64,
}

/// One paid-out reward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardClaim {
    pub token: Pubkey,
    pub amount: u64,
    pub fee: u64,
    pub net: u64,
    pub banked_remaining: u64,
}

pub fn reward_per_share_delta(amount: u64, total_assets: u64) -> Result<u128> {
    require!(total_assets > 0, VaultErrorCode::NoDepositors);
    Ok((amount as u128)
        .checked_mul(REWARD_PRECISION)
        .ok_or(VaultErrorCode::MathOverflow)?
        .checked_div(total_assets as u128)
        .ok_or(VaultErrorCode::DivisionByZero)?)
}

/// Floor of `(reward_per_share - last) * shares / 1e18`.
pub fn accrued(reward_per_share: u128, last: u128, shares: u64) -> Result<u64> {
    let delta = reward_per_share
        .checked_sub(last)
        .ok_or(VaultErrorCode::MathOverflow)?;
    // split so large accumulators don't overflow the product
    let whole = (delta / REWARD_PRECISION)
        .checked_mul(shares as u128)
        .ok_or(VaultErrorCode::MathOverflow)?;
    let fraction = (delta % REWARD_PRECISION)
        .checked_mul(shares as u128)
        .ok_or(VaultErrorCode::MathOverflow)?
        / REWARD_PRECISION;
    let total = whole.checked_add(fraction).ok_or(VaultErrorCode::MathOverflow)?;
    Ok(total.to_u64().ok_or(VaultErrorCode::MathOverflow)?)
}

/// The optional one-unit floor: a holder with shares and a positive
/// accumulator delta whose entitlement floors to zero is owed one unit.
/// Triggers only when `0 < delta * shares < 1e18` and nothing is banked.
pub fn apply_dust_floor(entitled: u64, delta: u128, shares: u64, enabled: bool) -> u64 {
    if enabled && entitled == 0 && delta > 0 && shares > 0 {
        return 1;
    }
    entitled
}

/// Size of the fee on `amount` of `token` and who receives it.
pub fn fee_for(state: &VaultState, token: &Pubkey, amount: u64) -> Result<(u64, Option<Pubkey>)> {
    let fee = match &state.fee {
        Some(fee) if fee.applies_to(token) && fee.fee_bps > 0 => fee,
        _ => return Ok((0, None)),
    };
    let cut = (amount as u128)
        .checked_mul(fee.fee_bps as u128)
        .ok_or(VaultErrorCode::MathOverflow)?
        / BPS_DENOMINATOR;
    Ok((cut.to_u64().ok_or(VaultErrorCode::MathOverflow)?, Some(fee.receiver)))
}

/// Smallest gross claim of `token` whose after-fee amount is `net`.
pub fn gross_for_net(state: &VaultState, token: &Pubkey, net: u64) -> Result<u64> {
    let fee_bps = match &state.fee {
        Some(fee) if fee.applies_to(token) && fee.fee_bps > 0 => fee.fee_bps as u128,
        _ => return Ok(net),
    };
    if net == 0 {
        return Ok(0);
    }
    let kept_bps = BPS_DENOMINATOR
        .checked_sub(fee_bps)
        .filter(|kept| *kept > 0)
        .ok_or(VaultErrorCode::InsufficientReward)?;
    // gross - floor(gross * bps / 10_000) >= net
    let gross = ((net as u128 - 1) * BPS_DENOMINATOR / kept_bps)
        .checked_add(1)
        .ok_or(VaultErrorCode::MathOverflow)?;
    Ok(gross.to_u64().ok_or(VaultErrorCode::MathOverflow)?)
}

fn checkpoint_of(state: &VaultState, holder: &Pubkey, token: &Pubkey) -> RewardCheckpoint {
    state
        .position(holder)
        .and_then(|p| p.rewards.get(token).copied())
        .unwrap_or_default()
}

/// The on-hand cap applies to the gross amount, so `net + fee` always fits in
/// what the vault holds; `net` is the most a holder can receive right now.
pub fn quote(state: &VaultState, holder: &Pubkey, token: &Pubkey, on_hand: u64) -> Result<RewardQuote> {
    let stream = state
        .stream(token)
        .ok_or(VaultErrorCode::UnknownRewardToken)?;
    let shares = state.shares_of(holder);
    let checkpoint = checkpoint_of(state, holder, token);

    let delta = stream
        .reward_per_share
        .checked_sub(checkpoint.last_reward_per_share)
        .ok_or(VaultErrorCode::MathOverflow)?;
    let earned = accrued(stream.reward_per_share, checkpoint.last_reward_per_share, shares)?;
    let entitled = earned
        .checked_add(checkpoint.banked)
        .ok_or(VaultErrorCode::MathOverflow)?;
    let entitled = apply_dust_floor(entitled, delta, shares, state.reward_dust_floor);

    let available = entitled.min(on_hand);
    let (fee, _) = fee_for(state, token, available)?;
    Ok(RewardQuote {
        token: *token,
        entitled,
        available,
        fee,
        net: available - fee,
    })
}

/// Banks every stream's pending reward for `holder` at its current share
/// balance and moves the checkpoints to the current accumulators. Creates
/// the position if needed so a new holder starts at the current value.
pub fn checkpoint_holder(state: &mut VaultState, holder: &Pubkey) -> Result<()> {
    let VaultState {
        reward_tokens,
        holders,
        ..
    } = state;
    let position = holders.entry(*holder).or_default();
    for stream in reward_tokens.iter().filter(|s| s.exists) {
        let checkpoint = position.rewards.entry(stream.token).or_default();
        let earned = accrued(
            stream.reward_per_share,
            checkpoint.last_reward_per_share,
            position.shares,
        )?;
        checkpoint.banked = checkpoint
            .banked
            .checked_add(earned)
            .ok_or(VaultErrorCode::MathOverflow)?;
        checkpoint.last_reward_per_share = stream.reward_per_share;
    }
    Ok(())
}

/// Moves the holder's checkpoint for `token` to the current accumulator
/// after `paid` out of `entitled` left the vault; the rest stays banked.
pub fn record_claim(
    state: &mut VaultState,
    holder: &Pubkey,
    token: &Pubkey,
    entitled: u64,
    paid: u64,
) -> Result<u64> {
    let remaining = entitled
        .checked_sub(paid)
        .ok_or(VaultErrorCode::InsufficientReward)?;
    let VaultState {
        reward_tokens,
        holders,
        ..
    } = state;
    let stream = reward_tokens
        .iter_mut()
        .find(|s| s.exists && s.token == *token)
        .ok_or(VaultErrorCode::UnknownRewardToken)?;
    stream.total_claimed = stream
        .total_claimed
        .checked_add(paid)
        .ok_or(VaultErrorCode::MathOverflow)?;

    if let Some(position) = holders.get_mut(holder) {
        position.rewards.insert(
            *token,
            RewardCheckpoint {
                last_reward_per_share: stream.reward_per_share,
                banked: remaining,
            },
        );
    }
    Ok(remaining)
}

/// Fails with `TooManyRewardTokens` if `token` is new and the registry is full.
pub fn ensure_registrable(state: &VaultState, token: &Pubkey) -> Result<()> {
    // an inactive slot still occupies the registry
    if !state.reward_tokens.iter().any(|s| s.token == *token) {
        require!(
            state.reward_tokens.len() < MAX_REWARD_TOKENS,
            VaultErrorCode::TooManyRewardTokens
        );
    }
    Ok(())
}

/// Raises the accumulator for `token` by `delta`, registering the stream on
/// first use. Returns the new accumulator and whether the stream is new.
pub fn accrue(state: &mut VaultState, token: &Pubkey, amount: u64, delta: u128) -> Result<(u128, bool)> {
    ensure_registrable(state, token)?;
    if let Some(stream) = state.reward_tokens.iter_mut().find(|s| s.token == *token) {
        stream.reward_per_share = stream
            .reward_per_share
            .checked_add(delta)
            .ok_or(VaultErrorCode::MathOverflow)?;
        stream.total_added = stream
            .total_added
            .checked_add(amount)
            .ok_or(VaultErrorCode::MathOverflow)?;
        let reactivated = !stream.exists;
        stream.exists = true;
        return Ok((stream.reward_per_share, reactivated));
    }

    state.reward_tokens.push(RewardStream {
        token: *token,
        reward_per_share: delta,
        exists: true,
        total_added: amount,
        total_claimed: 0,
    });
    Ok((delta, true))
}
