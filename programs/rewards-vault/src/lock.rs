use anchor_lang::prelude::*;
use num_traits::ToPrimitive;

use crate::error::VaultErrorCode;
use crate::state::VaultState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockPhase {
    PreCliff,
    Vesting,
    FullyUnlocked,
}

/// Cliff followed by a linear unlock, both in seconds from the holder's
/// deposit checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockSchedule {
    pub cliff: i64,
    pub duration: i64,
}

impl LockSchedule {
    pub fn of(state: &VaultState) -> Self {
        Self {
            cliff: state.lock_cliff,
            duration: state.unlock_duration,
        }
    }

    fn cliff_end(&self, checkpoint: i64) -> i64 {
        checkpoint.saturating_add(self.cliff)
    }

    pub fn phase(&self, checkpoint: i64, now: i64) -> LockPhase {
        let cliff_end = self.cliff_end(checkpoint);
        if now < cliff_end {
            return LockPhase::PreCliff;
        }
        if now >= cliff_end.saturating_add(self.duration) {
            return LockPhase::FullyUnlocked;
        }
        // nothing has vested yet at the exact end of the cliff
        if now == cliff_end {
            return LockPhase::PreCliff;
        }
        LockPhase::Vesting
    }

    /// Portion of `base` vested at `now`, floor-rounded.
    pub fn vested(&self, base: u64, checkpoint: i64, now: i64) -> Result<u64> {
        let cliff_end = self.cliff_end(checkpoint);
        if now < cliff_end {
            return Ok(0);
        }
        if now >= cliff_end.saturating_add(self.duration) {
            return Ok(base);
        }

        let elapsed = now - cliff_end;
        let vested = (base as u128)
            .checked_mul(elapsed as u128)
            .ok_or(VaultErrorCode::MathOverflow)?
            .checked_div(self.duration as u128)
            .ok_or(VaultErrorCode::DivisionByZero)?;
        Ok(vested.to_u64().ok_or(VaultErrorCode::MathOverflow)?)
    }
}

/// Assets of `holder` that can leave the vault at `now`: vested minus what
/// was already withdrawn since the checkpoint. The window runs from the
/// holder's last deposit, which restarts it for the whole balance.
pub fn unlocked_of(state: &VaultState, holder: &Pubkey, now: i64) -> Result<u64> {
    let position = match state.position(holder) {
        Some(p) if p.exists => p,
        _ => return Ok(0),
    };
    let vested = LockSchedule::of(state).vested(position.vesting_base(), position.deposit_ts, now)?;
    Ok(vested.saturating_sub(position.released_since_checkpoint()))
}

pub fn locked_of(state: &VaultState, holder: &Pubkey, now: i64) -> Result<u64> {
    let locked = state
        .position(holder)
        .map(|p| p.currently_locked())
        .unwrap_or(0);
    let unlocked = unlocked_of(state, holder, now)?;
    Ok(locked.saturating_sub(unlocked))
}

pub fn lock_phase(state: &VaultState, holder: &Pubkey, now: i64) -> Option<LockPhase> {
    state
        .position(holder)
        .filter(|p| p.exists)
        .map(|p| LockSchedule::of(state).phase(p.deposit_ts, now))
}
