use anchor_lang::error::Error;
use anchor_lang::prelude::*;

#[error_code]
pub enum VaultErrorCode {
    #[msg("Invalid amount")]
    InvalidAmount = 1,
    #[msg("Invalid receiver")]
    InvalidReceiver = 2,
    #[msg("Invalid reward token")]
    InvalidRewardToken = 3,
    #[msg("Reward token cannot be the vault asset")]
    RewardTokenIsAsset = 4,
    #[msg("Reward token is not registered")]
    UnknownRewardToken = 5,
    #[msg("Vault has no assets to distribute rewards against")]
    NoDepositors = 6,
    #[msg("Invalid lock period")]
    InvalidLockPeriod = 7,
    #[msg("Invalid fee configuration")]
    InvalidFeeConfig = 8,
    #[msg("Invalid vault configuration")]
    InvalidConfig = 9,
    #[msg("Timestamp is older than the last vault update")]
    StaleTimestamp = 10,

    #[msg("Signer is not authorized for this operation")]
    Unauthorized = 20,

    #[msg("Amount exceeds max deposit")]
    ExceedsMaxDeposit = 30,
    #[msg("Amount exceeds unlocked balance")]
    ExceedsUnlocked = 31,
    #[msg("Insufficient shares")]
    InsufficientShares = 32,
    #[msg("Requested reward exceeds unclaimed amount")]
    InsufficientReward = 33,

    #[msg("Operation would mint or burn zero shares")]
    ZeroShares = 40,
    #[msg("Operation would move zero assets")]
    ZeroAssets = 41,
    #[msg("Reward amount too small to distribute")]
    RewardTooSmall = 42,

    #[msg("Too many reward tokens")]
    TooManyRewardTokens = 50,

    #[msg("Math overflow")]
    MathOverflow = 60,
    #[msg("Division by zero error")]
    DivisionByZero = 61,

    #[msg("Insufficient token balance")]
    InsufficientBalance = 70,
    #[msg("Token account is frozen")]
    TokenAccountFrozen = 71,

    #[msg("Protocol is paused")]
    ProtocolPaused = 80,
    #[msg("Reentrant call rejected")]
    Reentrancy = 81,
    #[msg("Vault state could not be encoded or decoded")]
    StateCorrupted = 82,
}

/// Broad failure classes callers can branch on without matching every code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InsufficientAuthorization,
    ExceedsAvailable,
    ZeroResult,
    CapacityExceeded,
    Arithmetic,
    Transfer,
    State,
}

const ALL_CODES: [VaultErrorCode; 26] = [
    VaultErrorCode::InvalidAmount,
    VaultErrorCode::InvalidReceiver,
    VaultErrorCode::InvalidRewardToken,
    VaultErrorCode::RewardTokenIsAsset,
    VaultErrorCode::UnknownRewardToken,
    VaultErrorCode::NoDepositors,
    VaultErrorCode::InvalidLockPeriod,
    VaultErrorCode::InvalidFeeConfig,
    VaultErrorCode::InvalidConfig,
    VaultErrorCode::StaleTimestamp,
    VaultErrorCode::Unauthorized,
    VaultErrorCode::ExceedsMaxDeposit,
    VaultErrorCode::ExceedsUnlocked,
    VaultErrorCode::InsufficientShares,
    VaultErrorCode::InsufficientReward,
    VaultErrorCode::ZeroShares,
    VaultErrorCode::ZeroAssets,
    VaultErrorCode::RewardTooSmall,
    VaultErrorCode::TooManyRewardTokens,
    VaultErrorCode::MathOverflow,
    VaultErrorCode::DivisionByZero,
    VaultErrorCode::InsufficientBalance,
    VaultErrorCode::TokenAccountFrozen,
    VaultErrorCode::ProtocolPaused,
    VaultErrorCode::Reentrancy,
    VaultErrorCode::StateCorrupted,
];

impl VaultErrorCode {
    pub fn kind(self) -> ErrorKind {
        use VaultErrorCode::*;
        match self {
            InvalidAmount | InvalidReceiver | InvalidRewardToken | RewardTokenIsAsset
            | UnknownRewardToken | NoDepositors | InvalidLockPeriod | InvalidFeeConfig
            | InvalidConfig | StaleTimestamp => ErrorKind::InvalidInput,
            Unauthorized => ErrorKind::InsufficientAuthorization,
            ExceedsMaxDeposit | ExceedsUnlocked | InsufficientShares | InsufficientReward => {
                ErrorKind::ExceedsAvailable
            }
            ZeroShares | ZeroAssets | RewardTooSmall => ErrorKind::ZeroResult,
            TooManyRewardTokens => ErrorKind::CapacityExceeded,
            MathOverflow | DivisionByZero => ErrorKind::Arithmetic,
            InsufficientBalance | TokenAccountFrozen => ErrorKind::Transfer,
            ProtocolPaused | Reentrancy | StateCorrupted => ErrorKind::State,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        ALL_CODES.iter().copied().find(|c| u32::from(*c) == code)
    }
}

pub fn error_code_number(err: &Error) -> Option<u32> {
    match err {
        Error::AnchorError(e) => Some(e.error_code_number),
        Error::ProgramError(_) => None,
    }
}

/// Classifies an error raised by this crate; `None` for foreign errors.
pub fn error_kind(err: &Error) -> Option<ErrorKind> {
    error_code_number(err)
        .and_then(VaultErrorCode::from_code)
        .map(VaultErrorCode::kind)
}
