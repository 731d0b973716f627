//! PIN policy rules and the verification round state machine
//!
//! Everything here is pure: no prompts, no store. The gate feeds user input
//! through these checks and decides what to show next.
//!
//! The only complexity rule is "non-empty". Length and digit-only rules are
//! left to the prompt (numeric keypad).

use crate::pin::Pin;

/// Number of verification rounds before the flow gives up
pub const VERIFY_ATTEMPT_LIMIT: u32 = 3;

/// Why a submission was rejected and re-prompted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The new (or entered) PIN was empty
    EmptyInput,
    /// New PIN and confirmation differ, or the entered PIN is wrong
    Mismatch,
    /// The new PIN equals the old one
    SameAsOld,
    /// The old PIN does not match the stored secret
    InvalidOld,
}

/// Abstract result of any gate operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    EmptyInput,
    Mismatch,
    SameAsOld,
    InvalidOld,
    Cancelled,
    LimitExceeded,
    StoreFailure,
}

impl From<Rejection> for ValidationOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::EmptyInput => ValidationOutcome::EmptyInput,
            Rejection::Mismatch => ValidationOutcome::Mismatch,
            Rejection::SameAsOld => ValidationOutcome::SameAsOld,
            Rejection::InvalidOld => ValidationOutcome::InvalidOld,
        }
    }
}

impl From<&crate::Result<()>> for ValidationOutcome {
    fn from(result: &crate::Result<()>) -> Self {
        match result {
            Ok(()) => ValidationOutcome::Accepted,
            Err(e) => e.outcome(),
        }
    }
}

/// Check a new PIN and its confirmation
pub fn check_setup(new: &Pin, confirm: &Pin) -> Result<(), Rejection> {
    if new.is_empty() {
        return Err(Rejection::EmptyInput);
    }
    if new != confirm {
        return Err(Rejection::Mismatch);
    }
    Ok(())
}

/// Check a PIN change against the stored secret
///
/// Order matters: the old PIN is checked first so a wrong old PIN is always
/// reported as such, whatever the new fields contain.
pub fn check_reset(stored: &Pin, old: &Pin, new: &Pin, confirm: &Pin) -> Result<(), Rejection> {
    if old != stored {
        return Err(Rejection::InvalidOld);
    }
    if new.is_empty() {
        return Err(Rejection::EmptyInput);
    }
    if new == old {
        return Err(Rejection::SameAsOld);
    }
    if new != confirm {
        return Err(Rejection::Mismatch);
    }
    Ok(())
}

/// Check a single verification entry
pub fn check_entry(stored: &Pin, entered: &Pin) -> Result<(), Rejection> {
    if entered.is_empty() {
        return Err(Rejection::EmptyInput);
    }
    if entered != stored {
        return Err(Rejection::Mismatch);
    }
    Ok(())
}

/// What the user did in one verification round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundInput {
    /// Submitted the stored PIN
    Correct,
    /// Submitted something that was rejected
    Rejected(Rejection),
    /// Dismissed the prompt
    Cancelled,
}

impl From<Result<(), Rejection>> for RoundInput {
    fn from(check: Result<(), Rejection>) -> Self {
        match check {
            Ok(()) => RoundInput::Correct,
            Err(rejection) => RoundInput::Rejected(rejection),
        }
    }
}

/// Verification state machine
///
/// Starts at `Round(0)`; each rejected round moves one round forward until
/// the limit, after which the state is `LimitExceeded`. Terminal states never
/// transition again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyState {
    Round(u32),
    Accepted,
    Cancelled,
    LimitExceeded,
}

impl Default for VerifyState {
    fn default() -> Self {
        VerifyState::Round(0)
    }
}

impl VerifyState {
    /// Apply one round's input
    pub fn next(self, input: RoundInput) -> Self {
        let VerifyState::Round(round) = self else {
            return self;
        };

        match input {
            RoundInput::Correct => VerifyState::Accepted,
            RoundInput::Cancelled => VerifyState::Cancelled,
            RoundInput::Rejected(_) if round.saturating_add(1) >= VERIFY_ATTEMPT_LIMIT => {
                VerifyState::LimitExceeded
            }
            RoundInput::Rejected(_) => VerifyState::Round(round.saturating_add(1)),
        }
    }

    /// True once the flow is over
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerifyState::Round(_))
    }

    /// Rounds left including the current one
    pub fn rounds_remaining(&self) -> u32 {
        match self {
            VerifyState::Round(round) => VERIFY_ATTEMPT_LIMIT.saturating_sub(*round),
            _ => 0,
        }
    }
}
