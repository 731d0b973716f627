//! Biometric capability
//!
//! The device's fingerprint / face sensor is an opaque capability: the gate
//! asks whether it is available, then asks it to evaluate. Platform error
//! codes are mapped here so the gate only sees cancellation vs. anything else.

use async_trait::async_trait;
use thiserror::Error;

/// Authentication failed
pub const CODE_AUTHENTICATION_FAILED: i64 = -1;
/// User tapped cancel
pub const CODE_USER_CANCEL: i64 = -2;
/// User chose the fallback button
pub const CODE_USER_FALLBACK: i64 = -3;
/// System cancelled (app moved to background, another sheet appeared)
pub const CODE_SYSTEM_CANCEL: i64 = -4;
/// No device passcode set
pub const CODE_PASSCODE_NOT_SET: i64 = -5;
/// No sensor on this device
pub const CODE_NOT_AVAILABLE: i64 = -6;
/// Sensor present but nothing enrolled
pub const CODE_NOT_ENROLLED: i64 = -7;

/// Biometric evaluation failures
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BiometricError {
    /// The user dismissed the biometric sheet
    #[error("biometric prompt cancelled by user")]
    UserCancelled,

    /// The system dismissed the biometric sheet
    #[error("biometric prompt cancelled by system")]
    SystemCancelled,

    /// Anything else; the gate falls back to the PIN
    #[error("biometric authentication failed: {0}")]
    Other(String),
}

impl BiometricError {
    /// Map a platform policy-evaluation code
    pub fn from_platform_code(code: i64) -> Self {
        match code {
            CODE_USER_CANCEL => BiometricError::UserCancelled,
            CODE_SYSTEM_CANCEL => BiometricError::SystemCancelled,
            CODE_AUTHENTICATION_FAILED => BiometricError::Other("authentication failed".into()),
            CODE_USER_FALLBACK => BiometricError::Other("user chose fallback".into()),
            CODE_PASSCODE_NOT_SET => BiometricError::Other("passcode not set".into()),
            CODE_NOT_AVAILABLE => BiometricError::Other("not available".into()),
            CODE_NOT_ENROLLED => BiometricError::Other("not enrolled".into()),
            other => BiometricError::Other(format!("platform code {}", other)),
        }
    }

    /// True for user or system cancellation
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            BiometricError::UserCancelled | BiometricError::SystemCancelled
        )
    }
}

/// Device biometric authentication
#[async_trait]
pub trait Biometric: Send + Sync {
    /// Whether biometrics can be evaluated right now
    fn is_available(&self) -> bool;

    /// Show the biometric sheet with `reason` and wait for the result
    async fn evaluate(&self, reason: &str) -> Result<(), BiometricError>;
}

/// Capability for devices without a biometric sensor
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBiometric;

#[async_trait]
impl Biometric for NoBiometric {
    fn is_available(&self) -> bool {
        false
    }

    async fn evaluate(&self, _reason: &str) -> Result<(), BiometricError> {
        Err(BiometricError::from_platform_code(CODE_NOT_AVAILABLE))
    }
}
