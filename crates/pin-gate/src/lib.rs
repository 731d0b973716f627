//! pin-gate - PIN and biometric authentication gate
//!
//! This crate owns the authentication rules of a mobile app's lock screen:
//! - First-time PIN setup with confirmation
//! - PIN change with old-PIN confirmation
//! - PIN verification with a bounded number of rounds
//! - Biometrics as the primary path, PIN as the fallback
//!
//! Dialogs, secure storage and the biometric sensor belong to the host and
//! are reached through the [`Prompt`], [`SecretStore`] and [`Biometric`]
//! traits.
//!
//! # Example
//!
//! ```ignore
//! let gate = PinGate::new(MemorySecretStore::new());
//! if gate.needs_setup() {
//!     gate.setup(&mut dialog).await?;
//! }
//! gate.authenticate(&touch_id, &mut dialog).await?;
//! ```

pub mod biometric;
pub mod config;
pub mod error;
pub mod gate;
pub mod pin;
pub mod policy;
pub mod prompt;
pub mod store;

pub use biometric::{Biometric, BiometricError, NoBiometric};
pub use config::{ConfigError, GateConfig, PromptTexts};
pub use error::{AuthError, Flow, Result};
pub use gate::PinGate;
pub use pin::Pin;
pub use policy::{Rejection, ValidationOutcome, VerifyState, VERIFY_ATTEMPT_LIMIT};
pub use prompt::{Field, Prompt, PromptField, PromptRequest, PromptResponse, Submission};
pub use store::{FileSecretStore, MemorySecretStore, SecretKey, SecretStore, StoreError};
