//! The PIN gate
//!
//! Drives the setup, reset and verification dialogs against a secret store,
//! and puts biometrics in front of PIN verification. Validation problems are
//! handled here by re-prompting; only cancellation, the attempt limit and
//! store failures reach the caller.

use tracing::{debug, info, warn};

use crate::biometric::Biometric;
use crate::config::{GateConfig, PromptTexts};
use crate::error::{AuthError, Flow, Result};
use crate::pin::Pin;
use crate::policy::{self, Rejection, RoundInput, VerifyState};
use crate::prompt::{Field, Prompt, PromptField, PromptRequest, PromptResponse};
use crate::store::SecretStore;

/// PIN lifecycle and authentication over a secret store
pub struct PinGate<S> {
    store: S,
    texts: PromptTexts,
}

impl<S: SecretStore> PinGate<S> {
    /// Create a gate with the default English texts
    pub fn new(store: S) -> Self {
        Self::with_texts(store, PromptTexts::default())
    }

    /// Create a gate with custom texts
    pub fn with_texts(store: S, texts: PromptTexts) -> Self {
        Self { store, texts }
    }

    /// Create a gate using the texts from `config`
    pub fn from_config(store: S, config: &GateConfig) -> Self {
        Self::with_texts(store, config.texts.clone())
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Texts used for prompts
    pub fn texts(&self) -> &PromptTexts {
        &self.texts
    }

    /// True when no PIN is stored
    pub fn needs_setup(&self) -> bool {
        !self.store.contains()
    }

    /// Ask for a new PIN twice and store it
    ///
    /// Re-prompts on an empty PIN or a mismatched confirmation until the
    /// user gets it right or cancels.
    pub async fn setup<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<()> {
        info!("Starting PIN setup");

        let mut new = Pin::default();
        let mut confirm = Pin::default();
        let mut message = self.texts.setup_message.clone();

        loop {
            let request = self.setup_request(&new, &confirm, message);
            let submission = match prompt.present(request).await {
                PromptResponse::Submitted(submission) => submission,
                PromptResponse::Cancelled => {
                    info!("PIN setup cancelled");
                    return Err(AuthError::Cancelled(Flow::Setup));
                }
            };

            let entered = submission.get(Field::Pin);
            let entered_confirm = submission.get(Field::Confirm);

            let rejection = match policy::check_setup(&entered, &entered_confirm) {
                Ok(()) => {
                    self.save(&entered)?;
                    info!("PIN set up");
                    return Ok(());
                }
                Err(rejection) => rejection,
            };

            warn!(?rejection, "PIN setup rejected");
            message = PromptTexts::retry_message(
                &self.texts.setup_message,
                self.texts.rejection(rejection),
            );

            // Keep a mismatched pair so the user can see what to fix
            (new, confirm) = match rejection {
                Rejection::Mismatch => (entered, entered_confirm),
                _ => (Pin::default(), Pin::default()),
            };
        }
    }

    /// Change the PIN after confirming the old one
    ///
    /// Runs [`PinGate::setup`] instead when no PIN is stored yet.
    pub async fn reset<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<()> {
        if self.needs_setup() {
            info!("No PIN stored, running setup instead of reset");
            return self.setup(prompt).await;
        }

        info!("Starting PIN reset");

        let mut old = Pin::default();
        let mut message = self.texts.reset_message.clone();

        loop {
            let request = self.reset_request(&old, message);
            let submission = match prompt.present(request).await {
                PromptResponse::Submitted(submission) => submission,
                PromptResponse::Cancelled => {
                    info!("PIN reset cancelled");
                    return Err(AuthError::Cancelled(Flow::Reset));
                }
            };

            let entered_old = submission.get(Field::OldPin);
            let entered = submission.get(Field::Pin);
            let entered_confirm = submission.get(Field::Confirm);

            let stored = self.stored()?;
            let rejection =
                match policy::check_reset(&stored, &entered_old, &entered, &entered_confirm) {
                    Ok(()) => {
                        self.save(&entered)?;
                        info!("PIN reset");
                        return Ok(());
                    }
                    Err(rejection) => rejection,
                };

            warn!(?rejection, "PIN reset rejected");
            message = PromptTexts::retry_message(
                &self.texts.reset_message,
                self.texts.rejection(rejection),
            );

            // The old PIN entry survives every retry; the new pair starts over
            old = entered_old;
        }
    }

    /// Ask for the PIN, allowing a bounded number of rounds
    ///
    /// Runs [`PinGate::setup`] instead when no PIN is stored yet; a completed
    /// setup counts as a successful verification.
    pub async fn verify<P: Prompt + ?Sized>(&self, prompt: &mut P) -> Result<()> {
        if self.needs_setup() {
            info!("No PIN stored, running setup instead of verification");
            return self.setup(prompt).await;
        }

        info!("Starting PIN verification");

        let mut state = VerifyState::default();
        let mut message = self.texts.verify_message.clone();

        loop {
            debug!(?state, remaining = state.rounds_remaining(), "Verification round");

            let input = match prompt.present(self.verify_request(message.clone())).await {
                PromptResponse::Cancelled => RoundInput::Cancelled,
                PromptResponse::Submitted(submission) => {
                    let stored = self.stored()?;
                    RoundInput::from(policy::check_entry(&stored, &submission.get(Field::Pin)))
                }
            };

            if let RoundInput::Rejected(rejection) = input {
                warn!(?state, ?rejection, "PIN verification round failed");
                message = PromptTexts::retry_message(
                    &self.texts.verify_message,
                    self.texts.verify_rejection(rejection),
                );
            }

            state = state.next(input);
            match state {
                VerifyState::Round(_) => continue,
                VerifyState::Accepted => {
                    info!("PIN verified");
                    return Ok(());
                }
                VerifyState::Cancelled => {
                    info!("PIN verification cancelled");
                    return Err(AuthError::Cancelled(Flow::Authentication));
                }
                VerifyState::LimitExceeded => {
                    warn!("PIN verification attempt limit exceeded");
                    return Err(AuthError::LimitExceeded);
                }
            }
        }
    }

    /// Remove the stored PIN
    pub fn delete_pin(&self) -> Result<()> {
        self.store.delete().map_err(|e| {
            warn!("Failed to delete PIN: {}", e);
            AuthError::from(e)
        })?;
        info!("PIN deleted");
        Ok(())
    }

    /// Authenticate with biometrics, falling back to the PIN
    ///
    /// Cancelling the biometric sheet ends the flow; any other biometric
    /// failure (including no sensor or nothing enrolled) falls back to
    /// [`PinGate::verify`].
    pub async fn authenticate<B, P>(&self, biometric: &B, prompt: &mut P) -> Result<()>
    where
        B: Biometric + ?Sized,
        P: Prompt + ?Sized,
    {
        if biometric.is_available() {
            match biometric.evaluate(&self.texts.biometric_reason).await {
                Ok(()) => {
                    info!("Authenticated with biometrics");
                    return Ok(());
                }
                Err(e) if e.is_cancellation() => {
                    info!(error = %e, "Biometric authentication cancelled");
                    return Err(AuthError::Cancelled(Flow::Authentication));
                }
                Err(e) => {
                    warn!(error = %e, "Biometric authentication failed, falling back to PIN");
                }
            }
        } else {
            debug!("Biometrics unavailable, falling back to PIN");
        }

        self.verify(prompt).await
    }

    fn stored(&self) -> Result<Pin> {
        self.store.load().ok_or_else(|| {
            warn!("Stored PIN could not be loaded during an active flow");
            AuthError::PinNotSetUp
        })
    }

    fn save(&self, pin: &Pin) -> Result<()> {
        self.store.save(pin).map_err(|e| {
            warn!("Failed to store PIN: {}", e);
            AuthError::from(e)
        })
    }

    fn setup_request(&self, new: &Pin, confirm: &Pin, message: String) -> PromptRequest {
        PromptRequest {
            flow: Flow::Setup,
            title: self.texts.setup_title.clone(),
            message,
            fields: vec![
                PromptField::secure(Field::Pin, &self.texts.pin_label, new.clone()),
                PromptField::secure(Field::Confirm, &self.texts.confirm_label, confirm.clone()),
            ],
        }
    }

    fn reset_request(&self, old: &Pin, message: String) -> PromptRequest {
        PromptRequest {
            flow: Flow::Reset,
            title: self.texts.reset_title.clone(),
            message,
            fields: vec![
                PromptField::secure(Field::OldPin, &self.texts.old_pin_label, old.clone()),
                PromptField::secure(Field::Pin, &self.texts.new_pin_label, Pin::default()),
                PromptField::secure(Field::Confirm, &self.texts.confirm_new_label, Pin::default()),
            ],
        }
    }

    fn verify_request(&self, message: String) -> PromptRequest {
        PromptRequest {
            flow: Flow::Authentication,
            title: self.texts.verify_title.clone(),
            message,
            fields: vec![PromptField::secure(
                Field::Pin,
                &self.texts.pin_label,
                Pin::default(),
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::prompt::Submission;
    use crate::store::MemorySecretStore;

    /// Answers prompts from a queue and records what it was shown
    #[derive(Default)]
    struct Scripted {
        answers: VecDeque<PromptResponse>,
        shown: Vec<PromptRequest>,
    }

    impl Scripted {
        fn new(answers: Vec<PromptResponse>) -> Self {
            Self {
                answers: answers.into(),
                shown: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Prompt for Scripted {
        async fn present(&mut self, request: PromptRequest) -> PromptResponse {
            self.shown.push(request);
            self.answers.pop_front().unwrap_or(PromptResponse::Cancelled)
        }
    }

    fn submit(pairs: &[(Field, &str)]) -> PromptResponse {
        let submission: Submission = pairs.iter().map(|(f, v)| (*f, Pin::from(*v))).collect();
        PromptResponse::Submitted(submission)
    }

    #[tokio::test]
    async fn test_setup_mismatch_keeps_pair() {
        let gate = PinGate::new(MemorySecretStore::new());
        let mut prompt = Scripted::new(vec![
            submit(&[(Field::Pin, "1234"), (Field::Confirm, "1243")]),
            submit(&[(Field::Pin, "1234"), (Field::Confirm, "1234")]),
        ]);

        gate.setup(&mut prompt).await.unwrap();

        assert_eq!(prompt.shown.len(), 2);
        let retry = &prompt.shown[1];
        assert_eq!(retry.message, "Please enter your new PIN.\n\nPINs must match!");
        assert_eq!(retry.value(Field::Pin), Pin::from("1234"));
        assert_eq!(retry.value(Field::Confirm), Pin::from("1243"));
        assert_eq!(gate.store().load(), Some(Pin::from("1234")));
    }

    #[tokio::test]
    async fn test_setup_empty_clears_fields() {
        let gate = PinGate::new(MemorySecretStore::new());
        let mut prompt = Scripted::new(vec![
            submit(&[(Field::Confirm, "55")]),
            PromptResponse::Cancelled,
        ]);

        let err = gate.setup(&mut prompt).await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled(Flow::Setup)));

        let retry = &prompt.shown[1];
        assert_eq!(retry.message, "Please enter your new PIN.\n\nPIN cannot be empty!");
        assert!(retry.value(Field::Pin).is_empty());
        assert!(retry.value(Field::Confirm).is_empty());
        assert!(gate.needs_setup());
    }

    #[tokio::test]
    async fn test_reset_prefill_rules() {
        let gate = PinGate::new(MemorySecretStore::with_pin("1111"));
        let mut prompt = Scripted::new(vec![
            // Wrong old PIN: old entry kept, new pair cleared
            submit(&[(Field::OldPin, "9999"), (Field::Pin, "2222"), (Field::Confirm, "2222")]),
            // Same as old: old kept, new pair cleared
            submit(&[(Field::OldPin, "1111"), (Field::Pin, "1111"), (Field::Confirm, "1111")]),
            submit(&[(Field::OldPin, "1111"), (Field::Pin, "2222"), (Field::Confirm, "2222")]),
        ]);

        gate.reset(&mut prompt).await.unwrap();

        let first_retry = &prompt.shown[1];
        assert!(first_retry.message.ends_with("The old PIN you entered was invalid!"));
        assert_eq!(first_retry.value(Field::OldPin), Pin::from("9999"));
        assert!(first_retry.value(Field::Pin).is_empty());
        assert!(first_retry.value(Field::Confirm).is_empty());

        let second_retry = &prompt.shown[2];
        assert!(second_retry
            .message
            .ends_with("New PIN must be different from the old one!"));
        assert_eq!(second_retry.value(Field::OldPin), Pin::from("1111"));
        assert!(second_retry.value(Field::Pin).is_empty());
        assert!(second_retry.value(Field::Confirm).is_empty());

        assert_eq!(gate.store().load(), Some(Pin::from("2222")));
    }

    #[tokio::test]
    async fn test_verify_messages() {
        let gate = PinGate::new(MemorySecretStore::with_pin("4321"));
        let mut prompt = Scripted::new(vec![
            submit(&[(Field::Pin, "")]),
            submit(&[(Field::Pin, "0000")]),
            submit(&[(Field::Pin, "4321")]),
        ]);

        gate.verify(&mut prompt).await.unwrap();

        assert_eq!(prompt.shown[0].title, "PIN Alert");
        assert_eq!(prompt.shown[0].message, "Please enter your PIN to proceed.");
        assert_eq!(
            prompt.shown[1].message,
            "Please enter your PIN to proceed.\n\nPIN cannot be empty!"
        );
        assert_eq!(
            prompt.shown[2].message,
            "Please enter your PIN to proceed.\n\nEntered PIN was incorrect."
        );
    }

    #[tokio::test]
    async fn test_verify_limit() {
        let gate = PinGate::new(MemorySecretStore::with_pin("4321"));
        let mut prompt = Scripted::new(vec![
            submit(&[(Field::Pin, "1")]),
            submit(&[(Field::Pin, "2")]),
            submit(&[(Field::Pin, "3")]),
            submit(&[(Field::Pin, "4321")]),
        ]);

        let err = gate.verify(&mut prompt).await.unwrap_err();
        assert!(matches!(err, AuthError::LimitExceeded));
        assert_eq!(prompt.shown.len(), 3);
    }

    #[tokio::test]
    async fn test_custom_texts() {
        let texts = PromptTexts {
            verify_title: "Déverrouiller".to_string(),
            ..PromptTexts::default()
        };
        let gate = PinGate::with_texts(MemorySecretStore::with_pin("1"), texts);
        let mut prompt = Scripted::new(vec![submit(&[(Field::Pin, "1")])]);

        gate.verify(&mut prompt).await.unwrap();
        assert_eq!(prompt.shown[0].title, "Déverrouiller");
        assert!(prompt.shown[0].fields.iter().all(|f| f.secure));
    }
}
