//! Scripted collaborators for driving pin-gate flows in tests
//!
//! - [`ScriptedPrompt`] answers prompts from a queue and records every request
//! - [`ScriptedBiometric`] returns a fixed availability and result
//! - [`FailingStore`] wraps a store and fails writes / deletes on demand
//! - [`init_test_tracing`] routes gate logs to the test writer

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Once;

use async_trait::async_trait;
use pin_gate::{
    Biometric, BiometricError, Field, MemorySecretStore, Pin, Prompt, PromptRequest,
    PromptResponse, SecretStore, StoreError, Submission,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize tracing for tests
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Uses `RUST_LOG` if set, otherwise `pin_gate=debug`.
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,pin_gate=debug"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer().compact())
            .try_init();
    });
}

/// Submit a single PIN
pub fn pin(value: &str) -> PromptResponse {
    PromptResponse::Submitted(Submission::new().with(Field::Pin, value))
}

/// Submit a new PIN and its confirmation
pub fn new_pin(value: &str, confirm: &str) -> PromptResponse {
    PromptResponse::Submitted(
        Submission::new()
            .with(Field::Pin, value)
            .with(Field::Confirm, confirm),
    )
}

/// Submit an old PIN, a new PIN and its confirmation
pub fn change_pin(old: &str, value: &str, confirm: &str) -> PromptResponse {
    PromptResponse::Submitted(
        Submission::new()
            .with(Field::OldPin, old)
            .with(Field::Pin, value)
            .with(Field::Confirm, confirm),
    )
}

/// Prompt that replays queued answers
///
/// Once the queue runs dry every further prompt is cancelled, so a flow that
/// asks more often than expected ends instead of hanging.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<PromptResponse>,
    shown: Vec<PromptRequest>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = PromptResponse>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            shown: Vec::new(),
        }
    }

    /// Every request presented so far
    pub fn shown(&self) -> &[PromptRequest] {
        &self.shown
    }

    /// Number of prompts presented
    pub fn count(&self) -> usize {
        self.shown.len()
    }

    /// Answers not consumed by the flow
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl Prompt for ScriptedPrompt {
    async fn present(&mut self, request: PromptRequest) -> PromptResponse {
        self.shown.push(request);
        self.answers.pop_front().unwrap_or(PromptResponse::Cancelled)
    }
}

/// Biometric capability with a fixed answer
pub struct ScriptedBiometric {
    available: bool,
    result: Result<(), BiometricError>,
    evaluations: AtomicUsize,
    last_reason: std::sync::Mutex<Option<String>>,
}

impl ScriptedBiometric {
    /// Available, evaluates to `result`
    pub fn available(result: Result<(), BiometricError>) -> Self {
        Self {
            available: true,
            result,
            evaluations: AtomicUsize::new(0),
            last_reason: std::sync::Mutex::new(None),
        }
    }

    /// Not available on this device
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::available(Ok(()))
        }
    }

    /// How often the sheet was shown
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    /// Reason text passed to the last evaluation
    pub fn last_reason(&self) -> Option<String> {
        self.last_reason.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl Biometric for ScriptedBiometric {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn evaluate(&self, reason: &str) -> Result<(), BiometricError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_reason.lock() {
            *last = Some(reason.to_string());
        }
        self.result.clone()
    }
}

/// Memory store whose writes and deletes can be made to fail
#[derive(Default)]
pub struct FailingStore {
    inner: MemorySecretStore,
    fail_save: AtomicBool,
    fail_delete: AtomicBool,
}

impl FailingStore {
    /// Store holding `value`, failing every write and delete
    pub fn broken_with_pin(value: &str) -> Self {
        let store = Self {
            inner: MemorySecretStore::with_pin(value),
            ..Self::default()
        };
        store.set_fail_save(true);
        store.set_fail_delete(true);
        store
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

impl SecretStore for FailingStore {
    fn save(&self, secret: &Pin) -> Result<(), StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Status(-34018));
        }
        self.inner.save(secret)
    }

    fn load(&self) -> Option<Pin> {
        self.inner.load()
    }

    fn delete(&self) -> Result<(), StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Status(-25308));
        }
        self.inner.delete()
    }
}
