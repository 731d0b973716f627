//! The PIN secret
//!
//! A `Pin` wraps the user's PIN in a zeroizing buffer. Its contents never
//! appear in `Debug` output and equality is checked in constant time.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A PIN value as entered by the user or held by a secret store
#[derive(Clone, Default)]
pub struct Pin(Zeroizing<String>);

impl Pin {
    /// Wrap a PIN value
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the raw PIN text
    ///
    /// Only secret store adapters and prompt pre-population should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when nothing was entered
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of characters entered
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }
}

impl PartialEq for Pin {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for Pin {}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pin(<{} chars>)", self.len())
    }
}

impl From<&str> for Pin {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Pin {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality() {
        assert_eq!(Pin::from("1234"), Pin::from("1234"));
        assert_ne!(Pin::from("1234"), Pin::from("4321"));
        assert_ne!(Pin::from("1234"), Pin::from("12345"));
        assert_eq!(Pin::default(), Pin::from(""));
    }

    #[test]
    fn test_debug_hides_value() {
        let pin = Pin::from("908172");
        let shown = format!("{:?}", pin);
        assert!(!shown.contains("908172"));
        assert_eq!(shown, "Pin(<6 chars>)");
    }

    #[test]
    fn test_empty() {
        assert!(Pin::default().is_empty());
        assert!(!Pin::from("0").is_empty());
        assert_eq!(Pin::from("0000").len(), 4);
    }
}
