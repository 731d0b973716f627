#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pin_gate::policy::{check_entry, check_reset, check_setup};
use pin_gate::{Pin, Rejection};

#[derive(Arbitrary, Debug)]
struct Input {
    stored: String,
    old: String,
    new: String,
    confirm: String,
}

fuzz_target!(|input: Input| {
    let stored = Pin::new(input.stored);
    let old = Pin::new(input.old);
    let new = Pin::new(input.new);
    let confirm = Pin::new(input.confirm);

    // Accepted setups always have a non-empty, confirmed PIN
    if check_setup(&new, &confirm).is_ok() {
        assert!(!new.is_empty());
        assert_eq!(new, confirm);
    }

    // Accepted resets prove the old PIN and change it
    match check_reset(&stored, &old, &new, &confirm) {
        Ok(()) => {
            assert_eq!(old, stored);
            assert!(!new.is_empty());
            assert_ne!(new, old);
            assert_eq!(new, confirm);
        }
        Err(Rejection::InvalidOld) => assert_ne!(old, stored),
        Err(_) => assert_eq!(old, stored),
    }

    if check_entry(&stored, &new).is_ok() {
        assert_eq!(new, stored);
    }
});
