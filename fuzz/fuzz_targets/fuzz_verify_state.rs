#![no_main]

use libfuzzer_sys::fuzz_target;
use pin_gate::policy::RoundInput;
use pin_gate::{Rejection, VerifyState, VERIFY_ATTEMPT_LIMIT};

fuzz_target!(|data: &[u8]| {
    let mut state = VerifyState::default();
    let mut rounds = 0u32;

    for byte in data {
        let input = match byte % 4 {
            0 => RoundInput::Correct,
            1 => RoundInput::Cancelled,
            2 => RoundInput::Rejected(Rejection::EmptyInput),
            _ => RoundInput::Rejected(Rejection::Mismatch),
        };

        let next = state.next(input);
        if state.is_terminal() {
            // Terminal states never move
            assert_eq!(next, state);
        } else {
            rounds += 1;
        }
        state = next;
    }

    assert!(rounds <= VERIFY_ATTEMPT_LIMIT);
});
