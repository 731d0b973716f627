//! Keystore status code mapping
//!
//! Native bindings hand back raw `OSStatus`-style integers. These helpers
//! turn them into store results so the gate never sees platform numerics.

use super::{StoreError, StoreResult};

/// Operation completed
pub const STATUS_SUCCESS: i32 = 0;
/// No matching item in the keystore
pub const STATUS_ITEM_NOT_FOUND: i32 = -25300;
/// Item already exists
pub const STATUS_DUPLICATE_ITEM: i32 = -25299;
/// Keystore is locked or missing entitlements
pub const STATUS_INTERACTION_NOT_ALLOWED: i32 = -25308;

/// Map the status of a write
pub fn check_save(status: i32) -> StoreResult<()> {
    match status {
        STATUS_SUCCESS => Ok(()),
        other => Err(StoreError::Status(other)),
    }
}

/// Map the status of a delete; a missing item is success
pub fn check_delete(status: i32) -> StoreResult<()> {
    match status {
        STATUS_SUCCESS | STATUS_ITEM_NOT_FOUND => Ok(()),
        other => Err(StoreError::Status(other)),
    }
}

/// Map the status of a read to "found" / "not found"
///
/// Failures other than "not found" are logged and read as absent.
pub fn check_load(status: i32) -> bool {
    match status {
        STATUS_SUCCESS => true,
        STATUS_ITEM_NOT_FOUND => false,
        other => {
            tracing::warn!(status = other, "Keystore read failed");
            false
        }
    }
}
