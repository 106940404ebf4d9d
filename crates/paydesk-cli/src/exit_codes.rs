//! Exit codes of the `paydesk` binary.
//! Scripts rely on these values; keep them stable.

pub const SUCCESS: i32 = 0;
pub const GENERAL_ERROR: i32 = 1; // Config, not found, unexpected server status
pub const AUTH_ERROR: i32 = 2; // Not logged in, rejected credential, wrong role
pub const VALIDATION_FAILED: i32 = 3; // Invalid form field(s)
pub const PAYMENT_DECLINED: i32 = 4; // Bank answered with a decline
pub const NETWORK_ERROR: i32 = 5;
pub const INVALID_RESPONSE: i32 = 6; // Unreadable server answer or credential file
