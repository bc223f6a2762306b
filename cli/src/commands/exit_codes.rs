//! Exit code constants for CLI commands.

/// Successful operation.
pub const EXIT_SUCCESS: i32 = 0;

/// `dsa verify` ran, and the signature does not match.
pub const EXIT_INVALID_SIGNATURE: i32 = 1;

/// General error (configuration, network, rejected request, I/O).
pub const EXIT_ERROR: i32 = 2;

/// Input refused locally; no request was sent.
pub const EXIT_INVALID_INPUT: i32 = 3;
