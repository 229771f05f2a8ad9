//! CLI Exit Code Registry
//!
//! Single source of truth for `shopsync` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, missing file)               |
//! | 3    | IO error (cannot read input, cannot write output)  |
//! | 4    | Parse error (malformed listing or fallback file)   |
//! | 5    | Invalid matcher config                             |
//! | 6    | Embedding provider failed and no fallback was set  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write an output file.
pub const EXIT_IO: u8 = 3;

/// Listing or fallback file could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Matcher config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Embedding provider unavailable or returned a bad response.
pub const EXIT_EMBEDDING: u8 = 6;
