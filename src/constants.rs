// Constants module - centralized default values for configuration
//
// This module defines the default values used throughout the codebase.

// =============================================================================
// Disk cache defaults
// =============================================================================

/// Default cache root directory
pub const DEFAULT_CACHE_DIR: &str = "./kura-cache";

/// Default disk budget in bytes (5MB)
pub const DEFAULT_MAX_CACHE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Default low-water mark as a fraction of the budget
pub const DEFAULT_HYSTERESIS: f64 = 0.9;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";
