//! Safe wrappers around process-environment mutation.
//!
//! Since Rust 2024, `std::env::set_var` and `std::env::remove_var` are `unsafe`,
//! because another thread may be reading the environment at the same time
//! (e.g. through `getenv` in libc). The rest of the workspace forbids `unsafe` code,
//! so this is the only place where we call them.
//!
//! These helpers are intended for tests. Callers must not use them while other threads
//! might be reading or writing the environment outside of Rust's `std::env` functions.

use std::ffi::OsStr;

/// Sets the environment variable `key` to `value` for the current process.
pub fn set_env_var(key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) {
    // SAFETY: only used from test helpers, which document that they must not race
    // with foreign code reading the environment.
    unsafe { std::env::set_var(key, value) }
}

/// Removes the environment variable `key` from the current process.
pub fn remove_env_var(key: impl AsRef<OsStr>) {
    // SAFETY: see `set_env_var`.
    unsafe { std::env::remove_var(key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove_env_var() {
        let key = "TESTY_UNSAFE_HELPERS_TEST_VAR";
        set_env_var(key, "value");
        assert_eq!(std::env::var(key).as_deref(), Ok("value"));
        remove_env_var(key);
        assert!(std::env::var_os(key).is_none());
    }
}
