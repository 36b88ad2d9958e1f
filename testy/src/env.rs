use std::ffi::OsString;

use crate::error::{Error, ErrorDetails};

/// Sets an environment variable for as long as it is alive.
///
/// On drop, the previous value is restored, or the variable is removed if it was unset.
/// The process environment is global: tests that share a variable name must not run concurrently.
#[derive(Debug)]
pub struct EnvironmentVariable {
    name: String,
    previous: Option<OsString>,
}

impl EnvironmentVariable {
    pub fn new(name: impl Into<String>, value: impl Into<OsString>) -> Result<Self, Error> {
        let name = name.into();
        validate_name(&name)?;
        let value = value.into();
        if value.as_encoded_bytes().contains(&0) {
            return Err(Error::new(ErrorDetails::InvalidArgument {
                argument: "value",
                message: format!("Value for environment variable `{name}` contains a NUL byte"),
            }));
        }
        let previous = std::env::var_os(&name);
        testy_unsafe_helpers::set_env_var(&name, &value);
        tracing::debug!("Set environment variable `{name}`");
        Ok(Self { name, previous })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value the variable had before this guard was created.
    pub fn previous_value(&self) -> Option<&OsString> {
        self.previous.as_ref()
    }
}

impl Drop for EnvironmentVariable {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => testy_unsafe_helpers::set_env_var(&self.name, previous),
            None => testy_unsafe_helpers::remove_env_var(&self.name),
        }
        tracing::debug!("Restored environment variable `{}`", self.name);
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    let problem = if name.is_empty() {
        "must not be empty"
    } else if name.contains('=') {
        "must not contain `=`"
    } else if name.contains('\0') {
        "must not contain a NUL byte"
    } else {
        return Ok(());
    };
    Err(Error::new(ErrorDetails::InvalidArgument {
        argument: "name",
        message: format!("Environment variable name `{name}` {problem}"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_previously_unset_variable() {
        let name = "TESTY_ENV_TEST_UNSET";
        {
            let guard = EnvironmentVariable::new(name, "on").unwrap();
            assert_eq!(guard.name(), name);
            assert!(guard.previous_value().is_none());
            assert_eq!(std::env::var(name).as_deref(), Ok("on"));
        }
        assert!(std::env::var_os(name).is_none());
    }

    #[test]
    fn test_restores_previous_value() {
        let name = "TESTY_ENV_TEST_RESTORE";
        testy_unsafe_helpers::set_env_var(name, "original");
        {
            let _outer = EnvironmentVariable::new(name, "outer").unwrap();
            {
                let _inner = EnvironmentVariable::new(name, "inner").unwrap();
                assert_eq!(std::env::var(name).as_deref(), Ok("inner"));
            }
            assert_eq!(std::env::var(name).as_deref(), Ok("outer"));
        }
        assert_eq!(std::env::var(name).as_deref(), Ok("original"));
        testy_unsafe_helpers::remove_env_var(name);
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "A=B", "NUL\0NAME"] {
            let error = EnvironmentVariable::new(name, "x").unwrap_err();
            assert!(
                matches!(
                    error.get_details(),
                    ErrorDetails::InvalidArgument {
                        argument: "name",
                        ..
                    }
                ),
                "Unexpected error for {name:?}: {error}"
            );
        }
    }

    #[test]
    fn test_invalid_value() {
        let name = "TESTY_ENV_TEST_NUL_VALUE";
        let error = EnvironmentVariable::new(name, "a\0b").unwrap_err();
        assert!(matches!(
            error.get_details(),
            ErrorDetails::InvalidArgument {
                argument: "value",
                ..
            }
        ));
        assert!(std::env::var_os(name).is_none());
    }
}
