/*
Copyright 2021 Jakub Lewandowski

This file is part of Marine Currents Converter (MCC).

Marine Currents Converter (MCC) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

Marine Currents Converter (MCC) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Marine Currents Converter (MCC). If not, see https://www.gnu.org/licenses/.
*/

//! Copernicus Marine credentials.

use crate::constants::{
    FALLBACK_PASSWORD, FALLBACK_USERNAME, PASSWORD_VAR, PLACEHOLDER_PASSWORD, USERNAME_VAR,
};
use crate::errors::ConfigError;
use std::{env, fmt};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    /// Reads credentials from the environment, falling back
    /// to the values in [`constants`](crate::constants).
    pub fn resolve() -> Result<Self, ConfigError> {
        Credentials::resolve_with(|key| env::var(key).ok())
    }

    fn resolve_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR).unwrap_or_else(|| FALLBACK_USERNAME.to_string());
        let password = lookup(PASSWORD_VAR).unwrap_or_else(|| FALLBACK_PASSWORD.to_string());

        if username.is_empty() || password.is_empty() || password == PLACEHOLDER_PASSWORD {
            return Err(ConfigError::MissingCredentials(USERNAME_VAR, PASSWORD_VAR));
        }

        Ok(Credentials { username, password })
    }
}

// password never ends up in the log
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Credentials;
    use crate::constants::{PASSWORD_VAR, PLACEHOLDER_PASSWORD, USERNAME_VAR};
    use crate::errors::ConfigError;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn from_environment() {
        let vars = [(USERNAME_VAR, "sailor@example.com"), (PASSWORD_VAR, "secret")];
        let creds = Credentials::resolve_with(lookup(&vars)).unwrap();

        assert_eq!(creds.username, "sailor@example.com");
        assert_eq!(creds.password, "secret");
        assert!(!format!("{:?}", creds).contains("secret"));
    }

    #[test]
    fn fallback_is_rejected() {
        let result = Credentials::resolve_with(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingCredentials(_, _))));
    }

    #[test]
    fn placeholder_password_is_rejected() {
        let vars = [
            (USERNAME_VAR, "sailor@example.com"),
            (PASSWORD_VAR, PLACEHOLDER_PASSWORD),
        ];
        assert!(Credentials::resolve_with(lookup(&vars)).is_err());
    }
}
