//! Built-in decryption backends.
//!
//! Real secret managers live behind the [`Decryptor`](super::Decryptor)
//! trait in the embedding application; the backends here are the
//! deterministic ones a build pipeline can run anywhere.

use super::Decryptor;
use tracing::debug;

/// Default prefix for [`EnvDecryptor`] variable names.
pub const DEFAULT_ENV_PREFIX: &str = "ENVSTAMP_SECRET_";

/// Placeholder backend that answers every name with the same fixed
/// plaintext. Useful for dry runs and tests where real secret material
/// must never appear in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleDecryptor;

impl Decryptor for ExampleDecryptor {
    fn decrypt(&self, name: &str) -> anyhow::Result<String> {
        debug!(name = %name, "returning placeholder plaintext");
        Ok("decryptedValue".to_string())
    }
}

/// Environment variable backed backend.
///
/// A token name maps to `<prefix><NAME>` where `NAME` is the name
/// uppercased with every non-alphanumeric character turned into `_`:
/// `db-password` under the default prefix reads
/// `ENVSTAMP_SECRET_DB_PASSWORD`. An unset variable is an error.
#[derive(Debug, Clone)]
pub struct EnvDecryptor {
    prefix: String,
    lookup: fn(&str) -> Option<String>,
}

impl EnvDecryptor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lookup: read_env,
        }
    }

    /// Replace the process-environment lookup, for embedding and tests.
    pub fn with_lookup(mut self, lookup: fn(&str) -> Option<String>) -> Self {
        self.lookup = lookup;
        self
    }

    fn variable_name(&self, name: &str) -> String {
        let mapped: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, mapped)
    }
}

impl Default for EnvDecryptor {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl Decryptor for EnvDecryptor {
    fn decrypt(&self, name: &str) -> anyhow::Result<String> {
        let variable = self.variable_name(name);
        debug!(name = %name, variable = %variable, "resolving secret from environment");
        (self.lookup)(&variable)
            .ok_or_else(|| anyhow::anyhow!("environment variable {variable} is not set"))
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(key: &str) -> Option<String> {
        match key {
            "ENVSTAMP_SECRET_DB_PASSWORD" => Some("hunter2".to_string()),
            "CUSTOM_API_KEY_V2" => Some("abc123".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_example_decryptor_is_fixed() {
        let decryptor = ExampleDecryptor;
        assert_eq!(decryptor.decrypt("anything").unwrap(), "decryptedValue");
        assert_eq!(decryptor.decrypt("else").unwrap(), "decryptedValue");
    }

    #[test]
    fn test_env_decryptor_normalizes_names() {
        let decryptor = EnvDecryptor::default().with_lookup(fake_env);
        assert_eq!(decryptor.decrypt("db-password").unwrap(), "hunter2");
    }

    #[test]
    fn test_env_decryptor_custom_prefix() {
        let decryptor = EnvDecryptor::new("CUSTOM_").with_lookup(fake_env);
        assert_eq!(decryptor.decrypt("api.key v2").unwrap(), "abc123");
    }

    #[test]
    fn test_env_decryptor_missing_variable_errors() {
        let decryptor = EnvDecryptor::default().with_lookup(fake_env);
        let err = decryptor.decrypt("unset").unwrap_err();
        assert!(
            err.to_string().contains("ENVSTAMP_SECRET_UNSET"),
            "got: {err}"
        );
    }
}
