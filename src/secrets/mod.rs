//! Secret token resolution.
//!
//! String leaves of a configuration tree may embed `$$name$$` tokens. The
//! resolver walks the tree depth-first and replaces each token with the
//! plaintext produced by the injected [`Decryptor`]. Token names are
//! opaque: whatever sits between the delimiters is handed to the backend
//! verbatim.

pub mod backends;

pub use backends::{DEFAULT_ENV_PREFIX, EnvDecryptor, ExampleDecryptor};

use crate::error::{Error, Result};
use regex_lite::Regex;
use serde_json::Value;
use tracing::trace;

/// Pattern for `$$name$$` tokens. Matching is non-greedy, so
/// `$$a$$-$$b$$` is two tokens rather than one spanning the dash.
const TOKEN_PATTERN: &str = r"\$\$(.*?)\$\$";

/// Replace every `$$name$$` token in the tree with decrypted plaintext.
///
/// The tree is mutated in place, depth-first: mapping entries in key
/// order, list elements in index order. Within a string the tokens are
/// collected from the original text, then each one triggers a `decrypt`
/// call and a replacement of every remaining occurrence of that token. A
/// token appearing twice is therefore decrypted twice, and the first
/// plaintext wins because the first replacement already rewrote every
/// occurrence.
///
/// Returns the number of decrypt calls performed. The first backend
/// failure aborts the walk; values visited before the failure keep their
/// resolved plaintext, so the tree must be discarded after an error.
pub fn resolve_secrets(tree: &mut Value, decryptor: &dyn Decryptor) -> Result<usize> {
    // The pattern is a literal; compilation cannot fail.
    let pattern = Regex::new(TOKEN_PATTERN).expect("token pattern compiles");
    let mut resolved = 0;
    resolve_value(tree, decryptor, &pattern, &mut resolved)?;
    Ok(resolved)
}

/// Capability for turning a secret name into plaintext.
pub trait Decryptor {
    fn decrypt(&self, name: &str) -> anyhow::Result<String>;
}

fn resolve_value(
    value: &mut Value,
    decryptor: &dyn Decryptor,
    pattern: &Regex,
    resolved: &mut usize,
) -> Result<()> {
    match value {
        Value::String(text) => resolve_string(text, decryptor, pattern, resolved),
        Value::Object(map) => {
            for entry in map.values_mut() {
                resolve_value(entry, decryptor, pattern, resolved)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_value(item, decryptor, pattern, resolved)?;
            }
            Ok(())
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

fn resolve_string(
    text: &mut String,
    decryptor: &dyn Decryptor,
    pattern: &Regex,
    resolved: &mut usize,
) -> Result<()> {
    let tokens: Vec<(String, String)> = pattern
        .captures_iter(text)
        .map(|caps| (caps[0].to_string(), caps[1].to_string()))
        .collect();

    for (token, name) in tokens {
        trace!(name = %name, "decrypting secret token");
        let plaintext = match decryptor.decrypt(&name) {
            Ok(plaintext) => plaintext,
            Err(cause) => return Err(Error::Decrypt { name, cause }),
        };
        *resolved += 1;
        *text = text.replace(&token, &plaintext);
    }
    Ok(())
}
