use std::env;

/// Reads an environment variable verbatim. Unset and non-unicode values are both `None`.
pub fn var_opt(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(env::VarError::NotUnicode(raw)) => {
            log::warn!("{} environment variable is not valid unicode, treating as unset. raw={:?}", name, raw);
            None
        }
    }
}
