//! Composite cache key for `(domain, instance, variable)`.

use std::fmt;

use crate::error::KeyError;

/// Delimiter joining key components. Components may not contain it.
pub const KEY_DELIMITER: &str = "__";

/// Validated `(domain, instance, variable)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    domain: String,
    instance: String,
    variable: String,
}

impl CacheKey {
    pub fn new(
        domain: impl Into<String>,
        instance: impl Into<String>,
        variable: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let domain = check("domain", domain.into())?;
        let instance = check("instance", instance.into())?;
        let variable = check("variable", variable.into())?;
        Ok(Self {
            domain,
            instance,
            variable,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Same domain and instance, different variable.
    pub fn with_variable(&self, variable: impl Into<String>) -> Result<Self, KeyError> {
        Self::new(self.domain.clone(), self.instance.clone(), variable)
    }
}

fn check(component: &'static str, value: String) -> Result<String, KeyError> {
    if value.is_empty() {
        return Err(KeyError::EmptyComponent(component));
    }
    if value.contains(KEY_DELIMITER) {
        return Err(KeyError::DelimiterInComponent { component, value });
    }
    Ok(value)
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.domain, KEY_DELIMITER, self.instance, KEY_DELIMITER, self.variable
        )
    }
}
