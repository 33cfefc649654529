//! Layered invocation configuration
//!
//! A [`Config`] resolves a key by looking at, in order:
//!
//! 1. explicit overrides set with [`Config::set`]
//! 2. command-line flags bound with [`Config::bind_flag`]
//! 3. the environment, only when an [`EnvBinding`] is attached
//! 4. defaults registered with [`Config::set_default`]
//!
//! Every invocation owns its own instance. Attaching an environment binding
//! never mutates an instance in place: [`Config::with_env_binding`] derives a
//! new one, so the caller's configuration keeps resolving exactly as before.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Key holding the path of the execution log file
pub const LOG_FILE: &str = "logfile";
/// Key holding the verbosity of the harness logger
pub const LOG_LEVEL: &str = "loglevel";
/// Key holding the artifacts directory
pub const ARTIFACTS: &str = "artifacts";
/// Key toggling plugin submission
pub const SUBMIT: &str = "submit";

/// Default log file name
pub const DEFAULT_LOG_FILE: &str = "preflight.log";
/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default artifacts directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
/// Prefix of the environment variables understood by the harness
pub const ENV_PREFIX: &str = "pflt";

/// Where environment lookups are resolved
#[derive(Debug, Clone, Default)]
pub enum Environment {
    /// The process environment
    #[default]
    Process,
    /// A fixed set of variables
    Fixed(Arc<BTreeMap<String, String>>),
}

impl Environment {
    /// Build a fixed environment from name/value pairs
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Fixed(Arc::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()))
    }

    /// Look up a variable; empty values count as unset
    #[must_use]
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(name).ok(),
            Self::Fixed(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Rules mapping a configuration key to an environment variable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvBinding {
    prefix: String,
    replacements: Vec<(String, String)>,
}

impl EnvBinding {
    /// Create a binding using `prefix` (case-insensitive)
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
            replacements: Vec::new(),
        }
    }

    /// The binding the harness exposes: `PFLT_` prefix, hyphens become underscores
    #[must_use]
    pub fn harness() -> Self {
        Self::new(ENV_PREFIX).replace("-", "_")
    }

    /// Translate `from` to `to` in key names before lookup
    #[must_use]
    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replacements.push((from.into(), to.into()));
        self
    }

    /// The upper-cased prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Environment variable consulted for `key`
    #[must_use]
    pub fn variable_for(&self, key: &str) -> String {
        let name = self
            .replacements
            .iter()
            .fold(key.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to));
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }
}

/// Layered key/value configuration owned by one invocation
#[derive(Debug, Clone, Default)]
pub struct Config {
    overrides: BTreeMap<String, String>,
    flags: BTreeMap<String, String>,
    defaults: BTreeMap<String, String>,
    env_binding: Option<EnvBinding>,
    environment: Environment,
}

impl Config {
    /// Create an empty configuration reading the process environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty configuration reading `environment`
    #[must_use]
    pub fn with_environment(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    /// Register the defaults of every key the harness consumes
    pub fn set_harness_defaults(&mut self) {
        self.set_default(LOG_FILE, DEFAULT_LOG_FILE);
        self.set_default(LOG_LEVEL, DEFAULT_LOG_LEVEL);
        self.set_default(ARTIFACTS, DEFAULT_ARTIFACTS_DIR);
        self.set_default(SUBMIT, "false");
    }

    /// Register a default value
    pub fn set_default(&mut self, key: &str, value: impl Into<String>) {
        self.defaults.insert(normalize(key), value.into());
    }

    /// Bind a value given explicitly on the command line
    pub fn bind_flag(&mut self, key: &str, value: impl Into<String>) {
        self.flags.insert(normalize(key), value.into());
    }

    /// Override a key; wins over every other layer
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.overrides.insert(normalize(key), value.into());
    }

    /// Derive a new configuration resolving environment variables with `binding`
    ///
    /// The receiver is left untouched.
    #[must_use]
    pub fn with_env_binding(&self, binding: EnvBinding) -> Self {
        Self {
            env_binding: Some(binding),
            ..self.clone()
        }
    }

    /// The environment binding of this instance, if any
    #[must_use]
    pub const fn env_binding(&self) -> Option<&EnvBinding> {
        self.env_binding.as_ref()
    }

    /// Resolve a key through every layer
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let key = normalize(key);
        if let Some(value) = self.overrides.get(&key).or_else(|| self.flags.get(&key)) {
            return Some(value.clone());
        }
        if let Some(value) = self
            .env_binding
            .as_ref()
            .and_then(|binding| self.environment.var(&binding.variable_for(&key)))
        {
            return Some(value);
        }
        self.defaults.get(&key).cloned()
    }

    /// Resolve a key as a string, empty when unset
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default()
    }

    /// Resolve a key as a boolean, `false` when unset or unparseable
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| parse_bool(&value).unwrap_or(false))
    }

    /// Whether any layer provides a value for `key`
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn normalize(key: &str) -> String {
    key.to_lowercase()
}

/// Parse the boolean spellings accepted on the command line and in the environment
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
