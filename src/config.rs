use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SwitchError;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub unix_socket: Option<String>,
    pub host: Option<String>,
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub driver: Value,
    #[serde(default)]
    pub state_file: Option<PathBuf>,
    #[serde(default = "default_module")]
    pub module: String,
}

fn default_module() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SwitchError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| SwitchError::InvalidConfig(format!("failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| SwitchError::InvalidConfig(format!("invalid config json: {e}")))
    }

    pub fn driver_option(&self) -> DriverOption {
        DriverOption::new(self.driver.clone())
    }
}

/// Read-only view over one level of hierarchical driver configuration.
///
/// Keys may be dotted (`"driver.name"`) to reach into nested objects. Values
/// are coerced between strings and numbers but never validated; drivers decide
/// what a missing or unusable value means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverOption(Value);

impl DriverOption {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.0, |node, segment| node.as_object()?.get(segment))
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.lookup(key)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn sub(&self, key: &str) -> Option<DriverOption> {
        match self.lookup(key)? {
            v @ Value::Object(_) => Some(Self(v.clone())),
            _ => None,
        }
    }

    pub(crate) fn require_string(&self, key: &str) -> Result<String, SwitchError> {
        self.get_string(key)
            .ok_or_else(|| SwitchError::InvalidConfig(key.to_string()))
    }

    pub(crate) fn require_int(&self, key: &str) -> Result<i64, SwitchError> {
        self.get_int(key)
            .ok_or_else(|| SwitchError::InvalidConfig(key.to_string()))
    }
}
