use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::backend::{new_http_driver, new_rpi_driver};
use crate::config::DriverOption;
use crate::error::SwitchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchState {
    On,
    Off,
}

impl SwitchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchState::On => "on",
            SwitchState::Off => "off",
        }
    }

    /// Lenient parse for states reported by a remote device: anything but `"on"` is off.
    pub fn from_remote(s: &str) -> Self {
        match s {
            "on" => SwitchState::On,
            _ => SwitchState::Off,
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchState {
    type Err = SwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(SwitchState::On),
            "off" => Ok(SwitchState::Off),
            other => Err(SwitchError::InvalidValue(format!(
                "switch state must be \"on\" or \"off\", got {other:?}"
            ))),
        }
    }
}

pub trait SwitchDriver: Send + Sync {
    fn name(&self) -> &'static str;
    fn activate(&self) -> Result<(), SwitchError>;
    fn deactivate(&self) -> Result<(), SwitchError>;
    fn query(&self) -> SwitchState;
}

/// Extra values handed to a driver factory alongside its options.
#[derive(Debug, Clone, Default)]
pub struct DriverContext {
    module: Option<String>,
}

impl DriverContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn module(&self) -> &str {
        self.module.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }
}

pub type DriverFactory =
    fn(&DriverOption, &DriverContext) -> Result<Box<dyn SwitchDriver>, SwitchError>;

#[derive(Default)]
pub struct DriverRegistry {
    factories: FxHashMap<String, DriverFactory>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every driver shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("rpi", new_rpi_driver);
        registry.register("http", new_http_driver);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: DriverFactory) {
        self.factories.insert(name.into(), factory);
    }

    pub fn resolve(
        &self,
        name: &str,
        option: &DriverOption,
        ctx: &DriverContext,
    ) -> Result<Box<dyn SwitchDriver>, SwitchError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SwitchError::InvalidDriver(name.to_string()))?;

        factory(option, ctx)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
