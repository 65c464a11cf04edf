use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::RwLock;

use crate::config::DriverOption;
use crate::driver::{DriverContext, DriverRegistry, SwitchDriver, SwitchState};
use crate::error::SwitchError;

/// Durable sink for the last observed switch state.
pub trait StateStore: Send + Sync {
    fn put_state(&self, state: SwitchState) -> Result<(), SwitchError>;
}

#[derive(Default)]
pub struct MemoryStateStore {
    state: RwLock<Option<SwitchState>>,
}

impl MemoryStateStore {
    pub fn state(&self) -> Option<SwitchState> {
        *self.state.read()
    }
}

impl StateStore for MemoryStateStore {
    fn put_state(&self, state: SwitchState) -> Result<(), SwitchError> {
        *self.state.write() = Some(state);
        Ok(())
    }
}

pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn read_state(&self) -> Result<Option<SwitchState>, SwitchError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse::<SwitchState>().map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SwitchError::Storage(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }
}

impl StateStore for FileStateStore {
    fn put_state(&self, state: SwitchState) -> Result<(), SwitchError> {
        fs::write(&self.path, state.as_str())
            .map_err(|e| SwitchError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

/// Owns one driver for the process lifetime and mirrors every observed state
/// into a [`StateStore`].
pub struct SwitchService {
    module: String,
    driver: Box<dyn SwitchDriver>,
    store: Arc<dyn StateStore>,
}

impl SwitchService {
    pub fn init(
        registry: &DriverRegistry,
        option: &DriverOption,
        store: Arc<dyn StateStore>,
        module: &str,
    ) -> Result<Self, SwitchError> {
        let name = option.require_string("name")?;
        let ctx = DriverContext::new().with_module(module);
        let driver = registry.resolve(&name, option, &ctx)?;
        debug!("{module}: init switch driver {name}");

        let service = Self::new(driver, store, module);
        service.reset()?;
        Ok(service)
    }

    pub fn new(driver: Box<dyn SwitchDriver>, store: Arc<dyn StateStore>, module: &str) -> Self {
        Self {
            module: module.to_string(),
            driver,
            store,
        }
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    fn reset(&self) -> Result<SwitchState, SwitchError> {
        match self.driver.deactivate() {
            Ok(()) => {}
            Err(e) if e.is_precondition() => {}
            Err(e) => warn!("{}: failed to reset switch: {e}", self.module),
        }
        self.mirror()
    }

    fn mirror(&self) -> Result<SwitchState, SwitchError> {
        let state = self.driver.query();
        self.store.put_state(state).inspect_err(|e| {
            error!("{}: failed to set switch state: {e}", self.module);
        })?;
        Ok(state)
    }

    pub fn activate(&self) -> Result<SwitchState, SwitchError> {
        self.driver.activate().inspect_err(|e| {
            error!("{}: failed to activate switch: {e}", self.module);
        })?;
        let state = self.mirror()?;

        info!("{}: switch activated", self.module);
        Ok(state)
    }

    pub fn deactivate(&self) -> Result<SwitchState, SwitchError> {
        self.driver.deactivate().inspect_err(|e| {
            error!("{}: failed to deactivate switch: {e}", self.module);
        })?;
        let state = self.mirror()?;

        info!("{}: switch deactivated", self.module);
        Ok(state)
    }

    pub fn query(&self) -> SwitchState {
        self.driver.query()
    }
}
