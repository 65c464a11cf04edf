pub mod backend;
pub mod config;
pub mod driver;
pub mod error;
pub mod routes;
pub mod service;

pub use config::{AppConfig, DriverOption, HttpConfig};
pub use driver::{DriverContext, DriverFactory, DriverRegistry, SwitchDriver, SwitchState};
pub use error::SwitchError;
pub use routes::{AppState, api_scope};
pub use service::{FileStateStore, MemoryStateStore, StateStore, SwitchService};

pub use backend::{HttpSwitchDriver, MockOutputLine, RpiSwitchDriver};
#[cfg(feature = "hardware-gpio")]
pub use backend::LibgpiodLine;
