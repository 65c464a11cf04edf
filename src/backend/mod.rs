pub mod http;
#[cfg(feature = "hardware-gpio")]
pub mod libgpiod;
pub mod mock;
pub mod rpi;

pub use http::{HttpSwitchDriver, new_http_driver};
#[cfg(feature = "hardware-gpio")]
pub use libgpiod::LibgpiodLine;
pub use mock::MockOutputLine;
pub use rpi::{Level, OutputLine, PinMode, RpiSwitchDriver, new_rpi_driver, resolve_pin};
