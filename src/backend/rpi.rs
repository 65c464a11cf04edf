use log::{debug, info};
use parking_lot::Mutex;

use crate::config::DriverOption;
use crate::driver::{DriverContext, SwitchDriver, SwitchState};
use crate::error::SwitchError;

#[cfg(feature = "hardware-gpio")]
use super::libgpiod::LibgpiodLine;
#[cfg(not(feature = "hardware-gpio"))]
use super::mock::MockOutputLine;

const RPI_DEFAULT_CHIP: &str = "/dev/gpiochip0";

// (header pin, BCM line) for Raspberry Pi rev 2 and later boards
const RPI_PIN_MODERN: &[(u32, u32)] = &[
    (3, 2),
    (5, 3),
    (7, 4),
    (11, 17),
    (13, 27),
    (15, 22),
    (19, 10),
    (21, 9),
    (23, 11),
    (27, 0),
    (29, 5),
    (31, 6),
    (33, 13),
    (35, 19),
    (37, 26),
    (8, 14),
    (10, 15),
    (12, 18),
    (16, 23),
    (18, 24),
    (22, 25),
    (24, 8),
    (26, 7),
    (28, 1),
    (32, 12),
    (36, 16),
    (38, 20),
    (40, 21),
];

// (header pin, BCM line) for the 26-pin rev 1 header
const RPI_PIN_LEGACY: &[(u32, u32)] = &[
    (3, 0),
    (5, 1),
    (7, 4),
    (11, 17),
    (13, 21),
    (15, 22),
    (19, 10),
    (21, 9),
    (23, 11),
    (8, 14),
    (10, 15),
    (12, 18),
    (16, 23),
    (18, 24),
    (22, 25),
    (24, 8),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Legacy,
    Modern,
}

impl PinMode {
    pub fn from_version(version: &str) -> Result<Self, SwitchError> {
        match version {
            "pi1" | "pi2" => Ok(PinMode::Legacy),
            "pi3" | "pi0" | "pi0w" => Ok(PinMode::Modern),
            _ => Err(SwitchError::InvalidConfig("version".into())),
        }
    }

    fn table(self) -> &'static [(u32, u32)] {
        match self {
            PinMode::Legacy => RPI_PIN_LEGACY,
            PinMode::Modern => RPI_PIN_MODERN,
        }
    }
}

/// Maps a header pin number to the BCM line for the given board revision.
pub fn resolve_pin(version: &str, pin: i64) -> Result<u32, SwitchError> {
    let mode = PinMode::from_version(version)?;

    mode.table()
        .iter()
        .find(|(header, _)| i64::from(*header) == pin)
        .map(|(_, bcm)| *bcm)
        .ok_or_else(|| SwitchError::InvalidConfig("pin".into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

pub trait OutputLine: Send {
    fn set_level(&mut self, level: Level) -> Result<(), SwitchError>;
}

struct RpiPin {
    line: Box<dyn OutputLine>,
    state: SwitchState,
}

pub struct RpiSwitchDriver {
    module: String,
    bcm: u32,
    pin: Mutex<RpiPin>,
}

impl RpiSwitchDriver {
    /// Takes ownership of an opened line and drives it low before returning.
    pub fn new(
        bcm: u32,
        mut line: Box<dyn OutputLine>,
        ctx: &DriverContext,
    ) -> Result<Self, SwitchError> {
        line.set_level(Level::Low)?;

        Ok(Self {
            module: ctx.module().to_string(),
            bcm,
            pin: Mutex::new(RpiPin {
                line,
                state: SwitchState::Off,
            }),
        })
    }

    pub fn from_option(opt: &DriverOption, ctx: &DriverContext) -> Result<Self, SwitchError> {
        let version = opt.require_string("version")?;
        let pin = opt.require_int("pin")?;
        let bcm = resolve_pin(&version, pin)?;
        let chip = opt
            .get_string("chip")
            .unwrap_or_else(|| RPI_DEFAULT_CHIP.to_string());

        debug!(
            "{}: rpi {version} header pin {pin} resolved to {chip} line {bcm}",
            ctx.module()
        );

        let line = open_line(&chip, bcm)?;
        Self::new(bcm, line, ctx)
    }

    pub fn bcm(&self) -> u32 {
        self.bcm
    }

    fn drive(&self, level: Level, state: SwitchState) -> Result<(), SwitchError> {
        let mut pin = self.pin.lock();
        pin.line.set_level(level)?;
        pin.state = state;

        info!("{}: rpi line {} is {state}", self.module, self.bcm);
        Ok(())
    }
}

impl SwitchDriver for RpiSwitchDriver {
    fn name(&self) -> &'static str {
        "rpi"
    }

    fn activate(&self) -> Result<(), SwitchError> {
        self.drive(Level::High, SwitchState::On)
    }

    fn deactivate(&self) -> Result<(), SwitchError> {
        self.drive(Level::Low, SwitchState::Off)
    }

    fn query(&self) -> SwitchState {
        self.pin.lock().state
    }
}

#[cfg(feature = "hardware-gpio")]
fn open_line(chip: &str, offset: u32) -> Result<Box<dyn OutputLine>, SwitchError> {
    Ok(Box::new(LibgpiodLine::open(chip, offset)?))
}

#[cfg(not(feature = "hardware-gpio"))]
fn open_line(chip: &str, offset: u32) -> Result<Box<dyn OutputLine>, SwitchError> {
    log::warn!("hardware-gpio disabled, {chip} line {offset} is simulated");
    Ok(Box::new(MockOutputLine::new()))
}

pub fn new_rpi_driver(
    opt: &DriverOption,
    ctx: &DriverContext,
) -> Result<Box<dyn SwitchDriver>, SwitchError> {
    Ok(Box::new(RpiSwitchDriver::from_option(opt, ctx)?))
}
