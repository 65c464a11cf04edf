use std::path::PathBuf;

use libgpiod::{chip::Chip, line, request};

use super::rpi::{Level, OutputLine};
use crate::error::SwitchError;

/// A single line requested as an output on a character-device GPIO chip.
pub struct LibgpiodLine {
    offset: u32,
    request: request::Request,
}

impl LibgpiodLine {
    pub fn open(chip: &str, offset: u32) -> Result<Self, SwitchError> {
        let chip = Self::open_chip(chip)?;
        let line_cfg = Self::make_line_config(offset)?;
        let request = Self::request_lines(&chip, &line_cfg)?;

        Ok(Self { offset, request })
    }

    fn open_chip(path: &str) -> Result<Chip, SwitchError> {
        let p = PathBuf::from(path);
        Chip::open(&p).map_err(|e| SwitchError::Gpio(format!("open chip {path}: {e}")))
    }

    fn make_line_config(offset: u32) -> Result<line::Config, SwitchError> {
        let mut ls = line::Settings::new()
            .map_err(|e| SwitchError::Gpio(format!("libgpiod settings: {e}")))?;
        ls.set_direction(line::Direction::Output)
            .map_err(|e| SwitchError::Gpio(format!("set direction: {e}")))?;
        ls.set_drive(line::Drive::PushPull)
            .map_err(|e| SwitchError::Gpio(format!("set drive: {e}")))?;
        ls.set_output_value(line::Value::InActive)
            .map_err(|e| SwitchError::Gpio(format!("set output value: {e}")))?;

        let mut cfg =
            line::Config::new().map_err(|e| SwitchError::Gpio(format!("line config: {e}")))?;
        cfg.add_line_settings(&[offset], ls)
            .map_err(|e| SwitchError::Gpio(format!("line config add settings: {e}")))?;
        Ok(cfg)
    }

    fn request_lines(chip: &Chip, line_cfg: &line::Config) -> Result<request::Request, SwitchError> {
        let mut req_cfg = request::Config::new()
            .map_err(|e| SwitchError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| SwitchError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| SwitchError::Gpio(format!("request lines: {e}")))
    }
}

impl OutputLine for LibgpiodLine {
    fn set_level(&mut self, level: Level) -> Result<(), SwitchError> {
        let value = match level {
            Level::Low => line::Value::InActive,
            Level::High => line::Value::Active,
        };
        self.request
            .set_value(self.offset, value)
            .map_err(|e| SwitchError::Gpio(format!("set value: {e}")))?;
        Ok(())
    }
}
