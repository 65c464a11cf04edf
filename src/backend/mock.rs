use std::sync::Arc;

use parking_lot::Mutex;

use super::rpi::{Level, OutputLine};
use crate::error::SwitchError;

/// In-memory output line. Clones share the same recorded levels.
#[derive(Clone, Default)]
pub struct MockOutputLine {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl MockOutputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Option<Level> {
        self.levels.lock().last().copied()
    }

    pub fn history(&self) -> Vec<Level> {
        self.levels.lock().clone()
    }
}

impl OutputLine for MockOutputLine {
    fn set_level(&mut self, level: Level) -> Result<(), SwitchError> {
        self.levels.lock().push(level);
        Ok(())
    }
}
