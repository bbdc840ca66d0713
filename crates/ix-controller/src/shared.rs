//! Cross-controller flags with a single bound writer.
//!
//! Any controller may read a cell.  Writing requires being the cell's bound
//! writer; a second controller trying to bind, or anyone else trying to
//! write, gets `IxError::InvariantViolation`.  The scheduler unbinds a
//! controller's cells when it ends, so a writer slot never outlives its
//! controller.

use ix_core::{ControllerId, IxError, IxResult};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct SharedCell<T> {
    name:   &'static str,
    value:  T,
    writer: Option<ControllerId>,
}

impl<T: Copy + PartialEq + std::fmt::Debug> SharedCell<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self { name, value, writer: None }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn writer(&self) -> Option<ControllerId> {
        self.writer
    }

    /// Claim the writer slot.  Re-binding by the current writer is a no-op.
    pub fn bind_writer(&mut self, who: ControllerId) -> IxResult<()> {
        match self.writer {
            Some(current) if current != who => Err(IxError::InvariantViolation(format!(
                "{} already has writer {current}; {who} cannot bind",
                self.name
            ))),
            _ => {
                self.writer = Some(who);
                Ok(())
            }
        }
    }

    /// Give up the writer slot if `who` holds it.
    pub fn unbind(&mut self, who: ControllerId) -> bool {
        if self.writer == Some(who) {
            self.writer = None;
            true
        } else {
            false
        }
    }

    /// Write `value`.  Returns whether the value changed.
    pub fn set(&mut self, who: ControllerId, value: T) -> IxResult<bool> {
        if self.writer != Some(who) {
            return Err(IxError::InvariantViolation(format!(
                "{who} is not the writer of {}",
                self.name
            )));
        }
        let changed = self.value != value;
        if changed {
            debug!(flag = self.name, ?value, writer = %who, "shared flag changed");
        }
        self.value = value;
        Ok(changed)
    }
}

/// The flags interaction scripts coordinate through.
#[derive(Clone, Debug)]
pub struct SharedState {
    pub on_duty:        SharedCell<bool>,
    pub player_injured: SharedCell<bool>,
    pub lights_on:      SharedCell<bool>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            on_duty:        SharedCell::new("on_duty", false),
            player_injured: SharedCell::new("player_injured", false),
            lights_on:      SharedCell::new("lights_on", false),
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unbind `who` from every cell it writes.
    pub fn release_writer(&mut self, who: ControllerId) {
        self.on_duty.unbind(who);
        self.player_injured.unbind(who);
        self.lights_on.unbind(who);
    }
}
