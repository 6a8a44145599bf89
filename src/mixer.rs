//! Bus and VCA mixing control
//!
//! Handles are resolved by path on every lookup and never cached by the
//! session; each wrapper round-trips to the engine. Reads reflect engine
//! state as of the last update call, so callers needing fresh values
//! must drive the update loop.

use crate::error::Result;
use crate::playback::StopMode;
use crate::runtime::{BusHandle, VcaHandle};

/// A mixing channel aggregating event instance output.
///
/// Pause and mute are hierarchical engine-side and override inputs when
/// set; the session surfaces that contract as-is.
pub struct Bus {
    path: String,
    handle: Box<dyn BusHandle>,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Bus {
    pub(crate) fn new(path: &str, handle: Box<dyn BusHandle>) -> Self {
        Self {
            path: path.to_string(),
            handle,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Linear volume scalar, 1.0 being unity gain.
    pub fn volume(&self) -> Result<f32> {
        Ok(self.handle.volume()?)
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.handle.set_volume(volume)?;
        Ok(())
    }

    pub fn paused(&self) -> Result<bool> {
        Ok(self.handle.paused()?)
    }

    pub fn set_paused(&self, paused: bool) -> Result<()> {
        self.handle.set_paused(paused)?;
        Ok(())
    }

    pub fn muted(&self) -> Result<bool> {
        Ok(self.handle.muted()?)
    }

    pub fn set_mute(&self, mute: bool) -> Result<()> {
        self.handle.set_mute(mute)?;
        Ok(())
    }

    /// Stops every event instance routed into this bus.
    pub fn stop_all_events(&self, mode: StopMode) -> Result<()> {
        self.handle.stop_all_events(mode)?;
        Ok(())
    }
}

/// A volume control aggregate affecting multiple buses uniformly.
pub struct Vca {
    path: String,
    handle: Box<dyn VcaHandle>,
}

impl std::fmt::Debug for Vca {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vca").field("path", &self.path).finish_non_exhaustive()
    }
}

impl Vca {
    pub(crate) fn new(path: &str, handle: Box<dyn VcaHandle>) -> Self {
        Self {
            path: path.to_string(),
            handle,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn volume(&self) -> Result<f32> {
        Ok(self.handle.volume()?)
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.handle.set_volume(volume)?;
        Ok(())
    }
}
