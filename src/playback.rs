//! Event instance lifecycle and playback types

use crate::error::{FernSonicError, Result};
use crate::runtime::EventInstanceHandle;
use crate::spatial::{Attributes3d, Vec2, Vec3};

/// How an instance (or a bus's routed instances) should be stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Let the event's fade-out and release envelopes play out.
    AllowFadeout,
    /// Cut playback immediately.
    Immediate,
}

/// Engine-side playback state of an event instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Starting,
    Playing,
    Sustaining,
    Stopping,
    Stopped,
}

impl PlaybackState {
    /// Whether the instance is audible or about to be. Sustain points
    /// and fade-outs do not count as playing.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Starting | Self::Playing)
    }
}

/// Lightweight identity handle for a created event instance.
///
/// Returned by the one-shot playback calls for logging and identity
/// purposes only; it carries no control over the released instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(pub(crate) u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

/// How a music transition behaves.
#[derive(Debug, Clone, Copy)]
pub struct MusicOptions {
    /// Start the new track immediately. When false the instance still
    /// occupies the music slot, created but not started.
    pub autostart: bool,
    /// Let the previous occupant fade out instead of cutting it.
    pub fade_previous: bool,
}

impl Default for MusicOptions {
    fn default() -> Self {
        Self {
            autostart: true,
            fade_previous: true,
        }
    }
}

/// A live, playable occurrence of an event description.
///
/// The session creates these; the caller owns them and is responsible
/// for eventually calling [`stop`](Self::stop) or
/// [`release`](Self::release), both of which consume the instance so a
/// released handle can never be used again. Dropping an instance
/// releases it best-effort.
pub struct EventInstance {
    id: InstanceId,
    event_path: String,
    handle: Option<Box<dyn EventInstanceHandle>>,
}

impl std::fmt::Debug for EventInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventInstance")
            .field("id", &self.id)
            .field("event_path", &self.event_path)
            .field("released", &self.handle.is_none())
            .finish_non_exhaustive()
    }
}

impl EventInstance {
    pub(crate) fn new(id: InstanceId, event_path: &str, handle: Box<dyn EventInstanceHandle>) -> Self {
        Self {
            id,
            event_path: event_path.to_string(),
            handle: Some(handle),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The event path this instance was created from.
    pub fn event_path(&self) -> &str {
        &self.event_path
    }

    fn handle(&self) -> Result<&dyn EventInstanceHandle> {
        self.handle.as_deref().ok_or(FernSonicError::InvalidState)
    }

    /// Sets a single parameter by name.
    pub fn set_parameter(&self, name: &str, value: f32) -> Result<()> {
        self.handle()?.set_parameter(name, value)?;
        Ok(())
    }

    /// Sets parameters in order. Each pair is applied independently; the
    /// first failure aborts the remainder and the already-applied prefix
    /// stays committed.
    pub fn set_parameters(&self, parameters: &[(&str, f32)]) -> Result<()> {
        for (name, value) in parameters {
            self.handle()?.set_parameter(name, *value)?;
        }
        Ok(())
    }

    /// Positions the instance at `position` heard from `origin`.
    pub fn set_position(&self, position: Vec2, origin: Vec2) -> Result<()> {
        let rel = position - origin;
        self.set_attributes(Attributes3d::at(Vec3::new(rel.x, rel.y, 0.0)))
    }

    pub(crate) fn set_attributes(&self, attributes: Attributes3d) -> Result<()> {
        self.handle()?.set_3d_attributes(&attributes)?;
        Ok(())
    }

    pub fn start(&self) -> Result<()> {
        self.handle()?.start()?;
        Ok(())
    }

    pub fn set_paused(&self, paused: bool) -> Result<()> {
        self.handle()?.set_paused(paused)?;
        Ok(())
    }

    pub fn playback_state(&self) -> Result<PlaybackState> {
        Ok(self.handle()?.playback_state()?)
    }

    /// True iff the engine reports the instance as starting or playing.
    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.playback_state()?.is_playing())
    }

    /// Stops the instance with the given mode, then releases it.
    pub fn stop(mut self, mode: StopMode) -> Result<()> {
        let handle = self.handle.take().ok_or(FernSonicError::InvalidState)?;
        handle.stop(mode)?;
        handle.release()?;
        Ok(())
    }

    /// Hands the instance back to the engine. The engine frees it once
    /// playback completes; no further control is possible.
    pub fn release(mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(FernSonicError::InvalidState)?;
        handle.release()?;
        Ok(())
    }

    /// Forgets the engine handle without a release call. Used during
    /// session teardown, where releasing the studio system has already
    /// invalidated every instance engine-side.
    pub(crate) fn discard(mut self) {
        self.handle.take();
    }
}

impl Drop for EventInstance {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.release() {
                log::warn!(
                    "Failed to release event instance {} ({}): {}",
                    self.id,
                    self.event_path,
                    e
                );
            }
        }
    }
}
