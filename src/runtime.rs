//! Capability interface to the native audio runtime.
//!
//! The session never talks to engine FFI directly. Everything it needs
//! from the runtime (studio/core lifecycle, bank loading, event
//! resolution, instance control, bus/VCA mixing) goes through the
//! traits in this module, so a backend can be swapped or faked in
//! tests without touching the session logic.

use crate::config::FernSonicSessionDesc;
use crate::playback::{PlaybackState, StopMode};
use crate::spatial::Attributes3d;
use bitflags::bitflags;
use std::path::Path;
use thiserror::Error;

/// A non-success status returned by an engine call, carried verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("status {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

bitflags! {
    /// Flags passed to the engine when loading a bank. Empty means a
    /// normal, blocking load.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LoadBankFlags: u32 {
        const NONBLOCKING = 1 << 0;
        const DECOMPRESS_SAMPLES = 1 << 1;
        const UNENCRYPTED = 1 << 2;
    }
}

/// Entry point into a native audio runtime.
pub trait AudioRuntime {
    /// A harmless call that forces the native library to resolve before
    /// any real handle is created. Failure here means the runtime
    /// binaries are unusable.
    fn warm_up(&self) -> EngineResult<()>;

    /// Creates the top-level studio system handle. The handle is not
    /// usable until [`StudioHandle::initialize`] has been called.
    fn create_studio(&self) -> EngineResult<Box<dyn StudioHandle>>;
}

/// The studio (session) system: the top-level handle all bank, event,
/// bus and VCA lookups hang off.
pub trait StudioHandle {
    /// Retrieves the core (mixing) system associated with this studio
    /// system.
    fn core(&self) -> EngineResult<Box<dyn CoreHandle>>;

    /// Initializes the studio system. Initializing studio transitively
    /// initializes the core system.
    fn initialize(&self, desc: &FernSonicSessionDesc) -> EngineResult<()>;

    fn load_bank_file(
        &self,
        path: &Path,
        flags: LoadBankFlags,
    ) -> EngineResult<Box<dyn BankHandle>>;

    /// Resolves an event description by path, e.g. `event:/ui/click`.
    /// Path-based lookups only succeed once the master strings bank has
    /// been loaded.
    fn event_description(&self, path: &str) -> EngineResult<Box<dyn EventDescriptionHandle>>;

    fn bus(&self, path: &str) -> EngineResult<Box<dyn BusHandle>>;

    fn vca(&self, path: &str) -> EngineResult<Box<dyn VcaHandle>>;

    /// Advances engine-internal scheduling, parameter automation and
    /// pause/mute propagation. Must be driven by the caller on a regular
    /// cadence; mixing reads reflect state as of the last update.
    fn update(&self) -> EngineResult<()>;

    /// Releases the studio system. Unloads all banks and invalidates all
    /// outstanding description and instance handles engine-side.
    fn release(&self) -> EngineResult<()>;

    fn is_valid(&self) -> bool;
}

/// The core (mixing) system handle, retrieved from the studio system.
pub trait CoreHandle {
    fn is_valid(&self) -> bool;
}

/// A loaded unit of sound content.
pub trait BankHandle {
    fn is_valid(&self) -> bool;
}

impl std::fmt::Debug for dyn BankHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BankHandle").field("valid", &self.is_valid()).finish()
    }
}

/// A template for playable events, resolved by path.
pub trait EventDescriptionHandle {
    /// Whether instances of this event are spatialized.
    fn is_3d(&self) -> EngineResult<bool>;

    fn create_instance(&self) -> EngineResult<Box<dyn EventInstanceHandle>>;

    /// Number of live (created, not yet released) instances.
    fn instance_count(&self) -> EngineResult<i32>;
}

/// A live occurrence of an event description.
pub trait EventInstanceHandle {
    fn set_parameter(&self, name: &str, value: f32) -> EngineResult<()>;

    fn set_3d_attributes(&self, attributes: &Attributes3d) -> EngineResult<()>;

    fn start(&self) -> EngineResult<()>;

    fn stop(&self, mode: StopMode) -> EngineResult<()>;

    /// Hands the instance back to the engine. The engine frees its
    /// resources once playback completes; the handle must not be used
    /// afterwards.
    fn release(&self) -> EngineResult<()>;

    fn set_paused(&self, paused: bool) -> EngineResult<()>;

    fn playback_state(&self) -> EngineResult<PlaybackState>;
}

/// A mixing channel aggregating event instance output. Pause and mute
/// are hierarchical engine-side; the session surfaces them as-is.
pub trait BusHandle {
    fn volume(&self) -> EngineResult<f32>;

    fn set_volume(&self, volume: f32) -> EngineResult<()>;

    fn paused(&self) -> EngineResult<bool>;

    fn set_paused(&self, paused: bool) -> EngineResult<()>;

    fn muted(&self) -> EngineResult<bool>;

    fn set_mute(&self, mute: bool) -> EngineResult<()>;

    /// Stops every event instance routed into this bus.
    fn stop_all_events(&self, mode: StopMode) -> EngineResult<()>;
}

/// A volume control aggregate affecting multiple buses uniformly.
pub trait VcaHandle {
    fn volume(&self) -> EngineResult<f32>;

    fn set_volume(&self, volume: f32) -> EngineResult<()>;
}
