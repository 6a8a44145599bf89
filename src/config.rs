//! Configuration for FernSonic sessions

use bitflags::bitflags;

bitflags! {
    /// Studio-system init flags. Empty means normal initialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StudioInitFlags: u32 {
        /// Allow live profiling/mixing tools to connect to the session.
        const LIVE_UPDATE = 1 << 0;
        /// Run studio command processing on the caller's update thread
        /// instead of an engine-internal one.
        const SYNCHRONOUS_UPDATE = 1 << 1;
        /// Defer engine callbacks to the next update call.
        const DEFERRED_CALLBACKS = 1 << 2;
        /// Only load sample data from the update thread.
        const LOAD_FROM_UPDATE = 1 << 3;
    }
}

bitflags! {
    /// Core-system init flags. Empty means normal initialization.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CoreInitFlags: u32 {
        const STREAM_FROM_UPDATE = 1 << 0;
        const MIX_FROM_UPDATE = 1 << 1;
        /// Use a right-handed coordinate system for 3D math.
        const RIGHT_HANDED_3D = 1 << 2;
        const PROFILE_ENABLE = 1 << 3;
    }
}

/// Configuration descriptor for a FernSonic session.
///
/// Passed to the studio system during the fixed construction sequence;
/// initializing the studio system transitively initializes the core
/// system with these settings.
#[derive(Debug, Clone)]
pub struct FernSonicSessionDesc {
    /// Maximum number of virtual channels the core system mixes.
    pub max_channels: u32,
    /// Studio-system init flags.
    pub studio_flags: StudioInitFlags,
    /// Core-system init flags.
    pub core_flags: CoreInitFlags,
    /// Opaque driver-specific data handed through to the engine untouched.
    pub driver_data: Option<Vec<u8>>,
}

impl Default for FernSonicSessionDesc {
    fn default() -> Self {
        Self {
            max_channels: 256,
            studio_flags: StudioInitFlags::default(),
            core_flags: CoreInitFlags::default(),
            driver_data: None,
        }
    }
}

impl FernSonicSessionDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_channels(mut self, max: u32) -> Self {
        self.max_channels = max;
        self
    }

    pub fn studio_flags(mut self, flags: StudioInitFlags) -> Self {
        self.studio_flags = flags;
        self
    }

    pub fn core_flags(mut self, flags: CoreInitFlags) -> Self {
        self.core_flags = flags;
        self
    }

    pub fn driver_data(mut self, data: Vec<u8>) -> Self {
        self.driver_data = Some(data);
        self
    }
}
