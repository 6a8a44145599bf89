pub mod config;
pub mod error;
pub mod mixer;
pub mod playback;
pub mod runtime;
pub mod session;
pub mod spatial;

pub use config::{CoreInitFlags, FernSonicSessionDesc, StudioInitFlags};
pub use error::{FernSonicError, Result};
pub use mixer::{Bus, Vca};
pub use playback::{EventInstance, InstanceId, MusicOptions, PlaybackState, StopMode};
pub use runtime::{AudioRuntime, EngineError};
pub use session::FernSonicSession;
pub use spatial::{Attributes3d, Placement};
