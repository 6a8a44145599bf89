//! The audio session: the central API object of FernSonic.

use crate::config::FernSonicSessionDesc;
use crate::error::{FernSonicError, Result};
use crate::mixer::{Bus, Vca};
use crate::playback::{EventInstance, InstanceId, MusicOptions, StopMode};
use crate::runtime::{
    AudioRuntime, BankHandle, CoreHandle, EventDescriptionHandle, LoadBankFlags, StudioHandle,
};
use crate::spatial::{Attributes3d, Placement, Vec2};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// The music slot: at most one persistent track at a time.
struct MusicTrack {
    path: String,
    instance: EventInstance,
}

/// Main session object managing banks, events and mixing atop a native
/// audio runtime.
///
/// `FernSonicSession` owns the two top-level engine handles (studio and
/// core), the bank and event-description caches, and the single music
/// slot. It is driven by one controlling thread: every mutating
/// operation takes `&mut self`, so the external serialization the
/// engine expects is enforced by the borrow checker.
///
/// # Lifecycle
///
/// Construction runs the engine's fixed init sequence and fails fast on
/// any non-success status. [`update`](Self::update) must be called on a
/// regular cadence (once per frame/tick) to advance engine scheduling.
/// [`dispose`](Self::dispose) releases the studio handle, which unloads
/// all banks and invalidates all outstanding handles engine-side; it is
/// idempotent, and dropping the session runs the same teardown
/// best-effort.
pub struct FernSonicSession {
    studio: Box<dyn StudioHandle>,
    core: Box<dyn CoreHandle>,
    disposed: bool,
    banks: HashMap<String, Arc<dyn BankHandle>>,
    descriptions: HashMap<String, Arc<dyn EventDescriptionHandle>>,
    music: Option<MusicTrack>,
    next_instance: u64,
}

impl std::fmt::Debug for FernSonicSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FernSonicSession")
            .field("disposed", &self.disposed)
            .field("banks", &self.banks.len())
            .field("descriptions", &self.descriptions.len())
            .field("next_instance", &self.next_instance)
            .finish_non_exhaustive()
    }
}

impl FernSonicSession {
    /// Creates and initializes a session against the given runtime.
    ///
    /// The construction sequence is fixed and order-dependent: warm up
    /// the native library, create the studio system, retrieve its core
    /// system, then initialize studio (which transitively initializes
    /// core) with the descriptor's settings. Any failure propagates; no
    /// step is retried.
    pub fn new(runtime: &dyn AudioRuntime, desc: FernSonicSessionDesc) -> Result<Self> {
        runtime.warm_up()?;
        let studio = runtime.create_studio()?;
        let core = studio.core()?;
        studio.initialize(&desc)?;
        log::info!(
            "Audio session initialized (max_channels: {}, studio_flags: {:?}, core_flags: {:?})",
            desc.max_channels,
            desc.studio_flags,
            desc.core_flags
        );
        Ok(Self {
            studio,
            core,
            disposed: false,
            banks: HashMap::new(),
            descriptions: HashMap::new(),
            music: None,
            next_instance: 0,
        })
    }

    /// The studio system handle. Fails once the session is released.
    pub fn studio(&self) -> Result<&dyn StudioHandle> {
        if self.disposed {
            return Err(FernSonicError::InvalidState);
        }
        Ok(self.studio.as_ref())
    }

    /// The core system handle. Fails once the session is released.
    pub fn core(&self) -> Result<&dyn CoreHandle> {
        if self.disposed {
            return Err(FernSonicError::InvalidState);
        }
        Ok(self.core.as_ref())
    }

    /// Loads a bank from `path`, optionally registering it in the bank
    /// cache under `cache_key`.
    ///
    /// The filesystem is checked before the engine sees the path, so a
    /// missing file fails with [`FernSonicError::ResourceNotFound`]
    /// without an engine call. A non-empty `cache_key` that is already
    /// registered is rejected with
    /// [`FernSonicError::DuplicateCacheKey`], also before the engine
    /// call; a key is never silently overwritten.
    ///
    /// Loading a bank mutates engine-global state: events, buses and
    /// VCAs contained in it become resolvable by path session-wide. The
    /// master strings bank must be loaded before any path-based lookup
    /// resolves; that ordering is the engine's contract and is not
    /// enforced here.
    pub fn load_bank(
        &mut self,
        path: impl AsRef<Path>,
        cache_key: Option<&str>,
    ) -> Result<Arc<dyn BankHandle>> {
        let path = path.as_ref();
        self.studio()?;
        let key = cache_key.filter(|key| !key.is_empty());
        if let Some(key) = key {
            if self.banks.contains_key(key) {
                return Err(FernSonicError::DuplicateCacheKey(key.to_string()));
            }
        }
        if !path.exists() {
            return Err(FernSonicError::ResourceNotFound {
                path: path.to_path_buf(),
            });
        }
        let bank: Arc<dyn BankHandle> =
            Arc::from(self.studio()?.load_bank_file(path, LoadBankFlags::default())?);
        log::debug!("Loaded bank {}", path.display());
        if let Some(key) = key {
            self.banks.insert(key.to_string(), Arc::clone(&bank));
            log::debug!("Registered bank cache key '{}'", key);
        }
        Ok(bank)
    }

    /// Looks up a bank previously registered under `cache_key`. Pure
    /// cache lookup; never touches the engine and never fails.
    pub fn cached_bank(&self, cache_key: &str) -> Option<Arc<dyn BankHandle>> {
        self.banks.get(cache_key).cloned()
    }

    /// Resolves the event description for `path`, consulting the cache
    /// first. A description resolved once stays reachable until a sweep
    /// evicts it.
    pub fn event_description(&mut self, path: &str) -> Result<Arc<dyn EventDescriptionHandle>> {
        if let Some(description) = self.descriptions.get(path) {
            return Ok(Arc::clone(description));
        }
        let description: Arc<dyn EventDescriptionHandle> =
            Arc::from(self.studio()?.event_description(path)?);
        self.descriptions
            .insert(path.to_string(), Arc::clone(&description));
        log::debug!("Cached event description {}", path);
        Ok(description)
    }

    /// Evicts every cached event description whose live-instance count
    /// is zero, and returns how many were evicted.
    ///
    /// This is a maintenance sweep, not automatic: callers invoke it
    /// periodically (per update tick, or on a longer interval) to trade
    /// memory against description-cache hit rate. Eviction candidates
    /// are collected first, then removed, so the cache is never mutated
    /// mid-iteration.
    pub fn release_unused_event_descriptions(&mut self) -> Result<usize> {
        self.studio()?;
        let mut idle = Vec::new();
        for (path, description) in &self.descriptions {
            if description.instance_count()? == 0 {
                idle.push(path.clone());
            }
        }
        for path in &idle {
            self.descriptions.remove(path);
        }
        if !idle.is_empty() {
            log::debug!("Evicted {} idle event descriptions", idle.len());
        }
        Ok(idle.len())
    }

    /// Creates an event instance for `path`.
    ///
    /// If the event's description is 3D, the placement's relative
    /// position is pushed to the instance before it is returned; a
    /// [`Placement::NonSpatial`] placement positions a 3D event at the
    /// origin. The caller owns the instance and must eventually stop or
    /// release it; the session does not track it.
    pub fn create_instance(&mut self, path: &str, placement: Placement) -> Result<EventInstance> {
        let description = self.event_description(path)?;
        let handle = description.create_instance()?;
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        let instance = EventInstance::new(id, path, handle);
        if description.is_3d()? {
            instance.set_attributes(Attributes3d::at(placement.world_position()))?;
        }
        log::debug!("Created {} for {}", id, path);
        Ok(instance)
    }

    /// Plays `path` as a one-shot sound effect: create, start, release.
    pub fn play_sound_effect(&mut self, path: &str) -> Result<InstanceId> {
        self.play_sound_effect_with(path, &[], Placement::NonSpatial)
    }

    /// One-shot playback positioned at `position` heard from `origin`.
    pub fn play_sound_effect_at(
        &mut self,
        path: &str,
        position: Vec2,
        origin: Vec2,
    ) -> Result<InstanceId> {
        self.play_sound_effect_with(path, &[], Placement::relative_to(position, origin))
    }

    /// One-shot playback with parameters and placement.
    ///
    /// The sequence is fixed: create the instance (positioned if the
    /// event is 3D), apply the parameters in order, start, release.
    /// Releasing immediately after start is mandatory for one-shot
    /// playback: the engine frees the instance once it finishes
    /// naturally. The returned id is for identity and logging only; no
    /// further control over the instance is possible.
    pub fn play_sound_effect_with(
        &mut self,
        path: &str,
        parameters: &[(&str, f32)],
        placement: Placement,
    ) -> Result<InstanceId> {
        let instance = self.create_instance(path, placement)?;
        instance.set_parameters(parameters)?;
        instance.start()?;
        let id = instance.id();
        instance.release()?;
        Ok(id)
    }

    /// Plays `path` as the session's music track, fading out and
    /// replacing the current one. See [`play_music_with`](Self::play_music_with).
    pub fn play_music(&mut self, path: &str) -> Result<()> {
        self.play_music_with(path, MusicOptions::default())
    }

    /// Installs `path` in the music slot.
    ///
    /// Requesting the path already occupying the slot is an idempotent
    /// no-op; the track is not restarted. Otherwise the current
    /// occupant (if any) is stopped with fade-out or an immediate cut
    /// per `options.fade_previous` and released, a new non-spatial
    /// instance is created, started iff `options.autostart`, and
    /// installed as the slot occupant. An unstarted instance still
    /// occupies the slot.
    pub fn play_music_with(&mut self, path: &str, options: MusicOptions) -> Result<()> {
        self.studio()?;
        if self.music.as_ref().is_some_and(|track| track.path == path) {
            return Ok(());
        }
        if let Some(track) = self.music.take() {
            let mode = if options.fade_previous {
                StopMode::AllowFadeout
            } else {
                StopMode::Immediate
            };
            log::debug!("Replacing music track {} with {}", track.path, path);
            track.instance.stop(mode)?;
        }
        let instance = self.create_instance(path, Placement::NonSpatial)?;
        if options.autostart {
            instance.start()?;
        }
        self.music = Some(MusicTrack {
            path: path.to_string(),
            instance,
        });
        Ok(())
    }

    /// Stops and releases the music-slot occupant, if any.
    pub fn stop_music(&mut self, mode: StopMode) -> Result<()> {
        if let Some(track) = self.music.take() {
            log::debug!("Stopping music track {}", track.path);
            track.instance.stop(mode)?;
        }
        Ok(())
    }

    /// The event path currently occupying the music slot.
    pub fn music_path(&self) -> Option<&str> {
        self.music.as_ref().map(|track| track.path.as_str())
    }

    /// Whether the music-slot occupant is starting or playing.
    pub fn is_music_playing(&self) -> Result<bool> {
        match &self.music {
            Some(track) => track.instance.is_playing(),
            None => Ok(false),
        }
    }

    /// Resolves the bus at `path`. Resolution happens on every call;
    /// bus handles are never cached.
    pub fn bus(&self, path: &str) -> Result<Bus> {
        Ok(Bus::new(path, self.studio()?.bus(path)?))
    }

    /// Resolves the VCA at `path`. Resolution happens on every call;
    /// VCA handles are never cached.
    pub fn vca(&self, path: &str) -> Result<Vca> {
        Ok(Vca::new(path, self.studio()?.vca(path)?))
    }

    /// Advances engine-internal scheduling. Not implicit in any other
    /// operation; call once per frame/tick.
    pub fn update(&self) -> Result<()> {
        self.studio()?.update()?;
        Ok(())
    }

    /// Releases the session.
    ///
    /// Releases the studio handle (unloading all banks and invalidating
    /// all outstanding description and instance handles engine-side),
    /// clears both caches and the music slot, and marks the session
    /// permanently disposed. Idempotent: a second call is a no-op.
    /// Errors propagate; the `Drop` path runs the same teardown but
    /// swallows and logs instead.
    pub fn dispose(&mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        if let Some(track) = self.music.take() {
            // The studio release below invalidates every instance
            // engine-side; a release call on the occupant would be stale.
            track.instance.discard();
        }
        self.banks.clear();
        self.descriptions.clear();
        self.studio.release()?;
        log::info!("Audio session released");
        Ok(())
    }
}

impl Drop for FernSonicSession {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            log::warn!("Audio session teardown failed: {}", e);
        }
    }
}
