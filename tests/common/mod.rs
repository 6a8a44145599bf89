//! In-memory mock audio runtime recording all engine traffic.
//!
//! Handles share one `Arc<Mutex<EngineState>>`; tests inspect the state
//! to assert what the session asked the engine to do, and poke it to
//! steer playback states and failure injection.

#![allow(dead_code)]

use fernsonic::config::FernSonicSessionDesc;
use fernsonic::playback::{PlaybackState, StopMode};
use fernsonic::runtime::{
    AudioRuntime, BankHandle, BusHandle, CoreHandle, EngineError, EngineResult,
    EventDescriptionHandle, EventInstanceHandle, LoadBankFlags, StudioHandle, VcaHandle,
};
use fernsonic::spatial::{Attributes3d, Vec3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum InstanceOp {
    Attributes(Vec3),
    Parameter(String, f32),
    Start,
    Stop(StopMode),
    Release,
    SetPaused(bool),
}

#[derive(Debug)]
pub struct InstanceRecord {
    pub event_path: String,
    pub ops: Vec<InstanceOp>,
    pub released: bool,
    pub state: PlaybackState,
}

#[derive(Debug)]
pub struct MixerStrip {
    pub volume: f32,
    pub paused: bool,
    pub muted: bool,
    pub stop_calls: Vec<StopMode>,
}

impl Default for MixerStrip {
    fn default() -> Self {
        Self {
            volume: 1.0,
            paused: false,
            muted: false,
            stop_calls: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct EngineState {
    /// Ordered log of lifecycle calls: warm_up, create_studio, core,
    /// initialize, release.
    pub lifecycle: Vec<String>,
    pub initialized: Option<(u32, u32, u32)>,
    pub studio_released: bool,
    pub fail_warm_up: bool,
    pub fail_initialize: bool,
    /// Engine-side bank load attempts, in order.
    pub bank_loads: Vec<PathBuf>,
    /// Paths the engine rejects with a load error.
    pub failed_bank_paths: Vec<PathBuf>,
    /// Known event paths and whether their description is 3D.
    pub events: HashMap<String, bool>,
    /// Engine-side description resolutions, in order.
    pub resolutions: Vec<String>,
    pub instances: Vec<InstanceRecord>,
    pub buses: HashMap<String, MixerStrip>,
    pub vcas: HashMap<String, f32>,
    pub update_calls: usize,
    /// Parameter names the engine rejects.
    pub failing_parameters: Vec<String>,
}

impl EngineState {
    /// Records for every instance created from `path`, in creation order.
    pub fn instances_of(&self, path: &str) -> Vec<&InstanceRecord> {
        self.instances
            .iter()
            .filter(|record| record.event_path == path)
            .collect()
    }
}

pub struct MockRuntime {
    state: Arc<Mutex<EngineState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    pub fn state(&self) -> Arc<Mutex<EngineState>> {
        Arc::clone(&self.state)
    }

    pub fn with_event(self, path: &str, is_3d: bool) -> Self {
        self.state
            .lock()
            .unwrap()
            .events
            .insert(path.to_string(), is_3d);
        self
    }

    pub fn with_bus(self, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .buses
            .insert(path.to_string(), MixerStrip::default());
        self
    }

    pub fn with_vca(self, path: &str) -> Self {
        self.state.lock().unwrap().vcas.insert(path.to_string(), 1.0);
        self
    }
}

impl AudioRuntime for MockRuntime {
    fn warm_up(&self) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.lifecycle.push("warm_up".into());
        if state.fail_warm_up {
            return Err(EngineError::new(20, "native library unavailable"));
        }
        Ok(())
    }

    fn create_studio(&self) -> EngineResult<Box<dyn StudioHandle>> {
        let mut state = self.state.lock().unwrap();
        state.lifecycle.push("create_studio".into());
        Ok(Box::new(MockStudio {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockStudio {
    state: Arc<Mutex<EngineState>>,
}

impl StudioHandle for MockStudio {
    fn core(&self) -> EngineResult<Box<dyn CoreHandle>> {
        let mut state = self.state.lock().unwrap();
        state.lifecycle.push("core".into());
        Ok(Box::new(MockCore {
            state: Arc::clone(&self.state),
        }))
    }

    fn initialize(&self, desc: &FernSonicSessionDesc) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.lifecycle.push("initialize".into());
        if state.fail_initialize {
            return Err(EngineError::new(28, "initialization failed"));
        }
        state.initialized = Some((
            desc.max_channels,
            desc.studio_flags.bits(),
            desc.core_flags.bits(),
        ));
        Ok(())
    }

    fn load_bank_file(
        &self,
        path: &Path,
        _flags: LoadBankFlags,
    ) -> EngineResult<Box<dyn BankHandle>> {
        let mut state = self.state.lock().unwrap();
        if state.failed_bank_paths.iter().any(|p| p == path) {
            return Err(EngineError::new(23, format!("bad bank: {}", path.display())));
        }
        state.bank_loads.push(path.to_path_buf());
        Ok(Box::new(MockBank {
            state: Arc::clone(&self.state),
        }))
    }

    fn event_description(&self, path: &str) -> EngineResult<Box<dyn EventDescriptionHandle>> {
        let mut state = self.state.lock().unwrap();
        state.resolutions.push(path.to_string());
        if !state.events.contains_key(path) {
            return Err(EngineError::new(74, format!("event not found: {path}")));
        }
        Ok(Box::new(MockDescription {
            path: path.to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    fn bus(&self, path: &str) -> EngineResult<Box<dyn BusHandle>> {
        let state = self.state.lock().unwrap();
        if !state.buses.contains_key(path) {
            return Err(EngineError::new(74, format!("bus not found: {path}")));
        }
        Ok(Box::new(MockBus {
            path: path.to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    fn vca(&self, path: &str) -> EngineResult<Box<dyn VcaHandle>> {
        let state = self.state.lock().unwrap();
        if !state.vcas.contains_key(path) {
            return Err(EngineError::new(74, format!("vca not found: {path}")));
        }
        Ok(Box::new(MockVca {
            path: path.to_string(),
            state: Arc::clone(&self.state),
        }))
    }

    fn update(&self) -> EngineResult<()> {
        self.state.lock().unwrap().update_calls += 1;
        Ok(())
    }

    fn release(&self) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.lifecycle.push("release".into());
        state.studio_released = true;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        !self.state.lock().unwrap().studio_released
    }
}

struct MockCore {
    state: Arc<Mutex<EngineState>>,
}

impl CoreHandle for MockCore {
    fn is_valid(&self) -> bool {
        !self.state.lock().unwrap().studio_released
    }
}

struct MockBank {
    state: Arc<Mutex<EngineState>>,
}

impl BankHandle for MockBank {
    fn is_valid(&self) -> bool {
        !self.state.lock().unwrap().studio_released
    }
}

struct MockDescription {
    path: String,
    state: Arc<Mutex<EngineState>>,
}

impl EventDescriptionHandle for MockDescription {
    fn is_3d(&self) -> EngineResult<bool> {
        Ok(self.state.lock().unwrap().events[&self.path])
    }

    fn create_instance(&self) -> EngineResult<Box<dyn EventInstanceHandle>> {
        let mut state = self.state.lock().unwrap();
        let index = state.instances.len();
        state.instances.push(InstanceRecord {
            event_path: self.path.clone(),
            ops: Vec::new(),
            released: false,
            state: PlaybackState::Stopped,
        });
        Ok(Box::new(MockInstance {
            index,
            state: Arc::clone(&self.state),
        }))
    }

    fn instance_count(&self) -> EngineResult<i32> {
        let state = self.state.lock().unwrap();
        Ok(state
            .instances
            .iter()
            .filter(|record| record.event_path == self.path && !record.released)
            .count() as i32)
    }
}

struct MockInstance {
    index: usize,
    state: Arc<Mutex<EngineState>>,
}

impl EventInstanceHandle for MockInstance {
    fn set_parameter(&self, name: &str, value: f32) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_parameters.iter().any(|p| p == name) {
            return Err(EngineError::new(31, format!("bad parameter: {name}")));
        }
        state.instances[self.index]
            .ops
            .push(InstanceOp::Parameter(name.to_string(), value));
        Ok(())
    }

    fn set_3d_attributes(&self, attributes: &Attributes3d) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.instances[self.index]
            .ops
            .push(InstanceOp::Attributes(attributes.position));
        Ok(())
    }

    fn start(&self) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.instances[self.index].ops.push(InstanceOp::Start);
        state.instances[self.index].state = PlaybackState::Playing;
        Ok(())
    }

    fn stop(&self, mode: StopMode) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.instances[self.index].ops.push(InstanceOp::Stop(mode));
        state.instances[self.index].state = PlaybackState::Stopped;
        Ok(())
    }

    fn release(&self) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.instances[self.index].ops.push(InstanceOp::Release);
        state.instances[self.index].released = true;
        Ok(())
    }

    fn set_paused(&self, paused: bool) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.instances[self.index]
            .ops
            .push(InstanceOp::SetPaused(paused));
        Ok(())
    }

    fn playback_state(&self) -> EngineResult<PlaybackState> {
        Ok(self.state.lock().unwrap().instances[self.index].state)
    }
}

struct MockBus {
    path: String,
    state: Arc<Mutex<EngineState>>,
}

impl BusHandle for MockBus {
    fn volume(&self) -> EngineResult<f32> {
        Ok(self.state.lock().unwrap().buses[&self.path].volume)
    }

    fn set_volume(&self, volume: f32) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buses.get_mut(&self.path).unwrap().volume = volume;
        Ok(())
    }

    fn paused(&self) -> EngineResult<bool> {
        Ok(self.state.lock().unwrap().buses[&self.path].paused)
    }

    fn set_paused(&self, paused: bool) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buses.get_mut(&self.path).unwrap().paused = paused;
        Ok(())
    }

    fn muted(&self) -> EngineResult<bool> {
        Ok(self.state.lock().unwrap().buses[&self.path].muted)
    }

    fn set_mute(&self, mute: bool) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buses.get_mut(&self.path).unwrap().muted = mute;
        Ok(())
    }

    fn stop_all_events(&self, mode: StopMode) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buses.get_mut(&self.path).unwrap().stop_calls.push(mode);
        Ok(())
    }
}

struct MockVca {
    path: String,
    state: Arc<Mutex<EngineState>>,
}

impl VcaHandle for MockVca {
    fn volume(&self) -> EngineResult<f32> {
        Ok(self.state.lock().unwrap().vcas[&self.path])
    }

    fn set_volume(&self, volume: f32) -> EngineResult<()> {
        let mut state = self.state.lock().unwrap();
        state.vcas.insert(self.path.clone(), volume);
        Ok(())
    }
}

/// Builds a session over a mock runtime with default settings.
pub fn session_over(runtime: &MockRuntime) -> fernsonic::FernSonicSession {
    fernsonic::FernSonicSession::new(runtime, FernSonicSessionDesc::default())
        .expect("session construction failed")
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
