//! Bass boost audio graph
//!
//! Routes the media element through a low-shelf filter:
//!
//! ```text
//! media element ─► low-shelf (800 Hz) ─► destination
//! ```
//!
//! The graph is built lazily and at most once per element. Web Audio only
//! allows one `MediaElementAudioSourceNode` per element, so a failed build is
//! never retried and playback continues unprocessed.

use crate::error::Result;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, error};

/// Largest boost the filter accepts (dB)
pub const MAX_BASS_GAIN_DB: f32 = 30.0;

/// Bass boost presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BassPreset {
    Default,
    High,
    VeryHigh,
    Insane,
    /// Gain taken from [`BassBoostConfig::custom_gain_db`]
    Custom,
}

impl BassPreset {
    pub const ALL: [BassPreset; 5] = [
        BassPreset::Default,
        BassPreset::High,
        BassPreset::VeryHigh,
        BassPreset::Insane,
        BassPreset::Custom,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            BassPreset::Default => "Default",
            BassPreset::High => "High",
            BassPreset::VeryHigh => "Very High",
            BassPreset::Insane => "Insane",
            BassPreset::Custom => "Custom",
        }
    }

    /// Fixed gain in dB, `None` for [`BassPreset::Custom`]
    pub fn gain_db(self) -> Option<f32> {
        match self {
            BassPreset::Default => Some(5.0),
            BassPreset::High => Some(10.0),
            BassPreset::VeryHigh => Some(20.0),
            BassPreset::Insane => Some(30.0),
            BassPreset::Custom => None,
        }
    }

    /// Look up a preset by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Bass boost settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BassBoostConfig {
    /// When false the filter gain is 0 dB
    pub enabled: bool,

    pub preset: BassPreset,

    /// Gain used by the Custom preset, in [0, 30] dB
    pub custom_gain_db: f32,
}

impl Default for BassBoostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: BassPreset::Default,
            custom_gain_db: 5.0,
        }
    }
}

impl BassBoostConfig {
    /// Gain the filter should currently apply
    pub fn effective_gain_db(&self) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.preset
            .gain_db()
            .unwrap_or_else(|| clamp_gain(self.custom_gain_db))
    }

    /// Select a preset; fixed presets also become the new custom gain
    pub fn select_preset(&mut self, preset: BassPreset) {
        self.preset = preset;
        if let Some(gain) = preset.gain_db() {
            self.custom_gain_db = gain;
        }
    }

    /// Set the custom gain and switch to the Custom preset
    pub fn set_custom_gain(&mut self, gain_db: f32) {
        self.custom_gain_db = clamp_gain(gain_db);
        self.preset = BassPreset::Custom;
    }
}

fn clamp_gain(gain_db: f32) -> f32 {
    if gain_db.is_nan() {
        0.0
    } else {
        gain_db.clamp(0.0, MAX_BASS_GAIN_DB)
    }
}

/// A built audio graph attached to the media element
pub trait AudioGraph {
    /// Set the low-shelf gain in dB
    fn set_bass_gain(&self, gain_db: f32) -> Result<()>;

    /// Whether the underlying context is suspended (autoplay policy)
    fn is_suspended(&self) -> bool;

    /// Resume a suspended context
    fn resume(&self) -> LocalBoxFuture<'static, Result<()>>;

    /// Close the context; the graph is unusable afterwards
    fn close(&self) -> Result<()>;
}

/// Builds the audio graph for the player's media element
pub trait AudioGraphFactory {
    fn build(&self, low_shelf_hz: f32) -> Result<Rc<dyn AudioGraph>>;
}

enum GraphSlot {
    Unbuilt,
    Built(Rc<dyn AudioGraph>),
    Failed,
    Closed,
}

/// Lazily built bass boost graph plus its settings
pub struct EnhancementGraph {
    factory: Box<dyn AudioGraphFactory>,
    low_shelf_hz: f32,
    config: BassBoostConfig,
    slot: GraphSlot,
}

impl EnhancementGraph {
    pub fn new(
        factory: Box<dyn AudioGraphFactory>,
        low_shelf_hz: f32,
        config: BassBoostConfig,
    ) -> Self {
        Self {
            factory,
            low_shelf_hz,
            config: BassBoostConfig {
                custom_gain_db: clamp_gain(config.custom_gain_db),
                ..config
            },
            slot: GraphSlot::Unbuilt,
        }
    }

    pub fn config(&self) -> &BassBoostConfig {
        &self.config
    }

    /// Build the graph if this is the first call; returns the live graph
    pub fn ensure_built(&mut self) -> Option<Rc<dyn AudioGraph>> {
        if matches!(self.slot, GraphSlot::Unbuilt) {
            self.slot = match self.factory.build(self.low_shelf_hz) {
                Ok(graph) => {
                    debug!(low_shelf_hz = self.low_shelf_hz, "Audio graph built");
                    GraphSlot::Built(graph)
                }
                Err(e) => {
                    error!(error = %e, "Failed to build audio graph, bass boost disabled");
                    GraphSlot::Failed
                }
            };
            self.apply();
        }
        self.graph()
    }

    /// The live graph, if built
    pub fn graph(&self) -> Option<Rc<dyn AudioGraph>> {
        match &self.slot {
            GraphSlot::Built(graph) => Some(Rc::clone(graph)),
            _ => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self.slot, GraphSlot::Built(_))
    }

    pub fn set_enabled(&mut self, enabled: bool) -> f32 {
        self.config.enabled = enabled;
        self.apply()
    }

    pub fn select_preset(&mut self, preset: BassPreset) -> f32 {
        self.config.select_preset(preset);
        self.apply()
    }

    pub fn set_custom_gain(&mut self, gain_db: f32) -> f32 {
        self.config.set_custom_gain(gain_db);
        self.apply()
    }

    /// Replace all settings at once
    pub fn set_config(&mut self, config: BassBoostConfig) -> f32 {
        self.config = BassBoostConfig {
            custom_gain_db: clamp_gain(config.custom_gain_db),
            ..config
        };
        self.apply()
    }

    /// Push the effective gain to the graph; returns it
    fn apply(&self) -> f32 {
        let gain = self.config.effective_gain_db();
        if let GraphSlot::Built(graph) = &self.slot {
            if let Err(e) = graph.set_bass_gain(gain) {
                error!(error = %e, gain_db = gain, "Failed to set bass gain");
            }
        }
        gain
    }

    /// Close the context; idempotent
    pub fn close(&mut self) {
        if let GraphSlot::Built(graph) = std::mem::replace(&mut self.slot, GraphSlot::Closed) {
            if let Err(e) = graph.close() {
                error!(error = %e, "Failed to close audio context");
            }
        } else {
            self.slot = GraphSlot::Closed;
        }
    }
}
