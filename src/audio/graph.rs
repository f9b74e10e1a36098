use std::fmt;

use tracing::{debug, warn};

use crate::error::{PlayerError, Result};

use super::types::{
    Band, ContextState, EQ_MAX_DB, EQ_MIN_DB, EQ_STEP_DB, EqSettings, FilterKind, FilterSpec,
    HIGH_SHELF_HZ, LOW_SHELF_HZ, NodeKind, PEAKING_HZ, PEAKING_Q,
};

/// Node-graph primitives the manager needs from an audio backend.
pub trait GraphBackend {
    type Node: Copy + Eq + fmt::Debug;

    fn create_node(&mut self, kind: NodeKind) -> Result<Self::Node>;
    fn connect(&mut self, from: Self::Node, to: Self::Node) -> Result<()>;
    /// Remove every outgoing connection of `node`.
    fn disconnect(&mut self, node: Self::Node);
    /// Linear gain for `Gain` nodes, dB for filter nodes.
    fn set_gain(&mut self, node: Self::Node, value: f32);
    fn state(&self) -> ContextState;
    fn resume(&mut self) -> Result<()>;
}

#[derive(Debug, Copy, Clone)]
struct Chain<N> {
    source: N,
    gain: N,
    low: N,
    mid: N,
    high: N,
    destination: N,
}

impl<N: Copy> Chain<N> {
    fn band(&self, band: Band) -> N {
        match band {
            Band::Low => self.low,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }
}

/// Owns the `source -> gain -> low-shelf -> peaking -> high-shelf -> output`
/// chain and the volume/EQ values applied to it.
pub struct AudioGraph<B: GraphBackend> {
    backend: B,
    chain: Option<Chain<B::Node>>,
    volume: f32,
    eq: EqSettings,
}

fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Snap to the 0.5 dB grid and clamp into range.
pub fn clamp_band_gain(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    ((v / EQ_STEP_DB).round() * EQ_STEP_DB).clamp(EQ_MIN_DB, EQ_MAX_DB)
}

/// Whether `v` is a gain `set_eq` accepts as-is.
pub fn is_valid_band_gain(v: f32) -> bool {
    v.is_finite() && (EQ_MIN_DB..=EQ_MAX_DB).contains(&v) && (v / EQ_STEP_DB).fract() == 0.0
}

impl<B: GraphBackend> AudioGraph<B> {
    /// Out-of-range initial values are clamped.
    pub fn new(backend: B, volume: f32, eq: EqSettings) -> Self {
        let mut clamped = EqSettings::default();
        for band in Band::ALL {
            clamped.set(band, clamp_band_gain(eq.get(band)));
        }
        Self {
            backend,
            chain: None,
            volume: clamp_volume(volume),
            eq: clamped,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn eq(&self) -> EqSettings {
        self.eq
    }

    pub fn is_built(&self) -> bool {
        self.chain.is_some()
    }

    /// Create the nodes (first call only) and (re)connect the chain.
    pub fn build(&mut self) -> Result<()> {
        if self.chain.is_none() {
            let filter = |kind, frequency, q| NodeKind::Filter(FilterSpec { kind, frequency, q });
            let chain = Chain {
                source: self.backend.create_node(NodeKind::Source)?,
                gain: self.backend.create_node(NodeKind::Gain)?,
                low: self
                    .backend
                    .create_node(filter(FilterKind::LowShelf, LOW_SHELF_HZ, 1.0))?,
                mid: self
                    .backend
                    .create_node(filter(FilterKind::Peaking, PEAKING_HZ, PEAKING_Q))?,
                high: self
                    .backend
                    .create_node(filter(FilterKind::HighShelf, HIGH_SHELF_HZ, 1.0))?,
                destination: self.backend.create_node(NodeKind::Destination)?,
            };
            debug!(?chain, "created audio graph nodes");
            self.chain = Some(chain);
        }
        self.connect()?;
        self.apply_all();
        Ok(())
    }

    /// Tear down every link of the chain, then wire it again in order.
    /// Safe to call repeatedly: there is never more than one path.
    pub fn connect(&mut self) -> Result<()> {
        let Some(c) = self.chain else {
            return Err(PlayerError::Graph("connect called before build".into()));
        };
        for node in [c.source, c.gain, c.low, c.mid, c.high] {
            self.backend.disconnect(node);
        }
        let links = [
            (c.source, c.gain),
            (c.gain, c.low),
            (c.low, c.mid),
            (c.mid, c.high),
            (c.high, c.destination),
        ];
        for (from, to) in links {
            if let Err(e) = self.backend.connect(from, to) {
                warn!("failed to connect audio nodes {from:?} -> {to:?}: {e}");
                return Err(e);
            }
        }
        Ok(())
    }

    fn apply_all(&mut self) {
        let Some(c) = self.chain else {
            return;
        };
        self.backend.set_gain(c.gain, self.volume);
        for band in Band::ALL {
            self.backend.set_gain(c.band(band), self.eq.get(band));
        }
    }

    /// Set the output gain, clamped to `0.0..=1.0`. Returns the applied value.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        if let Some(c) = self.chain {
            self.backend.set_gain(c.gain, self.volume);
        }
        self.volume
    }

    /// Set all three bands. Rejects values outside `-12..=12` dB or off the 0.5 dB grid;
    /// nothing is applied unless every band is valid.
    pub fn set_eq(&mut self, eq: EqSettings) -> Result<()> {
        if let Some(band) = Band::ALL.into_iter().find(|b| !is_valid_band_gain(eq.get(*b))) {
            return Err(PlayerError::InvalidEq {
                band,
                value: eq.get(band),
            });
        }
        self.eq = eq;
        self.apply_all();
        Ok(())
    }

    /// UI-driven change of one band: clamped and snapped instead of rejected.
    pub fn set_band_clamped(&mut self, band: Band, value: f32) -> f32 {
        let value = clamp_band_gain(value);
        self.eq.set(band, value);
        if let Some(c) = self.chain {
            self.backend.set_gain(c.band(band), value);
        }
        value
    }

    pub fn reset_eq(&mut self) {
        self.eq = EqSettings::default();
        self.apply_all();
    }

    /// Resume a suspended context. Failures are logged and tolerated.
    pub fn ensure_running(&mut self) -> ContextState {
        if self.backend.state() == ContextState::Suspended {
            match self.backend.resume() {
                Ok(()) => debug!("audio context resumed"),
                Err(e) => warn!("failed to resume audio context: {e}"),
            }
        }
        self.backend.state()
    }
}
