//! `GraphBackend` for rodio: the node graph is bookkeeping, the actual
//! processing happens in [`EqSource`](super::source::EqSource), which reads
//! the shared [`DspParams`] on the audio callback thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use tracing::debug;

use crate::error::{PlayerError, Result};

use super::graph::GraphBackend;
use super::types::{ContextState, EqSettings, FilterKind, NodeKind};

/// Parameters shared between the graph manager and the audio thread.
#[derive(Debug)]
pub struct DspParams {
    volume: AtomicU32,
    low: AtomicU32,
    mid: AtomicU32,
    high: AtomicU32,
    routed: AtomicBool,
    running: AtomicBool,
    version: AtomicU64,
}

impl Default for DspParams {
    fn default() -> Self {
        Self {
            volume: AtomicU32::new(1.0_f32.to_bits()),
            low: AtomicU32::new(0.0_f32.to_bits()),
            mid: AtomicU32::new(0.0_f32.to_bits()),
            high: AtomicU32::new(0.0_f32.to_bits()),
            routed: AtomicBool::new(false),
            running: AtomicBool::new(false),
            version: AtomicU64::new(0),
        }
    }
}

impl DspParams {
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn eq(&self) -> EqSettings {
        EqSettings {
            low: f32::from_bits(self.low.load(Ordering::Relaxed)),
            mid: f32::from_bits(self.mid.load(Ordering::Relaxed)),
            high: f32::from_bits(self.high.load(Ordering::Relaxed)),
        }
    }

    /// Whether samples should reach the output at all.
    pub fn audible(&self) -> bool {
        self.routed.load(Ordering::Acquire) && self.running.load(Ordering::Acquire)
    }

    /// Bumped on every filter change so sources know to redesign.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn store_band(&self, kind: FilterKind, db: f32) {
        let slot = match kind {
            FilterKind::LowShelf => &self.low,
            FilterKind::Peaking => &self.mid,
            FilterKind::HighShelf => &self.high,
        };
        slot.store(db.to_bits(), Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeId(usize);

/// Node graph over rodio. Created suspended, like a fresh audio context.
#[derive(Debug)]
pub struct RodioGraph {
    params: Arc<DspParams>,
    nodes: Vec<NodeKind>,
    edges: Vec<(usize, usize)>,
}

impl RodioGraph {
    pub fn new(params: Arc<DspParams>) -> Self {
        Self {
            params,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn params(&self) -> Arc<DspParams> {
        Arc::clone(&self.params)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn kind(&self, node: NodeId) -> Result<NodeKind> {
        self.nodes
            .get(node.0)
            .copied()
            .ok_or_else(|| PlayerError::Graph(format!("unknown node {}", node.0)))
    }

    /// Depth-first search from any source to any destination.
    fn has_route(&self) -> bool {
        let mut stack: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, k)| matches!(k, NodeKind::Source))
            .map(|(i, _)| i)
            .collect();
        let mut seen = vec![false; self.nodes.len()];

        while let Some(n) = stack.pop() {
            if seen[n] {
                continue;
            }
            seen[n] = true;
            if matches!(self.nodes[n], NodeKind::Destination) {
                return true;
            }
            stack.extend(
                self.edges
                    .iter()
                    .filter(|(from, _)| *from == n)
                    .map(|(_, to)| *to),
            );
        }
        false
    }

    fn refresh_route(&self) {
        self.params.routed.store(self.has_route(), Ordering::Release);
    }
}

impl GraphBackend for RodioGraph {
    type Node = NodeId;

    fn create_node(&mut self, kind: NodeKind) -> Result<NodeId> {
        self.nodes.push(kind);
        Ok(NodeId(self.nodes.len() - 1))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.kind(from)?;
        if matches!(self.kind(to)?, NodeKind::Source) {
            return Err(PlayerError::Graph("a source cannot be an input".into()));
        }
        if !self.edges.contains(&(from.0, to.0)) {
            self.edges.push((from.0, to.0));
        }
        self.refresh_route();
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) {
        self.edges.retain(|(from, _)| *from != node.0);
        self.refresh_route();
    }

    fn set_gain(&mut self, node: NodeId, value: f32) {
        match self.nodes.get(node.0) {
            Some(NodeKind::Gain) => self.params.volume.store(value.to_bits(), Ordering::Relaxed),
            Some(NodeKind::Filter(spec)) => self.params.store_band(spec.kind, value),
            other => debug!(?other, "ignoring gain on a node without one"),
        }
    }

    fn state(&self) -> ContextState {
        if self.params.running.load(Ordering::Acquire) {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    fn resume(&mut self) -> Result<()> {
        self.params.running.store(true, Ordering::Release);
        Ok(())
    }
}
