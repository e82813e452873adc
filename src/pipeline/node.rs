//! Node abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`BatchFilter` trait** - for user-defined nodes.
//! - **`BuiltinNode` enum** - for all built-in nodes. The compiler can inline
//!   match arms, eliminating dynamic dispatch for them.
//!
//! `AnyNode` wraps either variant so the pipeline can handle both uniformly.
//!
//! # Contract
//!
//! A node takes part in one traversal through two calls:
//!
//! 1. `prepare(request)` - the request is on its way upstream. The node
//!    replaces the volume types it produces by the input ROIs it needs.
//! 2. `process(batch, request)` - the batch is on its way downstream. `request`
//!    is the request exactly as this node received it, before its own
//!    `prepare`. The node produces its outputs at the requested ROIs and crops
//!    its inputs back to what was requested of them.
//!
//! Methods take `&self`: one node instance serves concurrent traversals, so
//! nothing may be carried from `prepare` to `process` in node fields.

use crate::error::Result;
use crate::pipeline::batch::Batch;
use crate::pipeline::nodes::DownSample;
use crate::pipeline::request::Request;
use crate::volume::VolumeType;

/// Trait for pluggable/user-defined nodes.
pub trait BatchFilter: Send + Sync {
    /// Human-readable name of this node.
    fn name(&self) -> &str;

    /// Volume types this node produces.
    fn provides(&self) -> Vec<VolumeType>;

    /// Rewrite `request` into what this node needs from upstream.
    fn prepare(&self, request: &mut Request) -> Result<()>;

    /// Produce the outputs `request` asks for from the upstream `batch`.
    fn process(&self, batch: &mut Batch, request: &Request) -> Result<()>;
}

/// Enum dispatch for built-in nodes.
#[derive(Debug, Clone)]
pub enum BuiltinNode {
    DownSample(DownSample),
}

impl BuiltinNode {
    pub fn name(&self) -> &str {
        match self {
            BuiltinNode::DownSample(n) => n.name(),
        }
    }

    pub fn provides(&self) -> Vec<VolumeType> {
        match self {
            BuiltinNode::DownSample(n) => n.provides(),
        }
    }

    pub fn prepare(&self, request: &mut Request) -> Result<()> {
        match self {
            BuiltinNode::DownSample(n) => n.prepare(request),
        }
    }

    pub fn process(&self, batch: &mut Batch, request: &Request) -> Result<()> {
        match self {
            BuiltinNode::DownSample(n) => n.process(batch, request),
        }
    }
}

/// Wrapper that holds either a built-in node (enum dispatch) or a plugin (trait object).
pub enum AnyNode {
    Builtin(BuiltinNode),
    Plugin(Box<dyn BatchFilter>),
}

impl AnyNode {
    pub fn plugin(node: impl BatchFilter + 'static) -> Self {
        AnyNode::Plugin(Box::new(node))
    }

    pub fn name(&self) -> &str {
        match self {
            AnyNode::Builtin(n) => n.name(),
            AnyNode::Plugin(n) => n.name(),
        }
    }

    pub fn provides(&self) -> Vec<VolumeType> {
        match self {
            AnyNode::Builtin(n) => n.provides(),
            AnyNode::Plugin(n) => n.provides(),
        }
    }

    pub fn prepare(&self, request: &mut Request) -> Result<()> {
        match self {
            AnyNode::Builtin(n) => n.prepare(request),
            AnyNode::Plugin(n) => n.prepare(request),
        }
    }

    pub fn process(&self, batch: &mut Batch, request: &Request) -> Result<()> {
        match self {
            AnyNode::Builtin(n) => n.process(batch, request),
            AnyNode::Plugin(n) => n.process(batch, request),
        }
    }
}

impl From<BuiltinNode> for AnyNode {
    fn from(node: BuiltinNode) -> Self {
        AnyNode::Builtin(node)
    }
}

impl From<DownSample> for AnyNode {
    fn from(node: DownSample) -> Self {
        AnyNode::Builtin(BuiltinNode::DownSample(node))
    }
}

impl From<Box<dyn BatchFilter>> for AnyNode {
    fn from(node: Box<dyn BatchFilter>) -> Self {
        AnyNode::Plugin(node)
    }
}

impl std::fmt::Debug for AnyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyNode::Builtin(n) => f.debug_tuple("Builtin").field(n).finish(),
            AnyNode::Plugin(n) => f.debug_tuple("Plugin").field(&n.name()).finish(),
        }
    }
}
