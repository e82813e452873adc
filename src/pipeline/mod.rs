//! ROI-negotiating batch pipeline.
//!
//! A consumer asks for a [`Request`]: a region of interest per volume type.
//! The request travels upstream through the nodes, each of which may rewrite
//! it (`prepare`), until the source materializes it. The resulting [`Batch`]
//! then travels back downstream, each node deriving its outputs and restoring
//! its inputs to what was asked of it (`process`).
//!
//! # Architecture
//!
//! ```text
//!            prepare                prepare
//! [Source] ◄──────────── [Node 0] ◄──────────── [Node 1] ◄── Request
//!          ────────────►          ────────────►          ──► Batch
//!            process                process
//! ```
//!
//! # Design
//!
//! - **Enum dispatch** - `BuiltinNode` for shipped nodes, `BatchFilter` trait
//!   objects for everything else.
//! - **Stateless nodes** - the request a node saw in `prepare` is handed back
//!   to it in `process` by the executor, so one `Pipeline` serves many threads.
//! - **Prefetching** - `BatchPrefetcher` runs traversals on worker threads and
//!   queues the results over a bounded crossbeam channel.

pub mod batch;
pub mod executor;
pub mod id;
pub mod node;
pub mod nodes;
pub mod prefetch;
pub mod request;
pub mod source;

pub use batch::Batch;
pub use executor::{Pipeline, PipelineBuilder};
pub use id::NodeId;
pub use node::{AnyNode, BatchFilter, BuiltinNode};
pub use nodes::{decimate, DownSample, DownSampleEntry};
pub use prefetch::BatchPrefetcher;
pub use request::Request;
pub use source::{ArraySource, BatchSource};
