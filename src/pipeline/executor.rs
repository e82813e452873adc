//! Pipeline executor - drives one traversal through the node chain.
//!
//! Nodes are stored upstream first: index 0 sits directly below the source,
//! the last node faces the consumer. A traversal:
//! 1. Walk nodes downstream to upstream, remembering the request each node
//!    receives, and let each node `prepare` it.
//! 2. Ask the source for the fully prepared request.
//! 3. Walk nodes upstream to downstream, calling `process` with the request
//!    that node received in step 1.
//! 4. Check the batch matches the consumer's request exactly.
//!
//! The executor owns no per-traversal state; `request_batch` can be called
//! from many threads at once on a shared `Pipeline`.

use crate::error::{Result, ResultExt, VolpipeError};
use crate::pipeline::batch::Batch;
use crate::pipeline::id::NodeId;
use crate::pipeline::node::AnyNode;
use crate::pipeline::request::Request;
use crate::pipeline::source::BatchSource;
use std::collections::HashSet;
use std::time::Instant;

/// A source followed by an ordered chain of nodes.
pub struct Pipeline {
    source: Box<dyn BatchSource>,
    nodes: Vec<AnyNode>,
}

impl Pipeline {
    /// Number of nodes, not counting the source.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&AnyNode> {
        self.nodes.get(id.index())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// The request the source will see for a consumer `request`.
    pub fn upstream_request(&self, request: &Request) -> Result<Request> {
        self.prepare_all(request).map(|(upstream, _)| upstream)
    }

    /// Run `prepare` through the chain. Returns the final upstream request
    /// and, per node index, the request that node received.
    fn prepare_all(&self, request: &Request) -> Result<(Request, Vec<Request>)> {
        let mut stages = Vec::with_capacity(self.nodes.len());
        let mut current = request.clone();
        for (i, node) in self.nodes.iter().enumerate().rev() {
            stages.push(current.clone());
            node.prepare(&mut current)
                .with_context(|| format!("{} ({}) prepare", node.name(), NodeId(i as u32)))?;
            tracing::trace!("after {} ({}): {}", node.name(), NodeId(i as u32), current);
        }
        stages.reverse();
        Ok((current, stages))
    }

    /// Negotiate `request` through the chain and return a batch whose volumes
    /// have exactly the requested ROIs.
    pub fn request_batch(&self, request: &Request) -> Result<Batch> {
        let started = Instant::now();
        let (upstream, stages) = self.prepare_all(request)?;

        tracing::debug!("{} serving {}", self.source.name(), upstream);
        let mut batch = self
            .source
            .provide(&upstream)
            .with_context(|| format!("source {}", self.source.name()))?;

        for (i, (node, stage)) in self.nodes.iter().zip(&stages).enumerate() {
            node.process(&mut batch, stage)
                .with_context(|| format!("{} ({}) process", node.name(), NodeId(i as u32)))?;
        }

        batch.retain_requested(request);
        batch.verify(request)?;

        tracing::debug!(
            "batch {} with {} volumes delivered in {:?}",
            batch.id(),
            batch.len(),
            started.elapsed()
        );
        Ok(batch)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("nodes", &self.nodes)
            .finish()
    }
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    source: Box<dyn BatchSource>,
    nodes: Vec<AnyNode>,
}

impl PipelineBuilder {
    pub fn new(source: impl BatchSource + 'static) -> Self {
        Self::from_boxed(Box::new(source))
    }

    pub fn from_boxed(source: Box<dyn BatchSource>) -> Self {
        Self {
            source,
            nodes: Vec::new(),
        }
    }

    /// Append a node downstream of everything added so far.
    pub fn node(mut self, node: impl Into<AnyNode>) -> Self {
        self.nodes.push(node.into());
        self
    }

    /// Validate and build. Two nodes providing the same volume type is a
    /// configuration error.
    pub fn build(self) -> Result<Pipeline> {
        let mut provided = HashSet::new();
        for (i, node) in self.nodes.iter().enumerate() {
            for volume_type in node.provides() {
                if !provided.insert(volume_type.clone()) {
                    return Err(VolpipeError::Configuration(format!(
                        "{} is provided by more than one node (again by {} at {})",
                        volume_type,
                        node.name(),
                        NodeId(i as u32)
                    )));
                }
            }
        }

        tracing::info!(
            "Pipeline built: {} -> {} nodes",
            self.source.name(),
            self.nodes.len()
        );

        Ok(Pipeline {
            source: self.source,
            nodes: self.nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Coordinate, Roi};
    use crate::pipeline::node::BatchFilter;
    use crate::pipeline::nodes::DownSample;
    use crate::pipeline::source::ArraySource;
    use crate::volume::{DataType, Volume, VolumeData, VolumeType};

    fn roi(offset: &[i64], shape: &[i64]) -> Roi {
        Roi::from_slices(offset, shape).unwrap()
    }

    fn source(extent: Roi) -> ArraySource {
        let shape = extent.shape().to_usize_vec().unwrap();
        let volume = Volume::new(
            VolumeData::zeros(DataType::F32, &shape),
            extent,
            Coordinate::from([1, 1]),
        )
        .unwrap();
        ArraySource::new("memory").with_volume("raw", volume)
    }

    #[test]
    fn test_source_only_pipeline() {
        let pipeline = PipelineBuilder::new(source(roi(&[0, 0], &[16, 16])))
            .build()
            .unwrap();
        assert!(pipeline.is_empty());
        let request = Request::new().with("raw", roi(&[4, 4], &[2, 2]));
        let batch = pipeline.request_batch(&request).unwrap();
        assert!(batch.verify(&request).is_ok());
    }

    #[test]
    fn test_chained_downsampling() {
        let pipeline = PipelineBuilder::new(source(roi(&[-32, -32], &[64, 64])))
            .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
            .node(DownSample::single("raw_2", 2u32, "raw_4").unwrap())
            .build()
            .unwrap();
        assert_eq!(pipeline.len(), 2);

        let request = Request::new().with("raw_4", roi(&[0, 0], &[4, 4]));
        let upstream = pipeline.upstream_request(&request).unwrap();
        // raw_4 [0:4) -> raw_2 [-2:6) -> raw [-6:10)
        assert_eq!(upstream.get(&"raw".into()), Some(&roi(&[-6, -6], &[16, 16])));

        let batch = pipeline.request_batch(&request).unwrap();
        assert_eq!(batch.volume_types(), vec![VolumeType::new("raw_4")]);
        let out = batch.get(&"raw_4".into()).unwrap();
        assert_eq!(out.roi(), &roi(&[0, 0], &[4, 4]));
        assert_eq!(out.resolution(), &Coordinate::from([4, 4]));
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let err = PipelineBuilder::new(source(roi(&[0, 0], &[8, 8])))
            .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
            .node(DownSample::single("raw", 4u32, "raw_2").unwrap())
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_source_failure_propagates() {
        let pipeline = PipelineBuilder::new(source(roi(&[0, 0], &[8, 8])))
            .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
            .build()
            .unwrap();
        // needs raw [-2:6), which the source does not have
        let request = Request::new().with("raw_2", roi(&[0, 0], &[4, 4]));
        let err = pipeline.request_batch(&request).unwrap_err();
        assert!(err.is_containment_violation());
        assert!(err.to_string().contains("source memory"));
    }

    struct Passthrough;

    impl BatchFilter for Passthrough {
        fn name(&self) -> &str {
            "Passthrough"
        }

        fn provides(&self) -> Vec<VolumeType> {
            Vec::new()
        }

        fn prepare(&self, _request: &mut Request) -> Result<()> {
            Ok(())
        }

        fn process(&self, _batch: &mut Batch, _request: &Request) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_plugin_nodes() {
        let pipeline = PipelineBuilder::new(source(roi(&[-8, -8], &[32, 32])))
            .node(AnyNode::plugin(Passthrough))
            .node(DownSample::single("raw", 2u32, "raw_2").unwrap())
            .node(AnyNode::plugin(Passthrough))
            .build()
            .unwrap();
        let names: Vec<_> = pipeline
            .node_ids()
            .filter_map(|id| pipeline.node(id))
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["Passthrough", "DownSample", "Passthrough"]);

        let request = Request::new()
            .with("raw_2", roi(&[0, 0], &[4, 4]))
            .with("raw", roi(&[0, 0], &[2, 2]));
        let batch = pipeline.request_batch(&request).unwrap();
        assert!(batch.verify(&request).is_ok());
        assert_eq!(batch.len(), 2);
    }
}
