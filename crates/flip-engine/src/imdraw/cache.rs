use std::collections::HashMap;

use crate::gfx::{
    make_pipeline, BlendState, DepthState, FaceWinding, GfxError, GfxRef, Pipeline, PipelineDesc,
    PipelineId, ShaderId,
};

use super::{ImVertex, RenderMode};

/// Lazily built pipelines for the immediate-draw shader, one per `RenderMode`.
///
/// Entries are never evicted. All pipelines are destroyed when the cache drops.
pub struct PipelineCache {
    gfx: GfxRef,
    shader: ShaderId,
    pipelines: HashMap<RenderMode, Pipeline>,
}

impl PipelineCache {
    pub fn new(gfx: GfxRef, shader: ShaderId) -> Self {
        Self { gfx, shader, pipelines: HashMap::new() }
    }

    /// Returns the pipeline for `mode`, creating it on first use.
    pub fn resolve(&mut self, mode: RenderMode) -> Result<PipelineId, GfxError> {
        if let Some(pipeline) = self.pipelines.get(&mode) {
            return Ok(pipeline.id());
        }

        let pipeline = make_pipeline(&self.gfx, &pipeline_desc(self.shader, mode))?;
        log::debug!("imdraw: created {:?} for {:?}", pipeline.id(), mode);

        let id = pipeline.id();
        self.pipelines.insert(mode, pipeline);
        Ok(id)
    }

    /// Number of distinct modes seen so far.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

fn pipeline_desc(shader: ShaderId, mode: RenderMode) -> PipelineDesc {
    PipelineDesc {
        shader,
        layout: ImVertex::layout(),
        primitive: mode.primitive,
        cull_mode: mode.cull_mode,
        face_winding: FaceWinding::Ccw,
        depth: DepthState { write_enabled: mode.depth_write, compare: mode.depth_compare },
        blend: mode.blending.then_some(BlendState::ALPHA),
        label: "imdraw pipeline",
    }
}
