use crate::gfx::{CompareFunc, CullMode, PrimitiveType};

/// Fixed-function state of an immediate-draw session.
///
/// Used directly as the pipeline cache key: equality and hashing cover every
/// field, so two modes with the same values always share one pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderMode {
    pub primitive: PrimitiveType,
    pub depth_write: bool,
    pub depth_compare: CompareFunc,
    pub cull_mode: CullMode,
    /// Standard alpha blending (`src_alpha`, `1 - src_alpha`) when set.
    pub blending: bool,
}

impl Default for RenderMode {
    fn default() -> Self {
        Self {
            primitive: PrimitiveType::Triangles,
            depth_write: true,
            depth_compare: CompareFunc::LessEqual,
            cull_mode: CullMode::Back,
            blending: false,
        }
    }
}

impl RenderMode {
    pub fn with_primitive(mut self, primitive: PrimitiveType) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn with_blending(mut self, blending: bool) -> Self {
        self.blending = blending;
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn with_depth(mut self, write: bool, compare: CompareFunc) -> Self {
        self.depth_write = write;
        self.depth_compare = compare;
        self
    }

    pub fn lines() -> Self {
        Self::default().with_primitive(PrimitiveType::Lines)
    }

    pub fn line_strip() -> Self {
        Self::default().with_primitive(PrimitiveType::LineStrip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_is_opaque_depth_tested_triangles() {
        let m = RenderMode::default();
        assert_eq!(m.primitive, PrimitiveType::Triangles);
        assert!(m.depth_write);
        assert_eq!(m.depth_compare, CompareFunc::LessEqual);
        assert_eq!(m.cull_mode, CullMode::Back);
        assert!(!m.blending);
    }

    #[test]
    fn hash_is_structural() {
        let mut set = HashSet::new();
        set.insert(RenderMode::line_strip());
        set.insert(RenderMode::default().with_primitive(PrimitiveType::LineStrip));
        assert_eq!(set.len(), 1);

        set.insert(RenderMode::line_strip().with_blending(true));
        assert_eq!(set.len(), 2);
    }
}
