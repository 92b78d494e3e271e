//! Rendering engine seam (made by FontLab https://www.fontlab.com/)

use anyhow::Result;

use crate::params::{Layout, RenderParameters, Width};

/// One call into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub text: String,
    pub typeface: String,
    pub horizontal_layout: Layout,
    pub vertical_layout: Layout,
    pub width: Width,
}

impl RenderRequest {
    pub fn from_params(params: &RenderParameters) -> Self {
        Self {
            text: params.text.clone(),
            typeface: params.typeface.clone(),
            horizontal_layout: params.horizontal_layout,
            vertical_layout: params.vertical_layout,
            width: params.effective_width(),
        }
    }

    /// Same request, different typeface.
    pub fn with_typeface(&self, typeface: &str) -> Self {
        Self {
            typeface: typeface.to_string(),
            ..self.clone()
        }
    }
}

/// Turns text into block-letter art. Implementations are black boxes to the core.
#[allow(async_fn_in_trait)]
pub trait RenderEngine {
    async fn render(&self, request: &RenderRequest) -> Result<String>;
}
