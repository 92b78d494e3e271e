//! Render with typeface substitution (made by FontLab https://www.fontlab.com/)
//!
//! A requested typeface gets one chance. If it cannot be loaded or the
//! engine rejects it, it is excluded from the catalog and the default
//! typeface renders instead. A failure of the default ends the cycle.

use serde::{Deserialize, Serialize};

use crate::catalog::TypefaceCatalog;
use crate::engine::{RenderEngine, RenderRequest};
use crate::error::{AsciiLabError, Result};
use crate::params::DEFAULT_TYPEFACE;
use crate::probe::TypefaceProbe;
use crate::resolver::AvailabilityResolver;

/// Successful output of one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    pub text: String,
    pub used_typeface: String,
    pub warning: Option<String>,
}

pub fn unavailable_warning(name: &str) -> String {
    format!(
        "\"{name}\" is unavailable right now. Showing {}.",
        DEFAULT_TYPEFACE.to_uppercase()
    )
}

pub fn failed_warning(name: &str) -> String {
    format!(
        "\"{name}\" failed to render. Showing {}.",
        DEFAULT_TYPEFACE.to_uppercase()
    )
}

#[derive(Debug)]
pub struct FallbackController<P, E> {
    resolver: AvailabilityResolver<P>,
    engine: E,
}

impl<P: TypefaceProbe, E: RenderEngine> FallbackController<P, E> {
    pub fn new(resolver: AvailabilityResolver<P>, engine: E) -> Self {
        Self { resolver, engine }
    }

    /// Render `request`, substituting the default typeface when needed.
    ///
    /// Only [`AsciiLabError::FatalRenderFailure`] is ever returned.
    pub async fn render(&mut self, request: &RenderRequest) -> Result<RenderResult> {
        let requested = request.typeface.as_str();
        let mut active = requested.to_string();
        let mut warning = None;

        if requested != DEFAULT_TYPEFACE && !self.resolver.is_available(requested).await {
            self.exclude(requested);
            warning = Some(unavailable_warning(requested));
            active = DEFAULT_TYPEFACE.to_string();
        }

        match self.engine.render(&request.with_typeface(&active)).await {
            Ok(art) => {
                return Ok(RenderResult {
                    text: art,
                    used_typeface: active,
                    warning,
                })
            }
            Err(err) if active != DEFAULT_TYPEFACE => {
                let err = AsciiLabError::RenderFailure {
                    typeface: active.clone(),
                    message: format!("{err:#}"),
                };
                tracing::warn!(error = %err, "falling back to default typeface");
                self.exclude(&active);
                warning = Some(failed_warning(requested));
            }
            Err(err) => return Err(fatal(err)),
        }

        let art = self
            .engine
            .render(&request.with_typeface(DEFAULT_TYPEFACE))
            .await
            .map_err(fatal)?;

        Ok(RenderResult {
            text: art,
            used_typeface: DEFAULT_TYPEFACE.to_string(),
            warning,
        })
    }

    /// Put a typeface up for selection; see [`TypefaceCatalog::offer`].
    pub fn offer(&mut self, name: &str) -> bool {
        self.resolver.catalog_mut().offer(name)
    }

    fn exclude(&mut self, name: &str) {
        if self.resolver.catalog_mut().exclude(name) {
            tracing::info!(typeface = %name, "typeface removed from catalog");
        }
    }

    pub fn catalog(&self) -> &TypefaceCatalog {
        self.resolver.catalog()
    }

    pub fn resolver(&self) -> &AvailabilityResolver<P> {
        &self.resolver
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn fatal(err: anyhow::Error) -> AsciiLabError {
    let err = AsciiLabError::FatalRenderFailure {
        typeface: DEFAULT_TYPEFACE.to_string(),
        message: format!("{err:#}"),
    };
    tracing::error!(error = %err, "render cycle failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Layout, Width};
    use anyhow::{anyhow, Result as AnyResult};
    use std::cell::RefCell;

    struct NoProbe;

    impl TypefaceProbe for NoProbe {
        async fn probe(&self, _name: &str) -> AnyResult<()> {
            Ok(())
        }
    }

    /// Fails for every typeface listed in `broken`.
    struct PickyEngine {
        broken: Vec<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl RenderEngine for PickyEngine {
        async fn render(&self, request: &RenderRequest) -> AnyResult<String> {
            self.seen.borrow_mut().push(request.typeface.clone());
            if self.broken.iter().any(|b| *b == request.typeface) {
                Err(anyhow!("bad font data"))
            } else {
                Ok(format!("[{}:{}]", request.typeface, request.text))
            }
        }
    }

    fn request(typeface: &str) -> RenderRequest {
        RenderRequest {
            text: "HI".to_string(),
            typeface: typeface.to_string(),
            horizontal_layout: Layout::Default,
            vertical_layout: Layout::Default,
            width: Width::Fixed(80),
        }
    }

    fn controller(broken: Vec<&'static str>) -> FallbackController<NoProbe, PickyEngine> {
        FallbackController::new(
            AvailabilityResolver::new(NoProbe, TypefaceCatalog::builtin()),
            PickyEngine {
                broken,
                seen: RefCell::new(Vec::new()),
            },
        )
    }

    #[tokio::test]
    async fn engine_failure_retries_with_default_once() {
        let mut ctl = controller(vec!["Slant"]);
        let result = ctl.render(&request("Slant")).await.expect("fallback render");

        assert_eq!(result.used_typeface, DEFAULT_TYPEFACE);
        assert_eq!(result.text, "[Standard:HI]");
        assert_eq!(
            result.warning.as_deref(),
            Some("\"Slant\" failed to render. Showing STANDARD.")
        );
        assert!(!ctl.catalog().is_offered("Slant"));
        assert_eq!(*ctl.engine().seen.borrow(), vec!["Slant", "Standard"]);
    }

    #[tokio::test]
    async fn default_failure_is_fatal() {
        let mut ctl = controller(vec!["Standard"]);
        let err = ctl.render(&request("Standard")).await.unwrap_err();
        assert!(matches!(err, AsciiLabError::FatalRenderFailure { .. }));
        assert_eq!(ctl.engine().seen.borrow().len(), 1);
    }

    #[tokio::test]
    async fn fallback_to_broken_default_is_fatal() {
        let mut ctl = controller(vec!["Slant", "Standard"]);
        let err = ctl.render(&request("Slant")).await.unwrap_err();
        assert!(matches!(err, AsciiLabError::FatalRenderFailure { .. }));
        assert!(!ctl.catalog().is_offered("Slant"));
    }

    #[tokio::test]
    async fn success_carries_no_warning() {
        let mut ctl = controller(Vec::new());
        let result = ctl.render(&request("Big")).await.expect("render");
        assert_eq!(result.used_typeface, "Big");
        assert_eq!(result.warning, None);
    }
}
