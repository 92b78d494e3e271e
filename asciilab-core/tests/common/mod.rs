#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use anyhow::{anyhow, Result};
use asciilab_core::catalog::TypefaceCatalog;
use asciilab_core::engine::{RenderEngine, RenderRequest};
use asciilab_core::fallback::FallbackController;
use asciilab_core::ledger::Ledger;
use asciilab_core::probe::TypefaceProbe;
use asciilab_core::resolver::AvailabilityResolver;
use asciilab_core::session::Session;
use asciilab_core::store::MemoryStore;

/// Fails for every name in `missing`.
pub struct FakeProbe {
    pub missing: Vec<&'static str>,
}

impl TypefaceProbe for FakeProbe {
    async fn probe(&self, name: &str) -> Result<()> {
        if self.missing.iter().any(|m| *m == name) {
            Err(anyhow!("404 Not Found"))
        } else {
            Ok(())
        }
    }
}

/// Renders `<typeface>text`, fails for `broken`, optionally takes its time.
pub struct FakeEngine {
    pub broken: Vec<&'static str>,
    pub delay: Duration,
    pub calls: RefCell<Vec<RenderRequest>>,
}

impl FakeEngine {
    pub fn texts(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|r| r.text.clone()).collect()
    }
}

impl RenderEngine for FakeEngine {
    async fn render(&self, request: &RenderRequest) -> Result<String> {
        self.calls.borrow_mut().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.broken.iter().any(|b| *b == request.typeface) {
            return Err(anyhow!("malformed definition"));
        }
        Ok(format!("<{}>{}", request.typeface, request.text))
    }
}

pub type TestSession = Session<FakeProbe, FakeEngine, MemoryStore>;

pub async fn session(missing: &[&'static str], broken: &[&'static str]) -> TestSession {
    slow_session(missing, broken, Duration::ZERO).await
}

pub async fn slow_session(
    missing: &[&'static str],
    broken: &[&'static str],
    delay: Duration,
) -> TestSession {
    let resolver = AvailabilityResolver::new(
        FakeProbe {
            missing: missing.to_vec(),
        },
        TypefaceCatalog::builtin(),
    );
    let engine = FakeEngine {
        broken: broken.to_vec(),
        delay,
        calls: RefCell::new(Vec::new()),
    };
    Session::new(
        FallbackController::new(resolver, engine),
        Ledger::load(MemoryStore::new()).await,
    )
}
