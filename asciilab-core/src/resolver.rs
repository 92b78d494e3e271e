//! Memoized typeface availability (made by FontLab https://www.fontlab.com/)

use std::collections::HashMap;

use crate::catalog::{Availability, TypefaceCatalog};
use crate::error::AsciiLabError;
use crate::params::DEFAULT_TYPEFACE;
use crate::probe::TypefaceProbe;

/// Answers "can this typeface be loaded?" with at most one probe per name.
///
/// Outcomes live in the catalog it owns, so the answer for a name is fixed
/// for the rest of the session whether or not the transport cached anything.
#[derive(Debug)]
pub struct AvailabilityResolver<P> {
    probe: P,
    catalog: TypefaceCatalog,
    probes_issued: HashMap<String, usize>,
}

impl<P: TypefaceProbe> AvailabilityResolver<P> {
    pub fn new(probe: P, catalog: TypefaceCatalog) -> Self {
        Self {
            probe,
            catalog,
            probes_issued: HashMap::new(),
        }
    }

    pub async fn is_available(&mut self, name: &str) -> bool {
        if name == DEFAULT_TYPEFACE {
            return true;
        }

        match self.catalog.availability(name) {
            Availability::Available => return true,
            Availability::Unavailable => return false,
            Availability::Unknown => {}
        }

        *self.probes_issued.entry(name.to_string()).or_default() += 1;
        let available = match self.probe.probe(name).await {
            Ok(()) => {
                tracing::debug!(typeface = %name, "typeface available");
                true
            }
            Err(err) => {
                let err = AsciiLabError::TypefaceUnavailable {
                    name: name.to_string(),
                    reason: format!("{err:#}"),
                };
                tracing::info!(error = %err, "typeface marked unavailable");
                false
            }
        };

        self.catalog.record(name, available) == Availability::Available
    }

    /// How many probes were sent for `name` this session.
    pub fn probe_count(&self, name: &str) -> usize {
        self.probes_issued.get(name).copied().unwrap_or(0)
    }

    pub fn catalog(&self) -> &TypefaceCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TypefaceCatalog {
        &mut self.catalog
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}
