//! Turns a polygon (or identifier list) into boreholes plus their manifests.

use geo::Polygon;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::{Config, BNG_CRS};
use crate::error::{Result, ScanError};
use crate::index::{read_boreholes, BoundsFilter};
use crate::models::{BoreholeSet, ScanTable};
use crate::scans::{Fetch, ManifestFetcher};

/// Boreholes matched by a query, joined with their manifests
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub boreholes: BoreholeSet,
    pub scans: ScanTable,
}

/// Explicit identifier input: one id or a list of ids, all strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierInput {
    One(String),
    Many(Vec<String>),
}

impl IdentifierInput {
    /// Accepts a JSON string or an array of strings, nothing else
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(id) => Ok(IdentifierInput::One(id.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(id) => Ok(id.clone()),
                    other => Err(ScanError::InvalidArgument(format!(
                        "expected all identifiers to be strings, found {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(IdentifierInput::Many),
            other => Err(ScanError::InvalidArgument(format!(
                "expected a string or a list of strings, found {}",
                other
            ))),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IdentifierInput::One(_) => 1,
            IdentifierInput::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Resolver<'a, F> {
    config: &'a Config,
    fetch: &'a F,
}

impl<'a, F: Fetch> Resolver<'a, F> {
    pub fn new(config: &'a Config, fetch: &'a F) -> Self {
        Self { config, fetch }
    }

    /// Boreholes inside `polygon` (EPSG:27700), with manifests fetched
    pub async fn from_polygon(&self, polygon: Polygon<f64>) -> Result<Resolution> {
        info!("Resolving boreholes inside polygon ({})", BNG_CRS);
        self.from_bounds(BoundsFilter::Polygon(polygon)).await
    }

    /// Boreholes for explicit identifiers.
    ///
    /// Input is validated, but lookup by identifier is not available yet, so a
    /// valid input ends in `IdentifierLookupUnavailable`.
    pub async fn from_ids(&self, ids: &Value) -> Result<Resolution> {
        let input = IdentifierInput::from_value(ids)?;
        warn!("Identifier lookup requested for {} id(s) but is not available", input.len());
        Err(ScanError::IdentifierLookupUnavailable { count: input.len() })
    }

    /// Read the dataset through `filter`, then fetch and join every manifest.
    ///
    /// A manifest failure aborts the whole resolution.
    pub async fn from_bounds(&self, filter: BoundsFilter) -> Result<Resolution> {
        let boreholes = read_boreholes(&self.config.dataset, &filter)?;

        let fetcher = ManifestFetcher::new(self.fetch, self.config);
        let mut manifests = HashMap::with_capacity(boreholes.len());
        for record in boreholes.iter() {
            let entries = fetcher.manifest(record.bgs_id).await?;
            manifests.insert(record.bgs_id, entries);
        }

        let scans = ScanTable::join(&boreholes, &manifests);
        info!(
            "Resolved {} borehole(s) into {} scan row(s)",
            boreholes.len(),
            scans.len()
        );
        Ok(Resolution { boreholes, scans })
    }
}
