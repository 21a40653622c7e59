//! Per-entity configuration resolution
//!
//! An entity may carry an override object (by default under
//! `service_config`) with any of the keys `URL`, `METHOD`, `HEADERS`,
//! `PROPERTY`, `TOLERABLE_STATUS_CODES` and `PAYLOAD_PROPERTY`. Each present
//! key replaces the process default for that entity only; absent keys fall
//! back individually.

use super::execute::is_json_content_type;
use super::outcome::TolerableStatusCodes;
use crate::config::EndpointConfig;
use crate::domain::{entity_id, Entity, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-entity overrides, every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ServiceOverride {
    pub url: Option<String>,
    pub method: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub property: Option<String>,
    pub tolerable_status_codes: Option<String>,
    pub payload_property: Option<String>,
}

impl ServiceOverride {
    /// Reads the override object from `entity[property]`
    ///
    /// A missing or null property yields an empty override. A value that is
    /// not a well-formed override object is ignored with a warning.
    pub fn from_entity(entity: &Entity, property: &str) -> Self {
        match entity.get(property) {
            None | Some(Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                tracing::warn!(
                    entity_id = %entity_id(entity),
                    property = %property,
                    error = %e,
                    "Ignoring malformed service config override"
                );
                Self::default()
            }),
        }
    }
}

/// Settings in force for one entity's call
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    /// URL template, path suffix included
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Property the result is written to
    pub property: String,
    /// Property the payload is read from
    pub payload_property: String,
    pub tolerable_status_codes: Option<TolerableStatusCodes>,
    /// Whether `headers` declare a JSON body
    pub is_json: bool,
}

impl EffectiveConfig {
    /// Process-wide defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the default tolerable pattern does not compile
    pub fn defaults(config: &EndpointConfig) -> Result<Self> {
        let tolerable_status_codes = config
            .tolerable_status_codes
            .as_deref()
            .map(TolerableStatusCodes::new)
            .transpose()?;

        Ok(Self {
            url: config.url.clone(),
            method: config.method.to_uppercase(),
            headers: config.headers.clone(),
            property: config.property.clone(),
            payload_property: config.payload_property.clone(),
            tolerable_status_codes,
            is_json: is_json_content_type(&config.headers),
        })
    }
}

/// Overlays the entity's override onto the defaults and appends `path` to the URL
pub fn resolve(
    entity: &Entity,
    defaults: &EffectiveConfig,
    override_property: &str,
    path: &str,
) -> EffectiveConfig {
    let overrides = ServiceOverride::from_entity(entity, override_property);

    let (headers, is_json) = match overrides.headers {
        Some(headers) => {
            let is_json = is_json_content_type(&headers);
            (headers, is_json)
        }
        None => (defaults.headers.clone(), defaults.is_json),
    };

    let tolerable_status_codes = match overrides.tolerable_status_codes {
        Some(pattern) => TolerableStatusCodes::new(&pattern)
            .map_err(|e| {
                tracing::warn!(
                    entity_id = %entity_id(entity),
                    error = %e,
                    "Ignoring invalid tolerable status code override"
                );
            })
            .ok(),
        None => defaults.tolerable_status_codes.clone(),
    };

    let base_url = overrides.url.unwrap_or_else(|| defaults.url.clone());

    EffectiveConfig {
        url: format!("{base_url}{path}"),
        method: overrides
            .method
            .map(|m| m.to_uppercase())
            .unwrap_or_else(|| defaults.method.clone()),
        headers,
        property: overrides.property.unwrap_or_else(|| defaults.property.clone()),
        payload_property: overrides
            .payload_property
            .unwrap_or_else(|| defaults.payload_property.clone()),
        tolerable_status_codes,
        is_json,
    }
}
