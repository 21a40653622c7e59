//! Batch streamer
//!
//! Drives the per-entity pipeline over a whole batch and assembles the JSON
//! array of amended entities. Entities are processed strictly in order, one
//! outbound call at a time, all through one session acquired for the batch.
//!
//! # Delivery
//!
//! - **Streamed**: chunks are handed to the transport as each entity is done.
//!   An abort after the first chunk cannot change the `200` status already
//!   sent; the client sees a truncated JSON document instead. This is the
//!   price of not holding the batch in memory and is kept deliberately.
//! - **Buffered**: the whole array is built first, so an abort becomes a
//!   proper error status. `sink` always uses buffered delivery because
//!   delivery acknowledgement must be all-or-nothing.

use super::execute::{execute, OutboundRequest};
use super::outcome;
use super::resolve::{resolve, EffectiveConfig};
use crate::adapters::session::{Session, SessionProvider};
use crate::adapters::template::UrlRenderer;
use crate::config::RelayConfig;
use crate::domain::{entity_id, EndpointMode, Entity, RelayError, Result, TransformResult};
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Sequence of serialized JSON chunks making up the response array
pub type BatchStream = BoxStream<'static, Result<String>>;

/// How the response body reaches the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Streamed,
    Buffered,
}

/// Request-level options for one batch
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub mode: EndpointMode,
    /// Entity property holding per-entity overrides
    pub service_config_property: String,
    /// Suffix appended to every resolved URL
    pub path: String,
}

/// The per-entity pipeline, shared by all requests of the process
pub struct Pipeline {
    defaults: EffectiveConfig,
    default_service_config_property: String,
    do_stream: bool,
    renderer: UrlRenderer,
    sessions: Arc<dyn SessionProvider>,
}

impl Pipeline {
    /// Builds the pipeline from configuration and a session provider
    ///
    /// # Errors
    ///
    /// Returns an error if the default tolerable pattern does not compile
    pub fn new(config: &RelayConfig, sessions: Arc<dyn SessionProvider>) -> Result<Self> {
        Ok(Self {
            defaults: EffectiveConfig::defaults(&config.endpoint)?,
            default_service_config_property: config.endpoint.service_config_property.clone(),
            do_stream: config.endpoint.do_stream,
            renderer: UrlRenderer::new(),
            sessions,
        })
    }

    /// Options for a batch, falling back to configured defaults
    pub fn options(
        &self,
        mode: EndpointMode,
        service_config_property: Option<String>,
        path: Option<String>,
    ) -> BatchOptions {
        BatchOptions {
            mode,
            service_config_property: service_config_property
                .unwrap_or_else(|| self.default_service_config_property.clone()),
            path: path.unwrap_or_default(),
        }
    }

    /// Delivery used for a mode
    pub fn delivery(&self, mode: EndpointMode) -> Delivery {
        match mode {
            EndpointMode::Sink => Delivery::Buffered,
            EndpointMode::Transform if self.do_stream => Delivery::Streamed,
            EndpointMode::Transform => Delivery::Buffered,
        }
    }

    /// Runs one entity through resolve, render, execute and the outcome policy
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Aborted` when the outcome policy aborts the batch,
    /// or `RelayError::Render` for an unrenderable URL in `sink` mode
    pub async fn process_entity(
        &self,
        session: &Session,
        mut entity: Entity,
        options: &BatchOptions,
    ) -> Result<Entity> {
        let id = entity_id(&entity);
        let effective = resolve(
            &entity,
            &self.defaults,
            &options.service_config_property,
            &options.path,
        );

        let result = match self.renderer.render(&effective.url, &entity) {
            Ok(url) => {
                tracing::debug!(entity_id = %id, url = %url, method = %effective.method, "Calling endpoint");
                let request = OutboundRequest {
                    method: &effective.method,
                    url: &url,
                    headers: &effective.headers,
                    payload: entity.get(&effective.payload_property),
                    is_json: effective.is_json,
                };
                execute(session, &request).await
            }
            Err(e) if options.mode == EndpointMode::Sink => return Err(e),
            Err(e) => TransformResult::failure(500, e.to_string()),
        };

        tracing::debug!(
            entity_id = %id,
            status_code = result.status_code,
            mode = %options.mode,
            "Received response"
        );

        outcome::apply(
            options.mode,
            &mut entity,
            &effective.property,
            result,
            effective.tolerable_status_codes.as_ref(),
        )?;

        Ok(entity)
    }

    /// Acquires the batch's session and returns the lazy chunk stream
    ///
    /// The session is acquired before anything is produced, so credential
    /// failures surface as an error here rather than inside the stream. It is
    /// released when the stream finishes, fails or is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if no session can be made (e.g. token fetch failed)
    pub async fn open(
        self: Arc<Self>,
        entities: Vec<Entity>,
        options: BatchOptions,
    ) -> Result<BatchStream> {
        let session = self.sessions.make_session().await?;

        tracing::info!(
            mode = %options.mode,
            entities = entities.len(),
            delivery = ?self.delivery(options.mode),
            "Processing batch"
        );

        let cursor = Cursor {
            pipeline: self,
            session,
            entities: entities.into_iter(),
            options,
            index: 0,
            stage: Stage::Open,
            started: Instant::now(),
        };

        Ok(stream::unfold(cursor, Cursor::advance).boxed())
    }

    /// Materializes the whole array before returning it
    ///
    /// # Errors
    ///
    /// Returns the first error of the batch; nothing of the batch is returned
    pub async fn collect(
        self: Arc<Self>,
        entities: Vec<Entity>,
        options: BatchOptions,
    ) -> Result<String> {
        let mut chunks = self.open(entities, options).await?;
        let mut body = String::new();
        while let Some(chunk) = chunks.next().await {
            body.push_str(&chunk?);
        }
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Open,
    Entities,
    Done,
}

/// Iteration state of one batch; owns the batch's session
struct Cursor {
    pipeline: Arc<Pipeline>,
    session: Session,
    entities: std::vec::IntoIter<Entity>,
    options: BatchOptions,
    index: usize,
    stage: Stage,
    started: Instant,
}

impl Cursor {
    async fn advance(mut self) -> Option<(Result<String>, Self)> {
        match self.stage {
            Stage::Open => {
                self.stage = Stage::Entities;
                Some((Ok("[".to_string()), self))
            }
            Stage::Entities => {
                let Some(entity) = self.entities.next() else {
                    self.stage = Stage::Done;
                    tracing::info!(
                        mode = %self.options.mode,
                        entities = self.index,
                        duration_ms = self.started.elapsed().as_millis(),
                        "Batch completed"
                    );
                    return Some((Ok("]".to_string()), self));
                };

                let chunk = self.next_chunk(entity).await;
                if let Err(ref e) = chunk {
                    self.stage = Stage::Done;
                    tracing::error!(
                        mode = %self.options.mode,
                        entity_index = self.index,
                        status_code = e.status_code(),
                        error = %e,
                        "Batch aborted"
                    );
                }
                self.index += 1;
                Some((chunk, self))
            }
            Stage::Done => None,
        }
    }

    async fn next_chunk(&self, entity: Entity) -> Result<String> {
        let entity = self
            .pipeline
            .process_entity(&self.session, entity, &self.options)
            .await?;
        let json = serde_json::to_string(&entity).map_err(RelayError::from)?;
        Ok(if self.index > 0 {
            format!(",{json}")
        } else {
            json
        })
    }
}
