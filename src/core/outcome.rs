//! Outcome policy
//!
//! Decides, per endpoint mode, whether an entity's call result is written back
//! and the batch continues, or whether the whole batch aborts.
//!
//! | mode        | ok status (< 400) | tolerated non-ok | other non-ok |
//! |-------------|-------------------|------------------|--------------|
//! | `transform` | write result      | write result     | abort        |
//! | `sink`      | entity unchanged  | n/a              | abort        |

use crate::domain::{EndpointMode, Entity, RelayError, Result, TransformResult};
use regex::Regex;

/// Pattern of non-ok status codes that are recorded instead of aborting
///
/// The pattern is matched against the decimal status code from its start, so
/// `4\d\d` tolerates every 4xx status and `40` tolerates 400-409.
#[derive(Debug, Clone)]
pub struct TolerableStatusCodes {
    pattern: String,
    regex: Regex,
}

impl TolerableStatusCodes {
    /// Compiles a pattern
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Configuration` if the pattern is not a valid regex
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
            RelayError::Configuration(format!("Invalid tolerable status code pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether the status code's text form matches
    pub fn matches(&self, status_code: u16) -> bool {
        self.regex.is_match(&status_code.to_string())
    }

    /// Source pattern as configured
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl PartialEq for TolerableStatusCodes {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// Decision for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Ok status; continue the batch
    Accept,
    /// Non-ok status matched the tolerable pattern; continue the batch
    Tolerate,
    /// Terminate the batch with this entity's result
    Abort,
}

/// Classifies a result without touching the entity
pub fn classify(
    mode: EndpointMode,
    result: &TransformResult,
    tolerable: Option<&TolerableStatusCodes>,
) -> Verdict {
    if result.is_ok() {
        return Verdict::Accept;
    }
    match mode {
        EndpointMode::Transform if tolerable.is_some_and(|t| t.matches(result.status_code)) => {
            Verdict::Tolerate
        }
        _ => Verdict::Abort,
    }
}

/// Applies the verdict for one entity
///
/// In `transform` mode accepted and tolerated results are written to
/// `entity[property]`. In `sink` mode the entity is left as it is.
///
/// # Errors
///
/// Returns `RelayError::Aborted` carrying the result's status code and return
/// value when the batch must stop.
pub fn apply(
    mode: EndpointMode,
    entity: &mut Entity,
    property: &str,
    result: TransformResult,
    tolerable: Option<&TolerableStatusCodes>,
) -> Result<()> {
    match classify(mode, &result, tolerable) {
        Verdict::Accept => {
            if mode == EndpointMode::Transform {
                entity.insert(property.to_string(), result.return_value);
            }
            Ok(())
        }
        Verdict::Tolerate => {
            tracing::warn!(
                entity_id = %crate::domain::entity_id(entity),
                status_code = result.status_code,
                pattern = tolerable.map(TolerableStatusCodes::pattern).unwrap_or_default(),
                "Tolerating non-ok status"
            );
            entity.insert(property.to_string(), result.return_value);
            Ok(())
        }
        Verdict::Abort => Err(RelayError::Aborted {
            status_code: result.status_code,
            body: result.return_value,
        }),
    }
}
