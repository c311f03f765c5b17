//! Authorization requests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warden_abac::resolver::RequestContext;
use warden_types::{AttributeValue, ResourceId, SubjectId};

use crate::error::EngineError;

/// One authorization question: may `subject` perform `action` on this
/// resource?
///
/// Environment attributes (request time, source IP, request id, …) are
/// supplied inline by the caller; they are per-request facts, not stored
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub subject_id: SubjectId,
    /// `None` for resource-less actions (e.g. listing, exporting).
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub environment: BTreeMap<String, AttributeValue>,
}

impl AuthorizationRequest {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        action: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            resource_id: None,
            action: action.into(),
            resource_type: resource_type.into(),
            environment: BTreeMap::new(),
        }
    }

    /// Sets the resource the action targets (builder pattern).
    pub fn with_resource(mut self, resource_id: impl Into<ResourceId>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Adds one environment attribute (builder pattern).
    pub fn with_environment(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Rejects requests missing a required field, before any evaluation.
    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.subject_id.is_empty() {
            return Err(EngineError::InvalidRequest(
                "subject_id must not be empty".to_string(),
            ));
        }
        if self.action.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "action must not be empty".to_string(),
            ));
        }
        if self.resource_type.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "resource_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The borrowed view attribute resolution works against.
    pub(crate) fn context(&self) -> RequestContext<'_> {
        RequestContext {
            subject: &self.subject_id,
            resource: self.resource_id.as_ref(),
            action: &self.action,
            resource_type: &self.resource_type,
            environment: &self.environment,
        }
    }
}
