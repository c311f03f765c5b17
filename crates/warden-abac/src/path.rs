//! Attribute paths.
//!
//! A path names one attribute of the authorization context: a root entity
//! segment (`subject`, `resource`, `action`, `environment`) followed by the
//! attribute key, dot-separated. `subject.department` is the subject's
//! `department` attribute; attribute keys may themselves be dotted
//! (`subject.profile.region`). The `action` root is the verb itself and
//! admits no key.
//!
//! `user` is accepted as an alias of `subject`; policy authors address
//! subject attributes both ways.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The entity segment a path starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathRoot {
    Subject,
    Resource,
    Action,
    Environment,
}

impl Display for PathRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathRoot::Subject => write!(f, "subject"),
            PathRoot::Resource => write!(f, "resource"),
            PathRoot::Action => write!(f, "action"),
            PathRoot::Environment => write!(f, "environment"),
        }
    }
}

/// A malformed attribute path.
///
/// Path errors are configuration errors: the policy carrying the path is
/// treated as non-matching, other policies keep evaluating.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("empty attribute path")]
    Empty,

    #[error("unknown path root `{0}` (expected subject, resource, action, or environment)")]
    UnknownRoot(String),

    #[error("`action` is a scalar and admits no sub-path, got `action.{0}`")]
    ActionSubPath(String),

    #[error("path `{0}` names an entity but no attribute key")]
    MissingKey(String),
}

/// A parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    root: PathRoot,
    key: String,
}

impl AttributePath {
    /// Parses a dot-separated path string.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let (first, rest) = match raw.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (raw, None),
        };

        let root = match first {
            "subject" | "user" => PathRoot::Subject,
            "resource" => PathRoot::Resource,
            "action" => PathRoot::Action,
            "environment" => PathRoot::Environment,
            other => return Err(PathError::UnknownRoot(other.to_string())),
        };

        match (root, rest) {
            (PathRoot::Action, None) => Ok(Self {
                root,
                key: String::new(),
            }),
            (PathRoot::Action, Some(rest)) => Err(PathError::ActionSubPath(rest.to_string())),
            (_, None) => Err(PathError::MissingKey(raw.to_string())),
            (_, Some(rest)) => {
                if rest.is_empty() || rest.split('.').any(str::is_empty) {
                    return Err(PathError::MissingKey(raw.to_string()));
                }
                Ok(Self {
                    root,
                    key: rest.to_string(),
                })
            }
        }
    }

    pub fn root(&self) -> PathRoot {
        self.root
    }

    /// The attribute key under the root entity. Empty for `action`.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.root)
        } else {
            write!(f, "{}.{}", self.root, self.key)
        }
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
