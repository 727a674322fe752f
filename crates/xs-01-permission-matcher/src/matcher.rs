//! # Permission Matcher
//!
//! Evaluates an ordered allow-list against transport-stamped origins.

use crate::domain::{OperationSet, PermissionRule};
use crate::error::PatternError;
use shared_types::{Operation, Origin};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Immutable, cheaply clonable allow-list.
///
/// An empty list denies everything.
#[derive(Debug, Clone, Default)]
pub struct PermissionMatcher {
    rules: Arc<[PermissionRule]>,
}

impl PermissionMatcher {
    pub fn new(rules: Vec<PermissionRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Parse a JSON array of `{"origin", "allow"}` objects.
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let rules: Vec<PermissionRule> =
            serde_json::from_str(json).map_err(|e| PatternError::InvalidConfig(e.to_string()))?;
        Ok(Self::new(rules))
    }

    /// Whether `origin` may perform `operation`.
    ///
    /// Rules are scanned in order and the first one that both matches the
    /// origin and lists the operation grants access.
    pub fn is_allowed(&self, origin: &Origin, operation: Operation) -> bool {
        self.rules.iter().any(|rule| rule.permits(origin, operation))
    }

    /// Union of the operations granted to `origin` across all rules.
    pub fn allowed_operations(&self, origin: &Origin) -> OperationSet {
        let mut granted = BTreeSet::new();
        for rule in self.rules.iter().filter(|rule| rule.applies_to(origin)) {
            if rule.allow == OperationSet::All {
                return OperationSet::All;
            }
            granted.extend(rule.allow.iter());
        }
        OperationSet::Only(granted)
    }

    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
