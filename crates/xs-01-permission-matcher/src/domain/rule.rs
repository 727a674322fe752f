use super::{OperationSet, OriginPattern};
use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use shared_types::{Operation, Origin};

/// One allow-list entry: who, and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub origin: OriginPattern,
    pub allow: OperationSet,
}

impl PermissionRule {
    pub fn new(origin: &str, allow: impl IntoIterator<Item = Operation>) -> Result<Self, PatternError> {
        Ok(Self {
            origin: OriginPattern::parse(origin)?,
            allow: OperationSet::only(allow),
        })
    }

    /// Rule granting every operation.
    pub fn allow_all(origin: &str) -> Result<Self, PatternError> {
        Ok(Self {
            origin: OriginPattern::parse(origin)?,
            allow: OperationSet::All,
        })
    }

    pub fn applies_to(&self, origin: &Origin) -> bool {
        self.origin.matches(origin)
    }

    pub fn permits(&self, origin: &Origin, operation: Operation) -> bool {
        self.applies_to(origin) && self.allow.contains(operation)
    }
}
