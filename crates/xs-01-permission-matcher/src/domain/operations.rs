//! Allowed operation sets.

use crate::error::PatternError;
use serde::{Deserialize, Serialize};
use shared_types::Operation;
use std::collections::BTreeSet;

/// Operations granted by a rule.
///
/// Serialized as a list of wire names; `["*"]` grants every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum OperationSet {
    All,
    Only(BTreeSet<Operation>),
}

impl OperationSet {
    pub fn only(operations: impl IntoIterator<Item = Operation>) -> Self {
        OperationSet::Only(operations.into_iter().collect())
    }

    pub fn contains(&self, operation: Operation) -> bool {
        match self {
            OperationSet::All => true,
            OperationSet::Only(set) => set.contains(&operation),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, OperationSet::Only(set) if set.is_empty())
    }

    /// Expand into the concrete operations granted.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl TryFrom<Vec<String>> for OperationSet {
    type Error = PatternError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let mut operations = BTreeSet::new();
        for name in names {
            if name == "*" {
                return Ok(OperationSet::All);
            }
            let op = name
                .parse::<Operation>()
                .map_err(|_| PatternError::UnknownOperation(name))?;
            operations.insert(op);
        }
        Ok(OperationSet::Only(operations))
    }
}

impl From<OperationSet> for Vec<String> {
    fn from(set: OperationSet) -> Self {
        match set {
            OperationSet::All => vec!["*".to_string()],
            OperationSet::Only(ops) => ops.iter().map(|op| op.as_str().to_string()).collect(),
        }
    }
}
