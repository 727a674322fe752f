//! Decoded store commands.
//!
//! Positional arguments per operation:
//!
//! | Operation    | Args                          | Result                       |
//! |--------------|-------------------------------|------------------------------|
//! | `get`        | `key, ...keys`                | value, or array for 2+ keys  |
//! | `set`        | `key, value, ttlMillis?`      | `null`                       |
//! | `delete`     | `...keys`                     | `null`                       |
//! | `getAllKeys` | none                          | array of keys                |
//! | `clear`      | none                          | `null`                       |

use shared_types::{Operation, Value};
use std::collections::BTreeSet;

/// A request's operation with its arguments validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Get { keys: Vec<String> },
    Set { key: String, value: Value, ttl_millis: Option<i64> },
    Delete { keys: Vec<String> },
    GetAllKeys,
    Clear,
}

/// What a command must hold exclusively while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockScope {
    /// Sorted, de-duplicated keys.
    Keys(Vec<String>),
    /// The whole store.
    Store,
}

impl Command {
    /// Validate `args` for `operation`. The error is a human-readable reason.
    pub fn decode(operation: Operation, args: Vec<Value>) -> Result<Self, String> {
        match operation {
            Operation::Get => {
                let keys = string_keys(operation, args)?;
                if keys.is_empty() {
                    return Err("get requires at least one key".to_string());
                }
                Ok(Command::Get { keys })
            }
            Operation::Set => {
                let mut args = args.into_iter();
                let key = match args.next() {
                    Some(Value::String(key)) => key,
                    Some(other) => return Err(format!("set key must be a string, got {other}")),
                    None => return Err("set requires a key and a value".to_string()),
                };
                let Some(value) = args.next() else {
                    return Err("set requires a key and a value".to_string());
                };
                let ttl_millis = match args.next() {
                    None | Some(Value::Null) => None,
                    Some(Value::Number(n)) => n
                        .as_i64()
                        .or_else(|| n.as_f64().map(|f| f as i64))
                        .map(Some)
                        .ok_or_else(|| format!("ttl is not a usable number: {n}"))?,
                    Some(other) => return Err(format!("ttl must be a number, got {other}")),
                };
                Ok(Command::Set {
                    key,
                    value,
                    ttl_millis,
                })
            }
            Operation::Delete => Ok(Command::Delete {
                keys: string_keys(operation, args)?,
            }),
            Operation::GetAllKeys => Ok(Command::GetAllKeys),
            Operation::Clear => Ok(Command::Clear),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Command::Get { .. } => Operation::Get,
            Command::Set { .. } => Operation::Set,
            Command::Delete { .. } => Operation::Delete,
            Command::GetAllKeys => Operation::GetAllKeys,
            Command::Clear => Operation::Clear,
        }
    }

    pub fn lock_scope(&self) -> LockScope {
        let keys: BTreeSet<&String> = match self {
            Command::Get { keys } | Command::Delete { keys } => keys.iter().collect(),
            Command::Set { key, .. } => std::iter::once(key).collect(),
            Command::GetAllKeys | Command::Clear => return LockScope::Store,
        };
        LockScope::Keys(keys.into_iter().cloned().collect())
    }
}

fn string_keys(operation: Operation, args: Vec<Value>) -> Result<Vec<String>, String> {
    args.into_iter()
        .map(|arg| match arg {
            Value::String(key) => Ok(key),
            other => Err(format!("{operation} keys must be strings, got {other}")),
        })
        .collect()
}
