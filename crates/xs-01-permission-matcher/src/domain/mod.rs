//! # Domain Layer
//!
//! Value types of the permission model. All of them are immutable once
//! built.

mod operations;
mod pattern;
mod rule;

pub use operations::OperationSet;
pub use pattern::OriginPattern;
pub use rule::PermissionRule;
