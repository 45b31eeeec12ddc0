//! Core primitives for an OpenAPI/JSON-Schema document model.
//!
//! Three tightly-coupled pieces the rest of a document model stands on:
//! - [`number::UniversalNumber`]: one value type over every primitive numeric
//!   kind, compared and hashed by mathematical value rather than native width.
//! - The constraint family in [`constraint`]: range / count / pattern
//!   predicates over optional subjects.
//! - The pointer/reference subsystem: RFC 6901 [`pointer::JsonPointer`] with
//!   policy-driven tree evaluation, [`reference::Reference`] (URL + pointer
//!   fragment), and the pervasive [`referable::Referable`] wrapper.
//!
//! Everything here is an immutable value type: no I/O, no interior state,
//! safe to share across threads freely.

pub mod cli;
pub mod constraint;
pub mod number;
pub mod path_de;
pub mod pointer;
pub mod referable;
pub mod reference;
pub mod wellknown;

pub use constraint::{
    CountConstraint, IntegerConstraint, NumberConstraint, PatternConstraint, RangeOptions,
};
pub use number::UniversalNumber;
pub use pointer::{EvaluationError, JsonPointer, JsonPointerEvaluationOptions, PointerError};
pub use referable::Referable;
pub use reference::{Reference, ReferenceError};
