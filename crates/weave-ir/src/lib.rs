//! Core IR types for weave expression trees.
//!
//! An expression tree is a typed, immutable description of a computation:
//! constants, parameters, member access, calls, object and array creation,
//! lambdas, operators, conditionals and invocations. Types and members are
//! referred to through descriptors, which a [`MetadataResolver`] maps back
//! to concrete host metadata.
//!
//! Nothing here knows about any wire format; see `rhizome-weave-xml` for that.

mod binding;
mod compare;
mod descriptor;
mod expr;
mod metadata;
mod resolve;
mod visit;

pub use binding::*;
pub use compare::{compare, Comparison, Mismatch, MismatchReason};
pub use descriptor::*;
pub use expr::*;
pub use metadata::MetadataTable;
pub use resolve::{select_member, MetadataCache, MetadataResolver, ResolveError};
pub use visit::{PreOrder, Visitor};
