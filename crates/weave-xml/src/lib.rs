//! XML encoding for weave expression trees.
//!
//! Converts between the weave IR and a hierarchical element tree where every
//! node property is a named child element:
//!
//! ```text
//! <Expression>
//!   <NodeType>Add</NodeType>
//!   <Type><Type><MemberType>TypeInfo</MemberType><Name>System.Int32</Name></Type></Type>
//!   <IsLifted>false</IsLifted>
//!   <IsLiftedToNull>false</IsLiftedToNull>
//!   <Left><Expression>...</Expression></Left>
//!   <Right><Expression>...</Expression></Right>
//! </Expression>
//! ```
//!
//! An absent optional child has no element, an empty collection is an empty
//! container element. Types and members are written as descriptors and
//! resolved again on decode through a [`MetadataResolver`].

mod decode;
mod document;
mod encode;
mod options;
mod registry;
pub mod tags;
mod value;

pub use decode::{Decoded, Decoder};
pub use document::Element;
pub use encode::Encoder;
pub use options::CodecOptions;
pub use registry::ConstantRegistry;

use rhizome_weave_ir::{MemberDescriptor, ResolveError, TypeDescriptor};
use thiserror::Error;

#[cfg(doc)]
use rhizome_weave_ir::MetadataResolver;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("unresolved type: {0}")]
    UnresolvedType(TypeDescriptor),

    #[error("no member matches {0}")]
    MemberNotFound(MemberDescriptor),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("unsupported node kind: {0}")]
    UnsupportedNodeKind(String),

    #[error("constant reference {0} is not in the registry")]
    UnregisteredConstantReference(u64),

    #[error("nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("invalid xml: {0}")]
    Xml(String),
}

impl From<ResolveError> for CodecError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnresolvedType(ty) => CodecError::UnresolvedType(ty),
            ResolveError::MemberNotFound(member) => CodecError::MemberNotFound(member),
        }
    }
}
