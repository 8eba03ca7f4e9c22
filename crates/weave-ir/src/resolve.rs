//! Resolution of descriptors back into host metadata.

use crate::descriptor::{Member, MemberDescriptor, MemberKind, Type, TypeDescriptor, TypeInfo};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Host capability that maps descriptors to concrete metadata.
///
/// Implementations only enumerate what exists. Overload selection is done
/// by [`select_member`], never by the resolver.
pub trait MetadataResolver {
    /// Look up a type by its fully qualified name.
    fn resolve_type(&self, name: &TypeDescriptor) -> Option<Type>;

    /// Members of `declaring` with the given kind and name.
    ///
    /// Generic methods are returned as definitions. Constructors are listed
    /// regardless of `name`.
    fn members(&self, declaring: &TypeInfo, kind: MemberKind, name: &str) -> Vec<Member>;
}

impl<R: MetadataResolver + ?Sized> MetadataResolver for &R {
    fn resolve_type(&self, name: &TypeDescriptor) -> Option<Type> {
        (**self).resolve_type(name)
    }

    fn members(&self, declaring: &TypeInfo, kind: MemberKind, name: &str) -> Vec<Member> {
        (**self).members(declaring, kind, name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("unresolved type: {0}")]
    UnresolvedType(TypeDescriptor),

    #[error("no member matches {0}")]
    MemberNotFound(MemberDescriptor),
}

/// Pick the member that matches `wanted` exactly.
///
/// The rule is positional and exact: same name, same parameter types in the
/// same order, no assignability and no default parameters. A generic method
/// definition only matches when generic arguments of the right arity are
/// supplied, and is instantiated before its parameters are compared;
/// non-generic members never match when generic arguments are supplied.
pub fn select_member(candidates: &[Member], wanted: &MemberDescriptor) -> Option<Member> {
    for candidate in candidates {
        if candidate.kind() != wanted.kind || candidate.name() != wanted.name {
            continue;
        }

        let candidate = if candidate.is_generic_definition() {
            if wanted.generic_arguments.is_empty() {
                continue;
            }
            match candidate.instantiate(&wanted.generic_arguments) {
                Some(closed) => Arc::new(closed),
                None => continue,
            }
        } else if candidate.generic_arguments() != wanted.generic_arguments.as_slice() {
            continue;
        } else {
            Arc::clone(candidate)
        };

        if candidate.parameters() == wanted.parameters.as_slice() {
            return Some(candidate);
        }
    }

    None
}

/// Caching front end over a [`MetadataResolver`].
///
/// Type lookups are cached for the lifetime of the cache, so a descriptor
/// always resolves to the same handle.
pub struct MetadataCache<R> {
    resolver: R,
    types: HashMap<TypeDescriptor, Type>,
}

impl<R: MetadataResolver> MetadataCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            types: HashMap::new(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolve_type(&mut self, name: &TypeDescriptor) -> Result<Type, ResolveError> {
        if let Some(ty) = self.types.get(name) {
            return Ok(Arc::clone(ty));
        }

        let ty = self
            .resolver
            .resolve_type(name)
            .ok_or_else(|| ResolveError::UnresolvedType(name.clone()))?;
        trace!(%name, "resolved type");
        self.types.insert(name.clone(), Arc::clone(&ty));
        Ok(ty)
    }

    pub fn resolve_member(&mut self, wanted: &MemberDescriptor) -> Result<Member, ResolveError> {
        let declaring = self.resolve_type(&wanted.declaring_type)?;
        let candidates = self.resolver.members(&declaring, wanted.kind, &wanted.name);
        let member = select_member(&candidates, wanted)
            .ok_or_else(|| ResolveError::MemberNotFound(wanted.clone()))?;
        trace!(member = %wanted, "resolved member");
        Ok(member)
    }
}
