//! In-memory metadata table.

use crate::descriptor::{
    Member, MemberInfo, MemberKind, Primitive, Type, TypeDescriptor, TypeInfo, TypeShape,
};
use crate::resolve::MetadataResolver;
use std::collections::HashMap;
use std::sync::Arc;

/// A [`MetadataResolver`] backed by explicitly registered types and members.
///
/// Array types (`T[]`) resolve implicitly whenever their element type does.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    types: HashMap<TypeDescriptor, Type>,
    members: HashMap<TypeDescriptor, Vec<Member>>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that already knows the primitive types, `System.String`,
    /// `System.Object` and `System.Void`.
    pub fn with_primitives() -> Self {
        let mut table = Self::new();
        for primitive in Primitive::ALL {
            table.add_type(TypeInfo::primitive(primitive));
        }
        table.add_type(TypeInfo::new(TypeDescriptor::string(), TypeShape::String));
        table.add_type(TypeInfo::object(TypeDescriptor::object()));
        table.add_type(TypeInfo::object(TypeDescriptor::void()));
        table
    }

    pub fn add_type(&mut self, info: TypeInfo) -> Type {
        let ty = Arc::new(info);
        self.types.insert(ty.descriptor.clone(), Arc::clone(&ty));
        ty
    }

    /// Register a member on its declaring type.
    pub fn add_member(&mut self, member: MemberInfo) -> Member {
        let member = Arc::new(member);
        self.members
            .entry(member.declaring_type().clone())
            .or_default()
            .push(Arc::clone(&member));
        member
    }
}

impl MetadataResolver for MetadataTable {
    fn resolve_type(&self, name: &TypeDescriptor) -> Option<Type> {
        if let Some(ty) = self.types.get(name) {
            return Some(Arc::clone(ty));
        }

        let element = name.element_type()?;
        self.resolve_type(&element).map(|_| Arc::new(TypeInfo::array(&element)))
    }

    fn members(&self, declaring: &TypeInfo, kind: MemberKind, name: &str) -> Vec<Member> {
        let Some(members) = self.members.get(&declaring.descriptor) else {
            return Vec::new();
        };

        members
            .iter()
            .filter(|m| m.kind() == kind && (kind == MemberKind::Constructor || m.name() == name))
            .cloned()
            .collect()
    }
}
