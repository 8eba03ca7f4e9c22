//! Element initializers and member bindings.
//!
//! These are not expressions themselves but appear inside `ListInit` and
//! `MemberInit` nodes.

use crate::descriptor::Member;
use crate::expr::Expr;

/// One `Add(...)` call of a collection initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInit {
    pub add_method: Member,
    pub arguments: Vec<Expr>,
}

impl ElementInit {
    pub fn new(add_method: Member, arguments: Vec<Expr>) -> Self {
        Self {
            add_method,
            arguments,
        }
    }
}

/// Discriminant of a [`MemberBinding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    Assignment,
    MemberBinding,
    ListBinding,
}

impl BindingType {
    pub fn name(self) -> &'static str {
        match self {
            BindingType::Assignment => "Assignment",
            BindingType::MemberBinding => "MemberBinding",
            BindingType::ListBinding => "ListBinding",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Assignment" => Some(BindingType::Assignment),
            "MemberBinding" => Some(BindingType::MemberBinding),
            "ListBinding" => Some(BindingType::ListBinding),
            _ => None,
        }
    }
}

/// Initialization of one member inside a `MemberInit`.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberBinding {
    /// `Member = expression`.
    Assignment { member: Member, expression: Expr },

    /// `Member = { nested bindings }` on the existing member value.
    Member {
        member: Member,
        bindings: Vec<MemberBinding>,
    },

    /// `Member = { collection initializers }` on the existing member value.
    List {
        member: Member,
        initializers: Vec<ElementInit>,
    },
}

impl MemberBinding {
    pub fn member(&self) -> &Member {
        match self {
            MemberBinding::Assignment { member, .. }
            | MemberBinding::Member { member, .. }
            | MemberBinding::List { member, .. } => member,
        }
    }

    pub fn binding_type(&self) -> BindingType {
        match self {
            MemberBinding::Assignment { .. } => BindingType::Assignment,
            MemberBinding::Member { .. } => BindingType::MemberBinding,
            MemberBinding::List { .. } => BindingType::ListBinding,
        }
    }
}

// Builder methods for bindings
impl MemberBinding {
    pub fn assign(member: Member, expression: Expr) -> Self {
        MemberBinding::Assignment { member, expression }
    }

    pub fn nested(member: Member, bindings: Vec<MemberBinding>) -> Self {
        MemberBinding::Member { member, bindings }
    }

    pub fn list(member: Member, initializers: Vec<ElementInit>) -> Self {
        MemberBinding::List {
            member,
            initializers,
        }
    }
}
