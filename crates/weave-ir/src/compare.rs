//! Structural comparison of expression trees.
//!
//! The second tree is flattened into a pre-order queue; the first tree is
//! walked in the same order and every node is checked against the next
//! queued candidate. The walk stops at the first mismatch.

use crate::binding::{ElementInit, MemberBinding};
use crate::descriptor::{Member, TypeDescriptor};
use crate::expr::{
    BinaryExpr, CallExpr, ConstantExpr, Expr, InvokeExpr, LambdaExpr, ListInitExpr, MemberExpr,
    MemberInitExpr, NewArrayExpr, NewExpr, NodeType, ParameterExpr, TypeIsExpr, UnaryExpr,
};
use crate::visit::{PreOrder, Visitor};
use std::collections::VecDeque;

/// Whether two trees are structurally identical.
pub fn compare(a: Option<&Expr>, b: Option<&Expr>) -> bool {
    Comparison::run(a, b).are_equal()
}

/// Why a comparison failed.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// The second tree ran out of nodes.
    MissingNode,
    /// The second tree has this many nodes left over.
    ExtraNodes(usize),
    NodeType { expected: NodeType, found: NodeType },
    Type { expected: TypeDescriptor, found: TypeDescriptor },
    Value,
    Name,
    Member,
    Lifting,
    /// Optional children or child counts differ.
    Shape,
    /// Lambda parameter lists differ.
    Signature,
    TypeOperand,
    Bindings,
    Initializers,
}

/// First difference found, at a pre-order position of the first tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub position: usize,
    pub reason: MismatchReason,
}

/// Outcome of a lock-step walk over two trees.
pub struct Comparison<'b> {
    candidates: VecDeque<&'b Expr>,
    candidate: Option<&'b Expr>,
    visited: usize,
    mismatch: Option<Mismatch>,
}

impl<'b> Comparison<'b> {
    pub fn run<'a>(a: Option<&'a Expr>, b: Option<&'b Expr>) -> Self {
        let mut comparison = Self {
            candidates: PreOrder::new(b).into_iter().collect(),
            candidate: None,
            visited: 0,
            mismatch: None,
        };

        if let Some(a) = a {
            comparison.visit_expr(a);
        }

        if comparison.mismatch.is_none() && !comparison.candidates.is_empty() {
            comparison.mismatch = Some(Mismatch {
                position: comparison.visited,
                reason: MismatchReason::ExtraNodes(comparison.candidates.len()),
            });
        }

        comparison
    }

    pub fn are_equal(&self) -> bool {
        self.mismatch.is_none()
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// Nodes of the first tree that were checked, the mismatching one included.
    pub fn visited(&self) -> usize {
        self.visited
    }

    fn stop(&mut self, reason: MismatchReason) {
        if self.mismatch.is_none() {
            self.mismatch = Some(Mismatch {
                position: self.visited.saturating_sub(1),
                reason,
            });
        }
    }

    /// Record `reason` unless `same` holds; returns `same`.
    fn check(&mut self, same: bool, reason: MismatchReason) -> bool {
        if !same {
            self.stop(reason);
        }
        same
    }
}

// Each handler reads the candidate installed by `visit_expr`, compares the
// kind-specific attributes, then recurses.
impl<'a, 'b> Visitor<'a> for Comparison<'b> {
    fn visit_expr(&mut self, expr: &'a Expr) {
        if self.mismatch.is_some() {
            return;
        }
        self.visited += 1;

        let Some(candidate) = self.candidates.pop_front() else {
            self.stop(MismatchReason::MissingNode);
            return;
        };

        if candidate.node_type() != expr.node_type() {
            self.stop(MismatchReason::NodeType {
                expected: expr.node_type(),
                found: candidate.node_type(),
            });
            return;
        }

        if candidate.ty() != expr.ty() {
            self.stop(MismatchReason::Type {
                expected: expr.ty().clone(),
                found: candidate.ty().clone(),
            });
            return;
        }

        self.candidate = Some(candidate);
        self.super_expr(expr);
    }

    fn visit_constant(&mut self, constant: &'a ConstantExpr) {
        let Some(Expr::Constant(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        self.check(constant.value.same_as(&candidate.value), MismatchReason::Value);
    }

    fn visit_parameter(&mut self, parameter: &'a ParameterExpr) {
        let Some(Expr::Parameter(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        self.check(parameter.name == candidate.name, MismatchReason::Name);
    }

    fn visit_member_access(&mut self, member: &'a MemberExpr) {
        let Some(Expr::MemberAccess(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(same_member(&member.member, &candidate.member), MismatchReason::Member)
            && self.check(
                member.expression.is_some() == candidate.expression.is_some(),
                MismatchReason::Shape,
            )
        {
            self.super_member_access(member);
        }
    }

    fn visit_call(&mut self, call: &'a CallExpr) {
        let Some(Expr::Call(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(same_member(&call.method, &candidate.method), MismatchReason::Member)
            && self.check(
                call.object.is_some() == candidate.object.is_some()
                    && call.arguments.len() == candidate.arguments.len(),
                MismatchReason::Shape,
            )
        {
            self.super_call(call);
        }
    }

    fn visit_new(&mut self, new: &'a NewExpr) {
        let candidate = match self.candidate {
            Some(Expr::New(candidate)) => candidate,
            Some(Expr::MemberInit(init)) => &init.new_expression,
            Some(Expr::ListInit(init)) => &init.new_expression,
            _ => return self.stop(MismatchReason::Shape),
        };
        if self.check(same_new(new, candidate), MismatchReason::Member)
            && self.check(
                new.arguments.len() == candidate.arguments.len(),
                MismatchReason::Shape,
            )
        {
            self.super_new(new);
        }
    }

    fn visit_new_array(&mut self, array: &'a NewArrayExpr) {
        let Some(Expr::NewArray(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            array.expressions.len() == candidate.expressions.len(),
            MismatchReason::Shape,
        ) {
            self.super_new_array(array);
        }
    }

    fn visit_member_init(&mut self, init: &'a MemberInitExpr) {
        let Some(Expr::MemberInit(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            same_bindings(&init.bindings, &candidate.bindings),
            MismatchReason::Bindings,
        ) {
            self.super_member_init(init);
        }
    }

    fn visit_list_init(&mut self, init: &'a ListInitExpr) {
        let Some(Expr::ListInit(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            same_initializers(&init.initializers, &candidate.initializers),
            MismatchReason::Initializers,
        ) {
            self.super_list_init(init);
        }
    }

    fn visit_lambda(&mut self, lambda: &'a LambdaExpr) {
        let Some(Expr::Lambda(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            lambda.name == candidate.name && lambda.tail_call == candidate.tail_call,
            MismatchReason::Name,
        ) && self.check(same_signature(lambda, candidate), MismatchReason::Signature)
        {
            self.super_lambda(lambda);
        }
    }

    fn visit_unary(&mut self, unary: &'a UnaryExpr) {
        let Some(Expr::Unary(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            same_optional_member(&unary.method, &candidate.method),
            MismatchReason::Member,
        ) && self.check(
            unary.is_lifted == candidate.is_lifted
                && unary.is_lifted_to_null == candidate.is_lifted_to_null,
            MismatchReason::Lifting,
        ) {
            self.super_unary(unary);
        }
    }

    fn visit_binary(&mut self, binary: &'a BinaryExpr) {
        let Some(Expr::Binary(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            same_optional_member(&binary.method, &candidate.method),
            MismatchReason::Member,
        ) && self.check(
            binary.is_lifted == candidate.is_lifted
                && binary.is_lifted_to_null == candidate.is_lifted_to_null,
            MismatchReason::Lifting,
        ) && self.check(
            binary.conversion.is_some() == candidate.conversion.is_some(),
            MismatchReason::Shape,
        ) {
            self.super_binary(binary);
        }
    }

    fn visit_type_is(&mut self, type_is: &'a TypeIsExpr) {
        let Some(Expr::TypeIs(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            type_is.type_operand == candidate.type_operand,
            MismatchReason::TypeOperand,
        ) {
            self.super_type_is(type_is);
        }
    }

    fn visit_invoke(&mut self, invoke: &'a InvokeExpr) {
        let Some(Expr::Invoke(candidate)) = self.candidate else {
            return self.stop(MismatchReason::Shape);
        };
        if self.check(
            invoke.arguments.len() == candidate.arguments.len(),
            MismatchReason::Shape,
        ) {
            self.super_invoke(invoke);
        }
    }
}

fn same_member(a: &Member, b: &Member) -> bool {
    a.descriptor == b.descriptor
}

fn same_optional_member(a: &Option<Member>, b: &Option<Member>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_member(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn same_members(a: &[Member], b: &[Member]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_member(a, b))
}

fn same_new(a: &NewExpr, b: &NewExpr) -> bool {
    let members = match (&a.members, &b.members) {
        (Some(a), Some(b)) => same_members(a, b),
        (None, None) => true,
        _ => false,
    };
    members && same_optional_member(&a.constructor, &b.constructor)
}

fn same_signature(a: &LambdaExpr, b: &LambdaExpr) -> bool {
    a.parameters.len() == b.parameters.len()
        && a
            .parameters
            .iter()
            .zip(&b.parameters)
            .all(|(a, b)| a.name == b.name && a.ty == b.ty)
}

/// Compares everything but the expressions, which are walked as nodes.
fn same_initializers(a: &[ElementInit], b: &[ElementInit]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| {
            same_member(&a.add_method, &b.add_method) && a.arguments.len() == b.arguments.len()
        })
}

fn same_bindings(a: &[MemberBinding], b: &[MemberBinding]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| {
            same_member(a.member(), b.member())
                && match (a, b) {
                    (MemberBinding::Assignment { .. }, MemberBinding::Assignment { .. }) => true,
                    (
                        MemberBinding::Member { bindings: a, .. },
                        MemberBinding::Member { bindings: b, .. },
                    ) => same_bindings(a, b),
                    (
                        MemberBinding::List { initializers: a, .. },
                        MemberBinding::List { initializers: b, .. },
                    ) => same_initializers(a, b),
                    _ => false,
                }
        })
}
