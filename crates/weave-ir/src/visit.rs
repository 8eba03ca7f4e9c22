//! Traversal over expression trees.
//!
//! [`Visitor`] dispatches on the node kind and recurses into children in a
//! fixed order. The order is part of the contract: the codec writes and
//! reads children in the same sequence, and the comparator relies on it.
//!
//! | kind          | children, in order                         |
//! |---------------|--------------------------------------------|
//! | Unary         | operand                                    |
//! | Binary        | left, right, conversion                    |
//! | TypeIs        | expression                                 |
//! | Conditional   | test, if_true, if_false                    |
//! | MemberAccess  | expression                                 |
//! | Call          | object, arguments                          |
//! | Lambda        | body                                       |
//! | New           | arguments                                  |
//! | NewArray      | expressions                                |
//! | Invoke        | arguments, expression                      |
//! | MemberInit    | new expression, bindings                   |
//! | ListInit      | new expression, initializers               |
//!
//! Lambda parameters are not traversed: they are declarations, and every
//! use of them inside the body is visited as a `Parameter` node.

use crate::binding::{ElementInit, MemberBinding};
use crate::expr::{
    BinaryExpr, CallExpr, ConditionalExpr, ConstantExpr, Expr, InvokeExpr, LambdaExpr,
    ListInitExpr, MemberExpr, MemberInitExpr, NewArrayExpr, NewExpr, ParameterExpr, TypeIsExpr,
    UnaryExpr,
};

/// Trait for visiting expression trees.
///
/// Every `visit_*` method defaults to the matching `super_*` method, which
/// recurses into the node's children. Override `visit_*` to add behavior and
/// call `super_*` to keep recursing.
///
/// # Example
///
/// ```
/// use rhizome_weave_ir::{Expr, NodeType, ConstantExpr, Visitor};
///
/// struct ConstantCounter(usize);
///
/// impl<'ir> Visitor<'ir> for ConstantCounter {
///     fn visit_constant(&mut self, _: &'ir ConstantExpr) {
///         self.0 += 1;
///     }
/// }
///
/// let sum = Expr::binary(NodeType::Add, Expr::int(1), Expr::int(2));
/// let mut counter = ConstantCounter(0);
/// counter.visit_expr(&sum);
/// assert_eq!(counter.0, 2);
/// ```
pub trait Visitor<'ir> {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        self.super_expr(expr)
    }

    /// Dispatch on the node kind.
    fn super_expr(&mut self, expr: &'ir Expr) {
        match expr {
            Expr::Constant(e) => self.visit_constant(e),
            Expr::Parameter(e) => self.visit_parameter(e),
            Expr::MemberAccess(e) => self.visit_member_access(e),
            Expr::Call(e) => self.visit_call(e),
            Expr::New(e) => self.visit_new(e),
            Expr::NewArray(e) => self.visit_new_array(e),
            Expr::MemberInit(e) => self.visit_member_init(e),
            Expr::ListInit(e) => self.visit_list_init(e),
            Expr::Lambda(e) => self.visit_lambda(e),
            Expr::Unary(e) => self.visit_unary(e),
            Expr::Binary(e) => self.visit_binary(e),
            Expr::Conditional(e) => self.visit_conditional(e),
            Expr::TypeIs(e) => self.visit_type_is(e),
            Expr::Invoke(e) => self.visit_invoke(e),
        }
    }

    fn visit_constant(&mut self, _constant: &'ir ConstantExpr) {}

    fn visit_parameter(&mut self, _parameter: &'ir ParameterExpr) {}

    fn visit_member_access(&mut self, member: &'ir MemberExpr) {
        self.super_member_access(member)
    }

    fn super_member_access(&mut self, member: &'ir MemberExpr) {
        if let Some(expression) = &member.expression {
            self.visit_expr(expression);
        }
    }

    fn visit_call(&mut self, call: &'ir CallExpr) {
        self.super_call(call)
    }

    fn super_call(&mut self, call: &'ir CallExpr) {
        if let Some(object) = &call.object {
            self.visit_expr(object);
        }
        self.visit_exprs(&call.arguments);
    }

    fn visit_new(&mut self, new: &'ir NewExpr) {
        self.super_new(new)
    }

    fn super_new(&mut self, new: &'ir NewExpr) {
        self.visit_exprs(&new.arguments);
    }

    fn visit_new_array(&mut self, array: &'ir NewArrayExpr) {
        self.super_new_array(array)
    }

    fn super_new_array(&mut self, array: &'ir NewArrayExpr) {
        self.visit_exprs(&array.expressions);
    }

    /// The inner `New` is visited through [`Visitor::visit_new`] directly; it
    /// is part of the `MemberInit` node, not a node of its own.
    fn visit_member_init(&mut self, init: &'ir MemberInitExpr) {
        self.super_member_init(init)
    }

    fn super_member_init(&mut self, init: &'ir MemberInitExpr) {
        self.visit_new(&init.new_expression);
        for binding in &init.bindings {
            self.visit_binding(binding);
        }
    }

    fn visit_list_init(&mut self, init: &'ir ListInitExpr) {
        self.super_list_init(init)
    }

    fn super_list_init(&mut self, init: &'ir ListInitExpr) {
        self.visit_new(&init.new_expression);
        for initializer in &init.initializers {
            self.visit_element_init(initializer);
        }
    }

    fn visit_lambda(&mut self, lambda: &'ir LambdaExpr) {
        self.super_lambda(lambda)
    }

    fn super_lambda(&mut self, lambda: &'ir LambdaExpr) {
        self.visit_expr(&lambda.body);
    }

    fn visit_unary(&mut self, unary: &'ir UnaryExpr) {
        self.super_unary(unary)
    }

    fn super_unary(&mut self, unary: &'ir UnaryExpr) {
        self.visit_expr(&unary.operand);
    }

    fn visit_binary(&mut self, binary: &'ir BinaryExpr) {
        self.super_binary(binary)
    }

    fn super_binary(&mut self, binary: &'ir BinaryExpr) {
        self.visit_expr(&binary.left);
        self.visit_expr(&binary.right);
        if let Some(conversion) = &binary.conversion {
            self.visit_expr(conversion);
        }
    }

    fn visit_conditional(&mut self, conditional: &'ir ConditionalExpr) {
        self.super_conditional(conditional)
    }

    fn super_conditional(&mut self, conditional: &'ir ConditionalExpr) {
        self.visit_expr(&conditional.test);
        self.visit_expr(&conditional.if_true);
        self.visit_expr(&conditional.if_false);
    }

    fn visit_type_is(&mut self, type_is: &'ir TypeIsExpr) {
        self.super_type_is(type_is)
    }

    fn super_type_is(&mut self, type_is: &'ir TypeIsExpr) {
        self.visit_expr(&type_is.expression);
    }

    fn visit_invoke(&mut self, invoke: &'ir InvokeExpr) {
        self.super_invoke(invoke)
    }

    fn super_invoke(&mut self, invoke: &'ir InvokeExpr) {
        self.visit_exprs(&invoke.arguments);
        self.visit_expr(&invoke.expression);
    }

    fn visit_element_init(&mut self, init: &'ir ElementInit) {
        self.super_element_init(init)
    }

    fn super_element_init(&mut self, init: &'ir ElementInit) {
        self.visit_exprs(&init.arguments);
    }

    fn visit_binding(&mut self, binding: &'ir MemberBinding) {
        self.super_binding(binding)
    }

    fn super_binding(&mut self, binding: &'ir MemberBinding) {
        match binding {
            MemberBinding::Assignment { expression, .. } => self.visit_expr(expression),
            MemberBinding::Member { bindings, .. } => {
                for nested in bindings {
                    self.visit_binding(nested);
                }
            }
            MemberBinding::List { initializers, .. } => {
                for initializer in initializers {
                    self.visit_element_init(initializer);
                }
            }
        }
    }

    fn visit_exprs(&mut self, exprs: &'ir [Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }
}

/// Pre-order list of every node in a tree.
#[derive(Debug, Default)]
pub struct PreOrder<'ir> {
    nodes: Vec<&'ir Expr>,
}

impl<'ir> PreOrder<'ir> {
    pub fn new(expr: Option<&'ir Expr>) -> Self {
        let mut pre_order = Self::default();
        if let Some(expr) = expr {
            pre_order.visit_expr(expr);
        }
        pre_order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'ir Expr> + '_ {
        self.nodes.iter().copied()
    }
}

impl<'ir> IntoIterator for PreOrder<'ir> {
    type Item = &'ir Expr;
    type IntoIter = std::vec::IntoIter<&'ir Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'ir> Visitor<'ir> for PreOrder<'ir> {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        self.nodes.push(expr);
        self.super_expr(expr);
    }
}
