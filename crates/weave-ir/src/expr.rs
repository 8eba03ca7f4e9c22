//! Expression node types for the IR.

use crate::binding::{ElementInit, MemberBinding};
use crate::descriptor::{Member, Primitive, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

macro_rules! node_types {
    ($($variant:ident),* $(,)?) => {
        /// Node-kind tag carried by every expression.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum NodeType {
            $($variant,)*
        }

        impl NodeType {
            /// Tag used on the wire.
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeType::$variant => stringify!($variant),)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(NodeType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

node_types! {
    // Unary
    Negate,
    NegateChecked,
    Not,
    Convert,
    ConvertChecked,
    ArrayLength,
    Quote,
    TypeAs,
    UnaryPlus,
    // Binary
    Add,
    AddChecked,
    Subtract,
    SubtractChecked,
    Multiply,
    MultiplyChecked,
    Divide,
    Power,
    Modulo,
    And,
    AndAlso,
    Or,
    OrElse,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    Coalesce,
    ArrayIndex,
    RightShift,
    LeftShift,
    ExclusiveOr,
    // Everything else
    TypeIs,
    Conditional,
    Constant,
    Parameter,
    MemberAccess,
    Call,
    Lambda,
    New,
    NewArrayInit,
    NewArrayBounds,
    Invoke,
    MemberInit,
    ListInit,
}

impl NodeType {
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            NodeType::Negate
                | NodeType::NegateChecked
                | NodeType::Not
                | NodeType::Convert
                | NodeType::ConvertChecked
                | NodeType::ArrayLength
                | NodeType::Quote
                | NodeType::TypeAs
                | NodeType::UnaryPlus
        )
    }

    pub fn is_binary(self) -> bool {
        matches!(
            self,
            NodeType::Add
                | NodeType::AddChecked
                | NodeType::Subtract
                | NodeType::SubtractChecked
                | NodeType::Multiply
                | NodeType::MultiplyChecked
                | NodeType::Divide
                | NodeType::Power
                | NodeType::Modulo
                | NodeType::And
                | NodeType::AndAlso
                | NodeType::Or
                | NodeType::OrElse
                | NodeType::ExclusiveOr
                | NodeType::LeftShift
                | NodeType::RightShift
                | NodeType::Coalesce
                | NodeType::ArrayIndex
        ) || self.is_comparison()
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            NodeType::Equal
                | NodeType::NotEqual
                | NodeType::LessThan
                | NodeType::LessThanOrEqual
                | NodeType::GreaterThan
                | NodeType::GreaterThanOrEqual
        )
    }

    pub fn is_new_array(self) -> bool {
        matches!(self, NodeType::NewArrayInit | NodeType::NewArrayBounds)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host object referenced by a constant that has no textual form.
///
/// Two opaque values are equal only if they are the same allocation.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn from_arc(value: Arc<dyn Any + Send + Sync>) -> Self {
        Self(value)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Address of the shared allocation; stable while any clone is alive.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        self.addr() == other.addr()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:#x})", self.addr())
    }
}

/// Payload of a constant node.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Enum { variant: String, value: i64 },
    Opaque(Opaque),
}

impl ConstantValue {
    /// Equality that treats floats bitwise, so `NaN` matches itself.
    pub fn same_as(&self, other: &ConstantValue) -> bool {
        match (self, other) {
            (ConstantValue::F32(a), ConstantValue::F32(b)) => a.to_bits() == b.to_bits(),
            (ConstantValue::F64(a), ConstantValue::F64(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(ConstantExpr),
    /// Shared by every occurrence of the same parameter.
    Parameter(Arc<ParameterExpr>),
    MemberAccess(MemberExpr),
    Call(CallExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    MemberInit(MemberInitExpr),
    ListInit(ListInitExpr),
    Lambda(LambdaExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Conditional(ConditionalExpr),
    TypeIs(TypeIsExpr),
    Invoke(InvokeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExpr {
    pub ty: TypeDescriptor,
    pub value: ConstantValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterExpr {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl ParameterExpr {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            ty,
        })
    }
}

/// Field or property access; `expression` is `None` for static members.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub ty: TypeDescriptor,
    pub expression: Option<Box<Expr>>,
    pub member: Member,
}

/// Method call; `object` is `None` for static methods.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub ty: TypeDescriptor,
    pub object: Option<Box<Expr>>,
    pub method: Member,
    pub arguments: Vec<Expr>,
}

/// Object construction.
///
/// `constructor` is `None` for default-initialized value types. `members`
/// lists the members the arguments initialize (anonymous types), and is
/// distinct from an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub ty: TypeDescriptor,
    pub constructor: Option<Member>,
    pub arguments: Vec<Expr>,
    pub members: Option<Vec<Member>>,
}

impl NewExpr {
    pub fn new(constructor: Member, arguments: Vec<Expr>) -> Self {
        Self {
            ty: constructor.declaring_type().clone(),
            constructor: Some(constructor),
            arguments,
            members: None,
        }
    }

    pub fn default_value(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            constructor: None,
            arguments: Vec::new(),
            members: None,
        }
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = Some(members);
        self
    }
}

/// Array creation: `NewArrayInit` lists the elements, `NewArrayBounds`
/// lists the dimension lengths. `ty` is the array type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpr {
    pub node_type: NodeType,
    pub ty: TypeDescriptor,
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInitExpr {
    pub ty: TypeDescriptor,
    pub new_expression: NewExpr,
    pub bindings: Vec<MemberBinding>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListInitExpr {
    pub ty: TypeDescriptor,
    pub new_expression: NewExpr,
    pub initializers: Vec<ElementInit>,
}

/// Lambda abstraction; `ty` is the delegate type.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub ty: TypeDescriptor,
    pub body: Box<Expr>,
    pub parameters: Vec<Arc<ParameterExpr>>,
    pub name: Option<String>,
    pub tail_call: bool,
}

impl LambdaExpr {
    pub fn new(ty: TypeDescriptor, body: Expr, parameters: Vec<Arc<ParameterExpr>>) -> Self {
        Self {
            ty,
            body: Box::new(body),
            parameters,
            name: None,
            tail_call: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tail_call(mut self, tail_call: bool) -> Self {
        self.tail_call = tail_call;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub node_type: NodeType,
    pub ty: TypeDescriptor,
    pub operand: Box<Expr>,
    /// User-defined operator implementation.
    pub method: Option<Member>,
    pub is_lifted: bool,
    pub is_lifted_to_null: bool,
}

impl UnaryExpr {
    pub fn new(node_type: NodeType, operand: Expr, ty: TypeDescriptor) -> Self {
        Self {
            node_type,
            ty,
            operand: Box::new(operand),
            method: None,
            is_lifted: false,
            is_lifted_to_null: false,
        }
    }

    pub fn with_method(mut self, method: Member) -> Self {
        self.ty = method.value_type.clone();
        self.method = Some(method);
        self
    }

    pub fn lifted(mut self, is_lifted: bool, is_lifted_to_null: bool) -> Self {
        self.is_lifted = is_lifted;
        self.is_lifted_to_null = is_lifted_to_null;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub node_type: NodeType,
    pub ty: TypeDescriptor,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    /// Conversion lambda applied to the left operand of a `Coalesce`.
    pub conversion: Option<Box<Expr>>,
    /// User-defined operator implementation.
    pub method: Option<Member>,
    pub is_lifted: bool,
    pub is_lifted_to_null: bool,
}

impl BinaryExpr {
    /// Build a binary node, deriving its result type from the operator and
    /// operands.
    pub fn new(node_type: NodeType, left: Expr, right: Expr) -> Self {
        let ty = match node_type {
            op if op.is_comparison() => TypeDescriptor::boolean(),
            NodeType::Coalesce => right.ty().clone(),
            NodeType::ArrayIndex => left
                .ty()
                .element_type()
                .unwrap_or_else(|| left.ty().clone()),
            _ => left.ty().clone(),
        };
        Self {
            node_type,
            ty,
            left: Box::new(left),
            right: Box::new(right),
            conversion: None,
            method: None,
            is_lifted: false,
            is_lifted_to_null: false,
        }
    }

    pub fn with_method(mut self, method: Member) -> Self {
        self.ty = method.value_type.clone();
        self.method = Some(method);
        self
    }

    pub fn with_conversion(mut self, conversion: LambdaExpr) -> Self {
        self.conversion = Some(Box::new(Expr::Lambda(conversion)));
        self
    }

    pub fn lifted(mut self, is_lifted: bool, is_lifted_to_null: bool) -> Self {
        self.is_lifted = is_lifted;
        self.is_lifted_to_null = is_lifted_to_null;
        self
    }

    pub fn with_type(mut self, ty: TypeDescriptor) -> Self {
        self.ty = ty;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub ty: TypeDescriptor,
    pub test: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
}

/// `expression is type_operand`; always boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeIsExpr {
    pub ty: TypeDescriptor,
    pub expression: Box<Expr>,
    pub type_operand: TypeDescriptor,
}

/// Application of a delegate or lambda to arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeExpr {
    pub ty: TypeDescriptor,
    pub expression: Box<Expr>,
    pub arguments: Vec<Expr>,
}

impl Expr {
    pub fn node_type(&self) -> NodeType {
        match self {
            Expr::Constant(_) => NodeType::Constant,
            Expr::Parameter(_) => NodeType::Parameter,
            Expr::MemberAccess(_) => NodeType::MemberAccess,
            Expr::Call(_) => NodeType::Call,
            Expr::New(_) => NodeType::New,
            Expr::NewArray(e) => e.node_type,
            Expr::MemberInit(_) => NodeType::MemberInit,
            Expr::ListInit(_) => NodeType::ListInit,
            Expr::Lambda(_) => NodeType::Lambda,
            Expr::Unary(e) => e.node_type,
            Expr::Binary(e) => e.node_type,
            Expr::Conditional(_) => NodeType::Conditional,
            Expr::TypeIs(_) => NodeType::TypeIs,
            Expr::Invoke(_) => NodeType::Invoke,
        }
    }

    /// Result type of the node.
    pub fn ty(&self) -> &TypeDescriptor {
        match self {
            Expr::Constant(e) => &e.ty,
            Expr::Parameter(e) => &e.ty,
            Expr::MemberAccess(e) => &e.ty,
            Expr::Call(e) => &e.ty,
            Expr::New(e) => &e.ty,
            Expr::NewArray(e) => &e.ty,
            Expr::MemberInit(e) => &e.ty,
            Expr::ListInit(e) => &e.ty,
            Expr::Lambda(e) => &e.ty,
            Expr::Unary(e) => &e.ty,
            Expr::Binary(e) => &e.ty,
            Expr::Conditional(e) => &e.ty,
            Expr::TypeIs(e) => &e.ty,
            Expr::Invoke(e) => &e.ty,
        }
    }
}

// Builder methods for expressions
impl Expr {
    pub fn constant(value: ConstantValue, ty: TypeDescriptor) -> Self {
        Expr::Constant(ConstantExpr { ty, value })
    }

    pub fn null(ty: TypeDescriptor) -> Self {
        Expr::constant(ConstantValue::Null, ty)
    }

    pub fn int(v: i32) -> Self {
        Expr::constant(ConstantValue::I32(v), TypeDescriptor::int32())
    }

    pub fn long(v: i64) -> Self {
        Expr::constant(ConstantValue::I64(v), Primitive::Int64.descriptor())
    }

    pub fn double(v: f64) -> Self {
        Expr::constant(ConstantValue::F64(v), Primitive::Double.descriptor())
    }

    pub fn bool(v: bool) -> Self {
        Expr::constant(ConstantValue::Bool(v), TypeDescriptor::boolean())
    }

    pub fn string(v: impl Into<String>) -> Self {
        Expr::constant(ConstantValue::String(v.into()), TypeDescriptor::string())
    }

    pub fn opaque(value: Opaque, ty: TypeDescriptor) -> Self {
        Expr::constant(ConstantValue::Opaque(value), ty)
    }

    pub fn param(parameter: &Arc<ParameterExpr>) -> Self {
        Expr::Parameter(Arc::clone(parameter))
    }

    pub fn member(expression: Expr, member: Member) -> Self {
        Expr::MemberAccess(MemberExpr {
            ty: member.value_type.clone(),
            expression: Some(Box::new(expression)),
            member,
        })
    }

    pub fn static_member(member: Member) -> Self {
        Expr::MemberAccess(MemberExpr {
            ty: member.value_type.clone(),
            expression: None,
            member,
        })
    }

    pub fn call(object: Expr, method: Member, arguments: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            ty: method.value_type.clone(),
            object: Some(Box::new(object)),
            method,
            arguments,
        })
    }

    pub fn static_call(method: Member, arguments: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            ty: method.value_type.clone(),
            object: None,
            method,
            arguments,
        })
    }

    pub fn new(constructor: Member, arguments: Vec<Expr>) -> Self {
        Expr::New(NewExpr::new(constructor, arguments))
    }

    pub fn new_array_init(element: &TypeDescriptor, expressions: Vec<Expr>) -> Self {
        Expr::NewArray(NewArrayExpr {
            node_type: NodeType::NewArrayInit,
            ty: TypeDescriptor::array_of(element),
            expressions,
        })
    }

    pub fn new_array_bounds(element: &TypeDescriptor, bounds: Vec<Expr>) -> Self {
        Expr::NewArray(NewArrayExpr {
            node_type: NodeType::NewArrayBounds,
            ty: TypeDescriptor::array_of(element),
            expressions: bounds,
        })
    }

    pub fn member_init(new_expression: NewExpr, bindings: Vec<MemberBinding>) -> Self {
        Expr::MemberInit(MemberInitExpr {
            ty: new_expression.ty.clone(),
            new_expression,
            bindings,
        })
    }

    pub fn list_init(new_expression: NewExpr, initializers: Vec<ElementInit>) -> Self {
        Expr::ListInit(ListInitExpr {
            ty: new_expression.ty.clone(),
            new_expression,
            initializers,
        })
    }

    pub fn lambda(ty: TypeDescriptor, body: Expr, parameters: Vec<Arc<ParameterExpr>>) -> Self {
        Expr::Lambda(LambdaExpr::new(ty, body, parameters))
    }

    pub fn unary(node_type: NodeType, operand: Expr, ty: TypeDescriptor) -> Self {
        Expr::Unary(UnaryExpr::new(node_type, operand, ty))
    }

    pub fn negate(operand: Expr) -> Self {
        let ty = operand.ty().clone();
        Expr::unary(NodeType::Negate, operand, ty)
    }

    pub fn not(operand: Expr) -> Self {
        let ty = operand.ty().clone();
        Expr::unary(NodeType::Not, operand, ty)
    }

    pub fn convert(operand: Expr, ty: TypeDescriptor) -> Self {
        Expr::unary(NodeType::Convert, operand, ty)
    }

    pub fn binary(node_type: NodeType, left: Expr, right: Expr) -> Self {
        Expr::Binary(BinaryExpr::new(node_type, left, right))
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Conditional(ConditionalExpr {
            ty: if_true.ty().clone(),
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    pub fn type_is(expression: Expr, type_operand: TypeDescriptor) -> Self {
        Expr::TypeIs(TypeIsExpr {
            ty: TypeDescriptor::boolean(),
            expression: Box::new(expression),
            type_operand,
        })
    }

    pub fn invoke(expression: Expr, arguments: Vec<Expr>, ty: TypeDescriptor) -> Self {
        Expr::Invoke(InvokeExpr {
            ty,
            expression: Box::new(expression),
            arguments,
        })
    }
}

impl From<Arc<ParameterExpr>> for Expr {
    fn from(parameter: Arc<ParameterExpr>) -> Self {
        Expr::Parameter(parameter)
    }
}

impl From<LambdaExpr> for Expr {
    fn from(lambda: LambdaExpr) -> Self {
        Expr::Lambda(lambda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MemberInfo;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_node_type_names_round_trip() {
        for name in ["Add", "NewArrayBounds", "MemberInit", "UnaryPlus", "TypeIs"] {
            assert_eq!(NodeType::from_name(name).unwrap().name(), name);
        }
        assert_eq!(NodeType::from_name("Loop"), None);
    }

    #[test]
    fn test_node_type_categories() {
        assert!(NodeType::Add.is_binary());
        assert!(NodeType::Equal.is_binary());
        assert!(!NodeType::Equal.is_unary());
        assert!(NodeType::Convert.is_unary());
        assert!(NodeType::NewArrayInit.is_new_array());
        assert!(!NodeType::Call.is_binary());
    }

    #[test]
    fn test_binary_result_types() {
        let sum = Expr::binary(NodeType::Add, Expr::int(1), Expr::int(2));
        assert_eq!(sum.ty(), &TypeDescriptor::int32());

        let cmp = Expr::binary(NodeType::LessThan, Expr::int(1), Expr::int(2));
        assert_eq!(cmp.ty(), &TypeDescriptor::boolean());

        let array = Expr::new_array_init(&TypeDescriptor::string(), vec![Expr::string("a")]);
        let index = Expr::binary(NodeType::ArrayIndex, array, Expr::int(0));
        assert_eq!(index.ty(), &TypeDescriptor::string());
    }

    #[test]
    fn test_call_takes_return_type() {
        let length = Arc::new(MemberInfo::method(
            TypeDescriptor::string(),
            "Contains",
            vec![TypeDescriptor::string()],
            TypeDescriptor::boolean(),
        ));
        let call = Expr::call(Expr::string("abc"), length, vec![Expr::string("b")]);
        assert_eq!(call.node_type(), NodeType::Call);
        assert_eq!(call.ty(), &TypeDescriptor::boolean());
    }

    #[test]
    fn test_opaque_identity() {
        let a = Opaque::new(vec![1, 2, 3]);
        let b = Opaque::new(vec![1, 2, 3]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
    }

    #[test]
    fn test_nan_constants_same() {
        let nan = ConstantValue::F64(f64::NAN);
        assert!(nan.same_as(&nan.clone()));
        assert!(!ConstantValue::I32(1).same_as(&ConstantValue::I64(1)));
    }
}
