//! Textual descriptors for types and members.
//!
//! A descriptor is the serializable stand-in for a piece of host metadata.
//! Descriptors are resolved back into [`TypeInfo`] / [`MemberInfo`] handles
//! through a [`crate::MetadataResolver`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Fully qualified name of a type.
///
/// Generic method definitions refer to their own type parameters with
/// placeholders of the form `!!0`, `!!1`, ... (see [`TypeDescriptor::generic_parameter`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeDescriptor(String);

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder for the `index`-th type parameter of a generic method definition.
    pub fn generic_parameter(index: usize) -> Self {
        Self(format!("!!{index}"))
    }

    /// Descriptor of a single-dimensional array of `element`.
    pub fn array_of(element: &TypeDescriptor) -> Self {
        Self(format!("{}[]", element.0))
    }

    /// Element type of an array descriptor (`T[]` -> `T`).
    pub fn element_type(&self) -> Option<TypeDescriptor> {
        self.0.strip_suffix("[]").map(TypeDescriptor::new)
    }

    pub fn string() -> Self {
        Self::new("System.String")
    }

    pub fn object() -> Self {
        Self::new("System.Object")
    }

    pub fn void() -> Self {
        Self::new("System.Void")
    }

    pub fn boolean() -> Self {
        Primitive::Boolean.descriptor()
    }

    pub fn int32() -> Self {
        Primitive::Int32.descriptor()
    }

    /// True if the descriptor still mentions a generic parameter placeholder.
    pub fn is_open(&self) -> bool {
        self.0.contains("!!")
    }

    /// Replace every `!!N` placeholder with `arguments[N]`.
    ///
    /// Returns `None` when a placeholder index has no matching argument.
    pub fn substitute(&self, arguments: &[TypeDescriptor]) -> Option<TypeDescriptor> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(at) = rest.find("!!") {
            out.push_str(&rest[..at]);
            let tail = &rest[at + 2..];
            let digits = tail.bytes().take_while(|b| b.is_ascii_digit()).count();
            if digits == 0 {
                out.push_str("!!");
                rest = tail;
                continue;
            }
            let index: usize = tail[..digits].parse().ok()?;
            out.push_str(arguments.get(index)?.as_str());
            rest = &tail[digits..];
        }

        out.push_str(rest);
        Some(TypeDescriptor(out))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Primitive types that have a culture-invariant textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::Boolean,
        Primitive::Char,
        Primitive::SByte,
        Primitive::Byte,
        Primitive::Int16,
        Primitive::UInt16,
        Primitive::Int32,
        Primitive::UInt32,
        Primitive::Int64,
        Primitive::UInt64,
        Primitive::Single,
        Primitive::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Boolean => "System.Boolean",
            Primitive::Char => "System.Char",
            Primitive::SByte => "System.SByte",
            Primitive::Byte => "System.Byte",
            Primitive::Int16 => "System.Int16",
            Primitive::UInt16 => "System.UInt16",
            Primitive::Int32 => "System.Int32",
            Primitive::UInt32 => "System.UInt32",
            Primitive::Int64 => "System.Int64",
            Primitive::UInt64 => "System.UInt64",
            Primitive::Single => "System.Single",
            Primitive::Double => "System.Double",
        }
    }

    pub fn descriptor(self) -> TypeDescriptor {
        TypeDescriptor::new(self.name())
    }
}

/// A named enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: i64,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// What the codec needs to know about a resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Primitive(Primitive),
    String,
    Enum(Vec<EnumVariant>),
    Array { element: TypeDescriptor },
    /// Any other class, struct or delegate type.
    Object,
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub descriptor: TypeDescriptor,
    pub shape: TypeShape,
}

/// Shared handle to a resolved type.
pub type Type = Arc<TypeInfo>;

impl TypeInfo {
    pub fn new(descriptor: impl Into<TypeDescriptor>, shape: TypeShape) -> Self {
        Self {
            descriptor: descriptor.into(),
            shape,
        }
    }

    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(primitive.descriptor(), TypeShape::Primitive(primitive))
    }

    pub fn object(descriptor: impl Into<TypeDescriptor>) -> Self {
        Self::new(descriptor, TypeShape::Object)
    }

    pub fn enumeration(descriptor: impl Into<TypeDescriptor>, variants: Vec<EnumVariant>) -> Self {
        Self::new(descriptor, TypeShape::Enum(variants))
    }

    pub fn array(element: &TypeDescriptor) -> Self {
        Self::new(
            TypeDescriptor::array_of(element),
            TypeShape::Array {
                element: element.clone(),
            },
        )
    }

    /// Canonical textual name of this type.
    pub fn describe(&self) -> TypeDescriptor {
        self.descriptor.clone()
    }
}

/// Kind of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
    NestedType,
}

impl MemberKind {
    pub fn name(self) -> &'static str {
        match self {
            MemberKind::Field => "Field",
            MemberKind::Property => "Property",
            MemberKind::Method => "Method",
            MemberKind::Constructor => "Constructor",
            MemberKind::NestedType => "NestedType",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Field" => Some(MemberKind::Field),
            "Property" => Some(MemberKind::Property),
            "Method" => Some(MemberKind::Method),
            "Constructor" => Some(MemberKind::Constructor),
            "NestedType" => Some(MemberKind::NestedType),
            _ => None,
        }
    }
}

/// Name used for every constructor.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Identity of a field, property, method, constructor or nested type.
///
/// Methods and constructors are identified by the full tuple: overloads
/// differing only in parameter types are distinct members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub declaring_type: TypeDescriptor,
    pub kind: MemberKind,
    pub name: String,
    /// Method/constructor parameters or indexer parameters.
    pub parameters: Vec<TypeDescriptor>,
    /// Generic method instantiation.
    pub generic_arguments: Vec<TypeDescriptor>,
}

impl MemberDescriptor {
    pub fn new(declaring_type: TypeDescriptor, kind: MemberKind, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            kind,
            name: name.into(),
            parameters: Vec::new(),
            generic_arguments: Vec::new(),
        }
    }
}

impl fmt::Display for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)?;
        if !self.generic_arguments.is_empty() {
            write!(f, "<{}>", join(&self.generic_arguments))?;
        }
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                write!(f, "({})", join(&self.parameters))
            }
            MemberKind::Property if !self.parameters.is_empty() => {
                write!(f, "[{}]", join(&self.parameters))
            }
            _ => Ok(()),
        }
    }
}

fn join(types: &[TypeDescriptor]) -> String {
    types
        .iter()
        .map(TypeDescriptor::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A resolved member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub descriptor: MemberDescriptor,
    /// Field/property type, method return type, the declaring type for
    /// constructors and the nested type itself for nested types.
    pub value_type: TypeDescriptor,
    /// Type parameter count of a generic method; zero otherwise.
    pub generic_arity: usize,
    pub is_static: bool,
}

/// Shared handle to a resolved member.
pub type Member = Arc<MemberInfo>;

impl MemberInfo {
    fn build(
        declaring_type: TypeDescriptor,
        kind: MemberKind,
        name: impl Into<String>,
        parameters: Vec<TypeDescriptor>,
        value_type: TypeDescriptor,
    ) -> Self {
        let mut descriptor = MemberDescriptor::new(declaring_type, kind, name);
        descriptor.parameters = parameters;
        Self {
            descriptor,
            value_type,
            generic_arity: 0,
            is_static: false,
        }
    }

    pub fn field(
        declaring: impl Into<TypeDescriptor>,
        name: &str,
        ty: impl Into<TypeDescriptor>,
    ) -> Self {
        Self::build(declaring.into(), MemberKind::Field, name, Vec::new(), ty.into())
    }

    pub fn property(
        declaring: impl Into<TypeDescriptor>,
        name: &str,
        ty: impl Into<TypeDescriptor>,
    ) -> Self {
        Self::build(declaring.into(), MemberKind::Property, name, Vec::new(), ty.into())
    }

    /// Indexed property such as `Item[int]`.
    pub fn indexer(
        declaring: impl Into<TypeDescriptor>,
        name: &str,
        index_parameters: Vec<TypeDescriptor>,
        ty: impl Into<TypeDescriptor>,
    ) -> Self {
        Self::build(declaring.into(), MemberKind::Property, name, index_parameters, ty.into())
    }

    pub fn method(
        declaring: impl Into<TypeDescriptor>,
        name: &str,
        parameters: Vec<TypeDescriptor>,
        return_type: impl Into<TypeDescriptor>,
    ) -> Self {
        Self::build(declaring.into(), MemberKind::Method, name, parameters, return_type.into())
    }

    /// Generic method definition with `arity` type parameters.
    ///
    /// Parameter and return types refer to the type parameters through
    /// [`TypeDescriptor::generic_parameter`] placeholders.
    pub fn generic_method(
        declaring: impl Into<TypeDescriptor>,
        name: &str,
        arity: usize,
        parameters: Vec<TypeDescriptor>,
        return_type: impl Into<TypeDescriptor>,
    ) -> Self {
        let mut member = Self::method(declaring, name, parameters, return_type);
        member.generic_arity = arity;
        member
    }

    pub fn constructor(
        declaring: impl Into<TypeDescriptor>,
        parameters: Vec<TypeDescriptor>,
    ) -> Self {
        let declaring = declaring.into();
        Self::build(
            declaring.clone(),
            MemberKind::Constructor,
            CONSTRUCTOR_NAME,
            parameters,
            declaring,
        )
    }

    pub fn nested_type(declaring: impl Into<TypeDescriptor>, name: &str) -> Self {
        let declaring = declaring.into();
        let nested = TypeDescriptor::new(format!("{declaring}+{name}"));
        Self::build(declaring, MemberKind::NestedType, name, Vec::new(), nested)
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn kind(&self) -> MemberKind {
        self.descriptor.kind
    }

    pub fn declaring_type(&self) -> &TypeDescriptor {
        &self.descriptor.declaring_type
    }

    pub fn parameters(&self) -> &[TypeDescriptor] {
        &self.descriptor.parameters
    }

    pub fn generic_arguments(&self) -> &[TypeDescriptor] {
        &self.descriptor.generic_arguments
    }

    /// A generic method that has not been instantiated yet.
    pub fn is_generic_definition(&self) -> bool {
        self.generic_arity > 0 && self.descriptor.generic_arguments.is_empty()
    }

    /// Close a generic method definition over `arguments`.
    ///
    /// Returns `None` unless this is a generic definition whose arity equals
    /// `arguments.len()`.
    pub fn instantiate(&self, arguments: &[TypeDescriptor]) -> Option<MemberInfo> {
        if !self.is_generic_definition() || arguments.len() != self.generic_arity {
            return None;
        }

        let parameters = self
            .descriptor
            .parameters
            .iter()
            .map(|p| p.substitute(arguments))
            .collect::<Option<Vec<_>>>()?;

        let mut member = self.clone();
        member.descriptor.parameters = parameters;
        member.descriptor.generic_arguments = arguments.to_vec();
        member.value_type = self.value_type.substitute(arguments)?;
        Some(member)
    }
}
