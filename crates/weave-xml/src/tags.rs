//! Element names used on the wire.
//!
//! Encoder and decoder share these constants; a document written by one is
//! read by the other only if the two agree exactly.

// Item elements
pub const EXPRESSION: &str = "Expression";
pub const TYPE: &str = "Type";
pub const PROPERTY_INFO: &str = "PropertyInfo";
pub const FIELD_INFO: &str = "FieldInfo";
pub const METHOD_INFO: &str = "MethodInfo";
pub const CONSTRUCTOR_INFO: &str = "ConstructorInfo";
pub const ELEMENT_INIT: &str = "ElementInit";
pub const MEMBER_ASSIGNMENT: &str = "MemberAssignment";
pub const MEMBER_LIST_BINDING: &str = "MemberListBinding";
pub const MEMBER_MEMBER_BINDING: &str = "MemberMemberBinding";
pub const NO_CONVERTIBLE: &str = "NoConvertible";

// Descriptor properties
pub const NAME: &str = "Name";
pub const MEMBER_TYPE: &str = "MemberType";
pub const DECLARING_TYPE: &str = "DeclaringType";
pub const PARAMETERS: &str = "Parameters";
pub const GENERIC_ARGUMENTS: &str = "GenericArguments";
pub const INDEX_PARAMETERS: &str = "IndexParameters";

/// `MemberType` marker of a plain type reference.
pub const TYPE_INFO: &str = "TypeInfo";

// Node properties and child slots
pub const NODE_TYPE: &str = "NodeType";
pub const VALUE: &str = "Value";
pub const HASH_CODE: &str = "HashCode";
pub const LEFT: &str = "Left";
pub const RIGHT: &str = "Right";
pub const CONVERSION: &str = "Conversion";
pub const OPERAND: &str = "Operand";
pub const METHOD: &str = "Method";
pub const IS_LIFTED: &str = "IsLifted";
pub const IS_LIFTED_TO_NULL: &str = "IsLiftedToNull";
pub const TEST: &str = "Test";
pub const IF_TRUE: &str = "IfTrue";
pub const IF_FALSE: &str = "IfFalse";
pub const BODY: &str = "Body";
pub const TAIL_CALL: &str = "TailCall";
pub const OBJECT: &str = "Object";
pub const ARGUMENTS: &str = "Arguments";
pub const MEMBER: &str = "Member";
pub const CONSTRUCTOR: &str = "Constructor";
pub const MEMBERS: &str = "Members";
pub const EXPRESSIONS: &str = "Expressions";
pub const NEW_EXPRESSION: &str = "NewExpression";
pub const INITIALIZERS: &str = "Initializers";
pub const BINDINGS: &str = "Bindings";
pub const BINDING_TYPE: &str = "BindingType";
pub const ADD_METHOD: &str = "AddMethod";
pub const TYPE_OPERAND: &str = "TypeOperand";

pub const TRUE: &str = "true";
pub const FALSE: &str = "false";
