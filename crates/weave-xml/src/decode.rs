//! Element tree to expression tree.
//!
//! Decoding mirrors the encoder: the `NodeType` of an `Expression` element
//! selects the routine, and each routine reads the slots the encoder wrote
//! for that kind. Every slot is mandatory except the optional node slots
//! (`Object`, `Expression` of a member access, `Conversion`, `Method`,
//! `Constructor`, `Members`) and a lambda's `Name` and `TailCall`.

use crate::value::{parse_bool, parse_constant};
use crate::{tags, CodecError, CodecOptions, ConstantRegistry, Element};
use rhizome_weave_ir::{
    compare, BinaryExpr, BindingType, CallExpr, ConditionalExpr, ConstantValue, ElementInit, Expr,
    InvokeExpr, LambdaExpr, ListInitExpr, Member, MemberBinding, MemberDescriptor, MemberExpr,
    MemberInitExpr, MemberKind, MetadataCache, MetadataResolver, NewArrayExpr, NewExpr, NodeType,
    Opaque, ParameterExpr, Type, TypeDescriptor, TypeIsExpr, TypeShape, UnaryExpr,
    CONSTRUCTOR_NAME,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of [`Decoder::decode_any`].
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Expr(Expr),
    Type(Type),
    Member(Member),
    ElementInit(ElementInit),
    Binding(MemberBinding),
    Opaque(Opaque),
}

/// Reads element trees back into expression trees.
///
/// Types and members are resolved through `R`; resolved types are cached
/// for the lifetime of the decoder. Parameters are shared by identity
/// (name plus type) within one top-level decode call, and never across
/// calls.
pub struct Decoder<'r, R> {
    metadata: MetadataCache<R>,
    registry: Option<&'r ConstantRegistry>,
    options: CodecOptions,
    parameters: HashMap<(String, TypeDescriptor), Arc<ParameterExpr>>,
    depth: usize,
}

type Result<T> = std::result::Result<T, CodecError>;

impl<'r, R: MetadataResolver> Decoder<'r, R> {
    pub fn new(resolver: R) -> Self {
        Self {
            metadata: MetadataCache::new(resolver),
            registry: None,
            options: CodecOptions::default(),
            parameters: HashMap::new(),
            depth: 0,
        }
    }

    /// Resolve opaque constant references against `registry`.
    pub fn with_registry(mut self, registry: &'r ConstantRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn decode(&mut self, element: &Element) -> Result<Expr> {
        self.begin();
        debug!(root = %element.name, "decoding expression");
        self.expression(element)
    }

    /// `None` in, `None` out.
    pub fn decode_optional(&mut self, element: Option<&Element>) -> Result<Option<Expr>> {
        element.map(|e| self.decode(e)).transpose()
    }

    pub fn decode_str(&mut self, xml: &str) -> Result<Expr> {
        self.decode(&self.parse(xml)?)
    }

    /// Decode two documents and compare the trees structurally.
    pub fn compare_str(&mut self, a: &str, b: &str) -> Result<bool> {
        let a = self.decode_str(a)?;
        let b = self.decode_str(b)?;
        Ok(compare(Some(&a), Some(&b)))
    }

    /// Decode a document whose root must be a lambda.
    pub fn decode_lambda(&mut self, element: &Element) -> Result<LambdaExpr> {
        match self.decode(element)? {
            Expr::Lambda(lambda) => Ok(lambda),
            other => Err(malformed(format!(
                "expected a Lambda root, found {}",
                other.node_type()
            ))),
        }
    }

    pub fn decode_lambda_str(&mut self, xml: &str) -> Result<LambdaExpr> {
        self.decode_lambda(&self.parse(xml)?)
    }

    pub fn decode_member(&mut self, element: &Element) -> Result<Member> {
        self.begin();
        self.member(element)
    }

    pub fn decode_member_str(&mut self, xml: &str) -> Result<Member> {
        self.decode_member(&self.parse(xml)?)
    }

    pub fn decode_type(&mut self, element: &Element) -> Result<Type> {
        self.begin();
        self.resolve_type(element)
    }

    pub fn decode_type_str(&mut self, xml: &str) -> Result<Type> {
        self.decode_type(&self.parse(xml)?)
    }

    pub fn decode_element_init(&mut self, element: &Element) -> Result<ElementInit> {
        self.begin();
        self.element_init(element)
    }

    pub fn decode_element_init_str(&mut self, xml: &str) -> Result<ElementInit> {
        self.decode_element_init(&self.parse(xml)?)
    }

    pub fn decode_binding(&mut self, element: &Element) -> Result<MemberBinding> {
        self.begin();
        self.binding(element)
    }

    pub fn decode_binding_str(&mut self, xml: &str) -> Result<MemberBinding> {
        self.decode_binding(&self.parse(xml)?)
    }

    /// Decode any item the encoder can produce, dispatching on the tag.
    pub fn decode_any(&mut self, element: &Element) -> Result<Decoded> {
        self.begin();
        match element.name.as_str() {
            tags::EXPRESSION => self.expression(element).map(Decoded::Expr),
            tags::TYPE if is_nested_type(element) => self.member(element).map(Decoded::Member),
            tags::TYPE => self.resolve_type(element).map(Decoded::Type),
            tags::FIELD_INFO | tags::PROPERTY_INFO | tags::METHOD_INFO | tags::CONSTRUCTOR_INFO => {
                self.member(element).map(Decoded::Member)
            }
            tags::ELEMENT_INIT => self.element_init(element).map(Decoded::ElementInit),
            tags::MEMBER_ASSIGNMENT | tags::MEMBER_MEMBER_BINDING | tags::MEMBER_LIST_BINDING => {
                self.binding(element).map(Decoded::Binding)
            }
            tags::NO_CONVERTIBLE => self.opaque(element).map(Decoded::Opaque),
            other => Err(CodecError::UnsupportedNodeKind(other.to_string())),
        }
    }

    fn parse(&self, xml: &str) -> Result<Element> {
        Element::parse_with_limit(xml, self.options.element_depth())
    }

    fn begin(&mut self) {
        self.parameters.clear();
        self.depth = 0;
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn expression(&mut self, element: &Element) -> Result<Expr> {
        expect_tag(element, tags::EXPRESSION)?;
        self.enter()?;
        let expr = self.expression_body(element);
        self.depth -= 1;
        expr
    }

    fn expression_body(&mut self, element: &Element) -> Result<Expr> {
        let node_type = node_type(element)?;
        let ty = self.resolve_type(slot(element, tags::TYPE)?)?;

        // Arms stay tail calls to keep the frame per nesting level small.
        match node_type {
            NodeType::Constant => self.constant(element, &ty),
            NodeType::Parameter => self.parameter(element, &ty).map(Expr::Parameter),
            NodeType::MemberAccess => self.member_access(element, &ty),
            NodeType::Call => self.call(element, &ty),
            NodeType::New => self.new_body(element, &ty).map(Expr::New),
            NodeType::NewArrayInit | NodeType::NewArrayBounds => {
                self.new_array(element, node_type, &ty)
            }
            NodeType::MemberInit => self.member_init(element, &ty),
            NodeType::ListInit => self.list_init(element, &ty),
            NodeType::Lambda => self.lambda(element, &ty).map(Expr::Lambda),
            NodeType::Negate
            | NodeType::NegateChecked
            | NodeType::Not
            | NodeType::Convert
            | NodeType::ConvertChecked
            | NodeType::ArrayLength
            | NodeType::Quote
            | NodeType::TypeAs
            | NodeType::UnaryPlus => self.unary(element, node_type, &ty),
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
            | NodeType::LessThan
            | NodeType::LessThanOrEqual
            | NodeType::GreaterThan
            | NodeType::GreaterThanOrEqual
            | NodeType::Equal
            | NodeType::NotEqual
            | NodeType::Coalesce
            | NodeType::ArrayIndex
            | NodeType::RightShift
            | NodeType::LeftShift
            | NodeType::ExclusiveOr => self.binary(element, node_type, &ty),
            NodeType::Conditional => self.conditional(element, &ty),
            NodeType::TypeIs => self.type_is(element, &ty),
            NodeType::Invoke => self.invoke(element, &ty),
        }
    }

    fn child_expression(&mut self, element: &Element, name: &str) -> Result<Box<Expr>> {
        Ok(Box::new(self.expression(slot(element, name)?)?))
    }

    fn optional_expression(&mut self, element: &Element, name: &str) -> Result<Option<Box<Expr>>> {
        optional_slot(element, name)
            .map(|e| self.expression(e).map(Box::new))
            .transpose()
    }

    fn expressions(&mut self, element: &Element, name: &str) -> Result<Vec<Expr>> {
        container(element, name)?
            .iter()
            .map(|e| self.expression(e))
            .collect()
    }

    fn constant(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let value = match element.child(tags::VALUE) {
            None => ConstantValue::Null,
            Some(value) => match value.first_child() {
                Some(reference) => ConstantValue::Opaque(self.opaque(reference)?),
                None => parse_constant(value.text(), ty)?,
            },
        };
        Ok(Expr::constant(value, ty.describe()))
    }

    fn opaque(&self, element: &Element) -> Result<Opaque> {
        expect_tag(element, tags::NO_CONVERTIBLE)?;
        let text = required_text(element, tags::HASH_CODE)?;
        let key: u64 = text
            .parse()
            .map_err(|_| malformed(format!("invalid constant reference {text:?}")))?;

        self.registry
            .and_then(|registry| registry.get(key))
            .cloned()
            .ok_or(CodecError::UnregisteredConstantReference(key))
    }

    fn parameter(&mut self, element: &Element, ty: &Type) -> Result<Arc<ParameterExpr>> {
        let name = required_text(element, tags::NAME)?;
        let key = (name.to_string(), ty.describe());

        if let Some(parameter) = self.parameters.get(&key) {
            trace!(name, ty = %key.1, "parameter cache hit");
            return Ok(Arc::clone(parameter));
        }

        let parameter = ParameterExpr::new(name, ty.describe());
        self.parameters.insert(key, Arc::clone(&parameter));
        Ok(parameter)
    }

    /// A lambda's declared parameter, which is a `Parameter` expression.
    fn declared_parameter(&mut self, element: &Element) -> Result<Arc<ParameterExpr>> {
        expect_tag(element, tags::EXPRESSION)?;
        let node_type = node_type(element)?;
        if node_type != NodeType::Parameter {
            return Err(malformed(format!(
                "lambda parameter is a {node_type} expression"
            )));
        }
        let ty = self.resolve_type(slot(element, tags::TYPE)?)?;
        self.parameter(element, &ty)
    }

    fn member_access(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let member = self.member(slot(element, tags::MEMBER)?)?;
        expect_kind(&member, &[MemberKind::Field, MemberKind::Property])?;
        let expression = self.optional_expression(element, tags::EXPRESSION)?;

        Ok(Expr::MemberAccess(MemberExpr {
            ty: ty.describe(),
            expression,
            member,
        }))
    }

    fn call(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let method = self.method(slot(element, tags::METHOD)?)?;
        let object = self.optional_expression(element, tags::OBJECT)?;
        let arguments = self.expressions(element, tags::ARGUMENTS)?;
        expect_arity(&method, &arguments)?;

        Ok(Expr::Call(CallExpr {
            ty: ty.describe(),
            object,
            method,
            arguments,
        }))
    }

    fn new_body(&mut self, element: &Element, ty: &Type) -> Result<NewExpr> {
        let constructor = optional_slot(element, tags::CONSTRUCTOR)
            .map(|e| self.member(e))
            .transpose()?;
        let members = element
            .child(tags::MEMBERS)
            .map(|c| c.children.iter().map(|m| self.member(m)).collect::<Result<Vec<_>>>())
            .transpose()?;
        let arguments = self.expressions(element, tags::ARGUMENTS)?;

        match &constructor {
            Some(constructor) => {
                expect_kind(constructor, &[MemberKind::Constructor])?;
                expect_arity(constructor, &arguments)?;
            }
            None if !arguments.is_empty() => {
                return Err(malformed("arguments given without a constructor".into()));
            }
            None => {}
        }

        Ok(NewExpr {
            ty: ty.describe(),
            constructor,
            arguments,
            members,
        })
    }

    /// The `NewExpression` slot of a `MemberInit` / `ListInit`.
    fn nested_new(&mut self, element: &Element) -> Result<NewExpr> {
        let new = slot(element, tags::NEW_EXPRESSION)?;
        expect_tag(new, tags::EXPRESSION)?;
        let node_type = node_type(new)?;
        if node_type != NodeType::New {
            return Err(malformed(format!(
                "{} holds a {node_type} expression",
                tags::NEW_EXPRESSION
            )));
        }

        let type_element = slot(new, tags::TYPE)?;
        self.enter()?;
        let body = self
            .resolve_type(type_element)
            .and_then(|ty| self.new_body(new, &ty));
        self.depth -= 1;
        body
    }

    fn new_array(&mut self, element: &Element, node_type: NodeType, ty: &Type) -> Result<Expr> {
        if !matches!(ty.shape, TypeShape::Array { .. }) {
            return Err(malformed(format!("{} is not an array type", ty.descriptor)));
        }
        let expressions = self.expressions(element, tags::EXPRESSIONS)?;

        Ok(Expr::NewArray(NewArrayExpr {
            node_type,
            ty: ty.describe(),
            expressions,
        }))
    }

    fn member_init(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let new_expression = self.nested_new(element)?;
        let bindings = container(element, tags::BINDINGS)?
            .iter()
            .map(|b| self.binding(b))
            .collect::<Result<_>>()?;

        Ok(Expr::MemberInit(MemberInitExpr {
            ty: ty.describe(),
            new_expression,
            bindings,
        }))
    }

    fn list_init(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let new_expression = self.nested_new(element)?;
        let initializers = self.element_inits(element)?;

        Ok(Expr::ListInit(ListInitExpr {
            ty: ty.describe(),
            new_expression,
            initializers,
        }))
    }

    fn lambda(&mut self, element: &Element, ty: &Type) -> Result<LambdaExpr> {
        let parameters = container(element, tags::PARAMETERS)?
            .iter()
            .map(|p| self.declared_parameter(p))
            .collect::<Result<_>>()?;
        let body = self.child_expression(element, tags::BODY)?;
        let name = element.child(tags::NAME).map(|n| n.text().to_string());
        let tail_call = match element.child(tags::TAIL_CALL) {
            Some(flag) => parse_flag(flag)?,
            None => false,
        };

        Ok(LambdaExpr {
            ty: ty.describe(),
            body,
            parameters,
            name,
            tail_call,
        })
    }

    fn unary(&mut self, element: &Element, node_type: NodeType, ty: &Type) -> Result<Expr> {
        let method = self.optional_method(element)?;
        let is_lifted = required_flag(element, tags::IS_LIFTED)?;
        let is_lifted_to_null = required_flag(element, tags::IS_LIFTED_TO_NULL)?;
        let operand = self.child_expression(element, tags::OPERAND)?;

        Ok(Expr::Unary(UnaryExpr {
            node_type,
            ty: ty.describe(),
            operand,
            method,
            is_lifted,
            is_lifted_to_null,
        }))
    }

    fn binary(&mut self, element: &Element, node_type: NodeType, ty: &Type) -> Result<Expr> {
        let method = self.optional_method(element)?;
        let is_lifted = required_flag(element, tags::IS_LIFTED)?;
        let is_lifted_to_null = required_flag(element, tags::IS_LIFTED_TO_NULL)?;
        let left = self.child_expression(element, tags::LEFT)?;
        let right = self.child_expression(element, tags::RIGHT)?;
        let conversion = self.optional_expression(element, tags::CONVERSION)?;

        if let Some(conversion) = &conversion {
            if !matches!(**conversion, Expr::Lambda(_)) {
                return Err(malformed(format!(
                    "conversion is a {} expression",
                    conversion.node_type()
                )));
            }
        }

        Ok(Expr::Binary(BinaryExpr {
            node_type,
            ty: ty.describe(),
            left,
            right,
            conversion,
            method,
            is_lifted,
            is_lifted_to_null,
        }))
    }

    fn conditional(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let test = self.child_expression(element, tags::TEST)?;
        let if_true = self.child_expression(element, tags::IF_TRUE)?;
        let if_false = self.child_expression(element, tags::IF_FALSE)?;

        Ok(Expr::Conditional(ConditionalExpr {
            ty: ty.describe(),
            test,
            if_true,
            if_false,
        }))
    }

    fn type_is(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let type_operand = self.resolve_type(slot(element, tags::TYPE_OPERAND)?)?;
        let expression = self.child_expression(element, tags::EXPRESSION)?;

        Ok(Expr::TypeIs(TypeIsExpr {
            ty: ty.describe(),
            expression,
            type_operand: type_operand.describe(),
        }))
    }

    fn invoke(&mut self, element: &Element, ty: &Type) -> Result<Expr> {
        let arguments = self.expressions(element, tags::ARGUMENTS)?;
        let expression = self.child_expression(element, tags::EXPRESSION)?;

        Ok(Expr::Invoke(InvokeExpr {
            ty: ty.describe(),
            expression,
            arguments,
        }))
    }

    fn element_inits(&mut self, element: &Element) -> Result<Vec<ElementInit>> {
        container(element, tags::INITIALIZERS)?
            .iter()
            .map(|i| self.element_init(i))
            .collect()
    }

    fn element_init(&mut self, element: &Element) -> Result<ElementInit> {
        expect_tag(element, tags::ELEMENT_INIT)?;
        let add_method = self.method(slot(element, tags::ADD_METHOD)?)?;
        let arguments = self.expressions(element, tags::ARGUMENTS)?;
        expect_arity(&add_method, &arguments)?;
        Ok(ElementInit::new(add_method, arguments))
    }

    fn binding(&mut self, element: &Element) -> Result<MemberBinding> {
        let binding_type = match element.name.as_str() {
            tags::MEMBER_ASSIGNMENT => BindingType::Assignment,
            tags::MEMBER_MEMBER_BINDING => BindingType::MemberBinding,
            tags::MEMBER_LIST_BINDING => BindingType::ListBinding,
            other => return Err(CodecError::UnsupportedNodeKind(other.to_string())),
        };
        if let Some(marker) = element.child(tags::BINDING_TYPE) {
            if BindingType::from_name(marker.text()) != Some(binding_type) {
                return Err(malformed(format!(
                    "{} marked as {:?}",
                    element.name,
                    marker.text()
                )));
            }
        }

        self.enter()?;
        let binding = self.binding_body(element, binding_type);
        self.depth -= 1;
        binding
    }

    fn binding_body(
        &mut self,
        element: &Element,
        binding_type: BindingType,
    ) -> Result<MemberBinding> {
        let member = self.member(slot(element, tags::MEMBER)?)?;

        let binding = match binding_type {
            BindingType::Assignment => {
                let expression = self.expression(slot(element, tags::EXPRESSION)?)?;
                MemberBinding::assign(member, expression)
            }
            BindingType::MemberBinding => {
                let bindings = container(element, tags::BINDINGS)?
                    .iter()
                    .map(|b| self.binding(b))
                    .collect::<Result<_>>()?;
                MemberBinding::nested(member, bindings)
            }
            BindingType::ListBinding => {
                let initializers = self.element_inits(element)?;
                MemberBinding::list(member, initializers)
            }
        };
        Ok(binding)
    }

    fn method(&mut self, element: &Element) -> Result<Member> {
        let method = self.member(element)?;
        expect_kind(&method, &[MemberKind::Method])?;
        Ok(method)
    }

    fn optional_method(&mut self, element: &Element) -> Result<Option<Member>> {
        optional_slot(element, tags::METHOD)
            .map(|m| self.method(m))
            .transpose()
    }

    /// Resolve a member element to the exact member it describes.
    fn member(&mut self, element: &Element) -> Result<Member> {
        let kind = match element.name.as_str() {
            tags::FIELD_INFO => MemberKind::Field,
            tags::PROPERTY_INFO => MemberKind::Property,
            tags::METHOD_INFO => MemberKind::Method,
            tags::CONSTRUCTOR_INFO => MemberKind::Constructor,
            tags::TYPE => MemberKind::NestedType,
            other => return Err(CodecError::UnsupportedNodeKind(other.to_string())),
        };
        if let Some(marker) = element.child(tags::MEMBER_TYPE) {
            if MemberKind::from_name(marker.text()) != Some(kind) {
                return Err(malformed(format!(
                    "{} marked as {:?}",
                    element.name,
                    marker.text()
                )));
            }
        }

        let declaring_type = type_descriptor(slot(element, tags::DECLARING_TYPE)?)?;
        let name = match kind {
            MemberKind::Constructor => CONSTRUCTOR_NAME,
            _ => required_text(element, tags::NAME)?,
        };

        let mut wanted = MemberDescriptor::new(declaring_type, kind, name);
        match kind {
            MemberKind::Property => {
                wanted.parameters = type_list(element, tags::INDEX_PARAMETERS)?;
            }
            MemberKind::Constructor => {
                wanted.parameters = type_list(element, tags::PARAMETERS)?;
            }
            MemberKind::Method => {
                wanted.parameters = type_list(element, tags::PARAMETERS)?;
                wanted.generic_arguments = type_list(element, tags::GENERIC_ARGUMENTS)?;
            }
            MemberKind::Field | MemberKind::NestedType => {}
        }

        Ok(self.metadata.resolve_member(&wanted)?)
    }

    fn resolve_type(&mut self, element: &Element) -> Result<Type> {
        let descriptor = type_descriptor(element)?;
        Ok(self.metadata.resolve_type(&descriptor)?)
    }
}

fn malformed(message: String) -> CodecError {
    CodecError::MalformedDocument(message)
}

fn expect_tag(element: &Element, tag: &str) -> Result<()> {
    if element.name == tag {
        Ok(())
    } else {
        Err(malformed(format!(
            "expected <{tag}>, found <{}>",
            element.name
        )))
    }
}

fn node_type(element: &Element) -> Result<NodeType> {
    let text = required_text(element, tags::NODE_TYPE)?;
    NodeType::from_name(text).ok_or_else(|| CodecError::UnsupportedNodeKind(text.to_string()))
}

/// Text of a mandatory property.
fn required_text<'a>(element: &'a Element, name: &str) -> Result<&'a str> {
    element
        .child(name)
        .map(Element::text)
        .ok_or_else(|| missing(element, name))
}

fn parse_flag(flag: &Element) -> Result<bool> {
    parse_bool(flag.text())
        .ok_or_else(|| malformed(format!("{} is not a boolean: {:?}", flag.name, flag.text())))
}

fn required_flag(element: &Element, name: &str) -> Result<bool> {
    parse_flag(element.child(name).ok_or_else(|| missing(element, name))?)
}

/// The single item held by a mandatory slot.
fn slot<'a>(element: &'a Element, name: &str) -> Result<&'a Element> {
    optional_slot(element, name).ok_or_else(|| missing(element, name))
}

/// The item held by an optional slot; an empty slot counts as absent.
fn optional_slot<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    element.child(name).and_then(Element::first_child)
}

/// Items of a mandatory collection; an empty container is an empty list.
fn container<'a>(element: &'a Element, name: &str) -> Result<&'a [Element]> {
    element
        .child(name)
        .map(|c| c.children.as_slice())
        .ok_or_else(|| missing(element, name))
}

fn missing(element: &Element, name: &str) -> CodecError {
    let node = element
        .child(tags::NODE_TYPE)
        .map(|n| format!("{} {}", n.text(), element.name))
        .unwrap_or_else(|| element.name.clone());
    malformed(format!("{node} is missing {name}"))
}

fn is_nested_type(element: &Element) -> bool {
    element
        .child(tags::MEMBER_TYPE)
        .is_some_and(|m| m.text() == MemberKind::NestedType.name())
}

/// Descriptor named by a `Type` element, without resolving it.
fn type_descriptor(element: &Element) -> Result<TypeDescriptor> {
    expect_tag(element, tags::TYPE)?;
    if let Some(marker) = element.child(tags::MEMBER_TYPE) {
        if marker.text() != tags::TYPE_INFO {
            return Err(malformed(format!(
                "type reference marked as {:?}",
                marker.text()
            )));
        }
    }
    Ok(TypeDescriptor::new(required_text(element, tags::NAME)?))
}

fn type_list(element: &Element, name: &str) -> Result<Vec<TypeDescriptor>> {
    container(element, name)?
        .iter()
        .map(type_descriptor)
        .collect()
}

fn expect_kind(member: &Member, kinds: &[MemberKind]) -> Result<()> {
    if kinds.contains(&member.kind()) {
        Ok(())
    } else {
        Err(malformed(format!(
            "{} is a {}, expected one of {:?}",
            member.descriptor,
            member.kind().name(),
            kinds
        )))
    }
}

fn expect_arity(member: &Member, arguments: &[Expr]) -> Result<()> {
    let expected = member.parameters().len();
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(malformed(format!(
            "{} takes {expected} arguments, got {}",
            member.descriptor,
            arguments.len()
        )))
    }
}
