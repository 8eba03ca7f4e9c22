//! Expression tree to element tree.

use crate::value::{bool_text, constant_text};
use crate::{tags, CodecError, CodecOptions, ConstantRegistry, Element};
use rhizome_weave_ir::{
    BinaryExpr, CallExpr, ConditionalExpr, ConstantExpr, ConstantValue, ElementInit, Expr,
    InvokeExpr, LambdaExpr, ListInitExpr, MemberBinding, MemberExpr, MemberInfo, MemberInitExpr,
    MemberKind, NewArrayExpr, NewExpr, NodeType, ParameterExpr, TypeDescriptor, TypeIsExpr,
    UnaryExpr, Visitor,
};
use tracing::{debug, trace};

/// Writes expression trees as element trees.
///
/// The encoder owns the [`ConstantRegistry`] that opaque constants are
/// entered into; decode such documents against [`Encoder::registry`].
#[derive(Debug, Default)]
pub struct Encoder {
    registry: ConstantRegistry,
    options: CodecOptions,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            registry: ConstantRegistry::new(),
            options,
        }
    }

    pub fn registry(&self) -> &ConstantRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> ConstantRegistry {
        self.registry
    }

    pub fn encode(&mut self, expr: &Expr) -> Result<Element, CodecError> {
        debug!(node_type = %expr.node_type(), "encoding expression");
        self.session().run(|s| s.visit_expr(expr))
    }

    /// `None` in, `None` out.
    pub fn encode_optional(&mut self, expr: Option<&Expr>) -> Result<Option<Element>, CodecError> {
        expr.map(|e| self.encode(e)).transpose()
    }

    pub fn encode_to_string(&mut self, expr: &Expr) -> Result<String, CodecError> {
        let element = self.encode(expr)?;
        element.to_xml(self.options.indent)
    }

    pub fn encode_member(&self, member: &MemberInfo) -> Element {
        member_element(member)
    }

    pub fn encode_member_to_string(&self, member: &MemberInfo) -> Result<String, CodecError> {
        self.encode_member(member).to_xml(self.options.indent)
    }

    pub fn encode_element_init(&mut self, init: &ElementInit) -> Result<Element, CodecError> {
        self.session().run(|s| s.visit_element_init(init))
    }

    pub fn encode_element_init_to_string(
        &mut self,
        init: &ElementInit,
    ) -> Result<String, CodecError> {
        let element = self.encode_element_init(init)?;
        element.to_xml(self.options.indent)
    }

    pub fn encode_binding(&mut self, binding: &MemberBinding) -> Result<Element, CodecError> {
        self.session().run(|s| s.visit_binding(binding))
    }

    pub fn encode_binding_to_string(
        &mut self,
        binding: &MemberBinding,
    ) -> Result<String, CodecError> {
        let element = self.encode_binding(binding)?;
        element.to_xml(self.options.indent)
    }

    fn session(&mut self) -> Session<'_> {
        Session {
            registry: &mut self.registry,
            max_depth: self.options.max_depth,
            depth: 0,
            open: Vec::new(),
            error: None,
        }
    }
}

/// `<Type><MemberType>TypeInfo</MemberType><Name>..</Name></Type>`
pub(crate) fn type_element(ty: &TypeDescriptor) -> Element {
    Element::new(tags::TYPE)
        .with_child(Element::with_text(tags::MEMBER_TYPE, tags::TYPE_INFO))
        .with_child(Element::with_text(tags::NAME, ty.as_str()))
}

fn types_element(name: &str, types: &[TypeDescriptor]) -> Element {
    let mut container = Element::new(name);
    for ty in types {
        container.push(type_element(ty));
    }
    container
}

fn member_element(member: &MemberInfo) -> Element {
    let descriptor = &member.descriptor;
    let tag = match descriptor.kind {
        MemberKind::Field => tags::FIELD_INFO,
        MemberKind::Property => tags::PROPERTY_INFO,
        MemberKind::Method => tags::METHOD_INFO,
        MemberKind::Constructor => tags::CONSTRUCTOR_INFO,
        MemberKind::NestedType => tags::TYPE,
    };

    let mut element = Element::new(tag)
        .with_child(Element::with_text(tags::MEMBER_TYPE, descriptor.kind.name()))
        .with_child(Element::with_text(tags::NAME, descriptor.name.as_str()))
        .with_child(wrap(
            tags::DECLARING_TYPE,
            type_element(&descriptor.declaring_type),
        ));

    match descriptor.kind {
        MemberKind::Property => {
            element.push(types_element(tags::INDEX_PARAMETERS, &descriptor.parameters));
        }
        MemberKind::Constructor => {
            element.push(types_element(tags::PARAMETERS, &descriptor.parameters));
        }
        MemberKind::Method => {
            element.push(types_element(tags::PARAMETERS, &descriptor.parameters));
            element.push(types_element(
                tags::GENERIC_ARGUMENTS,
                &descriptor.generic_arguments,
            ));
        }
        MemberKind::Field | MemberKind::NestedType => {}
    }
    element
}

fn parameter_element(parameter: &ParameterExpr) -> Element {
    expression_element(NodeType::Parameter, &parameter.ty)
        .with_child(Element::with_text(tags::NAME, parameter.name.as_str()))
}

fn expression_element(node_type: NodeType, ty: &TypeDescriptor) -> Element {
    Element::new(tags::EXPRESSION)
        .with_child(Element::with_text(tags::NODE_TYPE, node_type.name()))
        .with_child(wrap(tags::TYPE, type_element(ty)))
}

/// A slot element holding a single item.
fn wrap(name: &str, item: Element) -> Element {
    Element::new(name).with_child(item)
}

/// One encode call.
///
/// `open` is the stack of elements under construction; a finished element
/// is appended to the one below it. Visitor methods cannot fail, so the
/// first error is parked in `error` and turns the rest of the walk into
/// no-ops.
struct Session<'e> {
    registry: &'e mut ConstantRegistry,
    max_depth: usize,
    depth: usize,
    open: Vec<Element>,
    error: Option<CodecError>,
}

impl Session<'_> {
    fn run(mut self, walk: impl FnOnce(&mut Self)) -> Result<Element, CodecError> {
        self.open.push(Element::new(""));
        walk(&mut self);
        if let Some(err) = self.error {
            return Err(err);
        }
        self.open
            .pop()
            .and_then(|mut holder| holder.children.pop())
            .ok_or_else(|| CodecError::MalformedDocument("nothing was encoded".into()))
    }

    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn close(&mut self) {
        if let Some(done) = self.open.pop() {
            self.append(done);
        }
    }

    fn append(&mut self, element: Element) {
        if let Some(parent) = self.open.last_mut() {
            parent.push(element);
        }
    }

    fn enter(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.depth >= self.max_depth {
            self.error = Some(CodecError::DepthLimitExceeded {
                limit: self.max_depth,
            });
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn slot(&mut self, name: &str, expr: &Expr) {
        self.open(Element::new(name));
        self.visit_expr(expr);
        self.close();
    }

    fn optional_slot(&mut self, name: &str, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.slot(name, expr);
        }
    }

    fn container(&mut self, name: &str, exprs: &[Expr]) {
        self.open(Element::new(name));
        self.visit_exprs(exprs);
        self.close();
    }

    fn flag(&mut self, name: &str, value: bool) {
        self.append(Element::with_text(name, bool_text(value)));
    }

    fn member(&mut self, slot: &str, member: &MemberInfo) {
        self.append(wrap(slot, member_element(member)));
    }

    fn optional_member(&mut self, slot: &str, member: Option<&MemberInfo>) {
        if let Some(member) = member {
            self.member(slot, member);
        }
    }

    /// The `New` part of a `MemberInit` / `ListInit`, as a full expression.
    fn nested_new(&mut self, new: &NewExpr) {
        self.open(Element::new(tags::NEW_EXPRESSION));
        if self.enter() {
            self.open(expression_element(NodeType::New, &new.ty));
            self.visit_new(new);
            self.close();
            self.leave();
        }
        self.close();
    }
}

// Every handler writes attributes first, then child slots in traversal order.
impl<'ir> Visitor<'ir> for Session<'_> {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        if !self.enter() {
            return;
        }
        self.open(expression_element(expr.node_type(), expr.ty()));
        self.super_expr(expr);
        self.close();
        self.leave();
    }

    fn visit_constant(&mut self, constant: &'ir ConstantExpr) {
        match &constant.value {
            ConstantValue::Null => {}
            ConstantValue::Opaque(value) => {
                let key = self.registry.register(value);
                trace!(key, ty = %constant.ty, "opaque constant");
                let reference = Element::new(tags::NO_CONVERTIBLE)
                    .with_child(Element::with_text(tags::HASH_CODE, key.to_string()));
                self.append(wrap(tags::VALUE, reference));
            }
            value => {
                if let Some(text) = constant_text(value) {
                    self.append(Element::with_text(tags::VALUE, text));
                }
            }
        }
    }

    fn visit_parameter(&mut self, parameter: &'ir ParameterExpr) {
        self.append(Element::with_text(tags::NAME, parameter.name.as_str()));
    }

    fn visit_member_access(&mut self, member: &'ir MemberExpr) {
        self.member(tags::MEMBER, &member.member);
        self.optional_slot(tags::EXPRESSION, member.expression.as_deref());
    }

    fn visit_call(&mut self, call: &'ir CallExpr) {
        self.member(tags::METHOD, &call.method);
        self.optional_slot(tags::OBJECT, call.object.as_deref());
        self.container(tags::ARGUMENTS, &call.arguments);
    }

    fn visit_new(&mut self, new: &'ir NewExpr) {
        self.optional_member(tags::CONSTRUCTOR, new.constructor.as_deref());
        if let Some(members) = &new.members {
            let mut container = Element::new(tags::MEMBERS);
            for member in members {
                container.push(member_element(member));
            }
            self.append(container);
        }
        self.container(tags::ARGUMENTS, &new.arguments);
    }

    fn visit_new_array(&mut self, array: &'ir NewArrayExpr) {
        self.container(tags::EXPRESSIONS, &array.expressions);
    }

    fn visit_member_init(&mut self, init: &'ir MemberInitExpr) {
        self.nested_new(&init.new_expression);
        self.open(Element::new(tags::BINDINGS));
        for binding in &init.bindings {
            self.visit_binding(binding);
        }
        self.close();
    }

    fn visit_list_init(&mut self, init: &'ir ListInitExpr) {
        self.nested_new(&init.new_expression);
        self.open(Element::new(tags::INITIALIZERS));
        for initializer in &init.initializers {
            self.visit_element_init(initializer);
        }
        self.close();
    }

    fn visit_lambda(&mut self, lambda: &'ir LambdaExpr) {
        if let Some(name) = &lambda.name {
            self.append(Element::with_text(tags::NAME, name.as_str()));
        }
        self.flag(tags::TAIL_CALL, lambda.tail_call);

        let mut parameters = Element::new(tags::PARAMETERS);
        for parameter in &lambda.parameters {
            parameters.push(parameter_element(parameter));
        }
        self.append(parameters);

        self.slot(tags::BODY, &lambda.body);
    }

    fn visit_unary(&mut self, unary: &'ir UnaryExpr) {
        self.optional_member(tags::METHOD, unary.method.as_deref());
        self.flag(tags::IS_LIFTED, unary.is_lifted);
        self.flag(tags::IS_LIFTED_TO_NULL, unary.is_lifted_to_null);
        self.slot(tags::OPERAND, &unary.operand);
    }

    fn visit_binary(&mut self, binary: &'ir BinaryExpr) {
        self.optional_member(tags::METHOD, binary.method.as_deref());
        self.flag(tags::IS_LIFTED, binary.is_lifted);
        self.flag(tags::IS_LIFTED_TO_NULL, binary.is_lifted_to_null);
        self.slot(tags::LEFT, &binary.left);
        self.slot(tags::RIGHT, &binary.right);
        self.optional_slot(tags::CONVERSION, binary.conversion.as_deref());
    }

    fn visit_conditional(&mut self, conditional: &'ir ConditionalExpr) {
        self.slot(tags::TEST, &conditional.test);
        self.slot(tags::IF_TRUE, &conditional.if_true);
        self.slot(tags::IF_FALSE, &conditional.if_false);
    }

    fn visit_type_is(&mut self, type_is: &'ir TypeIsExpr) {
        self.append(wrap(tags::TYPE_OPERAND, type_element(&type_is.type_operand)));
        self.slot(tags::EXPRESSION, &type_is.expression);
    }

    fn visit_invoke(&mut self, invoke: &'ir InvokeExpr) {
        self.container(tags::ARGUMENTS, &invoke.arguments);
        self.slot(tags::EXPRESSION, &invoke.expression);
    }

    fn visit_element_init(&mut self, init: &'ir ElementInit) {
        self.open(Element::new(tags::ELEMENT_INIT));
        self.member(tags::ADD_METHOD, &init.add_method);
        self.container(tags::ARGUMENTS, &init.arguments);
        self.close();
    }

    fn visit_binding(&mut self, binding: &'ir MemberBinding) {
        if !self.enter() {
            return;
        }

        let tag = match binding {
            MemberBinding::Assignment { .. } => tags::MEMBER_ASSIGNMENT,
            MemberBinding::Member { .. } => tags::MEMBER_MEMBER_BINDING,
            MemberBinding::List { .. } => tags::MEMBER_LIST_BINDING,
        };
        self.open(
            Element::new(tag).with_child(Element::with_text(
                tags::BINDING_TYPE,
                binding.binding_type().name(),
            )),
        );
        self.member(tags::MEMBER, binding.member());

        match binding {
            MemberBinding::Assignment { expression, .. } => {
                self.slot(tags::EXPRESSION, expression);
            }
            MemberBinding::Member { bindings, .. } => {
                self.open(Element::new(tags::BINDINGS));
                for nested in bindings {
                    self.visit_binding(nested);
                }
                self.close();
            }
            MemberBinding::List { initializers, .. } => {
                self.open(Element::new(tags::INITIALIZERS));
                for initializer in initializers {
                    self.visit_element_init(initializer);
                }
                self.close();
            }
        }

        self.close();
        self.leave();
    }
}
