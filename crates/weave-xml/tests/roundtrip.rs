mod common;

use common::*;
use pretty_assertions::assert_eq;
use rhizome_weave_ir::{
    compare, BinaryExpr, Comparison, ConstantValue, ElementInit, Expr, LambdaExpr, MemberBinding,
    NewExpr, NodeType, Opaque, ParameterExpr, Primitive, TypeDescriptor, UnaryExpr,
};
use rhizome_weave_xml::{CodecError, CodecOptions, Decoded, Decoder, Element, Encoder};
use std::collections::HashMap;
use std::sync::Arc;

/// Encode to text, decode against the fixture and check the result matches.
fn round_trip(fixture: &Fixture, tree: &Expr) -> Expr {
    let mut encoder = Encoder::new();
    let xml = encoder.encode_to_string(tree).unwrap();

    let mut decoder = Decoder::new(&fixture.table).with_registry(encoder.registry());
    let decoded = decoder.decode_str(&xml).unwrap();

    let mismatch = Comparison::run(Some(tree), Some(&decoded)).mismatch().cloned();
    assert_eq!(mismatch, None, "in\n{xml}");
    decoded
}

fn lambda_of(expr: &Expr) -> &LambdaExpr {
    match expr {
        Expr::Lambda(lambda) => lambda,
        other => panic!("expected Lambda, got {:?}", other.node_type()),
    }
}

fn parameter_of(expr: &Expr) -> &Arc<ParameterExpr> {
    match expr {
        Expr::Parameter(parameter) => parameter,
        other => panic!("expected Parameter, got {:?}", other.node_type()),
    }
}

fn binary_of(expr: &Expr) -> &BinaryExpr {
    match expr {
        Expr::Binary(binary) => binary,
        other => panic!("expected Binary, got {:?}", other.node_type()),
    }
}

/// Evaluates the integer subset needed by the tests.
fn evaluate(expr: &Expr, env: &HashMap<String, i32>) -> i32 {
    match expr {
        Expr::Constant(constant) => match constant.value {
            ConstantValue::I32(value) => value,
            ref other => panic!("cannot evaluate constant {other:?}"),
        },
        Expr::Parameter(parameter) => env[&parameter.name],
        Expr::Binary(binary) => {
            let left = evaluate(&binary.left, env);
            let right = evaluate(&binary.right, env);
            match binary.node_type {
                NodeType::Add => left + right,
                NodeType::Multiply => left * right,
                other => panic!("cannot evaluate {other}"),
            }
        }
        other => panic!("cannot evaluate {}", other.node_type()),
    }
}

fn call(lambda: &LambdaExpr, arguments: &[i32]) -> i32 {
    let env = lambda
        .parameters
        .iter()
        .zip(arguments)
        .map(|(p, a)| (p.name.clone(), *a))
        .collect();
    evaluate(&lambda.body, &env)
}

#[test]
fn test_add_parameter_constant_scenario() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::binary(NodeType::Add, Expr::param(&x), Expr::int(1));

    let element = Encoder::new().encode(&tree).unwrap();
    assert_eq!(element.child("NodeType").unwrap().text(), "Add");
    let left = element.child("Left").unwrap().first_child().unwrap();
    assert_eq!(left.child("Name").unwrap().text(), "x");
    let right = element.child("Right").unwrap().first_child().unwrap();
    assert_eq!(right.child("Value").unwrap().text(), "1");

    let decoded = Decoder::new(&fixture.table).decode(&element).unwrap();
    assert!(compare(Some(&tree), Some(&decoded)));

    let env = HashMap::from([("x".to_string(), 4)]);
    assert_eq!(evaluate(&decoded, &env), 5);

    let lambda = Expr::lambda(INT_FUNC.into(), tree, vec![x]);
    let decoded = round_trip(&fixture, &lambda);
    assert_eq!(call(lambda_of(&decoded), &[4]), 5);
}

#[test]
fn test_parameter_shared_within_lambda() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::lambda(
        INT_FUNC.into(),
        Expr::binary(NodeType::Multiply, Expr::param(&x), Expr::param(&x)),
        vec![x],
    );

    let decoded = round_trip(&fixture, &tree);
    let lambda = lambda_of(&decoded);
    let body = binary_of(&lambda.body);
    let declared = &lambda.parameters[0];

    assert!(Arc::ptr_eq(declared, parameter_of(&body.left)));
    assert!(Arc::ptr_eq(declared, parameter_of(&body.right)));
    assert_eq!(call(lambda, &[7]), 49);
}

#[test]
fn test_nested_lambda_shares_outer_parameter() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let y = ParameterExpr::new("y", int());
    let inner = Expr::lambda(
        INT_FUNC.into(),
        Expr::binary(NodeType::Add, Expr::param(&x), Expr::param(&y)),
        vec![y],
    );
    let tree = Expr::lambda(CURRIED.into(), inner, vec![x]);

    let decoded = round_trip(&fixture, &tree);
    let outer = lambda_of(&decoded);
    let inner = lambda_of(&outer.body);
    let body = binary_of(&inner.body);

    assert!(Arc::ptr_eq(&outer.parameters[0], parameter_of(&body.left)));
    assert!(Arc::ptr_eq(&inner.parameters[0], parameter_of(&body.right)));
    assert!(!Arc::ptr_eq(&outer.parameters[0], &inner.parameters[0]));
}

#[test]
fn test_parameters_not_shared_across_calls() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::lambda(INT_FUNC.into(), Expr::param(&x), vec![x]);
    let element = Encoder::new().encode(&tree).unwrap();

    let mut decoder = Decoder::new(&fixture.table);
    let first = decoder.decode_lambda(&element).unwrap();
    let second = decoder.decode_lambda(&element).unwrap();

    assert_eq!(first, second);
    assert!(!Arc::ptr_eq(&first.parameters[0], &second.parameters[0]));
}

#[test]
fn test_exact_overload_resolution() {
    let fixture = Fixture::new();

    let tree = Expr::static_call(Arc::clone(&fixture.twice_long), vec![Expr::long(2)]);
    match round_trip(&fixture, &tree) {
        Expr::Call(call) => {
            assert!(Arc::ptr_eq(&call.method, &fixture.twice_long));
            assert!(!Arc::ptr_eq(&call.method, &fixture.twice_object));
        }
        other => panic!("expected Call, got {:?}", other.node_type()),
    }

    // An int argument converted to object still selects the object overload.
    let boxed = Expr::convert(Expr::int(2), TypeDescriptor::object());
    let tree = Expr::static_call(Arc::clone(&fixture.twice_object), vec![boxed]);
    match round_trip(&fixture, &tree) {
        Expr::Call(call) => assert!(Arc::ptr_eq(&call.method, &fixture.twice_object)),
        other => panic!("expected Call, got {:?}", other.node_type()),
    }

    let tree = Expr::static_call(Arc::clone(&fixture.twice_int), vec![Expr::int(2)]);
    match round_trip(&fixture, &tree) {
        Expr::Call(call) => assert!(Arc::ptr_eq(&call.method, &fixture.twice_int)),
        other => panic!("expected Call, got {:?}", other.node_type()),
    }
}

#[test]
fn test_generic_method_call() {
    let fixture = Fixture::new();
    let identity = Arc::new(fixture.identity.instantiate(&[string()]).unwrap());
    let tree = Expr::static_call(Arc::clone(&identity), vec![Expr::string("a")]);

    let decoded = round_trip(&fixture, &tree);
    assert_eq!(decoded, tree);
    assert_eq!(decoded.ty(), &string());
}

#[test]
fn test_instance_call_and_member_access() {
    let fixture = Fixture::new();
    let contains = Expr::call(
        Expr::string("abc"),
        Arc::clone(&fixture.contains),
        vec![Expr::string("b")],
    );
    assert_eq!(round_trip(&fixture, &contains), contains);

    let point = Expr::new(
        Arc::clone(&fixture.point_new_xy),
        vec![Expr::int(1), Expr::int(2)],
    );
    let x = Expr::member(point, Arc::clone(&fixture.point_x));
    assert_eq!(round_trip(&fixture, &x), x);

    let tag = Expr::member(
        Expr::static_member(Arc::clone(&fixture.point_origin)),
        Arc::clone(&fixture.point_tag),
    );
    assert_eq!(round_trip(&fixture, &tag), tag);
}

#[test]
fn test_member_init_with_nested_bindings() {
    let fixture = Fixture::new();
    let tree = Expr::member_init(
        NewExpr::new(Arc::clone(&fixture.point_new), vec![]),
        vec![
            MemberBinding::assign(Arc::clone(&fixture.point_x), Expr::int(1)),
            MemberBinding::nested(
                Arc::clone(&fixture.point_corner),
                vec![MemberBinding::assign(
                    Arc::clone(&fixture.point_y),
                    Expr::int(2),
                )],
            ),
            MemberBinding::list(
                Arc::clone(&fixture.point_tags),
                vec![
                    ElementInit::new(Arc::clone(&fixture.list_add), vec![Expr::int(3)]),
                    ElementInit::new(Arc::clone(&fixture.list_add), vec![Expr::int(4)]),
                ],
            ),
        ],
    );

    assert_eq!(round_trip(&fixture, &tree), tree);
}

#[test]
fn test_list_init() {
    let fixture = Fixture::new();
    let tree = Expr::list_init(
        NewExpr::new(Arc::clone(&fixture.list_new), vec![]),
        vec![
            ElementInit::new(Arc::clone(&fixture.list_add), vec![Expr::int(1)]),
            ElementInit::new(Arc::clone(&fixture.list_add), vec![Expr::int(2)]),
        ],
    );

    assert_eq!(round_trip(&fixture, &tree), tree);
}

#[test]
fn test_arrays() {
    let fixture = Fixture::new();

    let init = Expr::new_array_init(&int(), vec![Expr::int(1), Expr::int(2), Expr::int(3)]);
    assert_eq!(round_trip(&fixture, &init), init);

    let index = Expr::binary(NodeType::ArrayIndex, init, Expr::int(0));
    assert_eq!(index.ty(), &int());
    assert_eq!(round_trip(&fixture, &index), index);

    let bounds = Expr::new_array_bounds(&string(), vec![Expr::int(4)]);
    assert_eq!(round_trip(&fixture, &bounds), bounds);

    let length = Expr::unary(
        NodeType::ArrayLength,
        Expr::new_array_init(&int(), vec![]),
        int(),
    );
    assert_eq!(round_trip(&fixture, &length), length);
}

#[test]
fn test_operators() {
    let fixture = Fixture::new();

    let conditional = Expr::conditional(
        Expr::binary(NodeType::LessThan, Expr::int(1), Expr::int(2)),
        Expr::int(10),
        Expr::int(20),
    );
    assert_eq!(round_trip(&fixture, &conditional), conditional);

    let type_is = Expr::type_is(Expr::null(TypeDescriptor::object()), POINT.into());
    assert_eq!(round_trip(&fixture, &type_is), type_is);

    let lifted = Expr::Binary(
        BinaryExpr::new(NodeType::Equal, Expr::int(1), Expr::int(1)).lifted(true, false),
    );
    assert_eq!(round_trip(&fixture, &lifted), lifted);

    let negate_point = Expr::Unary(
        UnaryExpr::new(
            NodeType::Negate,
            Expr::static_member(Arc::clone(&fixture.point_origin)),
            POINT.into(),
        )
        .with_method(Arc::clone(&fixture.point_negate)),
    );
    assert_eq!(round_trip(&fixture, &negate_point), negate_point);

    let logic = Expr::binary(
        NodeType::AndAlso,
        Expr::not(Expr::bool(false)),
        Expr::binary(NodeType::NotEqual, Expr::long(3), Expr::long(4)),
    );
    assert_eq!(round_trip(&fixture, &logic), logic);
}

#[test]
fn test_coalesce_with_conversion() {
    let fixture = Fixture::new();
    let s = ParameterExpr::new("s", string());
    let conversion = LambdaExpr::new(STRING_FUNC.into(), Expr::param(&s), vec![s]);
    let tree = Expr::Binary(
        BinaryExpr::new(
            NodeType::Coalesce,
            Expr::null(string()),
            Expr::string("fallback"),
        )
        .with_conversion(conversion),
    );

    let decoded = round_trip(&fixture, &tree);
    assert_eq!(decoded, tree);
    assert!(matches!(
        binary_of(&decoded).conversion.as_deref(),
        Some(Expr::Lambda(_))
    ));
}

#[test]
fn test_invoke() {
    let fixture = Fixture::new();
    let f = ParameterExpr::new("f", INT_FUNC.into());
    let tree = Expr::lambda(
        APPLY.into(),
        Expr::invoke(Expr::param(&f), vec![Expr::int(3)], int()),
        vec![f],
    );
    assert_eq!(round_trip(&fixture, &tree), tree);
}

#[test]
fn test_lambda_name_and_tail_call() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let y = ParameterExpr::new("y", int());
    let tree = Expr::Lambda(
        LambdaExpr::new(
            INT_FUNC2.into(),
            Expr::binary(NodeType::Add, Expr::param(&x), Expr::param(&y)),
            vec![x, y],
        )
        .named("sum")
        .with_tail_call(true),
    );

    let decoded = round_trip(&fixture, &tree);
    let lambda = lambda_of(&decoded);
    assert_eq!(lambda.name.as_deref(), Some("sum"));
    assert!(lambda.tail_call);
    assert_eq!(call(lambda, &[2, 3]), 5);
}

#[test]
fn test_constants() {
    let fixture = Fixture::new();
    let constants = vec![
        Expr::bool(true),
        Expr::constant(ConstantValue::Char('<'), Primitive::Char.descriptor()),
        Expr::constant(ConstantValue::U8(255), Primitive::Byte.descriptor()),
        Expr::constant(ConstantValue::I16(-7), Primitive::Int16.descriptor()),
        Expr::constant(ConstantValue::U64(u64::MAX), Primitive::UInt64.descriptor()),
        Expr::constant(ConstantValue::F32(1.5), Primitive::Single.descriptor()),
        Expr::double(0.1),
        Expr::double(-1e300),
        Expr::string("tabs\tand <markup> & \"quotes\""),
        Expr::string("  padded  "),
        Expr::string(""),
        Expr::null(string()),
        Expr::constant(
            ConstantValue::Enum {
                variant: "Blue".into(),
                value: 4,
            },
            COLOR.into(),
        ),
    ];

    for constant in constants {
        assert_eq!(round_trip(&fixture, &constant), constant);
    }

    let nan = Expr::double(f64::NAN);
    round_trip(&fixture, &nan);
}

#[test]
fn test_null_and_empty_string_stay_distinct() {
    let fixture = Fixture::new();
    let empty = round_trip(&fixture, &Expr::string(""));
    let null = round_trip(&fixture, &Expr::null(string()));
    assert_ne!(empty, null);
    assert!(!compare(Some(&empty), Some(&null)));
}

#[test]
fn test_opaque_constant_with_shared_registry() {
    let fixture = Fixture::new();
    let payload = Opaque::new(vec![1u32, 2, 3]);
    let tree = Expr::new_array_init(
        &PAYLOAD.into(),
        vec![
            Expr::opaque(payload.clone(), PAYLOAD.into()),
            Expr::opaque(payload.clone(), PAYLOAD.into()),
        ],
    );

    let decoded = round_trip(&fixture, &tree);
    match decoded {
        Expr::NewArray(array) => {
            for element in &array.expressions {
                match element {
                    Expr::Constant(constant) => match &constant.value {
                        ConstantValue::Opaque(value) => assert!(value.ptr_eq(&payload)),
                        other => panic!("expected opaque value, got {other:?}"),
                    },
                    other => panic!("expected Constant, got {:?}", other.node_type()),
                }
            }
        }
        other => panic!("expected NewArray, got {:?}", other.node_type()),
    }
}

#[test]
fn test_container_empty_and_absent() {
    let fixture = Fixture::new();

    let no_members = Expr::new(Arc::clone(&fixture.point_new), vec![]);
    let empty_members = Expr::New(
        NewExpr::new(Arc::clone(&fixture.point_new), vec![]).with_members(vec![]),
    );
    let with_members = Expr::New(
        NewExpr::new(
            Arc::clone(&fixture.point_new_xy),
            vec![Expr::int(1), Expr::int(2)],
        )
        .with_members(vec![
            Arc::clone(&fixture.point_x),
            Arc::clone(&fixture.point_y),
        ]),
    );

    let element = Encoder::new().encode(&no_members).unwrap();
    assert!(element.child("Members").is_none());
    let element = Encoder::new().encode(&empty_members).unwrap();
    assert!(element.child("Members").unwrap().children.is_empty());

    for tree in [&no_members, &empty_members, &with_members] {
        assert_eq!(&round_trip(&fixture, tree), tree);
    }
    assert!(!compare(Some(&no_members), Some(&empty_members)));

    let default_point = Expr::New(NewExpr::default_value(POINT.into()));
    assert_eq!(round_trip(&fixture, &default_point), default_point);

    let empty_lambda = Expr::lambda(INT_THUNK.into(), Expr::int(1), vec![]);
    match round_trip(&fixture, &empty_lambda) {
        Expr::Lambda(lambda) => assert!(lambda.parameters.is_empty()),
        other => panic!("expected Lambda, got {:?}", other.node_type()),
    }
}

#[test]
fn test_optional_entry_points() {
    let fixture = Fixture::new();
    assert_eq!(Encoder::new().encode_optional(None), Ok(None));
    assert_eq!(Decoder::new(&fixture.table).decode_optional(None), Ok(None));

    let tree = Expr::int(8);
    let element = Encoder::new().encode_optional(Some(&tree)).unwrap();
    let decoded = Decoder::new(&fixture.table)
        .decode_optional(element.as_ref())
        .unwrap();
    assert_eq!(decoded, Some(tree));
}

#[test]
fn test_per_item_entry_points() {
    let fixture = Fixture::new();
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new(&fixture.table);

    let xml = encoder.encode_member_to_string(&fixture.list_item).unwrap();
    assert!(xml.contains("<IndexParameters>"));
    let member = decoder.decode_member_str(&xml).unwrap();
    assert!(Arc::ptr_eq(&member, &fixture.list_item));

    let init = ElementInit::new(Arc::clone(&fixture.list_add), vec![Expr::int(5)]);
    let xml = encoder.encode_element_init_to_string(&init).unwrap();
    assert_eq!(decoder.decode_element_init_str(&xml).unwrap(), init);

    let binding = MemberBinding::assign(Arc::clone(&fixture.point_tag), Expr::string("t"));
    let xml = encoder.encode_binding_to_string(&binding).unwrap();
    assert_eq!(decoder.decode_binding_str(&xml).unwrap(), binding);

    let element = encoder.encode_element_init(&init).unwrap();
    assert_eq!(
        decoder.decode_any(&element).unwrap(),
        Decoded::ElementInit(init)
    );

    let element = encoder.encode_binding(&binding).unwrap();
    assert_eq!(decoder.decode_any(&element).unwrap(), Decoded::Binding(binding));
}

#[test]
fn test_decode_type() {
    let fixture = Fixture::new();
    let element = Element::parse(
        "<Type><MemberType>TypeInfo</MemberType><Name>System.Int32[]</Name></Type>",
    )
    .unwrap();
    let ty = Decoder::new(&fixture.table).decode_type(&element).unwrap();
    assert_eq!(ty.descriptor, TypeDescriptor::array_of(&int()));

    let ty = Decoder::new(&fixture.table)
        .decode_type_str("<Type><Name>System.String</Name></Type>")
        .unwrap();
    assert_eq!(ty.descriptor, TypeDescriptor::string());
}

#[test]
fn test_decode_lambda_from_text() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::lambda(
        INT_FUNC.into(),
        Expr::binary(NodeType::Multiply, Expr::param(&x), Expr::int(3)),
        vec![x],
    );
    let xml = Encoder::new().encode_to_string(&tree).unwrap();

    let mut decoder = Decoder::new(&fixture.table);
    let lambda = decoder.decode_lambda_str(&xml).unwrap();
    assert_eq!(call(&lambda, &[4]), 12);

    let constant = Encoder::new().encode_to_string(&Expr::int(3)).unwrap();
    assert!(matches!(
        decoder.decode_lambda_str(&constant),
        Err(CodecError::MalformedDocument(_))
    ));
}

#[test]
fn test_text_layouts_decode_alike() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::lambda(
        INT_FUNC.into(),
        Expr::binary(NodeType::Add, Expr::param(&x), Expr::int(1)),
        vec![x],
    );

    let mut compact = Encoder::with_options(CodecOptions {
        indent: None,
        ..CodecOptions::default()
    });
    let compact_xml = compact.encode_to_string(&tree).unwrap();
    assert!(!compact_xml.contains('\n'));

    let pretty_xml = Encoder::new().encode_to_string(&tree).unwrap();
    assert!(pretty_xml.contains('\n'));

    let mut decoder = Decoder::new(&fixture.table);
    let from_compact = decoder.decode_str(&compact_xml).unwrap();
    let from_pretty = decoder.decode_str(&pretty_xml).unwrap();
    assert_eq!(from_compact, from_pretty);
    assert_eq!(from_compact, tree);
}

#[test]
fn test_reencoding_is_stable() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let tree = Expr::lambda(
        INT_FUNC.into(),
        Expr::conditional(
            Expr::binary(NodeType::GreaterThan, Expr::param(&x), Expr::int(0)),
            Expr::param(&x),
            Expr::negate(Expr::param(&x)),
        ),
        vec![x],
    );

    let first = Encoder::new().encode_to_string(&tree).unwrap();
    let decoded = Decoder::new(&fixture.table).decode_str(&first).unwrap();
    let second = Encoder::new().encode_to_string(&decoded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compare_documents() {
    let fixture = Fixture::new();
    let x = ParameterExpr::new("x", int());
    let y = ParameterExpr::new("y", int());
    let plus_one = |p: &Arc<ParameterExpr>| {
        Expr::lambda(
            INT_FUNC.into(),
            Expr::binary(NodeType::Add, Expr::param(p), Expr::int(1)),
            vec![Arc::clone(p)],
        )
    };

    let mut encoder = Encoder::with_options(CodecOptions {
        indent: None,
        ..CodecOptions::default()
    });
    let with_x = encoder.encode_to_string(&plus_one(&x)).unwrap();
    let with_x_pretty = Encoder::new().encode_to_string(&plus_one(&x)).unwrap();
    let with_y = encoder.encode_to_string(&plus_one(&y)).unwrap();

    let mut decoder = Decoder::new(&fixture.table);
    assert_eq!(decoder.compare_str(&with_x, &with_x_pretty), Ok(true));
    assert_eq!(decoder.compare_str(&with_x, &with_y), Ok(false));
}
