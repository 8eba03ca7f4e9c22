//! Shared metadata fixture for the codec tests.

#![allow(dead_code)]

use rhizome_weave_ir::{
    EnumVariant, Member, MemberInfo, MetadataTable, Primitive, TypeDescriptor, TypeInfo,
};

pub const POINT: &str = "Geo.Point";
pub const INT_LIST: &str = "System.Collections.Generic.List`1[[System.Int32]]";
pub const INT_FUNC: &str = "System.Func`2[[System.Int32],[System.Int32]]";
pub const INT_FUNC2: &str = "System.Func`3[[System.Int32],[System.Int32],[System.Int32]]";
pub const CURRIED: &str =
    "System.Func`2[[System.Int32],[System.Func`2[[System.Int32],[System.Int32]]]]";
pub const STRING_FUNC: &str = "System.Func`2[[System.String],[System.String]]";
pub const INT_THUNK: &str = "System.Func`1[[System.Int32]]";
pub const APPLY: &str =
    "System.Func`2[[System.Func`2[[System.Int32],[System.Int32]]],[System.Int32]]";
pub const COLOR: &str = "Paint.Color";
pub const PAYLOAD: &str = "App.Payload";

pub fn int() -> TypeDescriptor {
    TypeDescriptor::int32()
}

pub fn long() -> TypeDescriptor {
    Primitive::Int64.descriptor()
}

pub fn string() -> TypeDescriptor {
    TypeDescriptor::string()
}

pub fn boolean() -> TypeDescriptor {
    TypeDescriptor::boolean()
}

/// Members registered in [`Fixture::table`], for building trees.
pub struct Fixture {
    pub table: MetadataTable,
    pub point_new: Member,
    pub point_new_xy: Member,
    pub point_x: Member,
    pub point_y: Member,
    pub point_tag: Member,
    pub point_corner: Member,
    pub point_tags: Member,
    pub point_origin: Member,
    pub point_negate: Member,
    pub list_new: Member,
    pub list_add: Member,
    pub list_item: Member,
    pub twice_int: Member,
    pub twice_long: Member,
    pub twice_object: Member,
    pub identity: Member,
    pub contains: Member,
}

impl Fixture {
    pub fn new() -> Self {
        let mut table = MetadataTable::with_primitives();

        for name in [
            POINT, INT_LIST, INT_FUNC, INT_FUNC2, CURRIED, STRING_FUNC, INT_THUNK, APPLY, PAYLOAD,
        ] {
            table.add_type(TypeInfo::object(name));
        }
        table.add_type(TypeInfo::object("Calc"));
        table.add_type(TypeInfo::object("Util"));
        table.add_type(TypeInfo::enumeration(
            COLOR,
            vec![
                EnumVariant::new("Red", 1),
                EnumVariant::new("Green", 2),
                EnumVariant::new("Blue", 4),
            ],
        ));

        let point_new = table.add_member(MemberInfo::constructor(POINT, vec![]));
        let point_new_xy = table.add_member(MemberInfo::constructor(POINT, vec![int(), int()]));
        let point_x = table.add_member(MemberInfo::property(POINT, "X", int()));
        let point_y = table.add_member(MemberInfo::property(POINT, "Y", int()));
        let point_tag = table.add_member(MemberInfo::field(POINT, "Tag", string()));
        let point_corner = table.add_member(MemberInfo::property(POINT, "Corner", POINT));
        let point_tags = table.add_member(MemberInfo::property(POINT, "Tags", INT_LIST));
        let point_origin =
            table.add_member(MemberInfo::field(POINT, "Origin", POINT).into_static());
        let point_negate = table.add_member(
            MemberInfo::method(POINT, "op_UnaryNegation", vec![POINT.into()], POINT).into_static(),
        );

        let list_new = table.add_member(MemberInfo::constructor(INT_LIST, vec![]));
        let list_add = table.add_member(MemberInfo::method(
            INT_LIST,
            "Add",
            vec![int()],
            TypeDescriptor::void(),
        ));
        let list_item = table.add_member(MemberInfo::indexer(INT_LIST, "Item", vec![int()], int()));

        // Overloads differing only by parameter type.
        let twice_object = table.add_member(
            MemberInfo::method("Calc", "Twice", vec![TypeDescriptor::object()], int())
                .into_static(),
        );
        let twice_long = table
            .add_member(MemberInfo::method("Calc", "Twice", vec![long()], long()).into_static());
        let twice_int =
            table.add_member(MemberInfo::method("Calc", "Twice", vec![int()], int()).into_static());

        let identity = table.add_member(
            MemberInfo::generic_method(
                "Util",
                "Identity",
                1,
                vec![TypeDescriptor::generic_parameter(0)],
                TypeDescriptor::generic_parameter(0),
            )
            .into_static(),
        );

        let contains = table.add_member(MemberInfo::method(
            TypeDescriptor::string(),
            "Contains",
            vec![string()],
            boolean(),
        ));

        Self {
            table,
            point_new,
            point_new_xy,
            point_x,
            point_y,
            point_tag,
            point_corner,
            point_tags,
            point_origin,
            point_negate,
            list_new,
            list_add,
            list_item,
            twice_int,
            twice_long,
            twice_object,
            identity,
            contains,
        }
    }
}
