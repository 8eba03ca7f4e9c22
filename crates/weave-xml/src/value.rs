//! Textual form of constant values.
//!
//! Text is culture-invariant: booleans are `true`/`false`, numbers use the
//! shortest form that parses back to the same value, enums use the variant
//! name and strings are verbatim.

use crate::{tags, CodecError};
use rhizome_weave_ir::{ConstantValue, Primitive, TypeInfo, TypeShape};
use std::str::FromStr;

pub(crate) fn bool_text(value: bool) -> &'static str {
    if value {
        tags::TRUE
    } else {
        tags::FALSE
    }
}

pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        tags::TRUE => Some(true),
        tags::FALSE => Some(false),
        _ => None,
    }
}

/// Text of a value; `None` for null and opaque values, which have none.
pub(crate) fn constant_text(value: &ConstantValue) -> Option<String> {
    let text = match value {
        ConstantValue::Null | ConstantValue::Opaque(_) => return None,
        ConstantValue::Bool(v) => bool_text(*v).to_string(),
        ConstantValue::Char(v) => v.to_string(),
        ConstantValue::I8(v) => v.to_string(),
        ConstantValue::U8(v) => v.to_string(),
        ConstantValue::I16(v) => v.to_string(),
        ConstantValue::U16(v) => v.to_string(),
        ConstantValue::I32(v) => v.to_string(),
        ConstantValue::U32(v) => v.to_string(),
        ConstantValue::I64(v) => v.to_string(),
        ConstantValue::U64(v) => v.to_string(),
        ConstantValue::F32(v) => v.to_string(),
        ConstantValue::F64(v) => v.to_string(),
        ConstantValue::String(v) => v.clone(),
        ConstantValue::Enum { variant, .. } => variant.clone(),
    };
    Some(text)
}

/// Parse `text` as a value of the declared type.
pub(crate) fn parse_constant(text: &str, ty: &TypeInfo) -> Result<ConstantValue, CodecError> {
    match &ty.shape {
        TypeShape::String => Ok(ConstantValue::String(text.to_string())),
        TypeShape::Primitive(primitive) => parse_primitive(text, *primitive, ty),
        TypeShape::Enum(variants) => variants
            .iter()
            .find(|v| v.name == text)
            .map(|v| ConstantValue::Enum {
                variant: v.name.clone(),
                value: v.value,
            })
            .ok_or_else(|| invalid(text, ty)),
        TypeShape::Array { .. } | TypeShape::Object => Err(CodecError::MalformedDocument(
            format!("constant of type {} has no textual form", ty.descriptor),
        )),
    }
}

fn parse_primitive(
    text: &str,
    primitive: Primitive,
    ty: &TypeInfo,
) -> Result<ConstantValue, CodecError> {
    let value = match primitive {
        Primitive::Boolean => parse_bool(text).map(ConstantValue::Bool),
        Primitive::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(ConstantValue::Char(c)),
                _ => None,
            }
        }
        Primitive::SByte => parse(text).map(ConstantValue::I8),
        Primitive::Byte => parse(text).map(ConstantValue::U8),
        Primitive::Int16 => parse(text).map(ConstantValue::I16),
        Primitive::UInt16 => parse(text).map(ConstantValue::U16),
        Primitive::Int32 => parse(text).map(ConstantValue::I32),
        Primitive::UInt32 => parse(text).map(ConstantValue::U32),
        Primitive::Int64 => parse(text).map(ConstantValue::I64),
        Primitive::UInt64 => parse(text).map(ConstantValue::U64),
        Primitive::Single => parse(text).map(ConstantValue::F32),
        Primitive::Double => parse(text).map(ConstantValue::F64),
    };
    value.ok_or_else(|| invalid(text, ty))
}

fn parse<T: FromStr>(text: &str) -> Option<T> {
    text.parse().ok()
}

fn invalid(text: &str, ty: &TypeInfo) -> CodecError {
    CodecError::MalformedDocument(format!("{text:?} is not a valid {}", ty.descriptor))
}
