use crate::dex::cursor::ByteCursor;
use crate::dex::error::DexError;
use crate::dex::pools::SymbolPools;
use crate::model::value::{AnnotationValue, StaticValue};

/// Deepest nesting of arrays and annotations accepted inside one value.
pub const MAX_VALUE_DEPTH: usize = 32;

const VALUE_BYTE: u8 = 0x00;
const VALUE_SHORT: u8 = 0x02;
const VALUE_CHAR: u8 = 0x03;
const VALUE_INT: u8 = 0x04;
const VALUE_LONG: u8 = 0x06;
const VALUE_FLOAT: u8 = 0x10;
const VALUE_DOUBLE: u8 = 0x11;
const VALUE_METHOD_TYPE: u8 = 0x15;
const VALUE_METHOD_HANDLE: u8 = 0x16;
const VALUE_STRING: u8 = 0x17;
const VALUE_TYPE: u8 = 0x18;
const VALUE_FIELD: u8 = 0x19;
const VALUE_METHOD: u8 = 0x1a;
const VALUE_ENUM: u8 = 0x1b;
const VALUE_ARRAY: u8 = 0x1c;
const VALUE_ANNOTATION: u8 = 0x1d;
const VALUE_NULL: u8 = 0x1e;
const VALUE_BOOLEAN: u8 = 0x1f;

fn check_width(value_type: u8, size: usize, max: usize) -> Result<(), DexError>
{
    if size > max
    {
        fail!(Format, "value type 0x{:02x} cannot be {} bytes wide", value_type, size);
    }
    Ok(())
}

/// Reads one `encoded_value` and resolves any pool index it carries.
pub fn read_static_value(c: &mut ByteCursor<'_>, pools: &SymbolPools) -> Result<StaticValue, DexError>
{
    read_value(c, pools, 0)
}

fn read_value(c: &mut ByteCursor<'_>, pools: &SymbolPools, depth: usize) -> Result<StaticValue, DexError>
{
    let header_byte = c.read_u1()?;
    let value_arg = header_byte >> 5;
    let value_type = header_byte & 0x1F;
    let size = (value_arg + 1) as usize;

    let value = match value_type
    {
        VALUE_BYTE => {
            check_width(value_type, size, 1)?;
            StaticValue::Byte(c.read_signed(size)? as i8)
        }
        VALUE_SHORT => {
            check_width(value_type, size, 2)?;
            StaticValue::Short(c.read_signed(size)? as i16)
        }
        VALUE_CHAR => {
            check_width(value_type, size, 2)?;
            StaticValue::Char(c.read_unsigned(size)? as u16)
        }
        VALUE_INT => {
            check_width(value_type, size, 4)?;
            StaticValue::Int(c.read_signed(size)? as i32)
        }
        VALUE_LONG => StaticValue::Long(c.read_signed(size)?),
        VALUE_FLOAT => {
            check_width(value_type, size, 4)?;
            StaticValue::Float(f32::from_bits(c.read_right_extended(size, 4)? as u32))
        }
        VALUE_DOUBLE => StaticValue::Double(f64::from_bits(c.read_right_extended(size, 8)?)),
        VALUE_METHOD_TYPE..=VALUE_ENUM => {
            check_width(value_type, size, 4)?;
            let idx = c.read_unsigned(size)? as u32;
            match value_type
            {
                VALUE_METHOD_TYPE => StaticValue::MethodType(pools.descriptor(idx)?.to_string()),
                VALUE_METHOD_HANDLE => StaticValue::MethodHandle(idx),
                VALUE_STRING => StaticValue::String(pools.string(idx)?.to_string()),
                VALUE_TYPE => StaticValue::Type(pools.type_descriptor(idx)?.to_string()),
                VALUE_FIELD => StaticValue::Field(pools.field(idx)?.clone()),
                VALUE_METHOD => StaticValue::Method(pools.method(idx)?.clone()),
                _ => StaticValue::Enum(pools.field(idx)?.clone()),
            }
        }
        VALUE_ARRAY => StaticValue::Array(read_array(c, pools, depth + 1)?),
        VALUE_ANNOTATION => StaticValue::Annotation(read_annotation(c, pools, depth + 1)?),
        VALUE_NULL => StaticValue::Null,
        VALUE_BOOLEAN => StaticValue::Boolean(value_arg != 0),
        _ => fail!(UnsupportedValue, "value type 0x{:02x} at 0x{:x}", value_type, c.position() - 1),
    };
    Ok(value)
}

fn check_depth(depth: usize) -> Result<(), DexError>
{
    if depth > MAX_VALUE_DEPTH
    {
        fail!(ResourceLimit, "values nested deeper than {}", MAX_VALUE_DEPTH);
    }
    Ok(())
}

fn read_array(c: &mut ByteCursor<'_>, pools: &SymbolPools, depth: usize) -> Result<Vec<StaticValue>, DexError>
{
    check_depth(depth)?;
    let size = c.read_uleb128()?;
    let mut values = vec![];
    for _ in 0..size
    {
        values.push(read_value(c, pools, depth)?);
    }
    Ok(values)
}

fn read_annotation(c: &mut ByteCursor<'_>, pools: &SymbolPools, depth: usize) -> Result<AnnotationValue, DexError>
{
    check_depth(depth)?;
    let type_idx = c.read_uleb128()?;
    let type_descriptor = pools.type_descriptor(type_idx)?.to_string();
    let size = c.read_uleb128()?;
    let mut elements = vec![];
    for _ in 0..size
    {
        let name = pools.string(c.read_uleb128()?)?.to_string();
        elements.push((name, read_value(c, pools, depth)?));
    }
    Ok(AnnotationValue { type_descriptor, elements })
}
