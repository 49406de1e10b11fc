use serde::{Deserialize, Serialize};
use crate::dex::pools::{FieldRef, MethodRef};

/// Constant initializer of a static field, with every pool reference already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StaticValue
{
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// Method prototype, as a descriptor string.
    MethodType(String),
    /// Index into the method handle section, which is not loaded.
    MethodHandle(u32),
    String(String),
    /// Type descriptor.
    Type(String),
    Field(FieldRef),
    Method(MethodRef),
    Enum(FieldRef),
    Array(Vec<StaticValue>),
    Annotation(AnnotationValue),
    Null,
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationValue
{
    pub type_descriptor: String,
    pub elements: Vec<(String, StaticValue)>,
}

impl StaticValue
{
    /// Integral view of the value, for the kinds an interpreter keeps in a single register pair.
    pub fn as_i64(&self) -> Option<i64>
    {
        match self
        {
            StaticValue::Byte(x) => Some(*x as i64),
            StaticValue::Short(x) => Some(*x as i64),
            StaticValue::Char(x) => Some(*x as i64),
            StaticValue::Int(x) => Some(*x as i64),
            StaticValue::Long(x) => Some(*x),
            StaticValue::Boolean(b) => Some(*b as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str>
    {
        match self
        {
            StaticValue::String(s) => Some(s),
            _ => None,
        }
    }
}
