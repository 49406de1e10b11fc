/* Type and method descriptors, e.g. I, [Ljava/lang/String; and (IJ)V */

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{anychar, char};
use nom::combinator::{all_consuming, map, map_opt};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor
{
    Void,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    /// Slash separated class name, without the `L` and `;`.
    Object(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor
{
    pub fn parse(s: &str) -> Option<TypeDescriptor>
    {
        all_consuming(parse_type).parse(s).ok().map(|(_, t)| t)
    }

    fn from_primitive(c: char) -> Option<TypeDescriptor>
    {
        Some(match c
        {
            'V' => TypeDescriptor::Void,
            'Z' => TypeDescriptor::Boolean,
            'B' => TypeDescriptor::Byte,
            'S' => TypeDescriptor::Short,
            'C' => TypeDescriptor::Char,
            'I' => TypeDescriptor::Int,
            'J' => TypeDescriptor::Long,
            'F' => TypeDescriptor::Float,
            'D' => TypeDescriptor::Double,
            _ => return None,
        })
    }

    /// Long and double values take two registers.
    pub fn is_wide(&self) -> bool
    {
        matches!(self, TypeDescriptor::Long | TypeDescriptor::Double)
    }

    pub fn to_descriptor(&self) -> String
    {
        match self
        {
            TypeDescriptor::Void => "V".to_string(),
            TypeDescriptor::Boolean => "Z".to_string(),
            TypeDescriptor::Byte => "B".to_string(),
            TypeDescriptor::Short => "S".to_string(),
            TypeDescriptor::Char => "C".to_string(),
            TypeDescriptor::Int => "I".to_string(),
            TypeDescriptor::Long => "J".to_string(),
            TypeDescriptor::Float => "F".to_string(),
            TypeDescriptor::Double => "D".to_string(),
            TypeDescriptor::Object(name) => format!("L{};", name),
            TypeDescriptor::Array(inner) => format!("[{}", inner.to_descriptor()),
        }
    }
}

impl fmt::Display for TypeDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "{}", self.to_descriptor())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor
{
    pub parameters: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
}

impl MethodDescriptor
{
    pub fn parse(s: &str) -> Option<MethodDescriptor>
    {
        all_consuming(parse_method).parse(s).ok().map(|(_, m)| m)
    }
}

fn parse_type(input: &str) -> IResult<&str, TypeDescriptor>
{
    alt((
        map(preceded(char('['), parse_type), |t| TypeDescriptor::Array(Box::new(t))),
        map(delimited(char('L'), take_while1(|c: char| c != ';'), char(';')), |s: &str| {
            TypeDescriptor::Object(s.to_string())
        }),
        map_opt(anychar, TypeDescriptor::from_primitive),
    ))
    .parse(input)
}

fn parse_method(input: &str) -> IResult<&str, MethodDescriptor>
{
    map(
        pair(delimited(char('('), many0(parse_type), char(')')), parse_type),
        |(parameters, return_type)| MethodDescriptor { parameters, return_type },
    )
    .parse(input)
}

/// Turns a type descriptor into the class name it denotes: `Lcom/a/B;` becomes `com/a/B`.
/// Primitive and array descriptors are returned unchanged.
pub fn class_name_from_descriptor(descriptor: &str) -> String
{
    match descriptor.strip_prefix('L').and_then(|s| s.strip_suffix(';'))
    {
        Some(name) => name.to_string(),
        None => descriptor.to_string(),
    }
}

/// Registry form of a class name: `java.lang.Object` becomes `java/lang/Object`.
pub fn canonical_class_name(name: &str) -> String
{
    name.replace('.', "/")
}
