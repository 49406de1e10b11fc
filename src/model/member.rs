use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::model::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::model::flags::AccessFlags;
use crate::model::value::StaticValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field
{
    /// Name of the declaring class.
    pub class: String,
    pub name: String,
    pub type_descriptor: String,
    pub is_instance: bool,
    pub access_flags: AccessFlags,
    pub initial_value: Option<StaticValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method
{
    /// Name of the declaring class.
    pub class: String,
    pub name: String,
    pub descriptor: String,
    pub access_flags: AccessFlags,
    pub is_instance: bool,
    pub is_synchronized: bool,
    /// `None` for abstract and native methods. Methods sharing a `code_item` share the body.
    pub code: Option<Arc<CodeBody>>,
}

impl Method
{
    pub fn parsed_descriptor(&self) -> Option<MethodDescriptor>
    {
        MethodDescriptor::parse(&self.descriptor)
    }

    pub fn parameter_types(&self) -> Vec<TypeDescriptor>
    {
        self.parsed_descriptor().map(|d| d.parameters).unwrap_or_default()
    }

    pub fn return_type(&self) -> Option<TypeDescriptor>
    {
        self.parsed_descriptor().map(|d| d.return_type)
    }

    /// Registers taken by the incoming arguments, `this` included.
    pub fn argument_words(&self) -> usize
    {
        let params: usize = self.parameter_types().iter().map(|t| if t.is_wide() { 2 } else { 1 }).sum();
        params + usize::from(self.is_instance)
    }

    pub fn has_code(&self) -> bool
    {
        self.code.is_some()
    }
}

/// A method's `code_item`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBody
{
    pub registers_size: u16,
    pub ins_size: u16,
    pub outs_size: u16,
    /// Read but not followed.
    pub debug_info_off: u32,
    pub instructions: Instructions,
    pub tries: Vec<TryRange>,
    pub handlers: Vec<HandlerList>,
}

impl CodeBody
{
    /// Handler list of the try range covering `address`.
    pub fn handlers_at(&self, address: u32) -> Option<&HandlerList>
    {
        self.tries
            .iter()
            .find(|t| t.covers(address))
            .and_then(|t| self.handlers.get(t.handler))
    }
}

/// The instruction stream in three parallel views.
///
/// Opcodes sit in the low byte of a code unit and the first operand byte in the high one,
/// while index and literal operands span whole units, so the decoder needs all three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions
{
    pub low: Vec<u8>,
    pub high: Vec<u8>,
    pub units: Vec<u16>,
}

impl Instructions
{
    pub fn push(&mut self, unit: u16)
    {
        self.low.push((unit & 0xFF) as u8);
        self.high.push((unit >> 8) as u8);
        self.units.push(unit);
    }

    pub fn len(&self) -> usize
    {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.units.is_empty()
    }
}

/// Instruction range `[start_addr, end_addr)`, in code units, guarded by `handlers[handler]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryRange
{
    pub start_addr: u32,
    pub end_addr: u32,
    pub handler: usize,
}

impl TryRange
{
    pub fn covers(&self, address: u32) -> bool
    {
        address >= self.start_addr && address < self.end_addr
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerList
{
    /// Typed handlers in order, followed by the catch-all entry if there is one.
    pub entries: Vec<HandlerEntry>,
    pub has_catch_all: bool,
}

impl HandlerList
{
    pub fn catch_all_addr(&self) -> Option<u32>
    {
        if self.has_catch_all { self.entries.last().map(|e| e.address) } else { None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerEntry
{
    pub exception_type: String,
    pub address: u32,
}
