//! The linked class model handed to the interpreter.

pub mod class;
pub mod descriptor;
pub mod flags;
pub mod member;
pub mod value;

pub use crate::model::class::{Class, ClassKind};
pub use crate::model::descriptor::{canonical_class_name, class_name_from_descriptor, MethodDescriptor, TypeDescriptor};
pub use crate::model::flags::AccessFlags;
pub use crate::model::member::{CodeBody, Field, HandlerEntry, HandlerList, Instructions, Method, TryRange};
pub use crate::model::value::{AnnotationValue, StaticValue};
