use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::loader::host::HostValue;
use crate::model::flags::AccessFlags;
use crate::model::member::{Field, Method};

/// Where a class definition came from.
#[derive(Debug, Clone)]
pub enum ClassKind
{
    /// Read from the container.
    Defined,
    /// Stands for a host platform class and wraps a live host value.
    Bridged(HostValue),
    /// Synthesized because the class could be found nowhere.
    Placeholder {
        /// Outer class of an unresolvable inner class name.
        outer: Option<String>,
    },
}

/// One class of the analysed program.
///
/// All three [`ClassKind`]s share this shape: placeholders and bridged classes simply have
/// fewer members. Members refer back to the class by name only.
#[derive(Debug, Serialize)]
pub struct Class
{
    pub name: String,
    pub access_flags: AccessFlags,
    pub is_interface: bool,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub source_file: Option<String>,
    pub static_fields: Vec<Field>,
    pub instance_fields: Vec<Field>,
    pub direct_methods: Vec<Method>,
    pub virtual_methods: Vec<Method>,
    #[serde(skip)]
    pub kind: ClassKind,
    #[serde(skip)]
    bound: AtomicBool,
}

impl Class
{
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self
    {
        Class {
            name: name.into(),
            access_flags: AccessFlags::empty(),
            is_interface: false,
            super_class: None,
            interfaces: vec![],
            source_file: None,
            static_fields: vec![],
            instance_fields: vec![],
            direct_methods: vec![],
            virtual_methods: vec![],
            kind,
            bound: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// True for synthesized placeholders.
    pub fn is_fake(&self) -> bool
    {
        matches!(self.kind, ClassKind::Placeholder { .. })
    }

    pub fn is_bridged(&self) -> bool
    {
        matches!(self.kind, ClassKind::Bridged(_))
    }

    pub fn host_value(&self) -> Option<&HostValue>
    {
        match &self.kind
        {
            ClassKind::Bridged(v) => Some(v),
            _ => None,
        }
    }

    pub fn outer_class(&self) -> Option<&str>
    {
        match &self.kind
        {
            ClassKind::Placeholder { outer } => outer.as_deref(),
            _ => None,
        }
    }

    /// Whether the class initializer has been scheduled.
    pub fn is_bound(&self) -> bool
    {
        self.bound.load(Ordering::Acquire)
    }

    /// Marks the class bound, returning true only for the call that made the change.
    pub fn mark_bound(&self) -> bool
    {
        self.bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn direct_method(&self, name: &str, descriptor: &str) -> Option<&Method>
    {
        self.direct_methods.iter().find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn virtual_method(&self, name: &str, descriptor: &str) -> Option<&Method>
    {
        self.virtual_methods.iter().find(|m| m.name == name && m.descriptor == descriptor)
    }

    /// Looks through direct methods, then virtual ones.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&Method>
    {
        self.direct_method(name, descriptor).or_else(|| self.virtual_method(name, descriptor))
    }

    pub fn static_field(&self, name: &str) -> Option<&Field>
    {
        self.static_fields.iter().find(|f| f.name == name)
    }

    pub fn instance_field(&self, name: &str) -> Option<&Field>
    {
        self.instance_fields.iter().find(|f| f.name == name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method>
    {
        self.direct_methods.iter().chain(self.virtual_methods.iter())
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field>
    {
        self.static_fields.iter().chain(self.instance_fields.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, is_instance: bool) -> Field {
        Field {
            class: "a/B".to_string(),
            name: name.to_string(),
            type_descriptor: "I".to_string(),
            is_instance,
            access_flags: AccessFlags::empty(),
            initial_value: None,
        }
    }

    #[test]
    fn binds_once() {
        let c = Class::new("a/B", ClassKind::Defined);
        assert!(!c.is_bound());
        assert!(c.mark_bound());
        assert!(!c.mark_bound());
        assert!(c.is_bound());
    }

    #[test]
    fn member_lookups() {
        let mut c = Class::new("a/B", ClassKind::Defined);
        c.static_fields.push(field("COUNT", false));
        c.instance_fields.push(field("value", true));
        assert!(c.static_field("COUNT").is_some());
        assert!(c.static_field("value").is_none());
        assert!(c.instance_field("value").is_some());
        assert_eq!(c.fields().count(), 2);
        assert!(c.find_method("<init>", "()V").is_none());
    }

    #[test]
    fn kinds() {
        let c = Class::new("a/B$C", ClassKind::Placeholder { outer: Some("a/B".to_string()) });
        assert!(c.is_fake());
        assert!(!c.is_bridged());
        assert_eq!(c.outer_class(), Some("a/B"));
        assert!(!Class::new("a/B", ClassKind::Defined).is_fake());
    }
}
