use log::warn;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use crate::model::class::Class;

#[derive(Default)]
struct Entries
{
    by_name: HashMap<String, usize>,
    classes: Vec<Arc<Class>>,
}

impl Entries
{
    fn insert(&mut self, class: Arc<Class>)
    {
        self.by_name.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
    }
}

/// Every class known to one loader, keyed by canonical name.
///
/// A name maps to one class for the registry's whole life: entries are added, never
/// replaced, until the registry is cleared for the next container.
#[derive(Default)]
pub struct ClassRegistry
{
    entries: RwLock<Entries>,
}

impl ClassRegistry
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Class>>
    {
        let entries = self.entries.read();
        entries.by_name.get(name).map(|ix| entries.classes[*ix].clone())
    }

    /// Returns the class registered under `name`, registering `make()` first if there is none.
    ///
    /// The flag is true when this call did the registration. `make` runs under the write lock,
    /// so concurrent callers for one name all get the same class.
    pub fn get_or_insert_with(&self, name: &str, make: impl FnOnce() -> Class) -> (Arc<Class>, bool)
    {
        if let Some(class) = self.get(name)
        {
            return (class, false);
        }
        let mut entries = self.entries.write();
        if let Some(ix) = entries.by_name.get(name)
        {
            return (entries.classes[*ix].clone(), false);
        }
        let class = Arc::new(make());
        entries.insert(class.clone());
        (class, true)
    }

    /// Drops everything and registers `classes` in order.
    ///
    /// A name seen twice keeps its first definition.
    pub fn replace_all(&self, classes: Vec<Class>) -> Vec<Arc<Class>>
    {
        let mut entries = self.entries.write();
        *entries = Entries::default();
        for class in classes
        {
            if entries.by_name.contains_key(&class.name)
            {
                warn!("duplicate definition of {} ignored", class.name);
                continue;
            }
            entries.insert(Arc::new(class));
        }
        entries.classes.clone()
    }

    /// All classes in registration order.
    pub fn classes(&self) -> Vec<Arc<Class>>
    {
        self.entries.read().classes.clone()
    }

    pub fn len(&self) -> usize
    {
        self.entries.read().classes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    pub fn clear(&self)
    {
        *self.entries.write() = Entries::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::class::ClassKind;

    #[test]
    fn insert_if_absent() {
        let r = ClassRegistry::new();
        let (a, created) = r.get_or_insert_with("a/B", || Class::new("a/B", ClassKind::Defined));
        assert!(created);
        let (b, created) = r.get_or_insert_with("a/B", || panic!("must not be called"));
        assert!(!created);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn replace_keeps_first_duplicate() {
        let r = ClassRegistry::new();
        r.get_or_insert_with("old/C", || Class::new("old/C", ClassKind::Defined));
        let mut first = Class::new("a/B", ClassKind::Defined);
        first.source_file = Some("First.java".to_string());
        let kept = r.replace_all(vec![first, Class::new("a/B", ClassKind::Defined), Class::new("a/C", ClassKind::Defined)]);
        assert_eq!(kept.len(), 2);
        assert!(r.get("old/C").is_none());
        assert_eq!(r.get("a/B").and_then(|c| c.source_file.clone()), Some("First.java".to_string()));
        r.clear();
        assert!(r.is_empty());
    }
}
