use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::{HashMap, HashSet, LinkedList};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A live value created by the host platform to stand for one of its classes.
#[derive(Clone)]
pub struct HostValue
{
    class_name: String,
    value: Arc<dyn Any + Send + Sync>,
}

impl HostValue
{
    pub fn new<T: Any + Send + Sync>(class_name: impl Into<String>, value: T) -> Self
    {
        HostValue { class_name: class_name.into(), value: Arc::new(value) }
    }

    pub fn class_name(&self) -> &str
    {
        &self.class_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T>
    {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for HostValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("HostValue").field("class_name", &self.class_name).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError
{
    /// The host has no class of that name.
    NotFound(String),
    /// The class exists but no instance of it could be made.
    Instantiation { name: String, reason: String },
}

impl fmt::Display for BridgeError
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            BridgeError::NotFound(name) => write!(f, "host class {} not found", name),
            BridgeError::Instantiation { name, reason } => write!(f, "cannot instantiate host class {}: {}", name, reason),
        }
    }
}

impl Error for BridgeError {}

/// Second tier of class resolution: classes the host platform supplies itself.
pub trait HostBridge: Send + Sync
{
    /// `name` is in canonical slash form.
    fn resolve(&self, name: &str) -> Result<HostValue, BridgeError>;
}

type Constructor = fn() -> HostValue;

fn object() -> HostValue
{
    HostValue::new("java/lang/Object", ())
}

fn string() -> HostValue
{
    HostValue::new("java/lang/String", String::new())
}

fn string_builder() -> HostValue
{
    HostValue::new("java/lang/StringBuilder", String::new())
}

fn string_buffer() -> HostValue
{
    HostValue::new("java/lang/StringBuffer", String::new())
}

fn array_list() -> HostValue
{
    HostValue::new("java/util/ArrayList", Vec::<HostValue>::new())
}

fn linked_list() -> HostValue
{
    HostValue::new("java/util/LinkedList", LinkedList::<HostValue>::new())
}

fn hash_map() -> HostValue
{
    HostValue::new("java/util/HashMap", HashMap::<String, HostValue>::new())
}

fn hashtable() -> HostValue
{
    HostValue::new("java/util/Hashtable", HashMap::<String, HostValue>::new())
}

fn hash_set() -> HostValue
{
    HostValue::new("java/util/HashSet", HashSet::<String>::new())
}

fn throwable() -> HostValue
{
    HostValue::new("java/lang/Throwable", String::new())
}

fn exception() -> HostValue
{
    HostValue::new("java/lang/Exception", String::new())
}

fn runtime_exception() -> HostValue
{
    HostValue::new("java/lang/RuntimeException", String::new())
}

/// Host classes known to [`SdkBridge`]. Classes listed without a constructor exist on the
/// host but have no public no-argument constructor.
static SDK_CLASSES: Lazy<HashMap<&'static str, Option<Constructor>>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Option<Constructor>> = HashMap::new();
    m.insert("java/lang/Object", Some(object));
    m.insert("java/lang/String", Some(string));
    m.insert("java/lang/StringBuilder", Some(string_builder));
    m.insert("java/lang/StringBuffer", Some(string_buffer));
    m.insert("java/util/ArrayList", Some(array_list));
    m.insert("java/util/LinkedList", Some(linked_list));
    m.insert("java/util/HashMap", Some(hash_map));
    m.insert("java/util/Hashtable", Some(hashtable));
    m.insert("java/util/HashSet", Some(hash_set));
    m.insert("java/lang/Throwable", Some(throwable));
    m.insert("java/lang/Exception", Some(exception));
    m.insert("java/lang/RuntimeException", Some(runtime_exception));
    for name in [
        "java/lang/Integer",
        "java/lang/Long",
        "java/lang/Boolean",
        "java/lang/Number",
        "java/lang/Class",
        "java/lang/Math",
        "java/lang/System",
    ]
    {
        m.insert(name, None);
    }
    m
});

/// The default bridge: a fixed table of platform classes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdkBridge;

impl HostBridge for SdkBridge
{
    fn resolve(&self, name: &str) -> Result<HostValue, BridgeError>
    {
        match SDK_CLASSES.get(name)
        {
            Some(Some(make)) => Ok(make()),
            Some(None) => Err(BridgeError::Instantiation {
                name: name.to_string(),
                reason: "no accessible no-argument constructor".to_string(),
            }),
            None => Err(BridgeError::NotFound(name.to_string())),
        }
    }
}

/// A bridge that knows no classes, so every unresolved name becomes a placeholder.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBridge;

impl HostBridge for NoBridge
{
    fn resolve(&self, name: &str) -> Result<HostValue, BridgeError>
    {
        Err(BridgeError::NotFound(name.to_string()))
    }
}
