//! Class resolution over a loaded container.
//!
//! [`DexLoader`] owns the class registry. [`DexLoader::load_classes`] fills it from a
//! container and [`DexLoader::load`] answers any class name with, in order of preference,
//! a class read from the container, a class bridged from the host platform, or a
//! placeholder synthesized on the spot. Lookups by name never fail.

pub mod config;
pub mod engine;
pub mod host;
pub mod registry;

use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use crate::dex::error::DexError;
use crate::dex::pools::SymbolPools;
use crate::dex::reader::DexReader;
use crate::model::class::{Class, ClassKind};
use crate::model::descriptor::canonical_class_name;
use crate::model::flags::AccessFlags;
use crate::model::member::Field;

pub use crate::loader::config::LoaderConfig;
pub use crate::loader::engine::{ExecutionEngine, ProjectSink};
pub use crate::loader::host::{BridgeError, HostBridge, HostValue, NoBridge, SdkBridge};
pub use crate::loader::registry::ClassRegistry;

/// Name and descriptor of the method scheduled when a class is bound.
pub const INITIALIZER_NAME: &str = "<init>";
pub const INITIALIZER_DESCRIPTOR: &str = "()V";

/// The universal root of the class hierarchy. It alone has no superclass.
pub const ROOT_CLASS: &str = "java/lang/Object";

const PLACEHOLDER_FIELD_TYPE: &str = "Ljava/lang/Object;";

pub struct DexLoader
{
    config: LoaderConfig,
    registry: ClassRegistry,
    pools: RwLock<Option<Arc<SymbolPools>>>,
    load_lock: Mutex<()>,
    bridge: Box<dyn HostBridge>,
    engine: Option<Arc<dyn ExecutionEngine>>,
    project: Option<Arc<dyn ProjectSink>>,
}

impl Default for DexLoader
{
    fn default() -> Self
    {
        DexLoader::new(LoaderConfig::default())
    }
}

impl DexLoader
{
    pub fn new(config: LoaderConfig) -> Self
    {
        DexLoader {
            config,
            registry: ClassRegistry::new(),
            pools: RwLock::new(None),
            load_lock: Mutex::new(()),
            bridge: Box::new(SdkBridge),
            engine: None,
            project: None,
        }
    }

    pub fn with_bridge(mut self, bridge: impl HostBridge + 'static) -> Self
    {
        self.bridge = Box::new(bridge);
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn ExecutionEngine>) -> Self
    {
        self.engine = Some(engine);
        self
    }

    pub fn with_project(mut self, project: Arc<dyn ProjectSink>) -> Self
    {
        self.project = Some(project);
        self
    }

    pub fn config(&self) -> &LoaderConfig
    {
        &self.config
    }

    /// Reads a container and makes its classes the registry's contents.
    ///
    /// Loads are serialized. On failure the registry is left empty, never half filled.
    pub fn load_classes(&self, bytes: &[u8]) -> Result<Vec<Arc<Class>>, DexError>
    {
        let _guard = self.load_lock.lock();
        let loaded = match DexReader::with_max_depth(bytes, self.config.max_offset_depth).read()
        {
            Ok(l) => l,
            Err(e) => {
                error!("failed to load container: {}", e);
                self.registry.clear();
                *self.pools.write() = None;
                return Err(e);
            }
        };

        let pools = Arc::new(loaded.pools);
        let classes = self.registry.replace_all(loaded.classes);
        *self.pools.write() = Some(pools.clone());
        info!("registered {} classes", classes.len());

        if let Some(project) = &self.project
        {
            project.attach_results(&pools, &classes);
        }
        Ok(classes)
    }

    /// Resolves `name`, dotted or slashed, to a class. Never fails.
    ///
    /// The first call for a name fixes its class for the life of the registry; later calls
    /// return that same class.
    pub fn load(&self, name: &str) -> Arc<Class>
    {
        let name = canonical_class_name(name);
        let (class, created) = self.registry.get_or_insert_with(&name, || self.find_class(&name));
        if created
        {
            if let Some(project) = &self.project
            {
                project.class_added(&class);
            }
        }
        if self.config.bind_on_load && !class.is_fake() && class.mark_bound()
        {
            self.schedule_initializer(&class);
        }
        class
    }

    /// Registered class of that name, without resolving anything.
    pub fn class(&self, name: &str) -> Option<Arc<Class>>
    {
        self.registry.get(&canonical_class_name(name))
    }

    /// Container classes in container order, then resolved classes in resolution order.
    pub fn classes(&self) -> Vec<Arc<Class>>
    {
        self.registry.classes()
    }

    /// Pools of the last container loaded successfully.
    pub fn pools(&self) -> Option<Arc<SymbolPools>>
    {
        self.pools.read().clone()
    }

    /// Builds the class for a name the registry does not have: bridged if the host can
    /// supply it, a placeholder otherwise.
    fn find_class(&self, name: &str) -> Class
    {
        match self.bridge.resolve(name)
        {
            Ok(value) => {
                debug!("bridged host class {}", name);
                let mut class = Class::new(name, ClassKind::Bridged(value));
                class.access_flags = AccessFlags::PUBLIC;
                class.super_class = self.root_super(name);
                return class;
            }
            Err(e @ BridgeError::NotFound(_)) => debug!("{}", e),
            Err(e @ BridgeError::Instantiation { .. }) => error!("{}", e),
        }
        self.placeholder(name)
    }

    /// Superclass given to classes the container does not define. A custom synthetic root
    /// hangs off the universal root rather than off itself.
    fn root_super(&self, name: &str) -> Option<String>
    {
        if name == ROOT_CLASS
        {
            None
        }
        else if name == self.config.synthetic_root
        {
            Some(ROOT_CLASS.to_string())
        }
        else
        {
            Some(self.config.synthetic_root.clone())
        }
    }

    fn placeholder(&self, name: &str) -> Class
    {
        debug!("synthesizing placeholder for {}", name);
        let outer = name.split_once('$').map(|(outer, _)| outer.to_string());
        let mut class = Class::new(name, ClassKind::Placeholder { outer: outer.clone() });
        class.access_flags = AccessFlags::PUBLIC | AccessFlags::SYNTHETIC;
        class.super_class = self.root_super(name);

        if let Some((_, inner)) = name.split_once('$')
        {
            class.instance_fields = inner
                .split('$')
                .filter(|s| !s.is_empty())
                .map(|segment| Field {
                    class: name.to_string(),
                    name: segment.to_string(),
                    type_descriptor: PLACEHOLDER_FIELD_TYPE.to_string(),
                    is_instance: true,
                    access_flags: AccessFlags::SYNTHETIC,
                    initial_value: None,
                })
                .collect();
        }
        class
    }

    fn schedule_initializer(&self, class: &Arc<Class>)
    {
        let Some(init) = class.direct_method(INITIALIZER_NAME, INITIALIZER_DESCRIPTOR) else {
            return;
        };
        if !init.has_code()
        {
            return;
        }
        let Some(engine) = &self.engine else {
            return;
        };
        if engine.push_frame(self.config.initializer_thread, class, init)
        {
            debug!("scheduled {}.{}{}", class.name, INITIALIZER_NAME, INITIALIZER_DESCRIPTOR);
        }
        else
        {
            warn!("no engine thread {} to initialize {}", self.config.initializer_thread, class.name);
        }
    }
}
