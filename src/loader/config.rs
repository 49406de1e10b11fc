use serde::{Deserialize, Serialize};
use crate::dex::cursor::DEFAULT_MAX_OFFSET_DEPTH;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig
{
    /// Superclass given to bridged host classes other than the hierarchy root.
    pub synthetic_root: String,
    /// Engine thread that runs class initializers.
    pub initializer_thread: usize,
    /// Deepest offset nesting accepted while reading a container.
    pub max_offset_depth: usize,
    /// Whether `load` schedules initializers.
    pub bind_on_load: bool,
}

impl Default for LoaderConfig
{
    fn default() -> Self
    {
        LoaderConfig {
            synthetic_root: "java/lang/Object".to_string(),
            initializer_thread: 0,
            max_offset_depth: DEFAULT_MAX_OFFSET_DEPTH,
            bind_on_load: true,
        }
    }
}
