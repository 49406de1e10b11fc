use std::sync::Arc;
use crate::dex::pools::SymbolPools;
use crate::model::class::Class;
use crate::model::member::Method;

/// The interpreter side of the loader: receives initializer frames when classes are bound.
pub trait ExecutionEngine: Send + Sync
{
    /// Queues `method` of `class` on engine thread `thread`.
    ///
    /// Returns false if there is no such thread.
    fn push_frame(&self, thread: usize, class: &Arc<Class>, method: &Method) -> bool;
}

/// Receives the results of loading, for whatever tracks the analysed program.
pub trait ProjectSink: Send + Sync
{
    /// Called once per successful container load.
    fn attach_results(&self, pools: &Arc<SymbolPools>, classes: &[Arc<Class>]);

    /// Called when resolution registers a bridged or synthesized class.
    fn class_added(&self, _class: &Arc<Class>) {}
}
