use log::info;
use serde::Serialize;
use crate::dex::class_def::read_class_defs;
use crate::dex::cursor::{ByteCursor, DEFAULT_MAX_OFFSET_DEPTH};
use crate::dex::error::{DexError, ResultExt};
use crate::dex::header::Header;
use crate::dex::pools::SymbolPools;
use crate::model::class::Class;

/// Result of reading one container.
#[derive(Debug, Serialize)]
pub struct LoadedDex
{
    pub header: Header,
    pub pools: SymbolPools,
    /// Classes in container order.
    pub classes: Vec<Class>,
}

/// Reads a whole container in one pass over its sections.
///
/// Either every section is read and the result is complete, or an error names the first
/// structural check that failed. Nothing partial is ever returned.
pub struct DexReader<'a>
{
    cursor: ByteCursor<'a>,
}

impl<'a> DexReader<'a>
{
    pub fn new(bytes: &'a [u8]) -> Self
    {
        Self::with_max_depth(bytes, DEFAULT_MAX_OFFSET_DEPTH)
    }

    pub fn with_max_depth(bytes: &'a [u8], max_depth: usize) -> Self
    {
        DexReader { cursor: ByteCursor::with_max_depth(bytes, max_depth) }
    }

    pub fn read(mut self) -> Result<LoadedDex, DexError>
    {
        let c = &mut self.cursor;
        info!("reading dex container of {} bytes", c.len());

        let header = Header::read(c).context(|| "header")?;
        let mut pools = SymbolPools::default();
        pools.read_map(c).context(|| "map list")?;
        pools.read_strings(c).context(|| "string_ids")?;
        pools.read_types(c).context(|| "type_ids")?;
        pools.read_descriptors(c).context(|| "proto_ids")?;
        pools.read_fields(c).context(|| "field_ids")?;
        pools.read_methods(c).context(|| "method_ids")?;
        let classes = read_class_defs(c, &pools)?;
        pools.class_names = classes.iter().map(|cls| cls.name.clone()).collect();

        if c.depth() != 0
        {
            fail!(Internal, "{} offsets left on the stack after reading", c.depth());
        }
        info!("read {} classes, {} strings, {} methods", classes.len(), pools.strings.len(), pools.methods.len());
        Ok(LoadedDex { header, pools, classes })
    }
}
