/* Symbol pools: map list, strings, types, prototypes, field ids and method ids */

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use crate::dex::cursor::ByteCursor;
use crate::dex::error::{DexError, ResultExt};
use crate::dex::mutf8::read_mutf8;
use crate::model::descriptor::class_name_from_descriptor;

/// One `map_item` of the map list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapItem
{
    pub item_type: u16,
    pub size: u32,
    pub offset: u32,
}

/// A `field_id_item` with its indices dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef
{
    pub class: String,
    pub type_descriptor: String,
    pub name: String,
}

/// A `method_id_item` with its indices dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef
{
    pub class: String,
    pub descriptor: String,
    pub name: String,
}

/// Everything a container's ids resolve to, indexed the way the container indexes them.
///
/// Built once per load and owned by that load's result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPools
{
    pub map: Vec<MapItem>,
    /// String ids pointing at the same string data share one allocation.
    pub strings: Vec<Arc<str>>,
    /// Type descriptors, e.g. `Ljava/lang/String;`.
    pub types: Vec<String>,
    /// Method prototypes as `(params)return` descriptors.
    pub descriptors: Vec<String>,
    pub fields: Vec<FieldRef>,
    pub methods: Vec<MethodRef>,
    /// Classes defined by the container, in container order.
    pub class_names: Vec<String>,
}

fn lookup<'p, T>(pool: &'p [T], idx: u32, what: &str) -> Result<&'p T, DexError>
{
    pool.get(idx as usize)
        .ok_or_else(|| err!(Format, "{} index {} out of range ({} entries)", what, idx, pool.len()))
}

impl SymbolPools
{
    pub fn string(&self, idx: u32) -> Result<&str, DexError>
    {
        lookup(&self.strings, idx, "string").map(|s| s.as_ref())
    }

    pub fn type_descriptor(&self, idx: u32) -> Result<&str, DexError>
    {
        lookup(&self.types, idx, "type").map(|s| s.as_str())
    }

    /// Class name of a type, `Lcom/a/B;` as `com/a/B`.
    pub fn class_name(&self, idx: u32) -> Result<String, DexError>
    {
        self.type_descriptor(idx).map(class_name_from_descriptor)
    }

    pub fn descriptor(&self, idx: u32) -> Result<&str, DexError>
    {
        lookup(&self.descriptors, idx, "prototype").map(|s| s.as_str())
    }

    pub fn field(&self, idx: u32) -> Result<&FieldRef, DexError>
    {
        lookup(&self.fields, idx, "field")
    }

    pub fn method(&self, idx: u32) -> Result<&MethodRef, DexError>
    {
        lookup(&self.methods, idx, "method")
    }

    /// Reads `map_off` and the map list it points at.
    pub(crate) fn read_map(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let offset = c.read_u4()?;
        if offset == 0
        {
            fail!(Format, "container has no map list");
        }
        let map = c.at(offset as usize, |c| {
            let count = c.read_u4()?;
            if count == 0
            {
                fail!(Format, "map list at 0x{:x} is empty", offset);
            }
            let mut items = vec![];
            for _ in 0..count
            {
                let item_type = c.read_u2()?;
                c.skip(2)?;
                let size = c.read_u4()?;
                let item_offset = c.read_u4()?;
                if item_offset as usize > c.len()
                {
                    warn!("map item 0x{:04x} points past the end of the file (0x{:x})", item_type, item_offset);
                }
                items.push(MapItem { item_type, size, offset: item_offset });
            }
            Ok(items)
        })?;
        debug!("map list: {} items", map.len());
        self.map = map;
        Ok(())
    }

    pub(crate) fn read_strings(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let count = c.read_u4()?;
        let offset = c.read_u4()?;
        let strings = c.at(offset as usize, |c| {
            let mut strings = vec![];
            let mut decoded: HashMap<u32, Arc<str>> = HashMap::new();
            for i in 0..count
            {
                let data_off = c.read_u4()?;
                if let Some(s) = decoded.get(&data_off)
                {
                    strings.push(s.clone());
                    continue;
                }
                let s: Arc<str> = c
                    .at(data_off as usize, |c| {
                        let utf16_size = c.read_uleb128()?;
                        read_mutf8(c, utf16_size)
                    })
                    .context(|| format!("string_ids[{}] at 0x{:x}", i, data_off))?
                    .into();
                decoded.insert(data_off, s.clone());
                strings.push(s);
            }
            Ok(strings)
        })?;
        debug!("{} strings", strings.len());
        self.strings = strings;
        Ok(())
    }

    pub(crate) fn read_types(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let count = c.read_u4()?;
        let offset = c.read_u4()?;
        let types = c.at(offset as usize, |c| {
            let mut types = vec![];
            for i in 0..count
            {
                let string_idx = c.read_u4()?;
                let t = self.string(string_idx).context(|| format!("type_ids[{}]", i))?;
                types.push(t.to_string());
            }
            Ok(types)
        })?;
        debug!("{} types", types.len());
        self.types = types;
        Ok(())
    }

    pub(crate) fn read_descriptors(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let count = c.read_u4()?;
        let offset = c.read_u4()?;
        let descriptors = c.at(offset as usize, |c| {
            let mut descriptors = vec![];
            for i in 0..count
            {
                let d = self.read_descriptor(c).context(|| format!("proto_ids[{}]", i))?;
                descriptors.push(d);
            }
            Ok(descriptors)
        })?;
        debug!("{} prototypes", descriptors.len());
        self.descriptors = descriptors;
        Ok(())
    }

    fn read_descriptor(&self, c: &mut ByteCursor<'_>) -> Result<String, DexError>
    {
        // shorty_idx
        c.skip(4)?;
        let return_type = self.type_descriptor(c.read_u4()?)?;
        let parameters_off = c.read_u4()?;

        let mut buffer = String::from("(");
        if parameters_off != 0
        {
            c.at(parameters_off as usize, |c| {
                let size = c.read_u4()?;
                for _ in 0..size
                {
                    buffer.push_str(self.type_descriptor(c.read_u2()? as u32)?);
                }
                Ok(())
            })?;
        }
        buffer.push(')');
        buffer.push_str(return_type);
        Ok(buffer)
    }

    pub(crate) fn read_fields(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let count = c.read_u4()?;
        let offset = c.read_u4()?;
        if offset == 0
        {
            return Ok(());
        }
        let fields = c.at(offset as usize, |c| {
            let mut fields = vec![];
            for i in 0..count
            {
                let f = self.read_field_id(c).context(|| format!("field_ids[{}]", i))?;
                fields.push(f);
            }
            Ok(fields)
        })?;
        debug!("{} field ids", fields.len());
        self.fields = fields;
        Ok(())
    }

    fn read_field_id(&self, c: &mut ByteCursor<'_>) -> Result<FieldRef, DexError>
    {
        let class = self.class_name(c.read_u2()? as u32)?;
        let type_descriptor = self.type_descriptor(c.read_u2()? as u32)?.to_string();
        let name = self.string(c.read_u4()?)?.to_string();
        Ok(FieldRef { class, type_descriptor, name })
    }

    pub(crate) fn read_methods(&mut self, c: &mut ByteCursor<'_>) -> Result<(), DexError>
    {
        let count = c.read_u4()?;
        let offset = c.read_u4()?;
        if offset == 0
        {
            return Ok(());
        }
        let methods = c.at(offset as usize, |c| {
            let mut methods = vec![];
            for i in 0..count
            {
                let m = self.read_method_id(c).context(|| format!("method_ids[{}]", i))?;
                methods.push(m);
            }
            Ok(methods)
        })?;
        debug!("{} method ids", methods.len());
        self.methods = methods;
        Ok(())
    }

    fn read_method_id(&self, c: &mut ByteCursor<'_>) -> Result<MethodRef, DexError>
    {
        let class = self.class_name(c.read_u2()? as u32)?;
        let descriptor = self.descriptor(c.read_u2()? as u32)?.to_string();
        let name = self.string(c.read_u4()?)?.to_string();
        Ok(MethodRef { class, descriptor, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::error::DexErrorKind;

    fn pools() -> SymbolPools {
        SymbolPools {
            strings: vec!["I".into(), "Lcom/a/B;".into(), "count".into()],
            types: vec!["I".to_string(), "Lcom/a/B;".to_string()],
            ..SymbolPools::default()
        }
    }

    #[test]
    fn lookups_check_ranges() {
        let p = pools();
        assert_eq!(p.string(2).unwrap(), "count");
        assert_eq!(p.class_name(1).unwrap(), "com/a/B");
        assert_eq!(p.type_descriptor(2).unwrap_err().kind(), DexErrorKind::Format);
        assert!(p.field(0).is_err());
        assert!(p.method(u32::MAX).is_err());
    }

    #[test]
    fn reads_field_ids() {
        let mut p = pools();
        // count, offset, then one field_id_item at 8
        let bytes = [1, 0, 0, 0, 8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0];
        let mut c = ByteCursor::new(&bytes);
        p.read_fields(&mut c).unwrap();
        assert_eq!(c.position(), 8);
        assert_eq!(c.depth(), 0);
        assert_eq!(
            p.fields,
            vec![FieldRef { class: "com/a/B".to_string(), type_descriptor: "I".to_string(), name: "count".to_string() }]
        );
    }

    #[test]
    fn bad_field_index_names_the_entry() {
        let mut p = pools();
        let bytes = [1, 0, 0, 0, 8, 0, 0, 0, 9, 0, 0, 0, 2, 0, 0, 0];
        let e = p.read_fields(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::Format);
        assert_eq!(e.contexts(), &["field_ids[0]".to_string()]);
    }

    #[test]
    fn string_ids_with_one_data_offset_share_the_string() {
        let mut p = SymbolPools::default();
        // count, offset, two string_id_items both pointing at 16, then the string data
        let bytes = [2, 0, 0, 0, 8, 0, 0, 0, 16, 0, 0, 0, 16, 0, 0, 0, 3, b'a', b'b', b'c', 0];
        let mut c = ByteCursor::new(&bytes);
        p.read_strings(&mut c).unwrap();
        assert_eq!(c.depth(), 0);
        assert_eq!(p.string(0).unwrap(), "abc");
        assert_eq!(p.string(1).unwrap(), "abc");
        assert!(Arc::ptr_eq(&p.strings[0], &p.strings[1]));
    }
}
