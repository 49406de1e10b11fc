use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use crate::dex::code::read_code_item;
use crate::dex::cursor::ByteCursor;
use crate::dex::encoded_values::read_static_value;
use crate::dex::error::{DexError, ResultExt};
use crate::dex::pools::SymbolPools;
use crate::dex::NO_INDEX;
use crate::model::class::{Class, ClassKind};
use crate::model::flags::AccessFlags;
use crate::model::member::{CodeBody, Field, Method};

/// Code bodies already decoded during one load, by `code_item` offset.
type CodeCache = HashMap<u32, Arc<CodeBody>>;

/// Reads the class_defs count and offset at the cursor and every class they describe.
pub fn read_class_defs(c: &mut ByteCursor<'_>, pools: &SymbolPools) -> Result<Vec<Class>, DexError>
{
    let count = c.read_u4()?;
    let offset = c.read_u4()?;
    if offset == 0
    {
        return Ok(vec![]);
    }
    c.at(offset as usize, |c| {
        let mut classes = vec![];
        let mut codes = CodeCache::new();
        for i in 0..count
        {
            let class = read_class_def(c, pools, &mut codes).context(|| format!("class_defs[{}]", i))?;
            debug!("class {}: {} fields, {} methods", class.name, class.fields().count(), class.methods().count());
            classes.push(class);
        }
        Ok(classes)
    })
}

fn read_class_def(c: &mut ByteCursor<'_>, pools: &SymbolPools, codes: &mut CodeCache) -> Result<Class, DexError>
{
    let name = pools.class_name(c.read_u4()?)?;
    let mut class = Class::new(name, ClassKind::Defined);
    read_class_body(c, pools, &mut class, codes).context(|| class.name.clone())?;
    Ok(class)
}

fn read_class_body(
    c: &mut ByteCursor<'_>,
    pools: &SymbolPools,
    class: &mut Class,
    codes: &mut CodeCache,
) -> Result<(), DexError>
{
    class.access_flags = AccessFlags::from_raw(c.read_u4()?);
    class.is_interface = class.access_flags.is_interface_like();

    let superclass_idx = c.read_u4()?;
    class.super_class = if superclass_idx == NO_INDEX { None } else { Some(pools.class_name(superclass_idx)?) };

    let interfaces_off = c.read_u4()?;
    if interfaces_off != 0
    {
        class.interfaces = c.at(interfaces_off as usize, |c| {
            let size = c.read_u4()?;
            let mut interfaces = vec![];
            for _ in 0..size
            {
                interfaces.push(pools.class_name(c.read_u2()? as u32)?);
            }
            Ok(interfaces)
        })?;
    }

    let source_file_idx = c.read_u4()?;
    class.source_file = read_source_file(pools, source_file_idx, &class.name);

    // annotations_off
    c.skip(4)?;

    let class_data_off = c.read_u4()?;
    if class_data_off != 0
    {
        c.at(class_data_off as usize, |c| read_class_data(c, pools, class, codes)).context(|| "class_data")?;
    }

    let static_values_off = c.read_u4()?;
    if static_values_off != 0
    {
        c.at(static_values_off as usize, |c| read_static_values(c, pools, class)).context(|| "static values")?;
    }
    Ok(())
}

fn read_source_file(pools: &SymbolPools, idx: u32, class: &str) -> Option<String>
{
    if idx == NO_INDEX
    {
        return None;
    }
    match pools.string(idx)
    {
        Ok(s) => Some(s.to_string()),
        Err(e) => {
            warn!("ignoring source file of {}: {}", class, e);
            None
        }
    }
}

fn read_class_data(
    c: &mut ByteCursor<'_>,
    pools: &SymbolPools,
    class: &mut Class,
    codes: &mut CodeCache,
) -> Result<(), DexError>
{
    let static_fields_size = c.read_uleb128()?;
    let instance_fields_size = c.read_uleb128()?;
    let direct_methods_size = c.read_uleb128()?;
    let virtual_methods_size = c.read_uleb128()?;

    class.static_fields = read_fields(c, pools, static_fields_size, false).context(|| "static fields")?;
    class.instance_fields = read_fields(c, pools, instance_fields_size, true).context(|| "instance fields")?;
    class.direct_methods = read_methods(c, pools, direct_methods_size, codes).context(|| "direct methods")?;
    class.virtual_methods = read_methods(c, pools, virtual_methods_size, codes).context(|| "virtual methods")?;
    Ok(())
}

/// Accumulates a delta encoded index: the first entry is absolute, later ones add to the previous.
fn next_index(previous: Option<u32>, diff: u32) -> Result<u32, DexError>
{
    match previous
    {
        None => Ok(diff),
        Some(p) => match p.checked_add(diff)
        {
            Some(ix) => Ok(ix),
            None => fail!(Format, "index delta {} overflows after {}", diff, p),
        },
    }
}

fn read_fields(c: &mut ByteCursor<'_>, pools: &SymbolPools, size: u32, is_instance: bool) -> Result<Vec<Field>, DexError>
{
    let mut fields = vec![];
    let mut index = None;
    for _ in 0..size
    {
        let field_idx = next_index(index, c.read_uleb128()?)?;
        index = Some(field_idx);
        let access_flags = AccessFlags::from_raw(c.read_uleb128()?);
        let id = pools.field(field_idx)?;
        fields.push(Field {
            class: id.class.clone(),
            name: id.name.clone(),
            type_descriptor: id.type_descriptor.clone(),
            is_instance,
            access_flags,
            initial_value: None,
        });
    }
    Ok(fields)
}

fn read_methods(c: &mut ByteCursor<'_>, pools: &SymbolPools, size: u32, codes: &mut CodeCache) -> Result<Vec<Method>, DexError>
{
    let mut methods = vec![];
    let mut index = None;
    for _ in 0..size
    {
        let method_idx = next_index(index, c.read_uleb128()?)?;
        index = Some(method_idx);
        let access_flags = AccessFlags::from_raw(c.read_uleb128()?);
        let code_off = c.read_uleb128()?;
        let id = pools.method(method_idx)?;

        let code = if code_off == 0
        {
            None
        }
        else if let Some(body) = codes.get(&code_off)
        {
            Some(body.clone())
        }
        else
        {
            let body = Arc::new(
                c.at(code_off as usize, |c| read_code_item(c, pools))
                    .context(|| format!("code of {}{}", id.name, id.descriptor))?,
            );
            codes.insert(code_off, body.clone());
            Some(body)
        };

        methods.push(Method {
            class: id.class.clone(),
            name: id.name.clone(),
            descriptor: id.descriptor.clone(),
            access_flags,
            is_instance: !access_flags.contains(AccessFlags::STATIC),
            is_synchronized: access_flags.contains(AccessFlags::SYNCHRONIZED),
            code,
        });
    }
    Ok(methods)
}

/// Applies an `encoded_array` of initial values, in order, to the static fields.
fn read_static_values(c: &mut ByteCursor<'_>, pools: &SymbolPools, class: &mut Class) -> Result<(), DexError>
{
    let size = c.read_uleb128()?;
    for j in 0..size as usize
    {
        let value = read_static_value(c, pools).context(|| format!("static value {}", j))?;
        match class.static_fields.get_mut(j)
        {
            Some(field) => field.initial_value = Some(value),
            None => fail!(Format, "static value {} has no static field ({} declared)", j, class.static_fields.len()),
        }
    }
    Ok(())
}
