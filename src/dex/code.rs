use log::{trace, warn};
use crate::dex::cursor::ByteCursor;
use crate::dex::error::DexError;
use crate::dex::pools::SymbolPools;
use crate::dex::CATCH_ALL_TYPE;
use crate::model::member::{CodeBody, HandlerEntry, HandlerList, Instructions, TryRange};

/// A try item as stored, with its handler still named by byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawTry
{
    pub start_addr: u32,
    pub end_addr: u32,
    /// Offset of the handler list, relative to the start of `encoded_catch_handler_list`.
    pub handler_off: u16,
}

/// Reads a `code_item` at the cursor position.
pub fn read_code_item(c: &mut ByteCursor<'_>, pools: &SymbolPools) -> Result<CodeBody, DexError>
{
    let registers_size = c.read_u2()?;
    let ins_size = c.read_u2()?;
    let outs_size = c.read_u2()?;
    let tries_size = c.read_u2()?;
    let debug_info_off = c.read_u4()?;
    let insns_size = c.read_u4()?;

    // No preallocation: insns_size is untrusted until the units have been read.
    let mut instructions = Instructions::default();
    for _ in 0..insns_size
    {
        instructions.push(c.read_u2()?);
    }

    let mut body = CodeBody {
        registers_size,
        ins_size,
        outs_size,
        debug_info_off,
        instructions,
        tries: vec![],
        handlers: vec![],
    };
    if tries_size == 0
    {
        return Ok(body);
    }

    if insns_size % 2 != 0
    {
        let padding = c.read_u2()?;
        if padding != 0
        {
            warn!("non-zero code item padding 0x{:04x} at 0x{:x}", padding, c.position() - 2);
        }
    }

    let mut raw = vec![];
    for _ in 0..tries_size
    {
        let start_addr = c.read_u4()?;
        let insn_count = c.read_u2()?;
        let handler_off = c.read_u2()?;
        let end_addr = match start_addr.checked_add(insn_count as u32)
        {
            Some(e) => e,
            None => fail!(Format, "try range 0x{:x}+{} overflows", start_addr, insn_count),
        };
        raw.push(RawTry { start_addr, end_addr, handler_off });
    }

    let (handlers, offsets) = read_handler_lists(c, pools)?;
    let indices = resolve_handler_offsets(&raw, &offsets)?;
    body.tries = raw
        .iter()
        .zip(indices)
        .map(|(t, handler)| TryRange { start_addr: t.start_addr, end_addr: t.end_addr, handler })
        .collect();
    body.handlers = handlers;
    trace!("code item: {} units, {} tries, {} handler lists", insns_size, body.tries.len(), body.handlers.len());
    Ok(body)
}

/// Reads an `encoded_catch_handler_list`, returning the lists together with the offset of
/// each one relative to the start of the whole structure.
pub(crate) fn read_handler_lists(c: &mut ByteCursor<'_>, pools: &SymbolPools) -> Result<(Vec<HandlerList>, Vec<usize>), DexError>
{
    let base = c.position();
    let count = c.read_uleb128()?;
    let mut handlers = vec![];
    let mut offsets = vec![];
    for _ in 0..count
    {
        offsets.push(c.position() - base);
        handlers.push(read_handler_list(c, pools)?);
    }
    Ok((handlers, offsets))
}

fn read_handler_list(c: &mut ByteCursor<'_>, pools: &SymbolPools) -> Result<HandlerList, DexError>
{
    let size = c.read_sleb128()?;
    let has_catch_all = size <= 0;
    let mut entries = vec![];
    for _ in 0..size.unsigned_abs()
    {
        let exception_type = pools.class_name(c.read_uleb128()?)?;
        let address = c.read_uleb128()?;
        entries.push(HandlerEntry { exception_type, address });
    }
    if has_catch_all
    {
        let address = c.read_uleb128()?;
        entries.push(HandlerEntry { exception_type: CATCH_ALL_TYPE.to_string(), address });
    }
    Ok(HandlerList { entries, has_catch_all })
}

/// Maps each try item's handler offset to the index of the list found at that offset.
///
/// Several try items may name the same list; they all get the same index.
pub(crate) fn resolve_handler_offsets(tries: &[RawTry], offsets: &[usize]) -> Result<Vec<usize>, DexError>
{
    let mut indices = Vec::with_capacity(tries.len());
    for t in tries
    {
        match offsets.iter().position(|o| *o == t.handler_off as usize)
        {
            Some(ix) => indices.push(ix),
            None => fail!(
                Format,
                "try range 0x{:x}..0x{:x} names handler offset {} which starts no handler list",
                t.start_addr,
                t.end_addr,
                t.handler_off
            ),
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::error::DexErrorKind;
    use crate::dex::{write_sleb128, write_u2, write_u4, write_uleb128};

    fn pools() -> SymbolPools {
        SymbolPools {
            types: vec!["Ljava/io/IOException;".to_string(), "Ljava/lang/RuntimeException;".to_string()],
            ..SymbolPools::default()
        }
    }

    fn header(bytes: &mut Vec<u8>, tries: u16, units: &[u16]) {
        write_u2(bytes, 3);
        write_u2(bytes, 1);
        write_u2(bytes, 0);
        write_u2(bytes, tries);
        write_u4(bytes, 0);
        write_u4(bytes, units.len() as u32);
        for u in units {
            write_u2(bytes, *u);
        }
    }

    #[test]
    fn body_without_tries() {
        let mut bytes = vec![];
        header(&mut bytes, 0, &[0x0012, 0x000e]);
        let body = read_code_item(&mut ByteCursor::new(&bytes), &pools()).unwrap();
        assert_eq!(body.registers_size, 3);
        assert_eq!(body.ins_size, 1);
        assert_eq!(body.instructions.units, vec![0x0012, 0x000e]);
        assert_eq!(body.instructions.high, vec![0x00, 0x00]);
        assert!(body.tries.is_empty());
        assert!(body.handlers.is_empty());
    }

    #[test]
    fn shared_handler_list_and_catch_all() {
        let mut bytes = vec![];
        // odd unit count, so a pad follows
        header(&mut bytes, 3, &[0x0000, 0x0000, 0x000e]);
        write_u2(&mut bytes, 0);

        // list 0 sits at offset 1 (after the count byte), list 1 after it
        write_u4(&mut bytes, 0);
        write_u2(&mut bytes, 1);
        write_u2(&mut bytes, 1);
        write_u4(&mut bytes, 1);
        write_u2(&mut bytes, 1);
        write_u2(&mut bytes, 4);
        write_u4(&mut bytes, 2);
        write_u2(&mut bytes, 1);
        write_u2(&mut bytes, 1);

        write_uleb128(&mut bytes, 2);
        // list 0: one typed entry
        write_sleb128(&mut bytes, 1);
        write_uleb128(&mut bytes, 0);
        write_uleb128(&mut bytes, 2);
        // list 1: one typed entry plus catch-all
        write_sleb128(&mut bytes, -1);
        write_uleb128(&mut bytes, 1);
        write_uleb128(&mut bytes, 2);
        write_uleb128(&mut bytes, 1);

        let mut c = ByteCursor::new(&bytes);
        let body = read_code_item(&mut c, &pools()).unwrap();
        assert_eq!(c.remaining(), 0);
        assert_eq!(body.tries.len(), 3);
        assert_eq!(body.tries[0].handler, 0);
        assert_eq!(body.tries[2].handler, 0);
        assert_eq!(body.tries[1].handler, 1);
        assert_eq!(body.tries[1].end_addr, 2);
        assert_eq!(body.handlers[0].entries, vec![HandlerEntry { exception_type: "java/io/IOException".to_string(), address: 2 }]);
        assert!(!body.handlers[0].has_catch_all);
        assert_eq!(body.handlers[1].catch_all_addr(), Some(1));
        assert_eq!(body.handlers[1].entries[1].exception_type, CATCH_ALL_TYPE);
        assert_eq!(body.handlers_at(2).map(|h| h.entries.len()), Some(1));
    }

    #[test]
    fn catch_all_only_list() {
        let mut bytes = vec![];
        write_uleb128(&mut bytes, 1);
        write_sleb128(&mut bytes, 0);
        write_uleb128(&mut bytes, 7);
        let (lists, offsets) = read_handler_lists(&mut ByteCursor::new(&bytes), &pools()).unwrap();
        assert_eq!(offsets, vec![1]);
        assert_eq!(lists[0].entries.len(), 1);
        assert_eq!(lists[0].catch_all_addr(), Some(7));
    }

    #[test]
    fn unmatched_offset_is_rejected() {
        let tries = [
            RawTry { start_addr: 0, end_addr: 2, handler_off: 1 },
            RawTry { start_addr: 2, end_addr: 4, handler_off: 3 },
        ];
        assert_eq!(resolve_handler_offsets(&tries[..1], &[1, 5]).unwrap(), vec![0]);
        let e = resolve_handler_offsets(&tries, &[1, 5]).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::Format);
    }

    #[test]
    fn truncated_instructions() {
        let mut bytes = vec![];
        header(&mut bytes, 0, &[0x000e]);
        bytes.truncate(bytes.len() - 1);
        let e = read_code_item(&mut ByteCursor::new(&bytes), &pools()).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::OutOfBounds);
    }
}
