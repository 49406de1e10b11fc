//! Binary decoding of DEX containers.
//!
//! The primitive readers here work on a byte slice and an index, in the same way every
//! structure reader below uses them through [`cursor::ByteCursor`].

#[macro_use]
pub mod error;

pub(crate) mod leb;
pub mod cursor;
pub mod mutf8;
pub mod header;
pub mod pools;
pub mod encoded_values;
pub mod code;
pub mod class_def;
pub mod reader;

pub use crate::dex::error::{DexError, DexErrorKind};
pub use crate::dex::reader::{DexReader, LoadedDex};

/* Constants */
pub const DEX_FILE_MAGIC: [u8; 8] = [ 0x64, 0x65, 0x78, 0x0a, 0x30, 0x33, 0x35, 0x00 ];
pub const HEADER_SIZE: u32 = 0x70;
pub const ENDIAN_CONSTANT: u32 = 0x12345678;
pub const NO_INDEX: u32 = 0xffffffff;

/// Recorded type of the catch-all entry of a handler list.
pub const CATCH_ALL_TYPE: &str = "java/lang/Throwable";

// Basic type reading
pub(crate) fn read_u1(bytes: &[u8], ix: &mut usize) -> Result<u8, DexError>
{
    if bytes.len() < *ix + 1
    {
        fail!(OutOfBounds, "Unexpected end of stream reading u1 at index {}", *ix);
    }
    let result = bytes[*ix];
    *ix += 1;
    Ok(result)
}

pub(crate) fn read_u2(bytes: &[u8], ix: &mut usize) -> Result<u16, DexError>
{
    if bytes.len() < *ix + 2
    {
        fail!(OutOfBounds, "Unexpected end of stream reading u2 at index {}", *ix);
    }
    let result = ((bytes[*ix + 1] as u16) << 8) | (bytes[*ix] as u16);
    *ix += 2;
    Ok(result)
}

pub(crate) fn read_u4(bytes: &[u8], ix: &mut usize) -> Result<u32, DexError>
{
    if bytes.len() < *ix + 4
    {
        fail!(OutOfBounds, "Unexpected end of stream reading u4 at index {}", *ix);
    }
    let result =
        ((bytes[*ix + 3] as u32) << 24) | ((bytes[*ix + 2] as u32) << 16) | ((bytes[*ix + 1] as u32) << 8) | (bytes[*ix] as u32);
    *ix += 4;
    Ok(result)
}

pub(crate) fn read_uleb128(bytes: &[u8], ix: &mut usize) -> Result<u32, DexError>
{
    match bytes.get(*ix..).and_then(leb::decode_uleb128)
    {
        Some((val, size)) => {
            *ix += size;
            Ok(val)
        }
        None => fail!(OutOfBounds, "Unexpected end of stream reading uleb128 at index {}", *ix),
    }
}

pub(crate) fn read_sleb128(bytes: &[u8], ix: &mut usize) -> Result<i32, DexError>
{
    match bytes.get(*ix..).and_then(leb::decode_sleb128)
    {
        Some((val, size)) => {
            *ix += size;
            Ok(val)
        }
        None => fail!(OutOfBounds, "Unexpected end of stream reading sleb128 at index {}", *ix),
    }
}

pub(crate) fn read_x<'a>(bytes: &'a [u8], ix: &mut usize, length: usize) -> Result<&'a [u8], DexError>
{
    if bytes.len().saturating_sub(*ix) >= length
    {
        let v = &bytes[*ix..*ix + length];
        *ix += length;
        Ok(v)
    }
    else
    {
        fail!(OutOfBounds, "buffer too short for {} byte read at index {}", length, *ix)
    }
}

// Writers, used to assemble containers in tests
#[cfg(test)]
pub(crate) fn write_u1(buffer: &mut Vec<u8>, val: u8) -> usize
{
    buffer.push(val);
    1
}

#[cfg(test)]
pub(crate) fn write_u2(buffer: &mut Vec<u8>, val: u16) -> usize
{
    buffer.push(val as u8);
    buffer.push((val >> 8) as u8);
    2
}

#[cfg(test)]
pub(crate) fn write_u4(buffer: &mut Vec<u8>, val: u32) -> usize
{
    for i in 0..4
    {
        buffer.push((val >> (i * 8)) as u8);
    }
    4
}

#[cfg(test)]
pub(crate) fn write_uleb128(buffer: &mut Vec<u8>, val: u32) -> usize
{
    let encoded = leb::encode_uleb128(val);
    let c = encoded.len();
    buffer.extend(encoded);
    c
}

#[cfg(test)]
pub(crate) fn write_sleb128(buffer: &mut Vec<u8>, val: i32) -> usize
{
    let encoded = leb::encode_sleb128(val);
    let c = encoded.len();
    buffer.extend(encoded);
    c
}

#[cfg(test)]
pub(crate) fn write_x(buffer: &mut Vec<u8>, val: &[u8]) -> usize
{
    let len = val.len();
    buffer.extend(val);
    len
}
