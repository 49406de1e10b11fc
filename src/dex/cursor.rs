use crate::dex::error::DexError;
use crate::dex::{read_sleb128, read_u1, read_u2, read_u4, read_uleb128, read_x};

/// Default depth limit of the offset stack.
pub const DEFAULT_MAX_OFFSET_DEPTH: usize = 64;

/// A read position over a container held fully in memory, plus the stack of positions
/// saved while the reader follows offsets into other sections.
///
/// The cursor is the only thing that moves the position. Every read advances it by
/// exactly the number of bytes consumed and fails instead of reading past the end.
#[derive(Debug)]
pub struct ByteCursor<'a>
{
    bytes: &'a [u8],
    position: usize,
    saved: Vec<usize>,
    max_depth: usize,
}

impl<'a> ByteCursor<'a>
{
    pub fn new(bytes: &'a [u8]) -> Self
    {
        Self::with_max_depth(bytes, DEFAULT_MAX_OFFSET_DEPTH)
    }

    pub fn with_max_depth(bytes: &'a [u8], max_depth: usize) -> Self
    {
        ByteCursor { bytes, position: 0, saved: Vec::new(), max_depth }
    }

    pub fn position(&self) -> usize
    {
        self.position
    }

    pub fn len(&self) -> usize
    {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.bytes.is_empty()
    }

    /// Bytes left between the position and the end of the buffer.
    pub fn remaining(&self) -> usize
    {
        self.bytes.len() - self.position
    }

    /// Number of saved positions.
    pub fn depth(&self) -> usize
    {
        self.saved.len()
    }

    pub fn read_u1(&mut self) -> Result<u8, DexError>
    {
        read_u1(self.bytes, &mut self.position)
    }

    pub fn read_u2(&mut self) -> Result<u16, DexError>
    {
        read_u2(self.bytes, &mut self.position)
    }

    pub fn read_u4(&mut self) -> Result<u32, DexError>
    {
        read_u4(self.bytes, &mut self.position)
    }

    pub fn read_uleb128(&mut self) -> Result<u32, DexError>
    {
        read_uleb128(self.bytes, &mut self.position)
    }

    pub fn read_sleb128(&mut self) -> Result<i32, DexError>
    {
        read_sleb128(self.bytes, &mut self.position)
    }

    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], DexError>
    {
        read_x(self.bytes, &mut self.position, length)
    }

    /// Reads `width` bytes little endian and sign extends the result from the top bit read.
    pub fn read_signed(&mut self, width: usize) -> Result<i64, DexError>
    {
        if width == 0 || width > 8
        {
            fail!(Format, "invalid signed value width {}", width);
        }
        let raw = self.read_unsigned(width)?;
        let shift = 64 - 8 * width as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Reads `width` bytes little endian, zero extended.
    pub fn read_unsigned(&mut self, width: usize) -> Result<u64, DexError>
    {
        if width == 0 || width > 8
        {
            fail!(Format, "invalid unsigned value width {}", width);
        }
        let mut value: u64 = 0;
        for (i, b) in self.read_bytes(width)?.iter().enumerate()
        {
            value |= (*b as u64) << (8 * i);
        }
        Ok(value)
    }

    /// Reads `width` bytes as the most significant bytes of a `total` byte value.
    ///
    /// Floating point constants are stored this way, with the low order bytes dropped.
    pub fn read_right_extended(&mut self, width: usize, total: usize) -> Result<u64, DexError>
    {
        if width == 0 || width > total || total > 8
        {
            fail!(Format, "invalid value width {} for a {} byte value", width, total);
        }
        let value = self.read_unsigned(width)?;
        Ok(value << (8 * (total - width) as u32))
    }

    pub fn skip(&mut self, count: usize) -> Result<(), DexError>
    {
        self.read_bytes(count).map(|_| ())
    }

    /// Saves the current position and jumps to `offset`.
    pub fn push_offset(&mut self, offset: usize) -> Result<(), DexError>
    {
        if offset > self.bytes.len()
        {
            fail!(OutOfBounds, "offset 0x{:x} is beyond the end of a 0x{:x} byte buffer", offset, self.bytes.len());
        }
        if self.saved.len() >= self.max_depth
        {
            fail!(ResourceLimit, "offset stack is deeper than {} entries", self.max_depth);
        }
        self.saved.push(self.position);
        self.position = offset;
        Ok(())
    }

    /// Returns to the position saved by the matching [`ByteCursor::push_offset`].
    pub fn pop_offset(&mut self) -> Result<(), DexError>
    {
        match self.saved.pop()
        {
            Some(p) => {
                self.position = p;
                Ok(())
            }
            None => fail!(Internal, "offset stack popped while empty at 0x{:x}", self.position),
        }
    }

    /// Runs `read` at `offset` and comes back to the current position afterwards,
    /// whether or not `read` succeeded.
    pub fn at<T>(&mut self, offset: usize, read: impl FnOnce(&mut Self) -> Result<T, DexError>) -> Result<T, DexError>
    {
        self.push_offset(offset)?;
        let result = read(self);
        self.pop_offset()?;
        result
    }
}
