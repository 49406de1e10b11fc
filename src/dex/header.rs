use log::debug;
use serde::{Deserialize, Serialize};
use crate::dex::cursor::ByteCursor;
use crate::dex::error::DexError;
use crate::dex::{DEX_FILE_MAGIC, ENDIAN_CONSTANT, HEADER_SIZE};

/// The validated part of `header_item`.
///
/// Checksum and signature are skipped without verification, the section sizes and offsets
/// that follow the link section are read by the pool loaders as they go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header
{
    pub magic: [u8; 8],
    pub file_size: u32,
    pub header_size: u32,
    pub endian_tag: u32,
}

impl Header
{
    /// Reads and checks the header up to and including the link section.
    ///
    /// Checks run in file order and stop at the first mismatch, so a bad magic is reported
    /// before anything past the first eight bytes is looked at.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Header, DexError>
    {
        let mut magic = [0u8; 8];
        for (i, expected) in DEX_FILE_MAGIC.iter().enumerate()
        {
            let b = cursor.read_u1()?;
            if b != *expected
            {
                fail!(Format, "illegal magic number: byte {} is 0x{:02x}, expected 0x{:02x}", i, b, expected);
            }
            magic[i] = b;
        }

        debug!("checksum skipping data block...");
        cursor.skip(4)?;
        debug!("SHA-1 signature skipping data block...");
        cursor.skip(20)?;

        let file_size = cursor.read_u4()?;
        if file_size as usize != cursor.len()
        {
            fail!(Format, "illegal file size {} in header, buffer holds {} bytes", file_size, cursor.len());
        }

        let header_size = cursor.read_u4()?;
        if header_size != HEADER_SIZE
        {
            fail!(Format, "illegal header size 0x{:x}", header_size);
        }

        let endian_tag = cursor.read_u4()?;
        if endian_tag != ENDIAN_CONSTANT
        {
            fail!(Format, "illegal endian tag 0x{:08x}", endian_tag);
        }

        let link_size = cursor.read_u4()?;
        if link_size != 0
        {
            fail!(Format, "illegal link size {}, link sections are not supported", link_size);
        }
        let link_off = cursor.read_u4()?;
        if link_off != 0
        {
            fail!(Format, "illegal link offset 0x{:x}, link sections are not supported", link_off);
        }

        Ok(Header { magic, file_size, header_size, endian_tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::error::DexErrorKind;
    use crate::dex::write_u4;

    fn header_bytes(total: usize) -> Vec<u8> {
        let mut b = DEX_FILE_MAGIC.to_vec();
        b.extend([0u8; 24]);
        write_u4(&mut b, total as u32);
        write_u4(&mut b, HEADER_SIZE);
        write_u4(&mut b, ENDIAN_CONSTANT);
        write_u4(&mut b, 0);
        write_u4(&mut b, 0);
        b.resize(total, 0);
        b
    }

    #[test]
    fn accepts_valid_header() {
        let bytes = header_bytes(0x70);
        let mut c = ByteCursor::new(&bytes);
        let h = Header::read(&mut c).unwrap();
        assert_eq!(h.magic, DEX_FILE_MAGIC);
        assert_eq!(h.file_size, 0x70);
        assert_eq!(c.position(), 0x34);
    }

    #[test]
    fn rejects_bad_magic_without_reading_further() {
        let mut bytes = header_bytes(0x70);
        bytes[5] = b'3';
        bytes[6] = b'9';
        let mut c = ByteCursor::new(&bytes);
        let e = Header::read(&mut c).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::Format);
        assert!(c.position() <= 8);

        // a short buffer with the wrong first byte fails on the magic, not on its length
        let mut c = ByteCursor::new(b"pk");
        assert_eq!(Header::read(&mut c).unwrap_err().kind(), DexErrorKind::Format);
    }

    #[test]
    fn rejects_size_mismatches() {
        let mut bytes = header_bytes(0x70);
        bytes.push(0);
        let e = Header::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(e.message().contains("file size"));

        let mut bytes = header_bytes(0x70);
        bytes[0x24] = 0x78;
        let e = Header::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(e.message().contains("header size"));
    }

    #[test]
    fn rejects_reversed_endian_and_link_sections() {
        let mut bytes = header_bytes(0x70);
        bytes[0x28..0x2C].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
        let e = Header::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(e.message().contains("endian"));

        let mut bytes = header_bytes(0x70);
        bytes[0x2C] = 1;
        let e = Header::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(e.message().contains("link size"));

        let mut bytes = header_bytes(0x70);
        bytes[0x30] = 0x70;
        let e = Header::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(e.message().contains("link offset"));
    }

    #[test]
    fn truncated_header_is_out_of_bounds() {
        let bytes = header_bytes(0x70);
        let e = Header::read(&mut ByteCursor::new(&bytes[..0x22])).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::OutOfBounds);
    }
}
