/* Modified UTF-8 as stored in string_data_item */

use log::warn;
use crate::dex::cursor::ByteCursor;
use crate::dex::error::DexError;

/// Reads exactly `utf16_size` UTF-16 code units of modified UTF-8 at the cursor.
///
/// One byte sequences have a leading nibble of 0-7, two byte sequences 0xC or 0xD and three
/// byte sequences 0xE. Anything else cannot start a code unit and fails the read. The trailing
/// NUL of the string data is not consumed.
pub fn read_mutf8(cursor: &mut ByteCursor<'_>, utf16_size: u32) -> Result<String, DexError>
{
    let start = cursor.position();
    let mut units: Vec<u16> = Vec::with_capacity((utf16_size as usize).min(cursor.remaining()));

    for _ in 0..utf16_size
    {
        let data = cursor.read_u1()? as u16;
        let unit = match data >> 4
        {
            0x0..=0x7 => data,
            0xC | 0xD => ((data & 0x1F) << 6) | (cursor.read_u1()? as u16 & 0x3F),
            0xE => {
                let b1 = cursor.read_u1()? as u16;
                let b2 = cursor.read_u1()? as u16;
                ((data & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F)
            }
            _ => fail!(Format, "illegal modified utf-8 byte 0x{:02x} at 0x{:x}", data, cursor.position() - 1),
        };
        units.push(unit);
    }

    let end = cursor.position();
    let encoded = cursor.at(start, |c| c.read_bytes(end - start))?;

    match cesu8::from_java_cesu8(encoded)
    {
        Ok(s) => Ok(s.into_owned()),
        Err(_) => {
            // lone surrogates and sloppy continuation bytes still count as units
            warn!("string at 0x{:x} ({} bytes) is not canonical modified utf-8, decoding lossily", start, encoded.len());
            Ok(String::from_utf16_lossy(&units))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::error::DexErrorKind;
    use rand::Rng;

    fn decode(bytes: &[u8], units: u32) -> Result<String, DexError> {
        let mut c = ByteCursor::new(bytes);
        read_mutf8(&mut c, units)
    }

    fn utf16_len(s: &str) -> u32 {
        s.encode_utf16().count() as u32
    }

    #[test]
    fn decodes_each_sequence_length() {
        assert_eq!(decode(b"abc\0", 3).unwrap(), "abc");
        // U+00E9 two bytes, U+20AC three bytes
        assert_eq!(decode(&[0xC3, 0xA9, 0xE2, 0x82, 0xAC, 0x00], 2).unwrap(), "\u{e9}\u{20ac}");
        // embedded NUL is two bytes
        assert_eq!(decode(&[0x61, 0xC0, 0x80, 0x62], 3).unwrap(), "a\0b");
    }

    #[test]
    fn counts_units_not_bytes() {
        let mut c = ByteCursor::new(&[0xE2, 0x82, 0xAC, 0x41, 0x42]);
        assert_eq!(read_mutf8(&mut c, 2).unwrap(), "\u{20ac}A");
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn rejects_bad_leading_nibble() {
        let e = decode(&[0x41, 0x85, 0x00], 2).unwrap_err();
        assert_eq!(e.kind(), DexErrorKind::Format);
        assert_eq!(decode(&[0xF0, 0x90, 0x80, 0x80], 1).unwrap_err().kind(), DexErrorKind::Format);
    }

    #[test]
    fn truncated_string_is_out_of_bounds() {
        assert_eq!(decode(&[0x41, 0xE2, 0x82], 2).unwrap_err().kind(), DexErrorKind::OutOfBounds);
    }

    #[test]
    fn lone_surrogate_is_decoded_lossily() {
        // U+D800 on its own
        assert_eq!(decode(&[0xED, 0xA0, 0x80], 1).unwrap(), "\u{fffd}");
    }

    #[test]
    fn random_roundtrips() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let len = rng.gen_range(0..24);
            let s: String = (0..len)
                .map(|_| {
                    let cp = match rng.gen_range(0..4) {
                        0 => rng.gen_range(0x00..0x80),
                        1 => rng.gen_range(0x80..0x800),
                        2 => rng.gen_range(0x800..0xD800),
                        _ => rng.gen_range(0x10000..0x110000),
                    };
                    char::from_u32(cp).unwrap()
                })
                .collect();
            let encoded = cesu8::to_java_cesu8(&s);
            assert_eq!(decode(&encoded, utf16_len(&s)).unwrap(), s);
        }
    }
}
