use std::io::Read;
use std::io::Write;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::kabocha_assert_simple;
use crate::options::TrailCompression;

/// Packs the raw bytes of a full trail block into its stored form and back.
///
/// The input length is always exactly one block, so `unpack` knows the size
/// of its output up front.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BlockPacker {
    /// Stored form is the raw bytes.
    None,
    /// Stored form is the zlib-deflated bytes.
    Zlib,
}

impl BlockPacker {
    pub(crate) fn from_options(compression: TrailCompression) -> BlockPacker {
        match compression {
            TrailCompression::None => BlockPacker::None,
            TrailCompression::Zlib => BlockPacker::Zlib,
        }
    }

    pub(crate) fn pack(&self, raw: &[u8], packed: &mut Vec<u8>) {
        packed.clear();
        match self {
            BlockPacker::None => packed.extend_from_slice(raw),
            BlockPacker::Zlib => {
                let mut encoder = ZlibEncoder::new(packed, Compression::fast());
                // Writing into a Vec cannot fail.
                encoder
                    .write_all(raw)
                    .and_then(|_| encoder.finish().map(|_| ()))
                    .expect("deflating a trail block into memory cannot fail");
            }
        }
    }

    pub(crate) fn unpack(&self, packed: &[u8], raw: &mut Vec<u8>) {
        raw.clear();
        match self {
            BlockPacker::None => raw.extend_from_slice(packed),
            BlockPacker::Zlib => {
                let bytes_read = ZlibDecoder::new(packed)
                    .read_to_end(raw)
                    .expect("inflating a stored trail block cannot fail");
                kabocha_assert_simple!(bytes_read == raw.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_packers_round_trip_a_block() {
        let raw: Vec<u8> = (0..=255).cycle().take(4096).collect();

        for packer in [BlockPacker::None, BlockPacker::Zlib] {
            let mut packed = Vec::new();
            packer.pack(&raw, &mut packed);

            let mut unpacked = Vec::new();
            packer.unpack(&packed, &mut unpacked);

            assert_eq!(unpacked, raw);
        }
    }

    #[test]
    fn zlib_shrinks_a_repetitive_block() {
        let raw = vec![0_u8; 8192];

        let mut packed = Vec::new();
        BlockPacker::Zlib.pack(&raw, &mut packed);

        assert!(packed.len() < raw.len() / 10);
    }
}
