//! FSEQ v2 container: an uncompressed 32-byte header followed directly by the
//! frame matrix. The byte layout is fixed by the playback firmware.

use std::path::Path;

use crate::{
    event::Event,
    timeline::{self, FrameMatrix, CHANNEL_COUNT, STEP_MS},
    Result, ShowError,
};

pub const MAGIC: [u8; 4] = *b"PSEQ";
pub const HEADER_LEN: usize = 32;
pub const VERSION_MAJOR: u8 = 2;
pub const VERSION_MINOR: u8 = 0;

/// Decoded fixed header. All multi-byte fields are little-endian on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FseqHeader {
    pub data_offset: u16,
    pub version_minor: u8,
    pub version_major: u8,
    pub variable_header_offset: u16,
    pub channel_count: u32,
    pub frame_count: u32,
    pub step_time_ms: u8,
    pub flags: u8,
    pub compression: u8,
    pub compression_blocks: u8,
    pub sparse_ranges: u8,
    pub flags2: u8,
    /// Opaque to decoders.
    pub unique_id: u64,
}

impl FseqHeader {
    /// Header for an uncompressed sequence without variable headers.
    pub fn new(frame_count: u32, unique_id: u64) -> Self {
        Self {
            data_offset: HEADER_LEN as u16,
            version_minor: VERSION_MINOR,
            version_major: VERSION_MAJOR,
            variable_header_offset: HEADER_LEN as u16,
            channel_count: CHANNEL_COUNT as u32,
            frame_count,
            step_time_ms: STEP_MS as u8,
            flags: 0,
            compression: 0,
            compression_blocks: 0,
            sparse_ranges: 0,
            flags2: 0,
            unique_id,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&self.data_offset.to_le_bytes());
        out[6] = self.version_minor;
        out[7] = self.version_major;
        out[8..10].copy_from_slice(&self.variable_header_offset.to_le_bytes());
        out[10..14].copy_from_slice(&self.channel_count.to_le_bytes());
        out[14..18].copy_from_slice(&self.frame_count.to_le_bytes());
        out[18] = self.step_time_ms;
        out[19] = self.flags;
        out[20] = self.compression;
        out[21] = self.compression_blocks;
        out[22] = self.sparse_ranges;
        out[23] = self.flags2;
        out[24..32].copy_from_slice(&self.unique_id.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(ShowError::malformed(format!(
                "expected at least {HEADER_LEN} header bytes, got {}",
                bytes.len()
            )));
        };
        if header[0..4] != MAGIC {
            return Err(ShowError::malformed("missing PSEQ magic"));
        }
        if header[7] != VERSION_MAJOR {
            return Err(ShowError::malformed(format!(
                "unsupported major version {}",
                header[7]
            )));
        }

        let u16_at = |at: usize| u16::from_le_bytes([header[at], header[at + 1]]);
        let u32_at = |at: usize| {
            u32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
        };
        let mut id = [0u8; 8];
        id.copy_from_slice(&header[24..32]);

        Ok(Self {
            data_offset: u16_at(4),
            version_minor: header[6],
            version_major: header[7],
            variable_header_offset: u16_at(8),
            channel_count: u32_at(10),
            frame_count: u32_at(14),
            step_time_ms: header[18],
            flags: header[19],
            compression: header[20],
            compression_blocks: header[21],
            sparse_ranges: header[22],
            flags2: header[23],
            unique_id: u64::from_le_bytes(id),
        })
    }

    pub fn duration_ms(&self) -> u64 {
        self.frame_count as u64 * self.step_time_ms as u64
    }
}

/// Serializes the header followed by the raw matrix.
pub fn encode(matrix: &FrameMatrix, unique_id: u64) -> Result<Vec<u8>> {
    let frame_count = u32::try_from(matrix.frame_count())
        .map_err(|_| ShowError::msg("show has too many frames for an FSEQ header"))?;
    let header = FseqHeader::new(frame_count, unique_id);

    let mut out = Vec::with_capacity(HEADER_LEN + matrix.as_bytes().len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(matrix.as_bytes());
    Ok(out)
}

impl FrameMatrix {
    /// Recovers the matrix from an uncompressed 48-channel sequence.
    pub fn from_fseq(bytes: &[u8]) -> Result<(FseqHeader, FrameMatrix)> {
        let header = FseqHeader::parse(bytes)?;
        if header.compression != 0 {
            return Err(ShowError::malformed("compressed sequences are not supported"));
        }
        if header.channel_count as usize != CHANNEL_COUNT {
            return Err(ShowError::malformed(format!(
                "expected {CHANNEL_COUNT} channels, header declares {}",
                header.channel_count
            )));
        }

        let frame_count = header.frame_count as usize;
        let start = header.data_offset as usize;
        let end = start + frame_count * CHANNEL_COUNT;
        let data = bytes.get(start..end).ok_or_else(|| {
            ShowError::malformed(format!(
                "channel data truncated: need {end} bytes, have {}",
                bytes.len()
            ))
        })?;

        Ok((header, FrameMatrix::from_raw(frame_count, data.to_vec())))
    }
}

/// Compiled and encoded show, ready to be written or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedShow {
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    pub channel_count: usize,
}

impl ExportedShow {
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        tracing::info!(path = %path.as_ref().display(), bytes = self.bytes.len(), "wrote sequence");
        Ok(())
    }
}

/// Compiles `events` and wraps the result in an FSEQ v2 container.
pub fn export_show(events: &[Event], duration_ms: u64, unique_id: u64) -> Result<ExportedShow> {
    let matrix = timeline::compile(events, duration_ms)?;
    let bytes = encode(&matrix, unique_id)?;
    let exported = ExportedShow {
        frame_count: matrix.frame_count(),
        channel_count: matrix.channel_count(),
        bytes,
    };
    tracing::info!(
        events = events.len(),
        duration_ms,
        frame_count = exported.frame_count,
        bytes = exported.byte_len(),
        "exported show"
    );
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Part;

    #[test]
    fn header_layout_is_byte_exact() {
        let bytes = FseqHeader::new(100, 0x0102_0304_0506_0708).to_bytes();
        assert_eq!(
            bytes,
            [
                b'P', b'S', b'E', b'Q', 32, 0, 0, 2, 32, 0, 48, 0, 0, 0, 100, 0, 0, 0, 20, 0, 0,
                0, 0, 0, 8, 7, 6, 5, 4, 3, 2, 1,
            ]
        );
    }

    #[test]
    fn header_parses_back() {
        let header = FseqHeader::new(1234, 99);
        assert_eq!(FseqHeader::parse(&header.to_bytes()).unwrap(), header);
        assert_eq!(header.duration_ms(), 24_680);
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(
            FseqHeader::parse(&[0; 10]),
            Err(ShowError::MalformedSequence(_))
        ));

        let mut bytes = FseqHeader::new(1, 0).to_bytes();
        bytes[0] = b'F';
        assert!(FseqHeader::parse(&bytes).is_err());

        let mut bytes = FseqHeader::new(1, 0).to_bytes();
        bytes[7] = 1;
        assert!(FseqHeader::parse(&bytes).is_err());
    }

    #[test]
    fn export_has_no_padding() {
        let events = [Event::new(Part::Flap, 0, 100)];
        let show = export_show(&events, 1_000, 0).unwrap();
        assert_eq!(show.frame_count, 50);
        assert_eq!(show.channel_count, 48);
        assert_eq!(show.byte_len(), HEADER_LEN + 50 * 48);
    }

    #[test]
    fn matrix_recovers_from_bytes() {
        let events = [Event::new(Part::LightRightBack, 0, 500).with_power(50)];
        let matrix = timeline::compile(&events, 600).unwrap();
        let bytes = encode(&matrix, 42).unwrap();
        let (header, decoded) = FrameMatrix::from_fseq(&bytes).unwrap();
        assert_eq!(header.unique_id, 42);
        assert_eq!(decoded, matrix);

        assert!(FrameMatrix::from_fseq(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn export_propagates_duration_errors() {
        assert!(matches!(
            export_show(&[], 0, 0),
            Err(ShowError::InvalidDuration { .. })
        ));
    }
}
