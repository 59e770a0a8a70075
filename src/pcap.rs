// Minimal classic-libpcap capture reader
//
// Reads the 24-byte file header and iterates 16-byte record headers
// over an in-memory capture. Handles both byte orders and both the
// microsecond and nanosecond timestamp variants; pcapng is out of
// scope.

use thiserror::Error;

const MAGIC_USEC: u32 = 0xa1b2_c3d4;
const MAGIC_NSEC: u32 = 0xa1b2_3c4d;
const FILE_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum PcapError {
    #[error("capture file shorter than the pcap file header")]
    TruncatedHeader,

    #[error("unrecognized pcap magic: {0:#010x}")]
    BadMagic(u32),

    #[error("truncated packet record at offset {0}")]
    TruncatedRecord(usize),
}

/// One packet record borrowed from the capture buffer.
#[derive(Debug, Clone, Copy)]
pub struct PcapRecord<'a> {
    pub ts_micros: u64,
    /// Original on-wire length; `data` may be shorter if the capture
    /// was taken with a snap length.
    pub orig_len: u32,
    pub data: &'a [u8],
}

/// Iterator over the records of a classic pcap capture held in memory.
pub struct PcapReader<'a> {
    data: &'a [u8],
    offset: usize,
    big_endian: bool,
    nanos: bool,
}

impl<'a> PcapReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, PcapError> {
        if data.len() < FILE_HEADER_LEN {
            return Err(PcapError::TruncatedHeader);
        }

        let magic_le = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let magic_be = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let (big_endian, nanos) = match (magic_le, magic_be) {
            (MAGIC_USEC, _) => (false, false),
            (MAGIC_NSEC, _) => (false, true),
            (_, MAGIC_USEC) => (true, false),
            (_, MAGIC_NSEC) => (true, true),
            _ => return Err(PcapError::BadMagic(magic_le)),
        };

        Ok(Self {
            data,
            offset: FILE_HEADER_LEN,
            big_endian,
            nanos,
        })
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }
}

impl<'a> Iterator for PcapReader<'a> {
    type Item = Result<PcapRecord<'a>, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        if self.offset + RECORD_HEADER_LEN > self.data.len() {
            let at = self.offset;
            self.offset = self.data.len();
            return Some(Err(PcapError::TruncatedRecord(at)));
        }

        let ts_sec = u64::from(self.read_u32(self.offset));
        let ts_frac = u64::from(self.read_u32(self.offset + 4));
        let incl_len = self.read_u32(self.offset + 8) as usize;
        let orig_len = self.read_u32(self.offset + 12);

        let start = self.offset + RECORD_HEADER_LEN;
        if start + incl_len > self.data.len() {
            let at = self.offset;
            self.offset = self.data.len();
            return Some(Err(PcapError::TruncatedRecord(at)));
        }
        self.offset = start + incl_len;

        let micros = if self.nanos { ts_frac / 1_000 } else { ts_frac };
        Some(Ok(PcapRecord {
            ts_micros: ts_sec * 1_000_000 + micros,
            orig_len,
            data: &self.data[start..start + incl_len],
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(magic: u32, little_endian: bool, records: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let word = |v: u32| {
            if little_endian {
                v.to_le_bytes()
            } else {
                v.to_be_bytes()
            }
        };
        let half = |v: u16| {
            if little_endian {
                v.to_le_bytes()
            } else {
                v.to_be_bytes()
            }
        };

        let mut out = Vec::new();
        out.extend_from_slice(&word(magic));
        out.extend_from_slice(&half(2)); // version major
        out.extend_from_slice(&half(4)); // version minor
        out.extend_from_slice(&word(0)); // thiszone
        out.extend_from_slice(&word(0)); // sigfigs
        out.extend_from_slice(&word(65535)); // snaplen
        out.extend_from_slice(&word(1)); // linktype: Ethernet

        for (sec, frac, data) in records {
            out.extend_from_slice(&word(*sec));
            out.extend_from_slice(&word(*frac));
            out.extend_from_slice(&word(data.len() as u32));
            out.extend_from_slice(&word(data.len() as u32));
            out.extend_from_slice(data);
        }
        out
    }

    #[test]
    fn test_reads_little_endian_usec_records() {
        let bytes = capture(MAGIC_USEC, true, &[(10, 250_000, &[1, 2, 3]), (11, 0, &[4])]);
        let records: Vec<_> = PcapReader::new(&bytes)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ts_micros, 10_250_000);
        assert_eq!(records[0].data, &[1, 2, 3]);
        assert_eq!(records[1].orig_len, 1);
    }

    #[test]
    fn test_reads_big_endian_nanosecond_records() {
        let bytes = capture(MAGIC_NSEC, false, &[(5, 1_500_000, &[9, 9])]);
        let records: Vec<_> = PcapReader::new(&bytes)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records[0].ts_micros, 5_001_500);
    }

    #[test]
    fn test_snap_length_records_keep_wire_length() {
        // Record captured under a snap length: 4 bytes on disk out of
        // 90 on the wire. orig_len must survive so callers can account
        // for the truncation.
        let mut bytes = capture(MAGIC_USEC, true, &[]);
        bytes.extend_from_slice(&1u32.to_le_bytes()); // ts_sec
        bytes.extend_from_slice(&0u32.to_le_bytes()); // ts_frac
        bytes.extend_from_slice(&4u32.to_le_bytes()); // incl_len
        bytes.extend_from_slice(&90u32.to_le_bytes()); // orig_len
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let record = PcapReader::new(&bytes).unwrap().next().unwrap().unwrap();
        assert_eq!(record.data.len(), 4);
        assert_eq!(record.orig_len, 90);
    }

    #[test]
    fn test_bad_magic() {
        let bytes = capture(0xdeadbeef, true, &[]);
        assert!(matches!(
            PcapReader::new(&bytes),
            Err(PcapError::BadMagic(_))
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            PcapReader::new(&[0u8; 10]),
            Err(PcapError::TruncatedHeader)
        ));
    }

    #[test]
    fn test_truncated_record_stops_iteration() {
        let mut bytes = capture(MAGIC_USEC, true, &[(1, 0, &[1, 2, 3, 4])]);
        bytes.truncate(bytes.len() - 2);
        let mut reader = PcapReader::new(&bytes).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(PcapError::TruncatedRecord(_)))
        ));
        assert!(reader.next().is_none());
    }
}
