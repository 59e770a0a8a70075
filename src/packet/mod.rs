// Raw packet model and best-effort header decoding
//
// Ingestion is fed raw link/network-layer bytes. Each consumer decodes
// only the layers it needs and silently ignores anything it cannot
// parse; heterogeneous traffic must never turn into an error.

use std::net::Ipv4Addr;

/// Transport protocol numbers we tally explicitly.
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

const ETHERNET_HEADER_LEN: usize = 14;
const ETHERTYPE_IPV4: u16 = 0x0800;
const IPV4_MIN_HEADER_LEN: usize = 20;
const TCP_MIN_HEADER_LEN: usize = 20;

/// One captured packet as handed to the report.
///
/// `caplen` is the number of bytes actually captured; it may be shorter
/// than the slice if the caller over-allocated, and decoding never looks
/// past it.
#[derive(Debug, Clone, Copy)]
pub struct PacketInfo<'a> {
    pub data: &'a [u8],
    pub caplen: usize,
    pub ts_micros: u64,
}

impl<'a> PacketInfo<'a> {
    /// Packet whose captured length is the full slice.
    pub fn new(data: &'a [u8], ts_micros: u64) -> Self {
        Self {
            data,
            caplen: data.len(),
            ts_micros,
        }
    }

    pub fn with_caplen(data: &'a [u8], caplen: usize, ts_micros: u64) -> Self {
        Self {
            data,
            caplen,
            ts_micros,
        }
    }

    /// The captured bytes, bounded by `caplen`.
    pub fn captured(&self) -> &'a [u8] {
        &self.data[..self.caplen.min(self.data.len())]
    }
}

/// Decoded IPv4 header view borrowed from a packet.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4View<'a> {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub protocol: u8,
    pub payload: &'a [u8],
}

/// Decode an IPv4 header from raw capture bytes.
///
/// Accepts either a bare IPv4 packet or an Ethernet frame carrying one.
/// Returns `None` for anything else (truncated, non-IPv4, bad header
/// length) rather than erroring.
pub fn ipv4(data: &[u8]) -> Option<Ipv4View<'_>> {
    // An IPv4 ethertype is a stronger signal than the version nibble
    // (a MAC address can start with 0x45), so try Ethernet first and
    // fall back to a bare header.
    if data.len() > ETHERNET_HEADER_LEN {
        let ethertype = u16::from_be_bytes([data[12], data[13]]);
        if ethertype == ETHERTYPE_IPV4 {
            if let Some(view) = ipv4_at(&data[ETHERNET_HEADER_LEN..]) {
                return Some(view);
            }
        }
    }

    ipv4_at(data)
}

/// Decode an IPv4 header assumed to start at offset 0.
fn ipv4_at(data: &[u8]) -> Option<Ipv4View<'_>> {
    if data.len() < IPV4_MIN_HEADER_LEN {
        return None;
    }

    let version = data[0] >> 4;
    if version != 4 {
        return None;
    }

    let header_len = ((data[0] & 0x0f) as usize) * 4;
    if header_len < IPV4_MIN_HEADER_LEN || data.len() < header_len {
        return None;
    }

    // total_length bounds the payload when plausible; a truncated capture
    // just yields a shorter payload.
    let total_len = u16::from_be_bytes([data[2], data[3]]) as usize;
    let end = total_len.clamp(header_len, data.len());

    Some(Ipv4View {
        src: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
        dst: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        protocol: data[9],
        payload: &data[header_len..end],
    })
}

/// Source and destination ports of a TCP segment, if the IPv4 payload
/// holds one.
pub fn tcp_ports(ip: &Ipv4View<'_>) -> Option<(u16, u16)> {
    if ip.protocol != IPPROTO_TCP || ip.payload.len() < TCP_MIN_HEADER_LEN {
        return None;
    }
    // Data offset below 5 words means a corrupt header.
    if (ip.payload[12] >> 4) < 5 {
        return None;
    }
    Some((
        u16::from_be_bytes([ip.payload[0], ip.payload[1]]),
        u16::from_be_bytes([ip.payload[2], ip.payload[3]]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{tcp_packet, udp_packet};

    #[test]
    fn test_ipv4_bare_packet() {
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 1234, 80);
        let ip = ipv4(&bytes).expect("should decode bare IPv4");
        assert_eq!(ip.src, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(ip.dst, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(ip.protocol, IPPROTO_TCP);
    }

    #[test]
    fn test_ipv4_ethernet_framed() {
        let inner = tcp_packet([192, 168, 1, 5], [8, 8, 8, 8], 5555, 443);
        let mut frame = vec![0u8; ETHERNET_HEADER_LEN];
        frame[12] = 0x08;
        frame[13] = 0x00;
        frame.extend_from_slice(&inner);

        let ip = ipv4(&frame).expect("should decode Ethernet-framed IPv4");
        assert_eq!(ip.dst, Ipv4Addr::new(8, 8, 8, 8));
        assert_eq!(tcp_ports(&ip), Some((5555, 443)));
    }

    #[test]
    fn test_malformed_input_is_none() {
        assert!(ipv4(&[]).is_none());
        assert!(ipv4(&[0x45, 0x00]).is_none());

        // Version 6 nibble is not IPv4.
        let mut bytes = tcp_packet([1, 1, 1, 1], [2, 2, 2, 2], 1, 2);
        bytes[0] = 0x65;
        assert!(ipv4(&bytes).is_none());

        // Header length below 5 words.
        let mut bytes = tcp_packet([1, 1, 1, 1], [2, 2, 2, 2], 1, 2);
        bytes[0] = 0x43;
        assert!(ipv4(&bytes).is_none());
    }

    #[test]
    fn test_tcp_ports() {
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        let ip = ipv4(&bytes).unwrap();
        assert_eq!(tcp_ports(&ip), Some((80, 443)));
    }

    #[test]
    fn test_udp_is_not_a_tcp_segment() {
        let bytes = udp_packet([10, 0, 0, 1], [10, 0, 0, 2], 53, 33000);
        let ip = ipv4(&bytes).unwrap();
        assert_eq!(ip.protocol, IPPROTO_UDP);
        assert_eq!(tcp_ports(&ip), None);
    }

    #[test]
    fn test_truncated_tcp_header_is_none() {
        let mut bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        bytes.truncate(IPV4_MIN_HEADER_LEN + 4);
        // Fix total_length so the IPv4 layer still parses.
        bytes[2] = 0;
        bytes[3] = (IPV4_MIN_HEADER_LEN + 4) as u8;
        let ip = ipv4(&bytes).unwrap();
        assert_eq!(tcp_ports(&ip), None);
    }

    #[test]
    fn test_captured_respects_caplen() {
        let bytes = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        let pi = PacketInfo::with_caplen(&bytes, 10, 0);
        assert_eq!(pi.captured().len(), 10);
    }
}
