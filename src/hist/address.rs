// Address frequency histogram
//
// Same shape as the port histogram but keyed on IPv4 addresses: any
// parseable IPv4 packet contributes its source and/or destination
// address per the role filter.

use std::net::Ipv4Addr;

use ratatui::buffer::Buffer;

use crate::counter::RankedCounter;
use crate::hist::port::render_labeled_bars;
use crate::hist::RoleFilter;
use crate::packet::{self, PacketInfo};
use crate::plot::{self, Bounds};
use crate::report::ReportConfig;

#[derive(Debug, Clone)]
pub struct AddressHistogram {
    title: String,
    role: RoleFilter,
    counter: RankedCounter<Ipv4Addr>,
}

impl AddressHistogram {
    pub fn new(role: RoleFilter, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            role,
            counter: RankedCounter::new(),
        }
    }

    pub fn ingest(&mut self, pi: &PacketInfo<'_>) {
        let Some(ip) = packet::ipv4(pi.captured()) else {
            return;
        };

        if self.role.counts_sender() {
            self.counter.record(ip.src);
        }
        if self.role.counts_receiver() {
            self.counter.record(ip.dst);
        }
    }

    pub fn top_n(&self, n: usize) -> Vec<(Ipv4Addr, u64)> {
        self.counter.top_n(n)
    }

    pub fn total(&self) -> u64 {
        self.counter.total()
    }

    pub fn render(&self, buf: &mut Buffer, bounds: &Bounds, conf: &ReportConfig) {
        let content = plot::render_frame(buf, bounds, &self.title);
        let ranked = self.top_n(conf.max_bars);
        render_labeled_bars(
            buf,
            &content,
            &ranked
                .iter()
                .map(|(addr, count)| (addr.to_string(), *count))
                .collect::<Vec<_>>(),
            conf.bar_space_factor,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::tcp_packet;

    fn pi(bytes: &[u8]) -> PacketInfo<'_> {
        PacketInfo::new(bytes, 0)
    }

    #[test]
    fn test_sender_counts_source_address() {
        let mut hist = AddressHistogram::new(RoleFilter::Sender, "src addrs");
        let a = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        let b = tcp_packet([10, 0, 0, 1], [10, 0, 0, 3], 80, 443);
        hist.ingest(&pi(&a));
        hist.ingest(&pi(&b));
        assert_eq!(
            hist.top_n(5),
            vec![(Ipv4Addr::new(10, 0, 0, 1), 2)]
        );
    }

    #[test]
    fn test_tied_addresses_break_on_value() {
        let mut hist = AddressHistogram::new(RoleFilter::Receiver, "dst addrs");
        let a = tcp_packet([10, 0, 0, 1], [10, 0, 0, 9], 80, 443);
        let b = tcp_packet([10, 0, 0, 1], [10, 0, 0, 4], 80, 443);
        hist.ingest(&pi(&a));
        hist.ingest(&pi(&b));
        assert_eq!(hist.top_n(1), vec![(Ipv4Addr::new(10, 0, 0, 9), 1)]);
    }

    #[test]
    fn test_non_ipv4_is_ignored() {
        let mut hist = AddressHistogram::new(RoleFilter::SendOrReceive, "addrs");
        hist.ingest(&pi(&[0x60, 0x00, 0x00, 0x00]));
        assert_eq!(hist.total(), 0);
    }
}
