// Flow-fall summary
//
// Tallies (source, destination) IPv4 flow pairs and renders the busiest
// flows one text row each, truncated to the section strip.

use std::net::Ipv4Addr;

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use crate::counter::RankedCounter;
use crate::packet::{self, PacketInfo};
use crate::plot::{self, Bounds};

#[derive(Debug, Clone, Default)]
pub struct Packetfall {
    flows: RankedCounter<(Ipv4Addr, Ipv4Addr)>,
}

impl Packetfall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, pi: &PacketInfo<'_>) {
        if let Some(ip) = packet::ipv4(pi.captured()) {
            self.flows.record((ip.src, ip.dst));
        }
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn top_n(&self, n: usize) -> Vec<((Ipv4Addr, Ipv4Addr), u64)> {
        self.flows.top_n(n)
    }

    pub fn render(&self, buf: &mut Buffer, bounds: &Bounds) {
        let content = plot::render_frame(buf, bounds, "busiest flows");
        let rows = content.height.floor().max(0.0) as usize;
        for (i, ((src, dst), count)) in self.top_n(rows).iter().enumerate() {
            let line = format!("{src} -> {dst}  {count} packets");
            plot::draw_text(
                buf,
                content.x,
                content.y + i as f64,
                content.width,
                &line,
                Style::default().fg(Color::White),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::tcp_packet;

    #[test]
    fn test_flow_tally() {
        let mut pfall = Packetfall::new();
        let a = tcp_packet([10, 0, 0, 1], [10, 0, 0, 2], 80, 443);
        let b = tcp_packet([10, 0, 0, 2], [10, 0, 0, 1], 443, 80);
        pfall.ingest(&PacketInfo::new(&a, 0));
        pfall.ingest(&PacketInfo::new(&a, 1));
        pfall.ingest(&PacketInfo::new(&b, 2));

        assert_eq!(pfall.flow_count(), 2);
        let top = pfall.top_n(1);
        assert_eq!(
            top,
            vec![(
                (Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2)),
                2
            )]
        );
    }

    #[test]
    fn test_unparseable_packets_ignored() {
        let mut pfall = Packetfall::new();
        pfall.ingest(&PacketInfo::new(&[1, 2, 3], 0));
        assert_eq!(pfall.flow_count(), 0);
    }
}
