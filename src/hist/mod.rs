// Summary components fed by the packet fan-out
//
// Each component owns its own aggregate, ingests packets independently
// and renders into the strip of the page the report hands it. No
// component observes another's state.

mod address;
mod bandwidth;
mod packetfall;
mod port;

pub use address::AddressHistogram;
pub use bandwidth::BandwidthHistogram;
pub use packetfall::Packetfall;
pub use port::PortHistogram;

/// Which side of a packet a frequency histogram counts.
///
/// Fixed at construction, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    Sender,
    Receiver,
    SendOrReceive,
}

impl RoleFilter {
    pub fn counts_sender(self) -> bool {
        matches!(self, RoleFilter::Sender | RoleFilter::SendOrReceive)
    }

    pub fn counts_receiver(self) -> bool {
        matches!(self, RoleFilter::Receiver | RoleFilter::SendOrReceive)
    }
}
