// netreport - one-page statistical report generator for captured traffic
//
// Packets are streamed in once per analysis run and aggregated into a
// small set of summaries (bandwidth over time, address frequency, port
// frequency, busiest flows). A final render pass lays the summaries out
// top-to-bottom on a single bounded drawing surface and writes the
// finished page to disk.

pub mod counter;
pub mod hist;
pub mod packet;
pub mod pcap;
pub mod plot;
pub mod report;

#[cfg(test)]
pub(crate) mod testutil;

pub use packet::PacketInfo;
pub use report::{OnePageReport, ReportConfig, ReportError};
