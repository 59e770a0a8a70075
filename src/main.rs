// netreport - one-page statistical report generator for captured traffic
//
// Streams every record of a classic pcap capture through the report
// aggregator, then renders the finished page to the output path.

use std::env;
use std::fs;

use anyhow::{bail, Context, Result};

use netreport::pcap::PcapReader;
use netreport::{OnePageReport, PacketInfo, ReportConfig};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!("usage: netreport <capture.pcap> <output.txt>");
    }
    let capture_path = &args[1];
    let output_path = &args[2];

    let raw = fs::read(capture_path)
        .with_context(|| format!("cannot read capture file {capture_path}"))?;
    let reader = PcapReader::new(&raw)
        .with_context(|| format!("{capture_path} is not a classic pcap capture"))?;

    let mut report = OnePageReport::new(ReportConfig::default(), capture_path.clone())?;
    let mut wire_bytes: u64 = 0;
    for record in reader {
        let record = record.context("capture ended mid-record")?;
        wire_bytes += u64::from(record.orig_len);
        report.ingest_packet(&PacketInfo::new(record.data, record.ts_micros))?;
    }

    report.render(output_path)?;
    println!(
        "wrote {output_path} ({} packets, {} of {} wire bytes captured)",
        report.packet_count(),
        report.byte_count(),
        wire_bytes
    );
    Ok(())
}
