//! Build a survey element, then scan it point by point.
//!
//! Run with `RUST_LOG=debug` to see every block swap.
//!
//! Usage: `scan [point_count] [block_points] [memory|disk]`

use std::time::Instant;

use cloudpage_access::ElementConfig;
use cloudpage_bench::{build_element, scan_valid};
use cloudpage_core::ProcessingLocation;
use log::info;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let points: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1_000_000);
    let block_points: u32 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ElementConfig::new().accessor.block_points);
    let location = match args.next().as_deref() {
        Some("disk") => ProcessingLocation::OnDisk,
        _ => ProcessingLocation::InMemory,
    };

    let config = ElementConfig::new().with_block_points(block_points);
    let start = Instant::now();
    let element = match build_element(points, location, config) {
        Ok(element) => element,
        Err(e) => {
            eprintln!("failed to build element: {e}");
            std::process::exit(1);
        }
    };
    info!("built {points} points ({location}) in {:?}", start.elapsed());
    if let Some(path) = element.temp_path() {
        info!("backing file: {}", path.display());
    }

    let start = Instant::now();
    let (count, sum) = scan_valid(&element);
    let elapsed = start.elapsed();
    println!("=== cloudpage scan ===");
    println!("points:       {points}");
    println!("block points: {block_points}");
    println!("valid:        {count}");
    println!("checksum:     {sum:.3}");
    println!(
        "elapsed:      {elapsed:?} ({:.1} Mpts/s)",
        count as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6
    );
}
