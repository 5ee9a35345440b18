/// Runs a light and prints every phase change with its timing.
extern crate stoplight_lib;

use std::time::{Duration, Instant};

use clap::Parser;

use stoplight_lib::light::{LightConfigBuilder, TrafficLight};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Shortest dwell in one phase, in milliseconds
    #[arg(long, default_value_t = 4000)]
    dwell_min_ms: u64,
    /// Longest dwell in one phase (exclusive), in milliseconds
    #[arg(long, default_value_t = 6000)]
    dwell_max_ms: u64,
    /// Number of phase changes to observe before exiting
    #[arg(short, long, default_value_t = 10)]
    changes: u32,
}

fn main() {
    let args = Args::parse();
    let config = LightConfigBuilder::new()
        .dwell_range(
            Duration::from_millis(args.dwell_min_ms),
            Duration::from_millis(args.dwell_max_ms),
        )
        .poll_quantum(Duration::from_millis(1))
        .build();
    let light = TrafficLight::new(config);
    light.simulate().unwrap();

    let mut previous = Instant::now();
    for i in 1..=args.changes {
        let phase = light.wait_for_change().unwrap();
        println!(
            "change {:>3}: {:>5} after {:?}",
            i,
            phase.to_string(),
            previous.elapsed()
        );
        previous = Instant::now();
    }
    light.stop();
}
