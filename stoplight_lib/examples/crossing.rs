/// Vehicles waiting at a crossing.
///
/// Spawns a traffic light with shortened timing and a handful of vehicle threads. Each
/// vehicle blocks until the light turns green, then reports that it crossed.
extern crate stoplight_lib;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use stoplight_lib::core::Phase;
use stoplight_lib::light::{LightConfigBuilder, TrafficLight};

fn print_phase(phase: Phase) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let color = match phase {
        Phase::Red => Color::Red,
        Phase::Green => Color::Green,
    };
    stdout
        .set_color(ColorSpec::new().set_fg(Some(color)))
        .unwrap();
    writeln!(&mut stdout, "the light is now {}", phase).unwrap();
    stdout.reset().unwrap();
}

fn main() {
    let config = LightConfigBuilder::new()
        .dwell_range(Duration::from_millis(500), Duration::from_millis(1500))
        .poll_quantum(Duration::from_millis(1))
        .build();
    let light = Arc::new(TrafficLight::new(config));
    light.simulate().unwrap();

    let mut vehicles = Vec::new();
    for id in 0..4 {
        let light = light.clone();
        vehicles.push(thread::spawn(move || {
            println!("vehicle {} is waiting at the red light", id);
            light.wait_for_phase(Phase::Green).unwrap();
            println!("vehicle {} crossed", id);
        }));
    }

    let observer = {
        let light = light.clone();
        thread::spawn(move || {
            while let Ok(phase) = light.wait_for_change() {
                print_phase(phase);
            }
        })
    };

    for vehicle in vehicles {
        vehicle.join().unwrap();
    }
    light.stop();
    observer.join().unwrap();
}
