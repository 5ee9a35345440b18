extern crate stoplight_lib;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stoplight_lib::core::Phase;
use stoplight_lib::light::{LightConfigBuilder, TrafficLight};

fn fast_light(dwell_min: u64, dwell_max: u64) -> TrafficLight {
    let config = LightConfigBuilder::new()
        .dwell_range(
            Duration::from_millis(dwell_min),
            Duration::from_millis(dwell_max),
        )
        .poll_quantum(Duration::from_millis(1))
        .build();
    TrafficLight::new(config)
}

#[test]
fn test_phases_toggle_with_alternating_parity() {
    let light = fast_light(20, 40);
    light.simulate().unwrap();
    // starting from red, transition k lands on green for odd k and red for even k
    let mut expected = Phase::Red;
    for _ in 0..6 {
        expected = expected.toggled();
        assert_eq!(light.wait_for_change(), Ok(expected));
    }
    light.stop();
}

#[test]
fn test_change_intervals_respect_dwell_bounds() {
    let light = fast_light(40, 80);
    light.simulate().unwrap();
    light.wait_for_change().unwrap();
    let mut previous = Instant::now();
    for _ in 0..4 {
        light.wait_for_change().unwrap();
        let interval = previous.elapsed();
        previous = Instant::now();
        // one poll quantum of slack below, scheduling slack above
        assert!(
            interval >= Duration::from_millis(35),
            "interval {:?} below dwell range",
            interval
        );
        assert!(
            interval < Duration::from_millis(200),
            "interval {:?} far above dwell range",
            interval
        );
    }
    light.stop();
}

#[test]
fn test_wait_for_green_returns_within_one_cycle() {
    let light = fast_light(30, 60);
    light.simulate().unwrap();
    let start = Instant::now();
    light.wait_for_phase(Phase::Green).unwrap();
    // at most one full red-plus-green cycle, with scheduling slack
    assert!(start.elapsed() < Duration::from_millis(500));
    light.stop();
}

#[test]
fn test_concurrent_waiters_all_see_green() {
    let light = Arc::new(fast_light(20, 40));
    light.simulate().unwrap();
    let mut handles = Vec::new();
    for _ in 0..3 {
        let light = light.clone();
        handles.push(thread::spawn(move || light.wait_for_phase(Phase::Green)));
    }
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(()));
    }
    light.stop();
}

#[test]
fn test_snapshot_follows_published_phase() {
    let light = fast_light(20, 40);
    light.simulate().unwrap();
    for _ in 0..4 {
        let phase = light.wait_for_change().unwrap();
        assert_eq!(light.current_phase(), phase);
    }
    light.stop();
}

#[test]
fn test_drop_shuts_down_with_blocked_waiter() {
    let light = Arc::new(fast_light(5000, 6000));
    light.simulate().unwrap();
    let handle = {
        let light = light.clone();
        thread::spawn(move || light.wait_for_phase(Phase::Green))
    };
    thread::sleep(Duration::from_millis(50));
    light.stop();
    assert!(handle.join().unwrap().is_err());
    // dropping the last handle joins the already-stopped updater without hanging
    drop(light);
}
