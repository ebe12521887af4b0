use segbar::preview::{Preview, PreviewCommand};
use segbar::{Band, Color, Gauge, GaugeConfig};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // A coarser 12-segment gauge with three bands, built with the bon-generated builder
    let config = GaugeConfig::builder()
        .segments(12)
        .sublevels(3)
        .phase_ticks(100)
        .bands(vec![
            Band::up_to("green", 11, Color::new(0x00, 0xff, 0x33)),
            Band::up_to("amber", 26, Color::new(0xff, 0xbf, 0x00)),
            Band::rest("red", Color::new(0xff, 0x00, 0x00)),
        ])
        .build();
    let gauge = Gauge::new(config)?;
    let max = gauge.config().metric_max;
    let preview = Preview::new(gauge)?;

    // Sweep the full range and past it so both saturation ends show up
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let steps = 120;
        for i in (0..=steps).chain((0..steps).rev()).cycle() {
            let value = -0.1 * max + 1.2 * max * i as f32 / steps as f32;
            if sender.send(PreviewCommand::SetMetric(value)).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
    });

    println!("Sweeping the gauge from below 0 to above {}; close the window to exit", max);
    preview.show_with_commands(receiver)
}
