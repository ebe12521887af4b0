use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use rand::Rng;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::assets::bar::generate_bars;
use crate::assets::decor::background_gradient;
use crate::assets::{AssetId, MemorySink};
use crate::canvas::{Bitmap, Canvas};
use crate::config::Rgba;
use crate::emit::DispatchTable;
use crate::error::GenerateError;
use crate::levels::AirQuality;
use crate::Gauge;

const WINDOW_SCALE: f64 = 3.0;
const TARGET_FPS: f64 = 60.0;

/// Updates fed to a running preview
#[derive(Debug, Clone, Copy)]
pub enum PreviewCommand {
    SetMetric(f32),
}

/// Plays the part of the display runtime: quantize, dispatch, blit.
pub struct Preview {
    gauge: Gauge,
    table: DispatchTable,
    assets: BTreeMap<AssetId, Bitmap>,
    background: Bitmap,
}

impl Preview {
    pub fn new(gauge: Gauge) -> Result<Self, GenerateError> {
        let mut sink = MemorySink::new();
        generate_bars(&gauge, &mut sink)?;
        let display = &gauge.config().display;
        let background = background_gradient(display.width, display.height);
        Ok(Self {
            table: DispatchTable::build(&gauge),
            assets: sink.images,
            background,
            gauge,
        })
    }

    /// Draw one screen for `value` at clock `ticks`. Returns the asset the
    /// dispatch table selected.
    pub fn render_frame(&self, canvas: &mut Canvas, value: f32, ticks: u64) -> Option<&AssetId> {
        let config = self.gauge.config();
        let emit = &config.emit;
        canvas.blit(&self.background, 0, 0);

        let level = AirQuality::classify(value);
        let (x0, y0) = (emit.x - 3, emit.y - 3);
        let (x1, y1) = (
            emit.x + config.strip_width() as i32 + 2,
            emit.y + config.strip_height() as i32 + 2,
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                canvas.blend_pixel(x, y, level.background(), 0.6);
            }
        }

        let state = self.gauge.quantizer().quantize(value, ticks);
        let id = self.table.lookup(state.fill_level, state.phase)?;
        let bitmap = self.assets.get(id)?;
        canvas.blit(bitmap, emit.x, emit.y);
        Some(id)
    }

    pub fn show_with_commands(&self, receiver: Receiver<PreviewCommand>) -> Result<(), Box<dyn std::error::Error>> {
        let display = self.gauge.config().display.clone();
        let tick_ms = display.tick_ms.max(1) as u128;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title("segbar preview")
            .with_inner_size(LogicalSize::new(
                display.width as f64 * WINDOW_SCALE,
                display.height as f64 * WINDOW_SCALE,
            ))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(display.width, display.height, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / TARGET_FPS);
        let start = Instant::now();
        let mut last_frame = Instant::now();
        let mut value = 0.0_f32;
        let mut last_id: Option<AssetId> = None;
        info!("preview running at {}x{}", display.width, display.height);

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::RedrawRequested => {
                        while let Ok(command) = receiver.try_recv() {
                            match command {
                                PreviewCommand::SetMetric(v) => value = v,
                            }
                        }

                        let ticks = (start.elapsed().as_millis() / tick_ms) as u64;
                        let mut canvas = Canvas::new(display.width, display.height, Rgba::TRANSPARENT);
                        let shown = self.render_frame(&mut canvas, value, ticks);
                        if shown != last_id.as_ref() {
                            debug!("{:.0} -> {:?}", value, shown);
                            last_id = shown.cloned();
                        }

                        pixels.frame_mut().copy_from_slice(canvas.as_bytes());
                        if let Err(e) = pixels.render() {
                            error!("render failed: {}", e);
                            window_target.exit();
                        }
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

/// Feed a slowly wandering metric that occasionally leaves `[0, max]`.
pub fn spawn_random_walk(sender: Sender<PreviewCommand>, max: f32) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut value = max * 0.3;
        loop {
            value = (value + rng.random_range(-0.04..0.04) * max).clamp(-0.05 * max, 1.1 * max);
            if sender.send(PreviewCommand::SetMetric(value)).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }
    })
}

/// Feed one metric value per stdin line.
pub fn spawn_stdin_feed(sender: Sender<PreviewCommand>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines().map_while(Result::ok) {
            match line.trim().parse::<f32>() {
                Ok(value) => {
                    if sender.send(PreviewCommand::SetMetric(value)).is_err() {
                        break;
                    }
                }
                Err(_) => warn!("ignoring non-numeric input {:?}", line),
            }
        }
    })
}
