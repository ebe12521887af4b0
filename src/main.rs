use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;

use log::{error, info};

use segbar::preview::{spawn_random_walk, spawn_stdin_feed, Preview};
use segbar::{generate, DispatchStyle, Gauge, GaugeConfig};

struct Options {
    out_dir: PathBuf,
    metric_max: Option<f32>,
    segments: Option<u32>,
    sublevels: Option<u32>,
    style: DispatchStyle,
    preview: bool,
    stdin: bool,
}

fn parse_args() -> Options {
    let mut options = Options {
        out_dir: PathBuf::from("generated"),
        metric_max: None,
        segments: None,
        sublevels: None,
        style: DispatchStyle::Switch,
        preview: false,
        stdin: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => {
                if let Some(dir) = args.next() {
                    options.out_dir = PathBuf::from(dir);
                }
            }
            "--max" => options.metric_max = args.next().and_then(|v| v.parse().ok()),
            "--segments" => options.segments = args.next().and_then(|v| v.parse().ok()),
            "--sublevels" => options.sublevels = args.next().and_then(|v| v.parse().ok()),
            "--ternary" => options.style = DispatchStyle::Ternary,
            "--preview" => options.preview = true,
            "--stdin" => options.stdin = true,
            other => {
                eprintln!(
                    "unknown argument {:?}\nusage: segbar [--out DIR] [--max VALUE] [--segments N] \
                     [--sublevels N] [--ternary] [--preview [--stdin]]",
                    other
                );
                process::exit(2);
            }
        }
    }
    options
}

fn build_config(options: &Options) -> GaugeConfig {
    let mut config = GaugeConfig::default();
    if let Some(max) = options.metric_max {
        config.metric_max = max;
    }
    if options.segments.is_some() || options.sublevels.is_some() {
        let segments = options.segments.unwrap_or(config.segments);
        let sublevels = options.sublevels.unwrap_or(config.sublevels);
        config.resize(segments, sublevels);
    }
    config
}

fn run(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let gauge = Gauge::new(build_config(&options))?;

    if options.preview {
        let (sender, receiver) = mpsc::channel();
        if options.stdin {
            info!("reading metric values from stdin");
            spawn_stdin_feed(sender);
        } else {
            spawn_random_walk(sender, gauge.config().metric_max);
        }
        return Preview::new(gauge)?.show_with_commands(receiver);
    }

    let report = generate(&gauge, options.style, &options.out_dir)?;
    println!(
        "Generated {} bar assets, {} decorative assets and a {}-case dispatch table in {}",
        report.bar_assets,
        report.decor_assets,
        report.dispatch_cases,
        options.out_dir.display()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run(parse_args()) {
        error!("{}", e);
        process::exit(1);
    }
}
