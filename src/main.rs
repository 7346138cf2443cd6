use clap::Parser;
use crossterm::event::{self, Event};
use heart3d::color::{Channel, ColorStore};
use heart3d::config::Config;
use heart3d::error::AppError;
use heart3d::mesh::generate_heart_mesh_with;
use heart3d::state::AppState;
use heart3d::terminal::{draw_frame, terminal_size, write_snapshot, TerminalGuard};
use heart3d::widget::{Control, HeartWidget};
use std::cell::Cell;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// A console-based 3D heart rotation demo with RGB color sliders
#[derive(Parser, Debug)]
#[command(name = "heart3d", version, about)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Initial red channel (0-255, clamped)
    #[arg(long, allow_hyphen_values = true)]
    red: Option<String>,

    /// Initial green channel (0-255, clamped)
    #[arg(long, allow_hyphen_values = true)]
    green: Option<String>,

    /// Initial blue channel (0-255, clamped)
    #[arg(long, allow_hyphen_values = true)]
    blue: Option<String>,

    /// Rotation speed in radians per second
    #[arg(short, long, allow_hyphen_values = true)]
    speed: Option<f64>,

    /// Frame-rate cap
    #[arg(long)]
    fps: Option<u32>,

    /// Render a single frame to stdout and exit
    #[arg(long)]
    snapshot: bool,

    /// Snapshot width in columns (defaults to the terminal width)
    #[arg(long, requires = "snapshot")]
    width: Option<u16>,

    /// Snapshot height in rows (defaults to the terminal height)
    #[arg(long, requires = "snapshot")]
    height: Option<u16>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Installs the tracing subscriber.
///
/// The interactive view owns stdout, so logs go to `--log-file` when given
/// and to stderr only in snapshot mode; otherwise they are dropped.
fn init_logging(cli: &Cli) -> Result<(), AppError> {
    let directive: Directive = format!("heart3d={}", cli.log_level)
        .parse()
        .map_err(|_| AppError::LogLevel(cli.log_level.clone()))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    if let Some(path) = &cli.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.snapshot {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Loads the config file if one was given and applies command-line overrides
fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::default(),
    };

    if let Some(speed) = cli.speed {
        config.animation.rotation_speed = speed;
    }
    if let Some(fps) = cli.fps {
        config.animation.fps = fps;
    }
    config.validate()?;
    Ok(config)
}

/// Color store seeded from the config, then from any channel given on the
/// command line
fn initial_store(cli: &Cli, config: &Config) -> Result<ColorStore, AppError> {
    let mut store = ColorStore::with_color(config.color.to_rgb());
    let overrides = [
        (Channel::Red, &cli.red),
        (Channel::Green, &cli.green),
        (Channel::Blue, &cli.blue),
    ];
    for (channel, raw) in overrides {
        if let Some(raw) = raw {
            store.apply_raw(channel, raw).map_err(|source| AppError::Channel {
                channel: channel.label(),
                source,
            })?;
        }
    }
    Ok(store)
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = load_config(cli)?;
    let mut store = initial_store(cli, &config)?;

    let mesh = generate_heart_mesh_with(config.mesh.u_steps, config.mesh.v_steps);
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "generated heart mesh"
    );

    // Repaint on color changes even while the rotation is paused
    let color_changed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&color_changed);
    store.subscribe(move |change| {
        debug!(
            channel = change.channel.label(),
            old = change.old,
            new = change.new,
            "color changed"
        );
        flag.set(true);
    });

    let mut state = AppState::new(store, config.animation.rotation_speed);
    let frame_interval = Duration::from_secs_f64(1.0 / config.animation.fps as f64);
    let mut widget = HeartWidget::new(mesh, config);

    if cli.snapshot {
        let (cols, rows) = terminal_size();
        let frame = widget.paint(&state, cli.width.unwrap_or(cols), cli.height.unwrap_or(rows));
        write_snapshot(&mut io::stdout().lock(), &frame)?;
        return Ok(());
    }

    info!("starting with {}", state.color.css());
    let _guard = TerminalGuard::new()?;
    event_loop(&mut widget, &mut state, &color_changed, frame_interval)
}

fn event_loop(
    widget: &mut HeartWidget,
    state: &mut AppState,
    color_changed: &Cell<bool>,
    frame_interval: Duration,
) -> Result<(), AppError> {
    let mut stdout = io::stdout();
    let (mut cols, mut rows) = terminal_size();
    let mut last_frame = Instant::now();
    let mut needs_paint = true;

    loop {
        let timeout = frame_interval.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if widget.handle_key(key, state) == Control::Quit {
                        info!("quit requested");
                        return Ok(());
                    }
                    needs_paint = true;
                }
                Event::Mouse(mouse) => {
                    needs_paint |= widget.handle_mouse(mouse, state, cols, rows);
                }
                Event::Resize(new_cols, new_rows) => {
                    debug!(cols = new_cols, rows = new_rows, "terminal resized");
                    cols = new_cols;
                    rows = new_rows;
                    needs_paint = true;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_frame);
        if elapsed < frame_interval {
            continue;
        }
        last_frame = now;
        state.advance(elapsed.as_secs_f64());

        let recolored = color_changed.replace(false);
        if !state.paused || needs_paint || recolored {
            let frame = widget.paint(state, cols, rows);
            draw_frame(&mut stdout, &frame)?;
            needs_paint = false;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("heart3d: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("heart3d: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use heart3d::color::Rgb;
    use heart3d::error::{ChannelError, ConfigError};
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("heart3d").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_without_arguments() {
        let cli = cli(&[]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(initial_store(&cli, &config).unwrap().color(), Rgb::new(224, 33, 138));
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn channel_flags_are_parsed_and_clamped() {
        let cli = cli(&["--red", "10", "--green", "-4", "--blue", "300"]);
        let store = initial_store(&cli, &Config::default()).unwrap();
        assert_eq!(store.css(), "rgb(10,0,255)");
    }

    #[test]
    fn non_numeric_channel_is_an_error() {
        let cli = cli(&["--green", "lime"]);
        let err = initial_store(&cli, &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Channel {
                channel: "green",
                source: ChannelError::NotANumber(_)
            }
        ));
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[color]\nred = 1\nblue = 2\n\n[animation]\nrotation_speed = 3.0").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = cli(&["--config", path, "--blue", "99", "--speed", "-0.5"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.animation.rotation_speed, -0.5);
        assert_eq!(initial_store(&cli, &config).unwrap().color(), Rgb::new(1, 33, 99));
    }

    #[test]
    fn invalid_fps_override_is_rejected() {
        let cli = cli(&["--fps", "0"]);
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn snapshot_size_requires_snapshot() {
        assert!(Cli::try_parse_from(["heart3d", "--width", "40"]).is_err());
        let cli = cli(&["--snapshot", "--width", "40", "--height", "20"]);
        assert_eq!((cli.width, cli.height), (Some(40), Some(20)));
    }
}
