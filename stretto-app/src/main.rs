//! Stretto - terminal tempo trainer
//!
//! Plays one track at a time and lets you slow it down or speed it up,
//! with or without keeping the original pitch.

mod app;
mod config;
mod view;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{unbounded, Receiver};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stretto_audio::{Player, UiEvent, UiGate};
use stretto_engine::{Renderer, SoftwareEngine};
use stretto_input::{Command, InputHandler};

use crate::app::{App, LoadResult};
use crate::config::Config;

/// Frame rate for UI updates
const FPS: u64 = 30;

/// Output rate used when no device is available
const FALLBACK_RATE: u32 = 48_000;

fn main() -> anyhow::Result<()> {
    init_logging();

    let mut config = Config::load();
    let initial = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.last_track.clone());

    // Output device first; the engine renders at its rate
    let output = OutputDevice::open();
    let rate = output.as_ref().map_or(FALLBACK_RATE, |o| o.sample_rate);
    let engine = SoftwareEngine::new(rate);
    let renderer = engine.renderer();

    let (ui_tx, ui_rx) = UiGate::create_channel();
    let mut app = App::new();
    let (player, _stream) = match output {
        Ok(device) => {
            let stream = device.start(renderer);
            if let Err(ref e) = stream {
                error!("Audio output unavailable: {}", e);
                app.error = Some(format!("Audio output unavailable: {}", e));
            }
            (Player::new(engine, config.player_settings(), ui_tx), stream.ok())
        }
        Err(e) => {
            error!("Audio output unavailable: {}", e);
            app.error = Some(format!("Audio output unavailable: {}", e));
            (Player::new(engine, config.player_settings(), ui_tx), None)
        }
    };
    let mut player = player.context("Audio engine failed to start")?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(
        &mut terminal,
        &mut app,
        &mut player,
        &ui_rx,
        &mut config,
        initial,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    player.shutdown();
    info!("Stretto exiting");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    player: &mut Player<SoftwareEngine>,
    ui_rx: &Receiver<UiEvent>,
    config: &mut Config,
    initial: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut input = InputHandler::new();
    let (load_tx, load_rx) = unbounded::<LoadResult>();
    let frame_duration = Duration::from_millis(1000 / FPS);

    if let Some(path) = initial {
        app.dispatch(Command::LoadTrack(path), player, &load_tx);
    }

    loop {
        let last_frame = Instant::now();

        for result in load_rx.try_iter() {
            if let Some(path) = app.complete_load(result, player) {
                config.last_track = Some(path);
                if let Err(e) = config.save() {
                    warn!("Could not save config: {}", e);
                }
            }
        }

        app.drain_events(ui_rx);
        app.refresh(player);

        terminal.draw(|frame| view::render(frame, app, &input))?;

        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = input.handle_key(key) {
                    app.dispatch(cmd, player, &load_tx);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Default output device and its stream configuration
struct OutputDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
}

impl OutputDevice {
    fn open() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No audio output device found")?;
        let supported = device
            .default_output_config()
            .context("Failed to get audio config")?;
        let sample_rate = supported.sample_rate().0;
        info!(
            "Output device: {} ({} Hz, {} channels)",
            device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            supported.channels()
        );
        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
        })
    }

    /// Start pulling audio from `renderer`; the stream plays until dropped
    fn start(self, renderer: Renderer) -> anyhow::Result<cpal::Stream> {
        let channels = self.config.channels as usize;
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    renderer.render(data, channels);
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .context("Failed to create audio stream")?;
        stream.play().context("Failed to start audio")?;
        Ok(stream)
    }
}

/// Log to a file; the terminal belongs to the UI
///
/// Filter comes from `RUST_LOG`, defaulting to `info`.
fn init_logging() {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stretto");
    let file = fs::create_dir_all(&dir).and_then(|_| File::create(dir.join("stretto.log")));
    let Ok(file) = file else {
        // No log file, no logging
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
