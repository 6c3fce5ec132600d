//! Camera2 Preview CLI
//!
//! Drives the preview through a scripted sequence of lifecycle, permission
//! and surface signals against a simulated camera service, then lets the
//! preview stream for a number of frames.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use camera2_preview::{
    app::PreviewApp,
    capture::FileConfig,
    event::{Event, LifecycleEvent, SurfaceEvent},
    event_loop::{EventLoop, EventSender, LoopStatus},
    metrics::PreviewMetrics,
    platform::{SimulatedCamera, SimulatedPermissions, SurfaceHandle},
    script::{parse_script, ScriptStep},
    CameraService, PermissionService,
};
use clap::Parser;
use tracing::{error, info};

/// Camera preview lifecycle demo.
#[derive(Debug, Parser)]
#[command(name = "camera2-preview", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated signal script.
    #[arg(short, long, default_value = "surface-created,resume,grant")]
    script: String,

    /// Frames to stream after the script before shutting down.
    #[arg(short, long, default_value_t = 30)]
    frames: u32,

    /// Override the simulated API level.
    #[arg(long)]
    api_level: Option<u32>,

    /// Print Prometheus metrics on exit.
    #[arg(long)]
    metrics: bool,

    /// Stream from a real camera instead of the simulated one.
    #[cfg(feature = "camera")]
    #[arg(long)]
    live: bool,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Camera2 Preview v{}", camera2_preview::VERSION);

    let config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    let steps = match parse_script(&args.script) {
        Ok(steps) => steps,
        Err(e) => {
            eprintln!("Invalid script: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args, config, steps)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args, config: FileConfig, steps: Vec<ScriptStep>) -> Result<(), Box<dyn Error>> {
    let mut event_loop = EventLoop::new();
    let sender = event_loop.sender();
    let shutdown = sender.clone();
    ctrlc::set_handler(move || {
        shutdown.send(Event::Shutdown);
    })?;

    let metrics = PreviewMetrics::new()?;
    let stream_for = Duration::from_secs(1) * args.frames / config.preview.fps;

    #[cfg(feature = "camera")]
    if args.live {
        let camera =
            camera2_preview::platform::NokhwaCamera::new(event_loop.sender(), config.preview.clone());
        let mut app = PreviewApp::new(
            camera,
            SimulatedPermissions::new(true),
            config.preview.clone(),
            metrics.clone(),
        );
        sender.send(SurfaceEvent::Created(SurfaceHandle(1)));
        sender.send(LifecycleEvent::Resumed);
        return stream(&mut event_loop, &mut app, &sender, stream_for, &metrics, args.metrics).await;
    }

    let api_level = args.api_level.unwrap_or(config.platform.api_level);
    let camera = SimulatedCamera::new(event_loop.sender())
        .with_api_level(api_level)
        .with_camera_count(config.simulation.camera_count)
        .with_configure_failure(config.simulation.fail_session_configure)
        .with_frame_clock(config.preview.fps);
    let permissions = SimulatedPermissions::new(config.simulation.permission_granted);
    permissions.set_permanently_denied(config.simulation.permanently_denied);
    let mut app = PreviewApp::new(
        camera,
        permissions.clone(),
        config.preview.clone(),
        metrics.clone(),
    );

    let mut surfaces = 0u64;
    for step in steps {
        info!(?step, "Script step");
        let event = match step {
            ScriptStep::Resume => Some(LifecycleEvent::Resumed.into()),
            ScriptStep::Pause => Some(LifecycleEvent::Paused.into()),
            ScriptStep::Grant => {
                permissions.set_granted(true);
                Some(Event::PermissionResult)
            }
            ScriptStep::Deny => {
                permissions.set_granted(false);
                Some(Event::PermissionResult)
            }
            ScriptStep::DenyForever => {
                permissions.set_granted(false);
                permissions.set_permanently_denied(true);
                Some(Event::PermissionResult)
            }
            ScriptStep::Press => Some(Event::PermissionButtonPressed),
            ScriptStep::SurfaceCreated => {
                surfaces += 1;
                Some(SurfaceEvent::Created(SurfaceHandle(surfaces)).into())
            }
            ScriptStep::SurfaceChanged => Some(
                SurfaceEvent::Changed {
                    format: 4,
                    width: config.preview.width,
                    height: config.preview.height,
                }
                .into(),
            ),
            ScriptStep::SurfaceDestroyed => Some(SurfaceEvent::Destroyed.into()),
            ScriptStep::Disconnect => {
                app.coordinator_mut().camera_mut().disconnect();
                None
            }
        };
        if let Some(event) = event {
            sender.send(event);
        }

        if event_loop.dispatch_pending(&mut app)? == LoopStatus::Shutdown {
            app.shutdown();
            return report(&app, &metrics, args.metrics);
        }
    }
    info!(view = ?app.permission_view(), "Script finished");

    stream(&mut event_loop, &mut app, &sender, stream_for, &metrics, args.metrics).await
}

/// Runs the event loop for `duration`, then releases the camera.
async fn stream<C: CameraService, P: PermissionService>(
    event_loop: &mut EventLoop,
    app: &mut PreviewApp<C, P>,
    sender: &EventSender,
    duration: Duration,
    metrics: &PreviewMetrics,
    print_metrics: bool,
) -> Result<(), Box<dyn Error>> {
    let shutdown = sender.clone();
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        shutdown.send(Event::Shutdown);
    });

    event_loop.run(app).await?;
    app.shutdown();
    report(app, metrics, print_metrics)
}

fn report<C: CameraService, P: PermissionService>(
    app: &PreviewApp<C, P>,
    metrics: &PreviewMetrics,
    print_metrics: bool,
) -> Result<(), Box<dyn Error>> {
    info!(
        state = %app.coordinator().state(),
        opens = metrics.opens(),
        closes = metrics.closes(),
        frames = metrics.frames(),
        "Done"
    );
    if print_metrics {
        println!("{}", metrics.encode()?);
    }
    Ok(())
}
