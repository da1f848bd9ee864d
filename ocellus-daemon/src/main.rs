//! Ocellus - Animatronic Eye Display Runtime
//!
//! Drives two round SPI panels and a PCA9685 PWM controller from a Linux
//! single-board computer. Commands arrive as lines of `<topic> <json>` on
//! stdin (or a file); see `ocellus-protocol` for the format.
//!
//! Startup order: configuration, textures, hardware, then the table build
//! thread and the command reader thread, then the async tasks. Panels show
//! a loading spinner until the animation tables are ready.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use embassy_executor::{SpawnError, Spawner};
use embassy_time::Timer;
use log::{error, info, trace};
use static_cell::StaticCell;

use ocellus_core::pipeline::Eye;
use ocellus_core::traits::PWM_CHANNELS;
use ocellus_hal_linux::PinBank;

use crate::cache::TableStore;
use crate::config::load_config;
use crate::context::AppContext;

mod assets;
mod boards;
mod cache;
mod config;
mod context;
mod reader;
mod tables;
mod tasks;

/// Animatronic eye display runtime
#[derive(Parser, Debug)]
#[command(name = "ocellus", version, about)]
struct Args {
    /// Configuration file; the embedded default is used when absent or unreadable
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read commands from this file instead of stdin
    #[arg(long, value_name = "PATH")]
    commands: Option<PathBuf>,

    /// Rebuild animation tables instead of using the cache
    #[arg(long)]
    no_cache: bool,
}

// Shared state (must live forever for task references)
static CONTEXT: StaticCell<AppContext> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = Args::parse();
    info!("Ocellus starting...");

    if let Err(e) = run(spawner, args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn spawn_failed(e: SpawnError) -> anyhow::Error {
    anyhow!("task spawn failed: {:?}", e)
}

async fn run(spawner: Spawner, args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let textures = assets::load_textures(&config.render.textures)?;
    info!("Textures loaded");

    // Panels and backlight
    let mut bank = PinBank::new();
    let left = boards::open_panel(&mut bank, &config.display.left, &config.display)
        .context("left panel")?;
    let right = boards::open_panel(&mut bank, &config.display.right, &config.display)
        .context("right panel")?;
    let _backlight = match config.display.backlight_pin {
        Some(pin) => Some(boards::backlight_on(&mut bank, pin)?),
        None => None,
    };
    info!("Panels opened");

    // PWM controller; the eyes run without it
    let pwm = if config.actuator.enabled {
        match boards::open_pwm(&config.actuator) {
            Ok(pwm) => Some(pwm),
            Err(e) => {
                error!("Actuator unavailable: {:#}", e);
                None
            }
        }
    } else {
        info!("Actuator disabled in configuration");
        None
    };
    let has_pwm = pwm.is_some();

    let store = if config.cache.enabled && !args.no_cache {
        Some(TableStore::new(&config.cache.dir))
    } else {
        info!("Table cache disabled");
        None
    };

    let ctx: &'static AppContext = CONTEXT.init(AppContext::new(config, pwm));

    // Background threads
    tables::spawn_table_builder(ctx, textures, store)?;
    reader::spawn_reader(ctx, args.commands).context("command input")?;

    // Spawn tasks
    spawner.spawn(tasks::loading_task(ctx).map_err(spawn_failed)?);
    spawner.spawn(tasks::render_task(ctx).map_err(spawn_failed)?);
    spawner.spawn(tasks::display_task(ctx, Eye::Left, left).map_err(spawn_failed)?);
    spawner.spawn(tasks::display_task(ctx, Eye::Right, right).map_err(spawn_failed)?);
    spawner.spawn(tasks::dispatch_task(ctx).map_err(spawn_failed)?);
    spawner.spawn(tasks::actuator_task(ctx).map_err(spawn_failed)?);
    if has_pwm {
        for channel in 0..PWM_CHANNELS {
            spawner.spawn(tasks::breath_task(ctx, channel).map_err(spawn_failed)?);
        }
    }

    info!("All tasks spawned, runtime running");

    // Keeps the backlight pin alive; all work happens in spawned tasks
    loop {
        Timer::after_secs(60).await;
        trace!(
            "heartbeat: queued {}/{}, evicted {}/{}",
            ctx.queue(Eye::Left).len(),
            ctx.queue(Eye::Right).len(),
            ctx.queue(Eye::Left).evicted(),
            ctx.queue(Eye::Right).evicted()
        );
    }
}
