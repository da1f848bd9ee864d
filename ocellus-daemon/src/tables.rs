//! Animation table construction
//!
//! Building all three tables takes a while on the target, so it runs on
//! its own thread. Both iris tables are built in parallel; the eyelid
//! table is cheap and built afterwards.

use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{error, info};

use ocellus_core::config::Config;
use ocellus_core::pipeline::FrameComposer;
use ocellus_core::render::cache::TableKey;
use ocellus_core::render::table::{
    build_eyelid_table, build_iris_table, AnimationTable, TableKind,
};
use ocellus_core::render::Canvas;

use crate::assets::Textures;
use crate::cache::TableStore;
use crate::context::AppContext;

fn iris_table(
    iris: &Canvas,
    sclera: &Canvas,
    config: &Config,
    store: Option<&TableStore>,
) -> Result<AnimationTable> {
    let render = &config.render;
    let build = || build_iris_table(iris, sclera, render);
    let table = match store {
        Some(store) => store.load_or_build(
            &TableKey::iris(iris, sclera, render),
            TableKind::IrisSclera,
            render.canvas_size,
            render.iris_steps,
            build,
        )?,
        None => build()?,
    };
    Ok(table)
}

fn eyelid_table(config: &Config, store: Option<&TableStore>) -> Result<AnimationTable> {
    let size = config.render.canvas_size;
    let build = || build_eyelid_table(&config.eyelid, size);
    let table = match store {
        Some(store) => store.load_or_build(
            &TableKey::eyelid(&config.eyelid, size),
            TableKind::Eyelid,
            size,
            config.eyelid.steps,
            build,
        )?,
        None => build()?,
    };
    Ok(table)
}

/// Build (or load) every table and assemble the composer
pub fn build_composer(
    config: &Config,
    textures: &Textures,
    store: Option<&TableStore>,
) -> Result<FrameComposer> {
    let started = Instant::now();

    let (left, right) = thread::scope(|s| {
        let left = s.spawn(|| iris_table(&textures.iris_left, &textures.sclera, config, store));
        let right = iris_table(&textures.iris_right, &textures.sclera, config, store);
        let left = left
            .join()
            .map_err(|_| anyhow!("left iris builder panicked"))?;
        Ok::<_, anyhow::Error>((left, right))
    })?;
    let left = left.context("left iris table")?;
    let right = right.context("right iris table")?;
    let lid = eyelid_table(config, store).context("eyelid table")?;

    info!(
        "Animation tables ready in {} ms ({} iris + {} eyelid frames per eye)",
        started.elapsed().as_millis(),
        left.len(),
        lid.len()
    );

    let display = &config.display;
    Ok(
        FrameComposer::new(left, right, lid, config.gaze.clone())
            .with_trims(display.left.trim, display.right.trim),
    )
}

/// Build the tables on a background thread and publish them to `ctx`
///
/// A build failure is a configuration error and ends the process.
pub fn spawn_table_builder<P: Send + 'static>(
    ctx: &'static AppContext<P>,
    textures: Textures,
    store: Option<TableStore>,
) -> Result<()> {
    thread::Builder::new()
        .name("tables".into())
        .spawn(move || {
            info!("Building animation tables");
            match build_composer(&ctx.config, &textures, store.as_ref()) {
                Ok(composer) => {
                    ctx.publish(composer);
                    info!("Animation tables published");
                }
                Err(e) => {
                    error!("Animation tables could not be built: {:#}", e);
                    std::process::exit(1);
                }
            }
        })?;
    Ok(())
}
