//! Burst: sunburst charts from the command line.
//!
//! Loads a hierarchy, optionally zooms along a path of node names, then
//! writes an SVG snapshot and/or opens the interactive Bevy window.

mod config;
mod error;

use std::fs;
use std::path::Path;
use std::time::Duration;

use burst::prelude::*;
use burst::runtime::run_sunburst;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::CliError;

/// Far enough past any zoom or label fade for everything to settle.
const SETTLE: Duration = Duration::from_secs(3600);

fn load_data(path: &Path) -> error::Result<Vec<HierarchyNode>> {
    let json = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(HierarchyNode::from_json(&json)?)
}

/// Render once, replay the zoom clicks and let every transition finish.
fn snapshot(config: &Config, options: SunburstOptions, data: Vec<HierarchyNode>) -> error::Result<String> {
    let mut chart = Sunburst::new(options);
    let mut scene = Scene::new();
    let root = scene.root();
    chart.render(&mut scene, &Selection::single(root, data))?;

    let path = config.zoom_path();
    if !path.is_empty() {
        let target = chart
            .partition()
            .and_then(|p| p.find_path(&path))
            .ok_or_else(|| CliError::UnknownPath(path.join("/")))?;
        chart.click(&mut scene, target)?;
        chart.tick(&mut scene, SETTLE);
        chart.tick(&mut scene, SETTLE * 2);
        info!(node = %target, "zoomed");
    }
    Ok(scene.to_svg())
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "burst_charts=info,burst_cli=info".into()),
        )
        .init();

    let config = Config::parse();
    let data = load_data(&config.input)?;
    let options = config.sunburst_options()?;
    info!(input = %config.input.display(), mode = ?options.mode, "loaded hierarchy");

    if let Some(out) = &config.svg {
        let svg = snapshot(&config, options.clone(), data.clone())?;
        fs::write(out, svg).map_err(|source| CliError::Write {
            path: out.clone(),
            source,
        })?;
        info!("wrote {}", out.display());
    }

    if config.wants_window() {
        if config.zoom.is_some() {
            warn!("--zoom only applies to the SVG snapshot");
        }
        run_sunburst(Sunburst::new(options), data);
    }
    Ok(())
}
