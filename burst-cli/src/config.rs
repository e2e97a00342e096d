//! CLI configuration

use std::fs;
use std::path::PathBuf;

use burst::prelude::{ChartId, SunburstOptions, WeightMode};
use clap::Parser;

use crate::error::{CliError, Result};

/// Render a hierarchy as a zoomable sunburst chart
#[derive(Parser, Clone, Debug)]
#[command(name = "burst-cli")]
#[command(about = "Render hierarchy JSON as a sunburst, to SVG or an interactive window")]
pub struct Config {
    /// Hierarchy JSON file: a root node or a one-element array holding it
    pub input: PathBuf,

    /// Sunburst options JSON file; flags below override it
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Leaf weighting, "count" or "size"
    #[arg(long)]
    pub mode: Option<String>,

    /// Surface width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Surface height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Zoom animation length in milliseconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Color leaves by their parent's name
    #[arg(long)]
    pub group_by_parent: Option<bool>,

    /// Chart instance id
    #[arg(long)]
    pub id: Option<u64>,

    /// Names from the root's children down to the node to zoom on, joined by '/'
    #[arg(long)]
    pub zoom: Option<String>,

    /// Write the rendered chart as SVG to this path
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Open an interactive window (default when no --svg is given)
    #[arg(long)]
    pub window: bool,
}

impl Config {
    pub fn sunburst_options(&self) -> Result<SunburstOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|source| CliError::Read {
                    path: path.clone(),
                    source,
                })?;
                SunburstOptions::from_json(&json)?
            }
            None => SunburstOptions::default(),
        };

        if let Some(mode) = &self.mode {
            options.mode = mode.parse::<WeightMode>()?;
        }
        if self.width.is_some() {
            options.canvas.size.width = self.width;
        }
        if self.height.is_some() {
            options.canvas.size.height = self.height;
        }
        if let Some(ms) = self.duration {
            options.duration = ms;
        }
        if let Some(on) = self.group_by_parent {
            options.group_color_by_parent = on;
        }
        if let Some(id) = self.id {
            options.id = Some(ChartId(id));
        }
        options.validate()?;
        Ok(options)
    }

    /// Zoom path split into node names.
    pub fn zoom_path(&self) -> Vec<String> {
        self.zoom
            .as_deref()
            .map(|z| z.split('/').filter(|s| !s.is_empty()).map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn wants_window(&self) -> bool {
        self.window || self.svg.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "burst", "tree.json", "--mode", "size", "--width", "400", "--duration", "0", "--id", "3",
        ])
        .unwrap();
        let options = config.sunburst_options().unwrap();
        assert_eq!(options.mode, WeightMode::Size);
        assert_eq!(options.canvas.size.width, Some(400.0));
        assert_eq!(options.duration, 0);
        assert_eq!(options.id, Some(ChartId(3)));
        assert!(options.group_color_by_parent);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let config = Config::try_parse_from(["burst", "tree.json", "--mode", "area"]).unwrap();
        assert!(matches!(config.sunburst_options(), Err(CliError::Chart(_))));
    }

    #[test]
    fn zoom_path_splits_on_slashes() {
        let config = Config::try_parse_from(["burst", "t.json", "--zoom", "fruit/apple/", "--svg", "o.svg"])
            .unwrap();
        assert_eq!(config.zoom_path(), vec!["fruit", "apple"]);
        assert!(!config.wants_window());
    }
}
