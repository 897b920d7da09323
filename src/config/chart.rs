//! Runtime configuration for the demo binaries.
//!
//! Besides detector parameters the config may carry axis anchors: two
//! (value, pixel) reference pairs per axis that map measurement values
//! onto raster coordinates, so queries can be phrased as "height 80 cm
//! at 12 months" instead of pixel positions.

use crate::detector::DetectorParams;
use crate::types::MeasurementType;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Linear axis calibration from two reference pairs.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AxisAnchors {
    pub value1: f32,
    pub pixel1: f32,
    pub value2: f32,
    pub pixel2: f32,
}

impl AxisAnchors {
    pub fn to_pixel(&self, value: f32) -> f32 {
        let slope = (self.pixel2 - self.pixel1) / (self.value2 - self.value1);
        self.pixel1 + slope * (value - self.value1)
    }
}

/// Anchors for one chart scan: the shared age axis plus one value axis
/// per panel present on the chart.
#[derive(Clone, Debug, Deserialize)]
pub struct ChartAnchors {
    pub age_x: AxisAnchors,
    pub height_y: Option<AxisAnchors>,
    pub weight_y: Option<AxisAnchors>,
    pub head_y: Option<AxisAnchors>,
}

impl ChartAnchors {
    pub fn y_axis(&self, measurement: MeasurementType) -> Option<&AxisAnchors> {
        match measurement {
            MeasurementType::Height => self.height_y.as_ref(),
            MeasurementType::Weight => self.weight_y.as_ref(),
            MeasurementType::Head => self.head_y.as_ref(),
        }
    }

    /// Raster position of a (age, value) pair, `None` when the chart has
    /// no axis for that measurement.
    pub fn point_for(&self, measurement: MeasurementType, age: f32, value: f32) -> Option<(f32, f32)> {
        let y_axis = self.y_axis(measurement)?;
        Some((self.age_x.to_pixel(age), y_axis.to_pixel(value)))
    }
}

/// One measurement the demo classifies after detection.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct QueryPoint {
    pub measurement: MeasurementType,
    pub age: f32,
    pub value: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(&self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub detector_params: DetectorParams,
    pub anchors: Option<ChartAnchors>,
    #[serde(default)]
    pub queries: Vec<QueryPoint>,
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

/// Reads the config path from the command line.
pub fn parse_cli(program: &str) -> Result<RuntimeConfig, String> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| format!("Usage: {program} <config.json>"))?;
    if args.next().is_some() {
        return Err(format!("Usage: {program} <config.json>"));
    }
    load_config(Path::new(&path))
}
