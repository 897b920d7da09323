//! Loading and normalizing pre-traced curve datasets.
//!
//! Datasets arrive in two shapes. The preferred one is a map keyed
//! `"<measurement>-<label>"` where every entry carries its own points,
//! percentile and type. Legacy files hold a bare array of point lists
//! instead; those are mapped through caller-supplied ordering metadata
//! when available, through the documented 14-curve convention when the
//! count matches, and through a lossy half-and-half split as a last
//! resort. The result always says which path was taken.

use crate::error::DatasetError;
use crate::types::{ChartCurves, Curve, CurvePoint, MeasurementType, PercentileLabel};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Label order of the bare-array form, by measurement. Mirrors the
/// `curveArrayOrder` block some datasets embed next to their curves.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatasetOrdering {
    pub height: Option<Vec<PercentileLabel>>,
    pub weight: Option<Vec<PercentileLabel>>,
    pub head: Option<Vec<PercentileLabel>>,
}

impl DatasetOrdering {
    fn expected_count(&self) -> usize {
        self.height.as_ref().map_or(0, Vec::len)
            + self.weight.as_ref().map_or(0, Vec::len)
            + self.head.as_ref().map_or(0, Vec::len)
    }

    fn flat(&self) -> Vec<(MeasurementType, PercentileLabel)> {
        let mut out = Vec::new();
        if let Some(labels) = &self.height {
            out.extend(labels.iter().map(|&l| (MeasurementType::Height, l)));
        }
        if let Some(labels) = &self.weight {
            out.extend(labels.iter().map(|&l| (MeasurementType::Weight, l)));
        }
        if let Some(labels) = &self.head {
            out.extend(labels.iter().map(|&l| (MeasurementType::Head, l)));
        }
        out
    }
}

/// How the loader arrived at its labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetQuality {
    /// Keyed entries carrying explicit labels.
    Keyed,
    /// Bare array mapped through ordering metadata.
    ExplicitOrder,
    /// Bare array mapped through the 14-curve convention.
    PositionalOrder,
    /// Unknown count, half-and-half split with P50 labels. Lossy.
    GenericFallback,
}

#[derive(Clone, Debug)]
pub struct LoadedDataset {
    pub curves: ChartCurves,
    pub quality: DatasetQuality,
    /// Curves dropped to keep one curve per label.
    pub discarded: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Rich {
        points: Vec<[f32; 2]>,
        percentile: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Bare(Vec<[f32; 2]>),
}

/// Reads and normalizes a dataset file.
pub fn load_dataset(path: &Path, ordering: Option<&DatasetOrdering>) -> Result<LoadedDataset, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&text, ordering)
}

/// Normalizes a dataset from JSON text. `ordering` applies only to the
/// bare-array form; when the caller passes none, a `curveArrayOrder`
/// block embedded in the file is used instead.
pub fn parse_dataset(json: &str, ordering: Option<&DatasetOrdering>) -> Result<LoadedDataset, DatasetError> {
    let root: Value = serde_json::from_str(json)?;
    let curves = root.get("curves").ok_or(DatasetError::Malformed)?;

    let embedded: Option<DatasetOrdering> = root
        .get("curveArrayOrder")
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    let ordering = ordering.or(embedded.as_ref());

    match curves {
        Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                let entry: RawEntry =
                    serde_json::from_value(value.clone()).map_err(|_| DatasetError::Malformed)?;
                entries.push((key.clone(), entry));
            }
            Ok(from_keyed(entries))
        }
        Value::Array(_) => {
            let lists: Vec<Vec<[f32; 2]>> =
                serde_json::from_value(curves.clone()).map_err(|_| DatasetError::Malformed)?;
            Ok(from_bare(lists, ordering))
        }
        _ => Err(DatasetError::Malformed),
    }
}

fn from_keyed(entries: Vec<(String, RawEntry)>) -> LoadedDataset {
    let mut out = LoadedDataset {
        curves: ChartCurves::default(),
        quality: DatasetQuality::Keyed,
        discarded: 0,
    };
    for (key, entry) in entries {
        let (points, percentile, kind) = match entry {
            RawEntry::Rich {
                points,
                percentile,
                kind,
            } => (points, percentile, kind),
            RawEntry::Bare(points) => (points, None, None),
        };

        let measurement = kind
            .as_deref()
            .and_then(MeasurementType::parse)
            .or_else(|| key_prefix_measurement(&key))
            .unwrap_or(MeasurementType::Weight);
        let label = percentile
            .as_deref()
            .and_then(PercentileLabel::parse)
            .or_else(|| key_suffix_label(&key))
            .unwrap_or(PercentileLabel::P50);

        insert_unique(&mut out, curve_from(measurement, label, points));
    }
    debug!(
        "dataset: keyed form, {} curves ({} duplicates dropped)",
        out.curves.curve_count(),
        out.discarded
    );
    out
}

fn from_bare(lists: Vec<Vec<[f32; 2]>>, ordering: Option<&DatasetOrdering>) -> LoadedDataset {
    let total = lists.len();

    if let Some(order) = ordering {
        let expected = order.expected_count();
        if expected == total && expected > 0 {
            let mut out = LoadedDataset {
                curves: ChartCurves::default(),
                quality: DatasetQuality::ExplicitOrder,
                discarded: 0,
            };
            for ((measurement, label), points) in order.flat().into_iter().zip(lists) {
                insert_unique(&mut out, curve_from(measurement, label, points));
            }
            debug!("dataset: bare form mapped through ordering metadata, {total} curves");
            return out;
        }
        if expected > 0 {
            warn!(
                "dataset: ordering metadata lists {expected} curves but file has {total}, \
                 mapping sequentially"
            );
            let mut out = LoadedDataset {
                curves: ChartCurves::default(),
                quality: DatasetQuality::PositionalOrder,
                discarded: 0,
            };
            let flat = order.flat();
            for (idx, points) in lists.into_iter().enumerate() {
                let (measurement, label) = flat
                    .get(idx)
                    .copied()
                    .unwrap_or((MeasurementType::Weight, PercentileLabel::P50));
                insert_unique(&mut out, curve_from(measurement, label, points));
            }
            return out;
        }
    }

    if total == 14 {
        // Standard export convention: seven height curves printed top to
        // bottom (P97 first), then seven weight curves (P3 first).
        let mut out = LoadedDataset {
            curves: ChartCurves::default(),
            quality: DatasetQuality::PositionalOrder,
            discarded: 0,
        };
        let height_order = PercentileLabel::ALL.iter().rev();
        let weight_order = PercentileLabel::ALL.iter();
        let slots = height_order
            .map(|&l| (MeasurementType::Height, l))
            .chain(weight_order.map(|&l| (MeasurementType::Weight, l)));
        for ((measurement, label), points) in slots.zip(lists) {
            insert_unique(&mut out, curve_from(measurement, label, points));
        }
        debug!("dataset: bare form mapped through the 14-curve convention");
        return out;
    }

    warn!(
        "dataset: bare form with {total} curves and no usable ordering, \
         falling back to a lossy half-and-half split"
    );
    let mut out = LoadedDataset {
        curves: ChartCurves::default(),
        quality: DatasetQuality::GenericFallback,
        discarded: 0,
    };
    for (idx, points) in lists.into_iter().enumerate() {
        let measurement = if idx * 2 < total {
            MeasurementType::Height
        } else {
            MeasurementType::Weight
        };
        insert_unique(&mut out, curve_from(measurement, PercentileLabel::P50, points));
    }
    out
}

fn curve_from(measurement: MeasurementType, label: PercentileLabel, points: Vec<[f32; 2]>) -> Curve {
    let points = points
        .into_iter()
        .map(|[x, y]| CurvePoint::from_xy(x, y))
        .collect();
    Curve::new(measurement, label, points)
}

/// Keeps the first curve per (measurement, label) slot and counts the
/// rest, so fallback labeling never silently overwrites data.
fn insert_unique(out: &mut LoadedDataset, curve: Curve) {
    let occupied = out
        .curves
        .get(curve.measurement)
        .and_then(|set| set.get(curve.label))
        .is_some();
    if occupied {
        warn!(
            "dataset: duplicate {} {} dropped ({} points)",
            curve.measurement,
            curve.label,
            curve.len()
        );
        out.discarded += 1;
    } else {
        out.curves.insert_curve(curve);
    }
}

fn key_prefix_measurement(key: &str) -> Option<MeasurementType> {
    let prefix = key.split('-').next()?;
    MeasurementType::parse(prefix)
}

fn key_suffix_label(key: &str) -> Option<PercentileLabel> {
    let suffix = key.rsplit('-').next()?;
    PercentileLabel::parse(suffix)
}
