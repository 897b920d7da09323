use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Clusters below this size are discarded as noise.
pub const MIN_CURVE_POINTS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Height,
    Weight,
    Head,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 3] = [
        MeasurementType::Height,
        MeasurementType::Weight,
        MeasurementType::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Height => "height",
            MeasurementType::Weight => "weight",
            MeasurementType::Head => "head",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "height" => Some(MeasurementType::Height),
            "weight" => Some(MeasurementType::Weight),
            "head" => Some(MeasurementType::Head),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard reference-line labels, ordered from lowest to highest percentile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PercentileLabel {
    P3,
    P10,
    P25,
    P50,
    P75,
    P90,
    P97,
}

impl PercentileLabel {
    pub const ALL: [PercentileLabel; 7] = [
        PercentileLabel::P3,
        PercentileLabel::P10,
        PercentileLabel::P25,
        PercentileLabel::P50,
        PercentileLabel::P75,
        PercentileLabel::P90,
        PercentileLabel::P97,
    ];

    pub fn value(&self) -> f32 {
        match self {
            PercentileLabel::P3 => 3.0,
            PercentileLabel::P10 => 10.0,
            PercentileLabel::P25 => 25.0,
            PercentileLabel::P50 => 50.0,
            PercentileLabel::P75 => 75.0,
            PercentileLabel::P90 => 90.0,
            PercentileLabel::P97 => 97.0,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "P3" => Some(PercentileLabel::P3),
            "P10" => Some(PercentileLabel::P10),
            "P25" => Some(PercentileLabel::P25),
            "P50" => Some(PercentileLabel::P50),
            "P75" => Some(PercentileLabel::P75),
            "P90" => Some(PercentileLabel::P90),
            "P97" => Some(PercentileLabel::P97),
            _ => None,
        }
    }

    /// P3, P50 and P97 are conventionally printed with a heavier stroke.
    pub fn is_heavy_stroke(&self) -> bool {
        matches!(
            self,
            PercentileLabel::P3 | PercentileLabel::P50 | PercentileLabel::P97
        )
    }
}

impl fmt::Display for PercentileLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.value() as i32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
    pub pos: Point2<f32>,
    /// 255 minus mean channel brightness at the sample, higher = darker.
    pub intensity: f32,
}

impl CurvePoint {
    pub fn new(x: f32, y: f32, intensity: f32) -> Self {
        Self {
            pos: Point2::new(x, y),
            intensity,
        }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0)
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }
}

/// One labeled percentile polyline. Points are kept sorted by ascending x.
#[derive(Clone, Debug, Serialize)]
pub struct Curve {
    pub measurement: MeasurementType,
    pub label: PercentileLabel,
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(
        measurement: MeasurementType,
        label: PercentileLabel,
        mut points: Vec<CurvePoint>,
    ) -> Self {
        points.sort_by(|a, b| a.x().partial_cmp(&b.x()).unwrap_or(Ordering::Equal));
        Self {
            measurement,
            label,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mean_y(&self) -> f32 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.iter().map(|p| p.y()).sum::<f32>() / self.points.len() as f32
    }

    pub fn x_span(&self) -> Option<(f32, f32)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some((first.x(), last.x()))
    }
}

/// Labeled curves for one measurement type, at most one per label.
#[derive(Clone, Debug, Serialize)]
pub struct CurveSet {
    measurement: MeasurementType,
    curves: Vec<Curve>,
}

impl CurveSet {
    pub fn new(measurement: MeasurementType) -> Self {
        Self {
            measurement,
            curves: Vec::new(),
        }
    }

    pub fn measurement(&self) -> MeasurementType {
        self.measurement
    }

    /// Inserts a curve, replacing any existing curve with the same label.
    /// Returns the replaced curve if there was one.
    pub fn insert(&mut self, curve: Curve) -> Option<Curve> {
        debug_assert_eq!(curve.measurement, self.measurement);
        let replaced = match self.curves.iter().position(|c| c.label == curve.label) {
            Some(idx) => Some(std::mem::replace(&mut self.curves[idx], curve)),
            None => {
                self.curves.push(curve);
                None
            }
        };
        self.curves.sort_by_key(|c| c.label);
        replaced
    }

    pub fn get(&self, label: PercentileLabel) -> Option<&Curve> {
        self.curves.iter().find(|c| c.label == label)
    }

    /// Curves in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

/// All curve sets extracted from one chart raster.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChartCurves {
    pub sets: Vec<CurveSet>,
}

impl ChartCurves {
    pub fn get(&self, measurement: MeasurementType) -> Option<&CurveSet> {
        self.sets.iter().find(|s| s.measurement == measurement)
    }

    pub fn get_mut(&mut self, measurement: MeasurementType) -> Option<&mut CurveSet> {
        self.sets.iter_mut().find(|s| s.measurement == measurement)
    }

    /// Inserts a whole set, replacing the existing one for that measurement.
    pub fn insert_set(&mut self, set: CurveSet) {
        match self
            .sets
            .iter_mut()
            .find(|s| s.measurement == set.measurement())
        {
            Some(slot) => *slot = set,
            None => self.sets.push(set),
        }
    }

    /// Inserts one curve into the matching set, creating the set on demand.
    pub fn insert_curve(&mut self, curve: Curve) -> Option<Curve> {
        if let Some(set) = self.get_mut(curve.measurement) {
            return set.insert(curve);
        }
        let mut set = CurveSet::new(curve.measurement);
        set.insert(curve);
        self.sets.push(set);
        None
    }

    pub fn curve_count(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    pub fn point_count(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|s| s.iter())
            .map(|c| c.len())
            .sum()
    }
}

/// Compact detection outcome for callers that do not need stage traces.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    pub curves: ChartCurves,
    /// Labeled curves found over labeled curves expected, 0..=1.
    pub coverage: f32,
    pub confidence: Confidence,
    pub latency_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeSide {
    Above,
    Below,
}

/// Percentile classification for one query point.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PercentileResult {
    /// Query lies on a reference curve.
    Exact {
        label: PercentileLabel,
        distance_px: f32,
    },
    /// Query is bracketed by two curves. `mid_gap` marks queries more than
    /// 20 px away from both brackets, where only the range is trustworthy.
    Interpolated {
        percentile: f32,
        low: PercentileLabel,
        high: PercentileLabel,
        mid_gap: bool,
    },
    /// Query is outside the bracketed band but within the extreme margin.
    Extrapolated {
        percentile: f32,
        nearest: PercentileLabel,
        distance_px: f32,
    },
    /// Query lies beyond the outermost curve by more than the margin.
    Extreme {
        bound: PercentileLabel,
        side: ExtremeSide,
        distance_px: f32,
    },
}

impl PercentileResult {
    pub fn confidence(&self) -> Confidence {
        match self {
            PercentileResult::Exact { .. } => Confidence::High,
            PercentileResult::Interpolated { .. } => Confidence::High,
            PercentileResult::Extreme { .. } => Confidence::Medium,
            PercentileResult::Extrapolated { distance_px, .. } => {
                if *distance_px < 50.0 {
                    Confidence::Medium
                } else {
                    Confidence::Low
                }
            }
        }
    }

    pub fn percentile(&self) -> f32 {
        match self {
            PercentileResult::Exact { label, .. } => label.value(),
            PercentileResult::Interpolated { percentile, .. } => *percentile,
            PercentileResult::Extrapolated { percentile, .. } => *percentile,
            PercentileResult::Extreme { bound, .. } => bound.value(),
        }
    }

    /// Ascending "P25-50" style range for interpolated results.
    pub fn range_label(&self) -> Option<String> {
        match self {
            PercentileResult::Interpolated { low, high, .. } => {
                let a = low.value().min(high.value()) as i32;
                let b = low.value().max(high.value()) as i32;
                Some(format!("P{a}-{b}"))
            }
            _ => None,
        }
    }
}

impl fmt::Display for PercentileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentileResult::Exact { label, .. } => write!(f, "{label}"),
            PercentileResult::Interpolated {
                percentile,
                mid_gap,
                ..
            } => {
                if *mid_gap {
                    f.write_str(&self.range_label().unwrap_or_default())
                } else {
                    write!(f, "P{percentile:.1}")
                }
            }
            PercentileResult::Extrapolated { nearest, .. } => write!(f, "~{nearest}"),
            PercentileResult::Extreme { bound, side, .. } => match side {
                ExtremeSide::Above => write!(f, ">{bound}"),
                ExtremeSide::Below => write!(f, "<{bound}"),
            },
        }
    }
}
