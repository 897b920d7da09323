//! Parameters of the full detection pipeline.

use crate::classify::ClassifierParams;
use crate::cluster::ClusterParams;
use crate::scan::{ScanParams, ScanRegion};
use crate::types::MeasurementType;
use serde::Deserialize;

/// One chart panel to scan for one measurement type.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct RegionSpec {
    pub measurement: MeasurementType,
    pub region: ScanRegion,
}

impl RegionSpec {
    pub fn new(measurement: MeasurementType, region: ScanRegion) -> Self {
        Self { measurement, region }
    }
}

/// Everything the detector needs, with defaults tuned for the reference
/// 2500x3500 chart layout: the height panel in the upper half, the
/// weight panel in the lower half, margins left for axis labels.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub classifier: ClassifierParams,
    pub scan: ScanParams,
    pub cluster: ClusterParams,
    pub regions: Vec<RegionSpec>,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            classifier: ClassifierParams::default(),
            scan: ScanParams::default(),
            cluster: ClusterParams::default(),
            regions: default_regions(),
        }
    }
}

/// Panel layout of the reference chart scan.
pub fn default_regions() -> Vec<RegionSpec> {
    vec![
        RegionSpec::new(
            MeasurementType::Height,
            ScanRegion::new(400, 2200, 200, 1400),
        ),
        RegionSpec::new(
            MeasurementType::Weight,
            ScanRegion::new(400, 2200, 1500, 3200),
        ),
    ]
}
