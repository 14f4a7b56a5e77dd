//! Table configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GeodexError, Result};
use crate::geohash::{GeohashRange, MAX_STEP, MIN_STEP};

/// Configuration of a [`Table`](crate::table::Table) and its geohash index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Geohash precision of the index, in bits per axis (1-32).
    /// Default: 26 (cells of roughly 0.6m x 0.3m at the equator)
    pub index_step: u8,

    /// Longitude domain of the index.
    /// Default: WGS84 (-180, 180)
    pub longitude_range: GeohashRange,

    /// Latitude domain of the index.
    /// Default: WGS84 limited to Web Mercator (about -85.05, 85.05)
    pub latitude_range: GeohashRange,

    /// Largest number of cells an envelope query may scan. Wider envelopes are covered at a
    /// coarser step.
    /// Default: 64
    pub max_query_cells: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            index_step: 26,
            longitude_range: GeohashRange::wgs84_longitude(),
            latitude_range: GeohashRange::wgs84_latitude(),
            max_query_cells: 64,
        }
    }
}

impl TableConfig {
    /// Set the index precision.
    pub fn with_index_step(mut self, step: u8) -> Self {
        self.index_step = step;
        self
    }

    /// Set the index domain.
    pub fn with_ranges(mut self, longitude: GeohashRange, latitude: GeohashRange) -> Self {
        self.longitude_range = longitude;
        self.latitude_range = latitude;
        self
    }

    /// Set the envelope query cell budget.
    pub fn with_max_query_cells(mut self, cells: usize) -> Self {
        self.max_query_cells = cells;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(MIN_STEP..=MAX_STEP).contains(&self.index_step) {
            return Err(GeodexError::invalid(format!(
                "index step must be between {MIN_STEP} and {MAX_STEP}, got {}",
                self.index_step
            )));
        }
        self.longitude_range.validate()?;
        self.latitude_range.validate()?;
        if self.max_query_cells == 0 {
            return Err(GeodexError::invalid("max_query_cells must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = TableConfig::default();
        assert_eq!(config.index_step, 26);
        assert_eq!(config.longitude_range, GeohashRange::wgs84_longitude());
        assert_eq!(config.max_query_cells, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: TableConfig = serde_json::from_str(r#"{"index_step": 12}"#).unwrap();
        assert_eq!(config, TableConfig::default().with_index_step(12));

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<TableConfig>(&json).unwrap(), config);
    }

    #[test]
    fn rejects_invalid() {
        assert!(TableConfig::default().with_index_step(0).validate().is_err());
        assert!(TableConfig::default().with_index_step(33).validate().is_err());
        assert!(TableConfig::default()
            .with_max_query_cells(0)
            .validate()
            .is_err());
        let flat = GeohashRange::new(1., 1.);
        assert!(TableConfig::default()
            .with_ranges(flat, GeohashRange::wgs84_latitude())
            .validate()
            .is_err());
    }
}
