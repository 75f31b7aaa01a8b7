//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Coarse infestation severity reported to the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Collapse the farmer-facing 0-5 damage scale into the backend enum.
    ///
    /// Levels 0-2 map to `Low`, 3 to `Medium`, 4 to `High`, 5 to `Critical`.
    /// Values above 5 are rejected rather than clamped.
    pub fn from_report_level(level: u8) -> Result<Self, InvalidReportLevel> {
        match level {
            0..=2 => Ok(Severity::Low),
            3 => Ok(Severity::Medium),
            4 => Ok(Severity::High),
            5 => Ok(Severity::Critical),
            _ => Err(InvalidReportLevel(level)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report level outside the 0-5 damage scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("report level {0} is outside the 0-5 damage scale")]
pub struct InvalidReportLevel(pub u8);

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl Pagination {
    /// Page size large enough to fetch a whole admin collection in one call.
    pub fn unpaginated() -> Self {
        Self {
            page: 1,
            page_size: 1000,
        }
    }
}

/// Date range for queries and filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: chrono::NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_level_mapping_is_total_on_valid_range() {
        assert_eq!(Severity::from_report_level(0).unwrap(), Severity::Low);
        assert_eq!(Severity::from_report_level(1).unwrap(), Severity::Low);
        assert_eq!(Severity::from_report_level(2).unwrap(), Severity::Low);
        assert_eq!(Severity::from_report_level(3).unwrap(), Severity::Medium);
        assert_eq!(Severity::from_report_level(4).unwrap(), Severity::High);
        assert_eq!(Severity::from_report_level(5).unwrap(), Severity::Critical);
    }

    #[test]
    fn report_level_above_scale_is_rejected() {
        assert_eq!(Severity::from_report_level(6), Err(InvalidReportLevel(6)));
        assert_eq!(
            Severity::from_report_level(255),
            Err(InvalidReportLevel(255))
        );
    }

    #[test]
    fn severity_round_trips_through_str() {
        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(severity.as_str().parse::<Severity>().unwrap(), severity);
        }
    }
}
