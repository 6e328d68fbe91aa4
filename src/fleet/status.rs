use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::HireOut;

pub const STATUS_AVAILABLE: &str = "available";
pub const STATUS_IN_TRANSIT: &str = "in-transit";
pub const STATUS_MAINTENANCE: &str = "maintenance";
pub const STATUS_RETIRED: &str = "retired";

/// Effective operational status of a truck, computed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum TruckStatus {
    Available,
    InTransit { trip_id: Uuid },
    Maintenance,
    Retired,
}

impl TruckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruckStatus::Available => STATUS_AVAILABLE,
            TruckStatus::InTransit { .. } => STATUS_IN_TRANSIT,
            TruckStatus::Maintenance => STATUS_MAINTENANCE,
            TruckStatus::Retired => STATUS_RETIRED,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, TruckStatus::Available)
    }
}

/// The only states that are persisted on a truck row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualStatus {
    Maintenance,
    Retired,
}

impl ManualStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManualStatus::Maintenance => STATUS_MAINTENANCE,
            ManualStatus::Retired => STATUS_RETIRED,
        }
    }

    /// Reads the nullable `manual_status` column. Unknown values are ignored so a bad row
    /// falls back to the derived status instead of failing the whole list.
    pub fn from_column(value: Option<&str>) -> Option<Self> {
        value.and_then(|raw| raw.parse().ok())
    }
}

impl fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusParseError {
    #[error("status `{0}` is derived from trips and cannot be set manually")]
    Derived(String),
    #[error("unknown truck status `{0}`")]
    Unknown(String),
}

impl FromStr for ManualStatus {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            STATUS_MAINTENANCE => Ok(ManualStatus::Maintenance),
            STATUS_RETIRED => Ok(ManualStatus::Retired),
            STATUS_AVAILABLE | STATUS_IN_TRANSIT => Err(StatusParseError::Derived(value.to_string())),
            other => Err(StatusParseError::Unknown(other.to_string())),
        }
    }
}

/// Status name accepted by list filters. `None` means "all".
pub fn parse_status_filter(value: &str) -> Result<Option<&'static str>, StatusParseError> {
    match value.trim() {
        "" | "all" => Ok(None),
        STATUS_AVAILABLE => Ok(Some(STATUS_AVAILABLE)),
        STATUS_IN_TRANSIT => Ok(Some(STATUS_IN_TRANSIT)),
        STATUS_MAINTENANCE => Ok(Some(STATUS_MAINTENANCE)),
        STATUS_RETIRED => Ok(Some(STATUS_RETIRED)),
        other => Err(StatusParseError::Unknown(other.to_string())),
    }
}

/// Requested change coming from the "set status" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Clear,
    Set(ManualStatus),
}

impl FromStr for StatusChange {
    type Err = StatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim() == STATUS_AVAILABLE {
            return Ok(StatusChange::Clear);
        }
        value.parse().map(StatusChange::Set)
    }
}

impl StatusChange {
    pub fn column_value(&self) -> Option<&'static str> {
        match self {
            StatusChange::Clear => None,
            StatusChange::Set(status) => Some(status.as_str()),
        }
    }
}

pub fn is_ongoing(hire_out: &HireOut, now: NaiveDateTime) -> bool {
    match hire_out.end_date {
        None => true,
        Some(end) => end > now,
    }
}

/// The ongoing trip of a truck. When several overlap, the most recently started wins.
pub fn active_trip<'a, I>(truck_id: Uuid, hire_outs: I, now: NaiveDateTime) -> Option<&'a HireOut>
where
    I: IntoIterator<Item = &'a HireOut>,
{
    hire_outs
        .into_iter()
        .filter(|h| h.truck_id == truck_id && is_ongoing(h, now))
        .max_by_key(|h| h.start_date)
}

pub fn derive_status<'a, I>(
    truck_id: Uuid,
    manual: Option<ManualStatus>,
    hire_outs: I,
    now: NaiveDateTime,
) -> TruckStatus
where
    I: IntoIterator<Item = &'a HireOut>,
{
    match manual {
        Some(ManualStatus::Maintenance) => TruckStatus::Maintenance,
        Some(ManualStatus::Retired) => TruckStatus::Retired,
        None => match active_trip(truck_id, hire_outs, now) {
            Some(trip) => TruckStatus::InTransit { trip_id: trip.id },
            None => TruckStatus::Available,
        },
    }
}
