use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

// ─── OrderType ──────────────────────────────────────────────

/// Discriminant of the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Service,
    Sales,
    Consultation,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [Self::Service, Self::Sales, Self::Consultation];

    /// Parse the raw control value. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "service" => Some(Self::Service),
            "sales" => Some(Self::Sales),
            "consultation" => Some(Self::Consultation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Sales => "sales",
            Self::Consultation => "consultation",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── ServiceOption ──────────────────────────────────────────

/// Checkboxes offered in the `service_selection` group of a service order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOption {
    OilChange,
    EngineDiagnostics,
    BrakeRepair,
    TireRotation,
    WheelAlignment,
    BatteryCheck,
    FluidTopUp,
}

impl ServiceOption {
    pub const ALL: [ServiceOption; 7] = [
        Self::OilChange,
        Self::EngineDiagnostics,
        Self::BrakeRepair,
        Self::TireRotation,
        Self::WheelAlignment,
        Self::BatteryCheck,
        Self::FluidTopUp,
    ];

    /// Checkbox value as submitted by the form.
    pub fn value(&self) -> &'static str {
        match self {
            Self::OilChange => "oil_change",
            Self::EngineDiagnostics => "engine_diagnostics",
            Self::BrakeRepair => "brake_repair",
            Self::TireRotation => "tire_rotation",
            Self::WheelAlignment => "wheel_alignment",
            Self::BatteryCheck => "battery_check",
            Self::FluidTopUp => "fluid_top_up",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OilChange => "Oil Change",
            Self::EngineDiagnostics => "Engine Diagnostics",
            Self::BrakeRepair => "Brake Repair",
            Self::TireRotation => "Tire Rotation",
            Self::WheelAlignment => "Wheel Alignment",
            Self::BatteryCheck => "Battery Check",
            Self::FluidTopUp => "Fluid Top-Up",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.value() == value)
    }
}

// ─── RecentOrder ────────────────────────────────────────────

/// Entry of the recent-orders feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentOrder {
    pub order_number: String,
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub priority: String,
    pub customer: String,
    #[serde(default)]
    pub vehicle: Option<String>,
    /// Offset-less timestamps are read as UTC.
    #[serde(deserialize_with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn iso_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Display-ready cells of one recent-orders table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOrderRow {
    pub order_number: String,
    pub status: String,
    /// CSS-ish hint, e.g. `pill-in_progress`.
    pub status_class: String,
    pub order_type: String,
    pub priority: String,
    pub priority_class: String,
    pub customer: String,
    pub vehicle: String,
    pub created: String,
}

impl RecentOrder {
    pub fn row(&self) -> RecentOrderRow {
        RecentOrderRow {
            order_number: self.order_number.clone(),
            // Only the first underscore is spaced: `in_progress` → `IN PROGRESS`.
            status: self.status.replacen('_', " ", 1).to_uppercase(),
            status_class: format!("pill-{}", self.status),
            order_type: self.order_type.to_uppercase(),
            priority: self.priority.to_uppercase(),
            priority_class: format!("pill-priority-{}", self.priority),
            customer: self.customer.clone(),
            vehicle: match self.vehicle.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => "-".to_string(),
            },
            created: self.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}
