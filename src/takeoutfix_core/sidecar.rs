use crate::takeoutfix_core::error::{Result, TakeoutError};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Sidecar file extension (lowercase).
pub const SIDECAR_EXTENSION: &str = "json";

/// Raw sidecar document. Only the fields this tool consumes are declared;
/// everything else in the export is ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RawSidecar {
    #[serde(default)]
    photo_taken_time: Option<RawTimestamp>,
    #[serde(default)]
    geo_data_exif: Option<RawGeoData>,
}

#[derive(Deserialize, Debug, Default)]
struct RawTimestamp {
    #[serde(default)]
    timestamp: Option<Value>, // Exported as a string, sometimes as a number
}

#[derive(Deserialize, Debug, Default)]
struct RawGeoData {
    #[serde(default)]
    latitude: Option<Value>,
    #[serde(default)]
    longitude: Option<Value>,
}

/// A GPS position in decimal WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// The parts of a sidecar record that get applied to a media file.
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarRecord {
    pub captured_at: i64,
    pub gps: Option<GpsPosition>,
}

impl SidecarRecord {
    /// Read and parse a sidecar file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|reason| TakeoutError::MalformedSidecar {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a sidecar document. The error is a human-readable reason.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let raw: RawSidecar = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let timestamp = raw
            .photo_taken_time
            .and_then(|t| t.timestamp)
            .ok_or_else(|| "missing photoTakenTime.timestamp".to_string())?;
        let captured_at = value_to_i64(&timestamp)
            .ok_or_else(|| format!("invalid photoTakenTime.timestamp: {}", timestamp))?;

        let gps = raw.geo_data_exif.and_then(|geo| {
            let latitude = geo.latitude.as_ref().and_then(value_to_f64).unwrap_or(0.0);
            let longitude = geo.longitude.as_ref().and_then(value_to_f64).unwrap_or(0.0);
            // Zero is the exporter's sentinel for "no location"
            (latitude != 0.0 && longitude != 0.0).then_some(GpsPosition {
                latitude,
                longitude,
            })
        });

        Ok(SidecarRecord { captured_at, gps })
    }
}

/// Helper to extract i64 from Value (handles both string and number)
fn value_to_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Helper to extract f64 from Value (handles both string and number)
fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Check if a file is a sidecar based on its extension.
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(SIDECAR_EXTENSION))
        .unwrap_or(false)
}
