//! Farmer and property data supplied by the external datastore.
//!
//! The record is optional per request; every field inside it is optional as
//! well, since farmers often link a property before any soil analysis has
//! been done.

use serde::{Deserialize, Serialize};

/// Latest soil analysis readings for a property.
///
/// Nutrient values are in mg/kg, moisture in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilReadings {
    /// Soil pH.
    pub ph: Option<f64>,
    /// Nitrogen (mg/kg).
    pub n: Option<f64>,
    /// Phosphorus (mg/kg).
    pub p: Option<f64>,
    /// Potassium (mg/kg).
    pub k: Option<f64>,
    /// Soil moisture (%).
    pub moisture: Option<f64>,
}

impl SoilReadings {
    /// Returns true when no reading is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ph.is_none()
            && self.n.is_none()
            && self.p.is_none()
            && self.k.is_none()
            && self.moisture.is_none()
    }
}

/// Structured farmer/property record.
///
/// # Examples
///
/// ```
/// use ekko::core::FarmerRecord;
///
/// let record: FarmerRecord = serde_json::from_str(
///     r#"{"property_name": "Fazenda Boa Vista", "current_crop": "Soja", "soil": {"ph": 5.2}}"#,
/// ).unwrap();
/// assert_eq!(record.soil.ph, Some(5.2));
/// assert!(record.area_ha.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmerRecord {
    /// Property name.
    pub property_name: Option<String>,
    /// Cultivated area in hectares.
    pub area_ha: Option<f64>,
    /// Crop currently planted.
    pub current_crop: Option<String>,
    /// Latest soil readings.
    pub soil: SoilReadings,
}

impl FarmerRecord {
    /// Creates a record for a named property.
    #[must_use]
    pub fn named(property_name: impl Into<String>) -> Self {
        Self {
            property_name: Some(property_name.into()),
            ..Self::default()
        }
    }

    /// Sets the cultivated area.
    #[must_use]
    pub fn with_area(mut self, area_ha: f64) -> Self {
        self.area_ha = Some(area_ha);
        self
    }

    /// Sets the current crop.
    #[must_use]
    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.current_crop = Some(crop.into());
        self
    }

    /// Sets the soil readings.
    #[must_use]
    pub fn with_soil(mut self, soil: SoilReadings) -> Self {
        self.soil = soil;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_record() {
        let record: FarmerRecord =
            serde_json::from_str(r#"{"property_name": "Sitio Esperanca"}"#).unwrap();
        assert_eq!(record.property_name.as_deref(), Some("Sitio Esperanca"));
        assert!(record.soil.is_empty());
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "property_name": "Fazenda Boa Vista",
            "area_ha": 120.5,
            "current_crop": "Soja",
            "soil": {"ph": 5.2, "n": 90, "p": 75, "k": 110, "moisture": 38}
        }"#;
        let record: FarmerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.area_ha, Some(120.5));
        assert_eq!(record.soil.n, Some(90.0));
        assert_eq!(record.soil.moisture, Some(38.0));
    }

    #[test]
    fn test_builder() {
        let record = FarmerRecord::named("Fazenda Santa Clara")
            .with_area(48.0)
            .with_crop("Cafe")
            .with_soil(SoilReadings {
                ph: Some(6.1),
                ..SoilReadings::default()
            });
        assert_eq!(record.current_crop.as_deref(), Some("Cafe"));
        assert!(!record.soil.is_empty());
    }
}
