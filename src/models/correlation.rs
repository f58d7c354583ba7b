use serde::Serialize;

/// Fire/smoke risk assessment relating detections to weather.
///
/// No correlation engine exists yet; [`CorrelationResult::placeholder`] is the
/// fixed payload the endpoint serves until one does.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub risk_level: &'static str,
    pub confidence: f64,
    pub factors: CorrelationFactors,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationFactors {
    pub thermal_detection: bool,
    pub weather_conditions: &'static str,
    pub wind_speed: &'static str,
    pub humidity: &'static str,
    pub temperature: &'static str,
}

impl CorrelationResult {
    pub fn placeholder() -> Self {
        Self {
            risk_level: "medium",
            confidence: 0.85,
            factors: CorrelationFactors {
                thermal_detection: true,
                weather_conditions: "favorable_for_fire",
                wind_speed: "15_kmh",
                humidity: "25_percent",
                temperature: "28_celsius",
            },
            recommendation: "Increase surveillance in the detected sector",
        }
    }
}
