//! Field validation and normalization of inbound payloads.
//!
//! Each `validate_*` function takes the untyped JSON body and runs three passes:
//! 1. per-field extraction, recording a type error for every field that does not
//!    decode to its expected type
//! 2. rule checks declared on the `*Create` model (`validator` derive) plus the
//!    cross-field rules declared here
//! 3. normalization into a fully populated record (rounding, case folding,
//!    defaults)
//!
//! All errors from passes 1 and 2 are reported together. Normalization only runs
//! on a payload that passed both. None of this touches the store.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::error::{FieldError, ValidationError};
use crate::models::{
    BoundingBox, DetectionCreate, DetectionKind, NewDetection, NewWeatherReading,
    UserCreate, UserRegistration, WeatherDataCreate, DEFAULT_CAMERA_ID, DEFAULT_SENSOR_ID,
};

// ---

const BBOX_FIELDS: [&str; 4] = ["bboxX", "bboxY", "bboxWidth", "bboxHeight"];

/// Validate and normalize a detection payload.
///
/// `now` becomes the event timestamp when the client omits one.
pub fn validate_detection(body: Value, now: DateTime<Utc>) -> Result<NewDetection, ValidationError> {
    // ---
    let mut payload = Payload::from_body(body)?;

    let create = DetectionCreate {
        detection_type: payload.take("detectionType", "a string"),
        confidence: payload.take("confidence", "a number"),
        bbox_x: payload.take("bboxX", "an integer"),
        bbox_y: payload.take("bboxY", "an integer"),
        bbox_width: payload.take("bboxWidth", "an integer"),
        bbox_height: payload.take("bboxHeight", "an integer"),
        image_path: payload.take("imagePath", "a string"),
        camera_id: payload.take("cameraId", "a string"),
        timestamp: payload.take_timestamp("timestamp"),
    };

    let mut errors = payload.finish(create.validate());

    let kind = create.detection_type.as_deref().and_then(|raw| {
        let kind = DetectionKind::parse(raw);
        if kind.is_none() {
            errors.push(FieldError::new(
                "detectionType",
                format!("detectionType must be one of: {}", DetectionKind::allowed()),
            ));
        }
        kind
    });

    let corners = [create.bbox_x, create.bbox_y, create.bbox_width, create.bbox_height];
    let present = corners.iter().filter(|v| v.is_some()).count();
    if present > 0 && present < corners.len() {
        for (name, value) in BBOX_FIELDS.iter().zip(corners) {
            if value.is_none() && !errors.iter().any(|e| e.field == *name) {
                errors.push(FieldError::new(
                    *name,
                    "bounding box requires bboxX, bboxY, bboxWidth and bboxHeight together",
                ));
            }
        }
    }

    match (kind, create.confidence) {
        (Some(detection_type), Some(confidence)) if errors.is_empty() => Ok(NewDetection {
            detection_type,
            confidence: round_to(confidence, 4),
            bbox: match corners {
                [Some(x), Some(y), Some(width), Some(height)] => Some(BoundingBox {
                    x,
                    y,
                    width,
                    height,
                }),
                _ => None,
            },
            image_path: create.image_path,
            camera_id: or_default(create.camera_id, DEFAULT_CAMERA_ID),
            processed: false,
            timestamp: create.timestamp.unwrap_or(now),
        }),
        _ => Err(ValidationError::new(errors)),
    }
}

/// Validate and normalize a weather reading payload.
pub fn validate_weather(
    body: Value,
    now: DateTime<Utc>,
) -> Result<NewWeatherReading, ValidationError> {
    // ---
    let mut payload = Payload::from_body(body)?;

    let create = WeatherDataCreate {
        temperature: payload.take("temperature", "a number"),
        humidity: payload.take("humidity", "a number"),
        wind_speed: payload.take("windSpeed", "a number"),
        wind_direction: payload.take("windDirection", "an integer"),
        pressure: payload.take("pressure", "a number"),
        rainfall: payload.take("rainfall", "a number"),
        sensor_id: payload.take("sensorId", "a string"),
        timestamp: payload.take_timestamp("timestamp"),
    };

    let errors = payload.finish(create.validate());
    if !errors.is_empty() {
        return Err(ValidationError::new(errors));
    }

    Ok(NewWeatherReading {
        temperature: create.temperature.map(|v| round_to(v, 2)),
        humidity: create.humidity.map(|v| round_to(v, 2)),
        wind_speed: create.wind_speed.map(|v| round_to(v, 2)),
        wind_direction: create.wind_direction,
        pressure: create.pressure.map(|v| round_to(v, 2)),
        rainfall: create.rainfall,
        sensor_id: or_default(create.sensor_id, DEFAULT_SENSOR_ID),
        timestamp: create.timestamp.unwrap_or(now),
    })
}

/// Validate a registration payload. Username and email are lower-cased.
pub fn validate_user(body: Value) -> Result<UserRegistration, ValidationError> {
    // ---
    let mut payload = Payload::from_body(body)?;

    let create = UserCreate {
        username: payload.take("username", "a string"),
        email: payload.take::<String>("email", "a string").map(|e| e.trim().to_string()),
        full_name: payload.take("fullName", "a string"),
        password: payload.take("password", "a string"),
    };

    let mut errors = payload.finish(create.validate());

    if let Some(username) = &create.username {
        if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(FieldError::new(
                "username",
                "username may only contain letters and digits",
            ));
        }
    }

    match (create.username, create.email, create.password) {
        (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(UserRegistration {
            username: username.to_ascii_lowercase(),
            email: email.to_lowercase(),
            full_name: create.full_name,
            password,
        }),
        _ => Err(ValidationError::new(errors)),
    }
}

// ---

/// Round half away from zero to `decimals` places.
///
/// A value too large to scale is already integral and is returned as is.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    // ---
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Accept RFC 3339, or a naive ISO-8601 date-time taken as UTC. The date and
/// time may be separated by `T` or a single space.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    // ---
    let raw = match raw.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &raw[..10], &raw[11..]),
        _ => raw.to_string(),
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// `bbox_width` -> `bboxWidth`
fn camel_case(field: &str) -> String {
    // ---
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// JSON object being taken apart field by field.
struct Payload {
    fields: Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Payload {
    // ---
    fn from_body(body: Value) -> Result<Self, ValidationError> {
        match body {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: Vec::new(),
            }),
            _ => Err(ValidationError::single("body", "expected a JSON object")),
        }
    }

    /// Remove `field` and decode it. Absent and `null` both yield `None`.
    fn take<T: DeserializeOwned>(&mut self, field: &str, expected: &str) -> Option<T> {
        // ---
        match self.fields.remove(field) {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(_) => {
                    self.errors
                        .push(FieldError::new(field, format!("{field} must be {expected}")));
                    None
                }
            },
        }
    }

    fn take_timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        // ---
        let raw: String = self.take(field, "an ISO-8601 date-time string")?;
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            self.errors.push(FieldError::new(
                field,
                format!("{field} must be an ISO-8601 date-time string"),
            ));
        }
        parsed
    }

    /// Combine type errors with rule violations reported by `validator`.
    ///
    /// A field that failed its type check is `None` on the model, so rule
    /// violations for it (e.g. `required`) are dropped.
    fn finish(self, checked: Result<(), ValidationErrors>) -> Vec<FieldError> {
        // ---
        let mut errors = self.errors;
        let Err(violations) = checked else {
            return errors;
        };

        for (field, field_violations) in violations.field_errors() {
            let field = camel_case(&field);
            if errors.iter().any(|e| e.field == field) {
                continue;
            }
            for violation in field_violations {
                let message = match &violation.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid ({})", violation.code),
                };
                errors.push(FieldError::new(field.clone(), message));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
    }

    #[test]
    fn test_detection_example_is_normalized() {
        // ---
        let detection = validate_detection(
            json!({ "detectionType": "FIRE", "confidence": 0.91234, "cameraId": null }),
            now(),
        )
        .unwrap();

        assert_eq!(detection.detection_type, DetectionKind::Fire);
        assert_eq!(detection.detection_type.as_str(), "fire");
        assert_eq!(detection.confidence, 0.9123);
        assert_eq!(detection.camera_id, DEFAULT_CAMERA_ID);
        assert!(!detection.processed);
        assert_eq!(detection.timestamp, now());
        assert_eq!(detection.bbox, None);
    }

    #[test]
    fn test_confidence_rounded_to_four_places() {
        // ---
        let cases = [
            (0.0, 0.0),
            (1.0, 1.0),
            (0.5, 0.5),
            (0.12345678, 0.1235),
            (0.99994, 0.9999),
            (0.99996, 1.0),
            (0.00004, 0.0),
        ];
        for (input, expected) in cases {
            let detection =
                validate_detection(json!({ "detectionType": "smoke", "confidence": input }), now())
                    .unwrap();
            assert_eq!(detection.confidence, expected, "input {}", input);
        }
    }

    #[test]
    fn test_confidence_out_of_range_names_field() {
        // ---
        for input in [-0.0001, 1.0001, 5.0, -3.0] {
            let err =
                validate_detection(json!({ "detectionType": "fire", "confidence": input }), now())
                    .unwrap_err();
            assert!(err.has_field("confidence"), "input {}", input);
            assert_eq!(
                err.messages_for("confidence"),
                vec!["confidence must be between 0.0 and 1.0"]
            );
        }
    }

    #[test]
    fn test_detection_type_case_folding() {
        // ---
        for (input, expected) in [
            ("fire", "fire"),
            ("Smoke", "smoke"),
            ("PERSON", "person"),
            ("VeHiClE", "vehicle"),
            ("animal", "animal"),
        ] {
            let detection =
                validate_detection(json!({ "detectionType": input, "confidence": 0.5 }), now())
                    .unwrap();
            assert_eq!(detection.detection_type.as_str(), expected);
        }
    }

    #[test]
    fn test_unknown_detection_type_lists_allowed_set() {
        // ---
        for input in ["flame", "fires", " fire", ""] {
            let err =
                validate_detection(json!({ "detectionType": input, "confidence": 0.5 }), now())
                    .unwrap_err();
            assert_eq!(
                err.messages_for("detectionType"),
                vec!["detectionType must be one of: fire, smoke, person, vehicle, animal"]
            );
        }
    }

    #[test]
    fn test_every_offending_field_is_reported() {
        // ---
        let err = validate_detection(
            json!({
                "detectionType": "dragon",
                "confidence": 2.0,
                "bboxX": -1,
                "bboxY": 0,
                "bboxWidth": 0,
                "bboxHeight": 10,
            }),
            now(),
        )
        .unwrap_err();

        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["bboxWidth", "bboxX", "confidence", "detectionType"]);
    }

    #[test]
    fn test_missing_required_fields() {
        // ---
        let err = validate_detection(json!({}), now()).unwrap_err();
        assert_eq!(err.messages_for("detectionType"), vec!["field required"]);
        assert_eq!(err.messages_for("confidence"), vec!["field required"]);
    }

    #[test]
    fn test_type_errors_reported_once_per_field() {
        // ---
        let err = validate_detection(
            json!({ "detectionType": 42, "confidence": "high", "bboxX": 1.5 }),
            now(),
        )
        .unwrap_err();

        assert_eq!(err.messages_for("detectionType"), vec!["detectionType must be a string"]);
        assert_eq!(err.messages_for("confidence"), vec!["confidence must be a number"]);
        assert_eq!(err.messages_for("bboxX"), vec!["bboxX must be an integer"]);
    }

    #[test]
    fn test_full_bounding_box_accepted() {
        // ---
        let detection = validate_detection(
            json!({
                "detectionType": "person",
                "confidence": 0.7,
                "bboxX": 0,
                "bboxY": 0,
                "bboxWidth": 1,
                "bboxHeight": 1,
                "imagePath": "/captures/2025/03/26/frame-0001.jpg",
                "cameraId": "THERMAL_CAM_007",
            }),
            now(),
        )
        .unwrap();

        assert_eq!(
            detection.bbox,
            Some(BoundingBox {
                x: 0,
                y: 0,
                width: 1,
                height: 1
            })
        );
        assert_eq!(detection.camera_id, "THERMAL_CAM_007");
        assert_eq!(
            detection.image_path.as_deref(),
            Some("/captures/2025/03/26/frame-0001.jpg")
        );
    }

    #[test]
    fn test_partial_bounding_box_rejected() {
        // ---
        let err = validate_detection(
            json!({ "detectionType": "person", "confidence": 0.7, "bboxX": 10, "bboxY": 20 }),
            now(),
        )
        .unwrap_err();

        assert!(err.has_field("bboxWidth"));
        assert!(err.has_field("bboxHeight"));
        assert!(!err.has_field("bboxX"));
        assert!(!err.has_field("bboxY"));
    }

    #[test]
    fn test_detection_timestamp_forms() {
        // ---
        let with_offset = validate_detection(
            json!({ "detectionType": "fire", "confidence": 0.5, "timestamp": "2024-01-15T10:30:00-03:00" }),
            now(),
        )
        .unwrap();
        assert_eq!(
            with_offset.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 13, 30, 0).unwrap()
        );

        let naive = validate_detection(
            json!({ "detectionType": "fire", "confidence": 0.5, "timestamp": "2024-01-15T10:30:00" }),
            now(),
        )
        .unwrap();
        assert_eq!(
            naive.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );

        for spaced in ["2024-01-15 10:30:00", "2024-01-15 10:30:00.000"] {
            let detection = validate_detection(
                json!({ "detectionType": "fire", "confidence": 0.5, "timestamp": spaced }),
                now(),
            )
            .unwrap();
            assert_eq!(
                detection.timestamp,
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
                "input {}",
                spaced
            );
        }

        for (spaced, hour) in [("2024-01-15 10:30:00+02:00", 8), ("2024-01-15 10:30:00Z", 10)] {
            let detection = validate_detection(
                json!({ "detectionType": "fire", "confidence": 0.5, "timestamp": spaced }),
                now(),
            )
            .unwrap();
            assert_eq!(
                detection.timestamp,
                Utc.with_ymd_and_hms(2024, 1, 15, hour, 30, 0).unwrap(),
                "input {}",
                spaced
            );
        }

        let err = validate_detection(
            json!({ "detectionType": "fire", "confidence": 0.5, "timestamp": "yesterday" }),
            now(),
        )
        .unwrap_err();
        assert!(err.has_field("timestamp"));
    }

    #[test]
    fn test_long_camera_id_rejected() {
        // ---
        let err = validate_detection(
            json!({ "detectionType": "fire", "confidence": 0.5, "cameraId": "C".repeat(51) }),
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err.messages_for("cameraId"),
            vec!["cameraId must be at most 50 characters"]
        );
    }

    #[test]
    fn test_body_must_be_object() {
        // ---
        let err = validate_detection(json!([1, 2, 3]), now()).unwrap_err();
        assert!(err.has_field("body"));
    }

    #[test]
    fn test_weather_example_rounding() {
        // ---
        let reading = validate_weather(
            json!({ "temperature": 25.567, "humidity": 45.2, "windSpeed": 12.3, "pressure": 1013.256 }),
            now(),
        )
        .unwrap();

        assert_eq!(reading.temperature, Some(25.57));
        assert_eq!(reading.humidity, Some(45.2));
        assert_eq!(reading.wind_speed, Some(12.3));
        assert_eq!(reading.pressure, Some(1013.26));
        assert_eq!(reading.sensor_id, DEFAULT_SENSOR_ID);
        assert_eq!(reading.timestamp, now());
    }

    #[test]
    fn test_weather_temperature_below_range() {
        // ---
        let err = validate_weather(
            json!({ "temperature": -60, "humidity": 50, "windSpeed": 5 }),
            now(),
        )
        .unwrap_err();

        assert_eq!(err.errors.len(), 1);
        assert_eq!(
            err.messages_for("temperature"),
            vec!["temperature must be between -50.0 and 70.0 °C"]
        );
    }

    #[test]
    fn test_humidity_bounds_and_idempotent_rounding() {
        // ---
        for outside in [-0.01, 100.01, 150.0, -20.0] {
            let err = validate_weather(json!({ "humidity": outside }), now()).unwrap_err();
            assert!(err.has_field("humidity"), "input {}", outside);
        }

        for inside in [0.0, 12.345, 45.2, 99.999, 100.0] {
            let first = validate_weather(json!({ "humidity": inside }), now())
                .unwrap()
                .humidity
                .unwrap();
            let second = validate_weather(json!({ "humidity": first }), now())
                .unwrap()
                .humidity
                .unwrap();
            assert_eq!(first, round_to(inside, 2));
            assert_eq!(first, second, "input {}", inside);
        }
    }

    #[test]
    fn test_weather_all_rules_reported() {
        // ---
        let err = validate_weather(
            json!({
                "temperature": 71,
                "humidity": 101,
                "windSpeed": -1,
                "windDirection": 361,
                "pressure": 799.9,
                "rainfall": -0.5,
            }),
            now(),
        )
        .unwrap_err();

        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["humidity", "pressure", "rainfall", "temperature", "windDirection", "windSpeed"]
        );
    }

    #[test]
    fn test_weather_boundaries_accepted() {
        // ---
        let reading = validate_weather(
            json!({
                "temperature": -50,
                "humidity": 0,
                "windSpeed": 0,
                "windDirection": 360,
                "pressure": 1200,
                "rainfall": 0,
                "sensorId": "DAVIS_V3_009",
            }),
            now(),
        )
        .unwrap();

        assert_eq!(reading.temperature, Some(-50.0));
        assert_eq!(reading.wind_direction, Some(360));
        assert_eq!(reading.pressure, Some(1200.0));
        assert_eq!(reading.rainfall, Some(0.0));
        assert_eq!(reading.sensor_id, "DAVIS_V3_009");
    }

    #[test]
    fn test_weather_rainfall_not_rounded() {
        // ---
        let reading = validate_weather(json!({ "rainfall": 1.23456 }), now()).unwrap();
        assert_eq!(reading.rainfall, Some(1.23456));
        assert_eq!(reading.temperature, None);
    }

    #[test]
    fn test_huge_wind_speed_kept_finite() {
        // ---
        let reading = validate_weather(json!({ "windSpeed": 1e307 }), now()).unwrap();
        let speed = reading.wind_speed.unwrap();

        assert!(speed.is_finite());
        assert_eq!(speed, 1e307);
        assert_eq!(round_to(speed, 2), speed);
    }

    #[test]
    fn test_wind_direction_must_be_integer() {
        // ---
        let err = validate_weather(json!({ "windDirection": 90.5 }), now()).unwrap_err();
        assert_eq!(
            err.messages_for("windDirection"),
            vec!["windDirection must be an integer"]
        );
    }

    #[test]
    fn test_user_normalized() {
        // ---
        let registration = validate_user(json!({
            "username": "FireWatch01",
            "email": " Ops@Thermal-Monitoring.com ",
            "fullName": "Fire Watch",
            "password": "correct-horse",
        }))
        .unwrap();

        assert_eq!(registration.username, "firewatch01");
        assert_eq!(registration.email, "ops@thermal-monitoring.com");
        assert_eq!(registration.full_name.as_deref(), Some("Fire Watch"));
        assert_eq!(registration.password, "correct-horse");
    }

    #[test]
    fn test_user_rules() {
        // ---
        let err = validate_user(json!({
            "username": "no spaces!",
            "email": "not-an-email",
            "password": "short",
        }))
        .unwrap_err();

        assert_eq!(
            err.messages_for("username"),
            vec!["username may only contain letters and digits"]
        );
        assert_eq!(err.messages_for("email"), vec!["email must be a valid address"]);
        assert_eq!(
            err.messages_for("password"),
            vec!["password must be between 6 and 100 characters"]
        );
    }

    #[test]
    fn test_user_missing_fields() {
        // ---
        let err = validate_user(json!({ "fullName": "Nobody" })).unwrap_err();
        assert!(err.has_field("username"));
        assert!(err.has_field("email"));
        assert!(err.has_field("password"));
        assert!(!err.has_field("fullName"));
    }

    #[test]
    fn test_camel_case() {
        // ---
        assert_eq!(camel_case("bbox_width"), "bboxWidth");
        assert_eq!(camel_case("wind_direction"), "windDirection");
        assert_eq!(camel_case("confidence"), "confidence");
    }

    #[test]
    fn test_round_to() {
        // ---
        assert_eq!(round_to(25.567, 2), 25.57);
        assert_eq!(round_to(1013.256, 2), 1013.26);
        assert_eq!(round_to(0.91234, 4), 0.9123);
        assert_eq!(round_to(-12.345678, 2), -12.35);
        assert_eq!(round_to(f64::MAX, 4), f64::MAX);
        assert_eq!(round_to(-1e307, 2), -1e307);
    }
}
