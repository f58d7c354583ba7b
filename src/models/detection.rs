//! Thermal camera detections.

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

// ---

/// Camera id recorded when the client does not name one.
pub const DEFAULT_CAMERA_ID: &str = "THERMAL_CAM_001";

/// The fixed set of things a camera can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    Fire,
    Smoke,
    Person,
    Vehicle,
    Animal,
}

impl DetectionKind {
    // ---
    pub const ALL: [DetectionKind; 5] = [
        DetectionKind::Fire,
        DetectionKind::Smoke,
        DetectionKind::Person,
        DetectionKind::Vehicle,
        DetectionKind::Animal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DetectionKind::Fire => "fire",
            DetectionKind::Smoke => "smoke",
            DetectionKind::Person => "person",
            DetectionKind::Vehicle => "vehicle",
            DetectionKind::Animal => "animal",
        }
    }

    /// Case-insensitive match against the allowed set.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }

    /// Comma-separated list of allowed names, for error messages.
    pub fn allowed() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

/// Detection payload after per-field type checks, before normalization.
#[derive(Debug, Default, Validate)]
pub struct DetectionCreate {
    // ---
    #[validate(required(message = "field required"))]
    pub detection_type: Option<String>,

    #[validate(
        required(message = "field required"),
        range(min = 0.0, max = 1.0, message = "confidence must be between 0.0 and 1.0")
    )]
    pub confidence: Option<f64>,

    #[validate(range(min = 0, message = "bboxX must be greater than or equal to 0"))]
    pub bbox_x: Option<i32>,

    #[validate(range(min = 0, message = "bboxY must be greater than or equal to 0"))]
    pub bbox_y: Option<i32>,

    #[validate(range(min = 1, message = "bboxWidth must be greater than or equal to 1"))]
    pub bbox_width: Option<i32>,

    #[validate(range(min = 1, message = "bboxHeight must be greater than or equal to 1"))]
    pub bbox_height: Option<i32>,

    #[validate(length(max = 255, message = "imagePath must be at most 255 characters"))]
    pub image_path: Option<String>,

    #[validate(length(max = 50, message = "cameraId must be at most 50 characters"))]
    pub camera_id: Option<String>,

    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Fully populated detection, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub detection_type: DetectionKind,
    pub confidence: f64,
    pub bbox: Option<BoundingBox>,
    pub image_path: Option<String>,
    pub camera_id: String,
    pub processed: bool,
    pub timestamp: DateTime<Utc>,
}

/// Row of the `detections` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Detection {
    pub id: i32,
    pub detection_type: String,
    pub confidence: f64,
    pub bbox_x: Option<i32>,
    pub bbox_y: Option<i32>,
    pub bbox_width: Option<i32>,
    pub bbox_height: Option<i32>,
    pub image_path: Option<String>,
    pub camera_id: Option<String>,
    pub processed: bool,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Client-visible detection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    pub id: i32,
    pub detection_type: String,
    pub confidence: f64,
    pub camera_id: Option<String>,
    pub bbox_x: Option<i32>,
    pub bbox_y: Option<i32>,
    pub bbox_width: Option<i32>,
    pub bbox_height: Option<i32>,
    pub image_path: Option<String>,
    pub processed: bool,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Detection> for DetectionResponse {
    fn from(row: Detection) -> Self {
        Self {
            id: row.id,
            detection_type: row.detection_type,
            confidence: row.confidence,
            camera_id: row.camera_id,
            bbox_x: row.bbox_x,
            bbox_y: row.bbox_y,
            bbox_width: row.bbox_width,
            bbox_height: row.bbox_height,
            image_path: row.image_path,
            processed: row.processed,
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

// ---

/// Entry of the simulated detection listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionListItem {
    pub id: &'static str,
    pub detection_type: &'static str,
    pub confidence: f64,
    pub camera_id: &'static str,
    pub timestamp: &'static str,
    pub processed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionList {
    pub detections: Vec<DetectionListItem>,
    pub total_count: usize,
    pub iteration: &'static str,
}

impl DetectionList {
    /// Fixed listing served until the list endpoint is backed by the store.
    pub fn simulated() -> Self {
        // ---
        let detections = vec![
            DetectionListItem {
                id: "det_001",
                detection_type: "fire",
                confidence: 0.92,
                camera_id: DEFAULT_CAMERA_ID,
                timestamp: "2024-01-15T10:30:00Z",
                processed: true,
            },
            DetectionListItem {
                id: "det_002",
                detection_type: "smoke",
                confidence: 0.78,
                camera_id: DEFAULT_CAMERA_ID,
                timestamp: "2024-01-15T10:25:00Z",
                processed: true,
            },
        ];

        Self {
            total_count: detections.len(),
            detections,
            iteration: "1",
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        // ---
        assert_eq!(DetectionKind::parse("FIRE"), Some(DetectionKind::Fire));
        assert_eq!(DetectionKind::parse("Smoke"), Some(DetectionKind::Smoke));
        assert_eq!(DetectionKind::parse("vEhIcLe"), Some(DetectionKind::Vehicle));
        assert_eq!(DetectionKind::parse("flame"), None);
        assert_eq!(DetectionKind::parse(""), None);
    }

    #[test]
    fn test_allowed_list() {
        assert_eq!(DetectionKind::allowed(), "fire, smoke, person, vehicle, animal");
    }

    #[test]
    fn test_response_projection_uses_wire_names() {
        // ---
        let created = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let row = Detection {
            id: 7,
            detection_type: "fire".into(),
            confidence: 0.9123,
            bbox_x: Some(10),
            bbox_y: Some(20),
            bbox_width: Some(30),
            bbox_height: Some(40),
            image_path: None,
            camera_id: Some(DEFAULT_CAMERA_ID.into()),
            processed: false,
            timestamp: Some(created),
            created_at: created,
        };

        let json = serde_json::to_value(DetectionResponse::from(row)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["detectionType"], "fire");
        assert_eq!(json["confidence"], 0.9123);
        assert_eq!(json["cameraId"], DEFAULT_CAMERA_ID);
        assert_eq!(json["bboxWidth"], 30);
        assert_eq!(json["processed"], false);
        assert!(json["imagePath"].is_null());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_simulated_listing_counts_entries() {
        // ---
        let list = DetectionList::simulated();
        assert_eq!(list.total_count, list.detections.len());

        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["detections"][0]["detectionType"], "fire");
    }
}
