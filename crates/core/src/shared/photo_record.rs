use serde::{Deserialize, Serialize};

/// Face bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One detected face: its identity embedding plus optional detector output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl FaceObservation {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            bbox: None,
            confidence: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Per-photo features consumed by the clustering engine.
///
/// `color` is the outfit descriptor, taken from below the first detected
/// face or from a central fallback region when the photo has no faces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub url: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
    pub color: Vec<f32>,
}

impl PhotoRecord {
    pub fn new(
        url: impl Into<String>,
        filename: impl Into<String>,
        faces: Vec<FaceObservation>,
        color: Vec<f32>,
    ) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
            faces,
            color,
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// The filename, falling back to the last path segment of the URL.
    pub fn display_name(&self) -> &str {
        if !self.filename.is_empty() {
            return &self.filename;
        }
        self.url
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://cdn.example.com/memorymap/abc.jpg", "", "abc.jpg")]
    #[case("https://cdn.example.com/memorymap/abc.jpg", "IMG_0001.HEIC", "IMG_0001.HEIC")]
    #[case("local/dir/", "", "dir")]
    #[case("plain", "", "plain")]
    fn test_display_name(#[case] url: &str, #[case] filename: &str, #[case] expected: &str) {
        let photo = PhotoRecord::new(url, filename, Vec::new(), vec![0.0; 3]);
        assert_eq!(photo.display_name(), expected);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"url": "a.jpg", "color": [1.0, 2.0, 3.0]}"#;
        let photo: PhotoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(photo.url, "a.jpg");
        assert!(photo.filename.is_empty());
        assert_eq!(photo.face_count(), 0);
        assert_eq!(photo.color, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_deserialize_face_with_bbox() {
        let json = r#"{
            "url": "a.jpg",
            "filename": "a.jpg",
            "faces": [{"embedding": [0.1, 0.2], "bbox": {"x": 1, "y": 2, "width": 30, "height": 40}}],
            "color": [0.0]
        }"#;
        let photo: PhotoRecord = serde_json::from_str(json).unwrap();
        let face = &photo.faces[0];
        assert_eq!(face.embedding, vec![0.1, 0.2]);
        assert_eq!(
            face.bbox,
            Some(BoundingBox {
                x: 1.0,
                y: 2.0,
                width: 30.0,
                height: 40.0
            })
        );
        assert_eq!(face.confidence, None);
    }

    #[test]
    fn test_face_builder() {
        let face = FaceObservation::new(vec![1.0])
            .with_confidence(0.9)
            .with_bbox(BoundingBox {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            });
        assert_eq!(face.confidence, Some(0.9));
        assert!(face.bbox.is_some());
    }
}
