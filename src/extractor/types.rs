use serde::Serialize;

/// One downloadable stream/container combination as reported by yt-dlp.
/// `resolution` is the height in pixels when the source reports one.
#[derive(Debug, Clone, Serialize)]
pub struct FormatDescriptor {
    pub format_id: String,
    pub ext: String,
    pub resolution: Option<u32>,
    pub fps: Option<f64>,
    pub tbr: Option<f64>,
}

/// Metadata for a single video, produced fresh on every query.
#[derive(Debug, Serialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub formats: Vec<FormatDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_serializes_with_expected_keys() {
        let metadata = VideoMetadata {
            title: Some("A Video".to_string()),
            thumbnail: Some("https://example.com/thumb.jpg".to_string()),
            duration: Some(213.0),
            formats: vec![FormatDescriptor {
                format_id: "22".to_string(),
                ext: "mp4".to_string(),
                resolution: Some(720),
                fps: Some(30.0),
                tbr: Some(2500.0),
            }],
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["title"], "A Video");
        assert_eq!(value["thumbnail"], "https://example.com/thumb.jpg");
        assert_eq!(value["duration"], 213.0);
        let format = &value["formats"][0];
        assert_eq!(format["format_id"], "22");
        assert_eq!(format["ext"], "mp4");
        assert_eq!(format["resolution"], 720);
        assert_eq!(format["fps"], 30.0);
        assert_eq!(format["tbr"], 2500.0);
    }

    #[test]
    fn missing_fields_serialize_as_null() {
        let metadata = VideoMetadata {
            title: None,
            thumbnail: None,
            duration: None,
            formats: Vec::new(),
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert!(value["title"].is_null());
        assert!(value["duration"].is_null());
        assert!(value["formats"].as_array().unwrap().is_empty());
    }
}
