use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};

/// Scheme marker prepended to the base64 JPEG payloads returned by the service.
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Body returned by the detection service for one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DetectionResponse {
    pub original_image: String,
    pub annotated_image: String,
    pub counts: DetectionCounts,
}

/// Per-class object counts, kept in the order the service sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionCounts(Vec<(String, i64)>);

impl DetectionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a class count. A repeated class keeps its first position.
    pub fn insert(&mut self, class_name: impl Into<String>, count: i64) {
        let class_name = class_name.into();
        match self.0.iter_mut().find(|(name, _)| *name == class_name) {
            Some((_, existing)) => *existing = count,
            None => self.0.push((class_name, count)),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> Vec<CountEntry> {
        self.iter()
            .map(|(class_name, count)| CountEntry {
                class_name: class_name.to_string(),
                count,
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for DetectionCounts {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (class_name, count) in iter {
            counts.insert(class_name, count);
        }
        counts
    }
}

impl<'de> Deserialize<'de> for DetectionCounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = DetectionCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of class names to integer counts")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut counts = DetectionCounts::new();
                while let Some((class_name, count)) = map.next_entry::<String, i64>()? {
                    counts.insert(class_name, count);
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

/// One rendered row of the results card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub class_name: String,
    pub count: i64,
}

impl CountEntry {
    pub fn label(&self) -> String {
        format!("Total {}", self.class_name)
    }
}

impl fmt::Display for CountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total {}: {}", self.class_name, self.count)
    }
}

/// A JPEG preview held as a `data:` URI, ready to be used as an image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    data_uri: String,
}

impl ImagePreview {
    pub fn from_base64(encoded: &str) -> Self {
        Self {
            data_uri: format!("{JPEG_DATA_URI_PREFIX}{encoded}"),
        }
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn base64(&self) -> &str {
        &self.data_uri[JPEG_DATA_URI_PREFIX.len()..]
    }

    /// Decode the JPEG bytes behind the URI.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_uses_jpeg_data_uri() {
        let preview = ImagePreview::from_base64("AAAA");
        assert_eq!(preview.data_uri(), "data:image/jpeg;base64,AAAA");
        assert_eq!(preview.base64(), "AAAA");
        assert_eq!(preview.decode().unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn preview_decode_rejects_garbage() {
        let preview = ImagePreview::from_base64("not base64!");
        assert!(preview.decode().is_err());
    }

    #[test]
    fn counts_keep_response_order() {
        let response: DetectionResponse = serde_json::from_str(
            r#"{"original_image":"AAAA","annotated_image":"BBBB","counts":{"nut":5,"bolt":3,"washer":0}}"#,
        )
        .unwrap();

        let names: Vec<&str> = response.counts.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["nut", "bolt", "washer"]);
        assert_eq!(response.counts.get("bolt"), Some(3));
        assert_eq!(response.counts.get("screw"), None);
    }

    #[test]
    fn counts_reject_non_integers() {
        let result = serde_json::from_str::<DetectionCounts>(r#"{"bolt":"three"}"#);
        assert!(result.is_err());

        let result = serde_json::from_str::<DetectionCounts>(r#"{"bolt":2.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn counts_accept_negative_integers() {
        let counts = serde_json::from_str::<DetectionCounts>(r#"{"bolt":-1,"nut":4}"#).unwrap();
        assert_eq!(counts.get("bolt"), Some(-1));
        assert_eq!(counts.entries()[0].to_string(), "Total bolt: -1");
    }

    #[test]
    fn repeated_class_keeps_first_position() {
        let counts: DetectionCounts = [("bolt", 1), ("nut", 2), ("bolt", 7)].into_iter().collect();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.entries()[0].to_string(), "Total bolt: 7");
    }

    #[test]
    fn count_entry_formats_label() {
        let entry = CountEntry {
            class_name: "bolt".to_string(),
            count: 3,
        };
        assert_eq!(entry.label(), "Total bolt");
        assert_eq!(entry.to_string(), "Total bolt: 3");
    }
}
