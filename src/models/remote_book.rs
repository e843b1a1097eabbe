//! Remote book (Google Books volume) models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

use super::book::CreateBook;

/// A volume as returned by the Google Books API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Volume {
    pub id: String,
    #[serde(rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VolumeInfo {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "pageCount")]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub language: Option<String>,
    #[serde(rename = "industryIdentifiers", default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(rename = "imageLinks")]
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndustryIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageLinks {
    #[serde(rename = "smallThumbnail")]
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
}

/// Search envelope returned by the volumes endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct VolumesSearchResponse {
    #[serde(default)]
    pub items: Option<Vec<Volume>>,
}

impl Volume {
    /// Preferred ISBN: ISBN_13 when present, otherwise ISBN_10
    pub fn isbn(&self) -> Option<&str> {
        let ids = &self.volume_info.industry_identifiers;
        ids.iter()
            .find(|i| i.kind == "ISBN_13")
            .or_else(|| ids.iter().find(|i| i.kind == "ISBN_10"))
            .map(|i| i.identifier.as_str())
    }

    /// Publication year from the published date's leading 4-digit prefix
    pub fn publication_year(&self) -> Option<i32> {
        self.volume_info
            .published_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// Map volume metadata onto a local catalog entry
    pub fn to_create_book(&self, total_copies: i32) -> AppResult<CreateBook> {
        let title = self
            .volume_info
            .title
            .clone()
            .ok_or_else(|| AppError::InvalidInput(format!("Volume {} has no title", self.id)))?;

        let author = self
            .volume_info
            .authors
            .first()
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(CreateBook {
            title,
            author,
            isbn: self.isbn().map(str::to_string),
            publication_year: self.publication_year(),
            total_copies: Some(total_copies),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume() -> Volume {
        Volume {
            id: "zyTCAlFPjgYC".to_string(),
            volume_info: VolumeInfo {
                title: Some("The Pragmatic Programmer".to_string()),
                authors: vec!["Andrew Hunt".to_string(), "David Thomas".to_string()],
                published_date: Some("1999-10-30".to_string()),
                industry_identifiers: vec![
                    IndustryIdentifier {
                        kind: "ISBN_10".to_string(),
                        identifier: "020161622X".to_string(),
                    },
                    IndustryIdentifier {
                        kind: "ISBN_13".to_string(),
                        identifier: "9780201616224".to_string(),
                    },
                ],
                ..VolumeInfo::default()
            },
        }
    }

    #[test]
    fn prefers_isbn_13_over_isbn_10() {
        assert_eq!(volume().isbn(), Some("9780201616224"));
    }

    #[test]
    fn falls_back_to_isbn_10() {
        let mut v = volume();
        v.volume_info.industry_identifiers.pop();
        assert_eq!(v.isbn(), Some("020161622X"));
    }

    #[test]
    fn year_is_parsed_from_date_prefix() {
        assert_eq!(volume().publication_year(), Some(1999));

        let mut v = volume();
        v.volume_info.published_date = Some("1999".to_string());
        assert_eq!(v.publication_year(), Some(1999));

        v.volume_info.published_date = Some("n.d.".to_string());
        assert_eq!(v.publication_year(), None);
    }

    #[test]
    fn maps_to_catalog_entry() {
        let entry = volume().to_create_book(3).unwrap();
        assert_eq!(entry.title, "The Pragmatic Programmer");
        assert_eq!(entry.author, "Andrew Hunt");
        assert_eq!(entry.isbn.as_deref(), Some("9780201616224"));
        assert_eq!(entry.publication_year, Some(1999));
        assert_eq!(entry.total_copies, Some(3));
    }

    #[test]
    fn untitled_volume_is_rejected() {
        let mut v = volume();
        v.volume_info.title = None;
        assert!(v.to_create_book(1).is_err());
    }
}
