//! Parser module for reshaping catalog payloads
//!
//! This module extracts compact manga summaries from the JSON documents
//! returned by the catalog service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::catalog::CatalogError;

/// Reshaped summary of a catalog manga entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MangaSummary {
    /// Catalog identifier
    pub mal_id: u64,
    pub title: String,
    /// Catalog page URL
    pub url: Option<String>,
    /// Cover image URL (jpg)
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    /// Publication status (Publishing, Finished, Not yet published, ...)
    pub status: Option<String>,
    /// Genre names in catalog order
    pub genres: Vec<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawImage {
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImages {
    jpg: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawNamed {
    mal_id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawManga {
    mal_id: u64,
    #[serde(default)]
    title: String,
    url: Option<String>,
    images: Option<RawImages>,
    synopsis: Option<String>,
    status: Option<String>,
    score: Option<f64>,
    genres: Option<Vec<RawNamed>>,
}

impl From<RawManga> for MangaSummary {
    fn from(raw: RawManga) -> Self {
        Self {
            mal_id: raw.mal_id,
            title: raw.title,
            url: raw.url,
            image_url: raw.images.and_then(|images| images.jpg).and_then(|jpg| jpg.image_url),
            synopsis: raw.synopsis,
            status: raw.status,
            genres: raw
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|genre| genre.name)
                .collect(),
            score: raw.score,
        }
    }
}

/// The `data` member every catalog payload carries
fn data_of(payload: &Value) -> Result<&Value, CatalogError> {
    payload
        .get("data")
        .ok_or_else(|| CatalogError::MalformedResponse("missing `data` member".to_string()))
}

/// Parse a list payload (`{"data": [...]}`) into summaries, preserving order
pub fn parse_manga_list(payload: &Value) -> Result<Vec<MangaSummary>, CatalogError> {
    let entries = Vec::<RawManga>::deserialize(data_of(payload)?)
        .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

    Ok(entries.into_iter().map(MangaSummary::from).collect())
}

/// Parse a detail payload (`{"data": {...}}`) into a summary
pub fn parse_manga_detail(payload: &Value) -> Result<MangaSummary, CatalogError> {
    RawManga::deserialize(data_of(payload)?)
        .map(MangaSummary::from)
        .map_err(|e| CatalogError::MalformedResponse(e.to_string()))
}

/// Look up a genre identifier by name in a genre listing
///
/// Matching ignores ASCII case and surrounding whitespace.
pub fn find_genre_id(payload: &Value, name: &str) -> Result<Option<u64>, CatalogError> {
    let genres = Vec::<RawNamed>::deserialize(data_of(payload)?)
        .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

    let wanted = name.trim();
    Ok(genres
        .into_iter()
        .find(|genre| genre.name.eq_ignore_ascii_case(wanted))
        .map(|genre| genre.mal_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::stub::manga_json;
    use serde_json::json;

    #[test]
    fn test_parse_manga_list_reshapes_entries() {
        let payload = json!({
            "pagination": { "has_next_page": false },
            "data": [manga_json(2, "Berserk"), manga_json(13, "One Piece")]
        });

        let list = parse_manga_list(&payload).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].mal_id, 2);
        assert_eq!(list[0].title, "Berserk");
        assert_eq!(list[0].genres, vec!["Action", "Drama"]);
        assert_eq!(
            list[0].image_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/manga/2.jpg")
        );
        assert_eq!(list[1].mal_id, 13);
    }

    #[test]
    fn test_parse_manga_list_tolerates_missing_optionals() {
        let payload = json!({ "data": [{ "mal_id": 7 }] });

        let list = parse_manga_list(&payload).unwrap();

        assert_eq!(list[0].mal_id, 7);
        assert_eq!(list[0].title, "");
        assert!(list[0].synopsis.is_none());
        assert!(list[0].image_url.is_none());
        assert!(list[0].genres.is_empty());
    }

    #[test]
    fn test_parse_manga_list_null_genres() {
        let payload = json!({ "data": [{ "mal_id": 7, "title": "X", "genres": null }] });
        assert!(parse_manga_list(&payload).unwrap()[0].genres.is_empty());
    }

    #[test]
    fn test_parse_manga_list_missing_data() {
        let result = parse_manga_list(&json!({ "status": 500 }));
        assert!(matches!(result, Err(CatalogError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_manga_list_data_not_array() {
        let result = parse_manga_list(&json!({ "data": { "mal_id": 1 } }));
        assert!(matches!(result, Err(CatalogError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_manga_list_entry_without_id() {
        let result = parse_manga_list(&json!({ "data": [{ "title": "No id" }] }));
        assert!(matches!(result, Err(CatalogError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_manga_detail() {
        let detail = parse_manga_detail(&json!({ "data": manga_json(11, "Naruto") })).unwrap();

        assert_eq!(detail.mal_id, 11);
        assert_eq!(detail.status.as_deref(), Some("Finished"));
        assert_eq!(detail.score, Some(8.5));
    }

    #[test]
    fn test_find_genre_id() {
        let payload = json!({ "data": [
            { "mal_id": 1, "name": "Action", "count": 100 },
            { "mal_id": 4, "name": "Comedy", "count": 80 }
        ] });

        assert_eq!(find_genre_id(&payload, "comedy").unwrap(), Some(4));
        assert_eq!(find_genre_id(&payload, " ACTION ").unwrap(), Some(1));
        assert_eq!(find_genre_id(&payload, "Horror").unwrap(), None);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let detail = parse_manga_detail(&json!({ "data": manga_json(1, "Monster") })).unwrap();
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["malId"], 1);
        assert!(value.get("imageUrl").is_some());
        assert!(value.get("mal_id").is_none());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::catalog::stub::manga_json;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Reshaping keeps every entry, in catalog order, with its identifier and title.
        #[test]
        fn property_list_reshape_preserves_order(
            entries in prop::collection::vec((1u64..100_000, "[A-Za-z0-9 ]{1,30}"), 0..20)
        ) {
            let data: Vec<Value> = entries
                .iter()
                .map(|(id, title)| manga_json(*id, title))
                .collect();
            let payload = json!({ "data": data });

            let list = parse_manga_list(&payload).unwrap();

            prop_assert_eq!(list.len(), entries.len());
            for (summary, (id, title)) in list.iter().zip(entries.iter()) {
                prop_assert_eq!(summary.mal_id, *id);
                prop_assert_eq!(&summary.title, title);
            }
        }
    }
}
