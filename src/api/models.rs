use serde::{Deserialize, Deserializer, Serialize};

/// Poster value the movie provider uses when it has no image
pub const NO_POSTER: &str = "N/A";

/// One search hit, as proxied from the movie provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "results", default)]
    pub items: Vec<MovieSummary>,
    #[serde(rename = "totalResults", default, deserialize_with = "lenient_count")]
    pub total_count: u64,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    // Not sent by the list endpoint, the title lives in the path
    #[serde(rename = "movieTitle", default)]
    pub movie_title: String,
    #[serde(rename = "reviewText")]
    pub text: String,
}

/// Body of `POST /api/reviews`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    #[serde(rename = "movieTitle")]
    pub movie_title: String,
    #[serde(rename = "reviewText")]
    pub review_text: String,
}

/// Error payload returned alongside non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// `totalResults` arrives as a number from some proxies and as a string
/// from the provider itself. Anything unreadable counts as zero.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Count::deserialize(deserializer)? {
        Count::Number(n) => n,
        Count::Text(s) => s.trim().parse().unwrap_or(0),
        Count::Other(_) => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_result_from_backend_json() {
        let body = json!({
            "results": [
                {"imdbID": "tt1", "Title": "Batman", "Year": "1989", "Poster": "N/A"}
            ],
            "totalResults": 15
        });

        let result: SearchResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.total_count, 15);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].id, "tt1");
        assert_eq!(result.items[0].poster_url, NO_POSTER);
    }

    #[test]
    fn test_total_results_as_string() {
        let result: SearchResult =
            serde_json::from_value(json!({"results": [], "totalResults": "342"})).unwrap();
        assert_eq!(result.total_count, 342);

        let result: SearchResult =
            serde_json::from_value(json!({"results": [], "totalResults": "lots"})).unwrap();
        assert_eq!(result.total_count, 0);

        let result: SearchResult = serde_json::from_value(json!({"totalResults": null})).unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.is_empty());
    }

    #[test]
    fn test_review_without_title() {
        let reviews: Vec<Review> =
            serde_json::from_value(json!([{"id": 1, "reviewText": "Great film"}])).unwrap();
        assert_eq!(reviews[0].id, 1);
        assert_eq!(reviews[0].text, "Great film");
        assert!(reviews[0].movie_title.is_empty());
    }

    #[test]
    fn test_new_review_field_names() {
        let body = serde_json::to_value(NewReview {
            movie_title: "Batman".to_string(),
            review_text: "Great film".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"movieTitle": "Batman", "reviewText": "Great film"}));
    }
}
