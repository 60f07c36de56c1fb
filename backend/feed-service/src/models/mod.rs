use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of content in the feed
///
/// Variant order is significant: on equal score a story sorts before a post,
/// and the ranker relies on `Story < Post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentKind {
    Story,
    Post,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Story => "STORY",
            ContentKind::Post => "POST",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STORY" => Ok(ContentKind::Story),
            "POST" => Ok(ContentKind::Post),
            other => Err(format!("unknown content kind: {}", other)),
        }
    }
}

/// A post or story eligible for the recommended feed (matches the web client's FeedItem)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCandidate {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub id: i64,
    pub author_id: i64,
    #[serde(default)]
    pub content: String,
    /// Emotion label assigned by the author; absent labels rank as 0
    pub emotion: Option<f64>,
    pub like_count: i64,
    pub is_liked: bool,
    pub author_nickname: String,
    pub author_profile_url: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Candidate with its closeness-to-baseline score for one ranking call
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: FeedCandidate,
    pub score: f64,
}

/// Response body of `GET /api/posts/recommended`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFeed {
    pub base_emotion: f64,
    pub feed: Vec<FeedCandidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_orders_before_post() {
        assert!(ContentKind::Story < ContentKind::Post);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("STORY".parse::<ContentKind>().unwrap(), ContentKind::Story);
        assert_eq!("POST".parse::<ContentKind>().unwrap(), ContentKind::Post);
        assert!("REEL".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_candidate_serializes_client_field_names() {
        let candidate = FeedCandidate {
            kind: ContentKind::Story,
            id: 9,
            author_id: 3,
            content: "rainy day".to_string(),
            emotion: Some(4.0),
            like_count: 2,
            is_liked: true,
            author_nickname: "sora".to_string(),
            author_profile_url: None,
            media_urls: vec!["/uploads/stories/a.jpg".to_string()],
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["type"], "STORY");
        assert_eq!(value["authorId"], 3);
        assert_eq!(value["likeCount"], 2);
        assert_eq!(value["isLiked"], true);
        assert_eq!(value["authorProfileUrl"], serde_json::Value::Null);
        assert_eq!(value["mediaUrls"][0], "/uploads/stories/a.jpg");
    }
}
