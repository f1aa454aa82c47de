use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::UnknownKind;

/// Every story lives for exactly this long, whatever its kind.
pub const STORY_TTL_MILLIS: i64 = 24 * HOUR_MILLIS;

const MINUTE_MILLIS: i64 = 60 * 1000;
const HOUR_MILLIS: i64 = 60 * MINUTE_MILLIS;
const DAY_MILLIS: i64 = 24 * HOUR_MILLIS;

/// Returned by remaining-time queries once a story is gone.
pub const EXPIRED: &str = "Expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    Photo,
    Video,
    Text,
    Live,
}

impl FromStr for StoryKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "photo" => Ok(StoryKind::Photo),
            "video" => Ok(StoryKind::Video),
            "text" => Ok(StoryKind::Text),
            "live" => Ok(StoryKind::Live),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

/// Payload carried by a story. The store never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Caller-supplied fields of a story. Identity and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub user_id: String,
    pub username: String,
    pub user_image: String,
    pub kind: StoryKind,
    pub media: StoryMedia,
    pub is_live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub user_image: String,
    pub kind: StoryKind,
    #[serde(flatten)]
    pub media: StoryMedia,
    pub created_at: i64,
    pub expires_at: i64,
    pub is_live: bool,
    pub viewers: Vec<String>,
}

impl Story {
    pub(crate) fn create(input: NewStory, now: i64) -> Self {
        Story {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            username: input.username,
            user_image: input.user_image,
            kind: input.kind,
            media: input.media,
            created_at: now,
            expires_at: now + STORY_TTL_MILLIS,
            is_live: input.is_live,
            viewers: Vec::new(),
        }
    }

    pub fn is_active_at(&self, now: i64) -> bool {
        self.expires_at > now
    }

    /// Returns true if the viewer was newly recorded.
    pub(crate) fn add_viewer(&mut self, viewer_id: &str) -> bool {
        if has_user_viewed(self, viewer_id) {
            return false;
        }
        self.viewers.push(viewer_id.to_string());
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStats {
    pub total_views: usize,
    pub active_stories: usize,
    pub total_stories: usize,
}

pub fn has_user_viewed(story: &Story, user_id: &str) -> bool {
    story.viewers.iter().any(|viewer| viewer == user_id)
}

/// Formats a remaining duration as "Xh Ym", or "Ym" under an hour.
pub fn format_remaining(remaining_millis: i64) -> String {
    if remaining_millis <= 0 {
        return EXPIRED.to_string();
    }
    let hours = remaining_millis / HOUR_MILLIS;
    let minutes = (remaining_millis % HOUR_MILLIS) / MINUTE_MILLIS;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Describes how long ago `timestamp` was, relative to `now`.
pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    let elapsed = now - timestamp;
    if elapsed < MINUTE_MILLIS {
        "Just now".to_string()
    } else if elapsed < HOUR_MILLIS {
        format!("{}m ago", elapsed / MINUTE_MILLIS)
    } else if elapsed < DAY_MILLIS {
        format!("{}h ago", elapsed / HOUR_MILLIS)
    } else {
        format!("{}d ago", elapsed / DAY_MILLIS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_story(now: i64) -> Story {
        Story::create(
            NewStory {
                user_id: "user-1".into(),
                username: "alice".into(),
                user_image: "https://example.com/a.png".into(),
                kind: StoryKind::Text,
                media: StoryMedia {
                    text: Some("Lisbon!".into()),
                    ..Default::default()
                },
                is_live: false,
            },
            now,
        )
    }

    #[test]
    fn expiry_is_creation_plus_ttl() {
        let story = text_story(1_000);
        assert_eq!(story.expires_at - story.created_at, STORY_TTL_MILLIS);
        assert!(story.is_active_at(1_000 + STORY_TTL_MILLIS - 1));
        assert!(!story.is_active_at(1_000 + STORY_TTL_MILLIS));
    }

    #[test]
    fn viewers_are_deduplicated() {
        let mut story = text_story(0);
        assert!(story.add_viewer("bob"));
        assert!(!story.add_viewer("bob"));
        assert!(story.add_viewer("carol"));
        assert_eq!(story.viewers, vec!["bob".to_string(), "carol".to_string()]);
        assert!(has_user_viewed(&story, "carol"));
        assert!(!has_user_viewed(&story, "dave"));
    }

    #[test]
    fn remaining_time() {
        assert_eq!(format_remaining(0), EXPIRED);
        assert_eq!(format_remaining(-5), EXPIRED);
        assert_eq!(format_remaining(59_999), "0m");
        assert_eq!(format_remaining(45 * MINUTE_MILLIS), "45m");
        assert_eq!(format_remaining(HOUR_MILLIS), "1h 0m");
        assert_eq!(format_remaining(23 * HOUR_MILLIS + 59 * MINUTE_MILLIS), "23h 59m");
    }

    #[test]
    fn relative_time() {
        let now = 10 * DAY_MILLIS;
        assert_eq!(format_relative_time(now, now), "Just now");
        assert_eq!(format_relative_time(now - 59_000, now), "Just now");
        assert_eq!(format_relative_time(now - 5 * MINUTE_MILLIS, now), "5m ago");
        assert_eq!(format_relative_time(now - 3 * HOUR_MILLIS, now), "3h ago");
        assert_eq!(format_relative_time(now - 2 * DAY_MILLIS, now), "2d ago");
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("PHOTO".parse::<StoryKind>().unwrap(), StoryKind::Photo);
        assert_eq!("live".parse::<StoryKind>().unwrap(), StoryKind::Live);
        assert_eq!(
            "reel".parse::<StoryKind>(),
            Err(UnknownKind("reel".to_string()))
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let story = text_story(0);
        let json = serde_json::to_value(&story).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["text"], "Lisbon!");
        assert_eq!(json["expiresAt"], STORY_TTL_MILLIS);
        assert!(json.get("uri").is_none());
    }
}
