use super::common::string_list;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoRef {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(alias = "link")]
    pub url: String,
}

/// One stage of a generated career-progression plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoadmapStep {
    #[serde(alias = "step", alias = "stage", alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "timeline")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub skills: Vec<String>,
    #[serde(default, alias = "video_url")]
    pub video: Option<VideoField>,
}

/// Videos arrive either as a bare URL or as `{title, url}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VideoField {
    Url(String),
    Detailed(VideoRef),
}

impl RoadmapStep {
    pub fn video_url(&self) -> Option<&str> {
        match self.video.as_ref()? {
            VideoField::Url(url) if !url.is_empty() => Some(url),
            VideoField::Url(_) => None,
            VideoField::Detailed(video) => Some(&video.url),
        }
    }
}
