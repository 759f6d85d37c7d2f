use super::common::{lenient_f64, string_list};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Certificate {
    #[serde(alias = "title", alias = "certificate")]
    pub name: String,
    #[serde(default, alias = "issuer", alias = "organization")]
    pub provider: Option<String>,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, alias = "difficulty")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Course {
    #[serde(alias = "name", alias = "course")]
    pub title: String,
    #[serde(default, alias = "platform")]
    pub provider: Option<String>,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DegreeProgram {
    #[serde(alias = "degree", alias = "title")]
    pub name: String,
    #[serde(default, alias = "university", alias = "school")]
    pub institution: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    #[serde(alias = "skill", alias = "title")]
    pub name: String,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default, alias = "importance", alias = "level", deserialize_with = "lenient_f64")]
    pub proficiency: Option<f64>,
    #[serde(default, alias = "resources", deserialize_with = "string_list")]
    pub related: Vec<String>,
}
