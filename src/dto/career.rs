use super::common::{lenient_f64, string_list};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Career {
    #[serde(alias = "name", alias = "career")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "average_salary", deserialize_with = "lenient_f64")]
    pub salary: Option<f64>,
    #[serde(default, alias = "growth_rate", deserialize_with = "lenient_f64")]
    pub growth: Option<f64>,
    #[serde(default, alias = "required_skills", deserialize_with = "string_list")]
    pub skills: Vec<String>,
}

/// One year of a demand projection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DemandPoint {
    pub year: i32,
    #[serde(default, alias = "value", alias = "jobs", deserialize_with = "lenient_f64")]
    pub demand: Option<f64>,
}

/// Future-demand data for one career in one country.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CareerOutlook {
    #[serde(default, alias = "career_name")]
    pub career: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, alias = "median_salary", deserialize_with = "lenient_f64")]
    pub salary: Option<f64>,
    #[serde(default, alias = "growth_rate", deserialize_with = "lenient_f64")]
    pub growth: Option<f64>,
    #[serde(default, alias = "future_demand", alias = "demand")]
    pub projections: Vec<DemandPoint>,
    #[serde(default, alias = "top_skills", deserialize_with = "string_list")]
    pub skills: Vec<String>,
}

impl CareerOutlook {
    /// Relative change between the first and last projected year.
    pub fn projected_change(&self) -> Option<f64> {
        let mut points: Vec<(i32, f64)> = self
            .projections
            .iter()
            .filter_map(|point| point.demand.map(|demand| (point.year, demand)))
            .collect();
        points.sort_by_key(|(year, _)| *year);

        let (_, first) = *points.first()?;
        let (_, last) = *points.last()?;
        if points.len() < 2 || first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}
