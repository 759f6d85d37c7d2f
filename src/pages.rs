//! One [`PageSource`] per dashboard page.

use crate::config::ApiConfig;
use crate::context::{CountryDefault, PageContext};
use crate::dto::*;
use crate::error::LoadError;
use crate::fetch::FetchRequest;
use crate::loader::PageSource;
use crate::schema::{extract_list, extract_object};
use reqwest::Url;
use serde_json::json;

fn query_url(api: &ApiConfig, path: &str, params: &[(&str, &str)]) -> Result<String, LoadError> {
    Url::parse_with_params(&api.endpoint(path), params)
        .map(String::from)
        .map_err(|err| LoadError::InvalidRequest(format!("{}: {}", api.base_url, err)))
}

// ============================================================================
// Career-scoped pages
// ============================================================================

/// Careers matching the selected target. Country falls back to "USA".
#[derive(Debug, Clone, Copy, Default)]
pub struct CareersPage;

impl CareersPage {
    pub const COUNTRY_DEFAULT: CountryDefault = CountryDefault::Usa;
}

impl PageSource for CareersPage {
    type Data = Vec<Career>;

    fn resource(&self) -> &'static str {
        "careers"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        let country = ctx.country_or(Self::COUNTRY_DEFAULT);
        let url = query_url(
            api,
            "/api/careers",
            &[("career", career), ("country", country.as_str())],
        )?;
        Ok(FetchRequest::get(url))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "careers")
    }
}

/// The step-by-step roadmap. Country falls back to an empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoadmapPage;

impl RoadmapPage {
    pub const COUNTRY_DEFAULT: CountryDefault = CountryDefault::Empty;
}

impl PageSource for RoadmapPage {
    type Data = Vec<RoadmapStep>;

    fn resource(&self) -> &'static str {
        "career roadmap"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        let country = ctx.country_or(Self::COUNTRY_DEFAULT);
        let url = query_url(
            api,
            "/api/career-roadmap",
            &[("career", career), ("country", country.as_str())],
        )?;
        Ok(FetchRequest::get(url))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "roadmap")
    }
}

/// Salary, growth and year-by-year demand for the selected career.
#[derive(Debug, Clone, Copy, Default)]
pub struct FutureDemandPage;

impl FutureDemandPage {
    pub const COUNTRY_DEFAULT: CountryDefault = CountryDefault::Usa;
}

impl PageSource for FutureDemandPage {
    type Data = Option<CareerOutlook>;

    fn resource(&self) -> &'static str {
        "future demand data"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        let country = ctx.country_or(Self::COUNTRY_DEFAULT);
        Ok(FetchRequest::post(
            api.endpoint("/api/get_career_data"),
            json!({ "career": career, "country": country }),
        ))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_object(body, Some("data"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CertificatesPage;

impl PageSource for CertificatesPage {
    type Data = Vec<Certificate>;

    fn resource(&self) -> &'static str {
        "certificates"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        Ok(FetchRequest::get(query_url(
            api,
            "/api/certificates",
            &[("career", career)],
        )?))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "certificates")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoursesPage;

impl PageSource for CoursesPage {
    type Data = Vec<Course>;

    fn resource(&self) -> &'static str {
        "courses"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        Ok(FetchRequest::post(
            api.endpoint("/api/courses"),
            json!({ "career": career }),
        ))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "courses")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillsPage;

impl PageSource for SkillsPage {
    type Data = Vec<Skill>;

    fn resource(&self) -> &'static str {
        "skills"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        Ok(FetchRequest::get(query_url(
            api,
            "/api/skills",
            &[("career", career)],
        )?))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "skills")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DegreesPage;

impl PageSource for DegreesPage {
    type Data = Vec<DegreeProgram>;

    fn resource(&self) -> &'static str {
        "degree programs"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let career = ctx.require_career()?;
        Ok(FetchRequest::get(query_url(
            api,
            "/api/degrees",
            &[("career", career)],
        )?))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "degrees")
    }
}

// ============================================================================
// Account pages
// ============================================================================

/// The signed-in user's profile, looked up by email.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPage;

impl PageSource for SettingsPage {
    type Data = Option<UserSettings>;

    fn resource(&self) -> &'static str {
        "settings"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let email = ctx.require_email()?;
        Ok(FetchRequest::post(api.endpoint("/api/setting"), json!({ "email": email }))
            .with_bearer(ctx.session_token.as_deref()))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_object(body, None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdminUsersPage;

impl PageSource for AdminUsersPage {
    type Data = Vec<AdminUser>;

    fn resource(&self) -> &'static str {
        "users"
    }

    fn request(&self, api: &ApiConfig, ctx: &PageContext) -> Result<FetchRequest, LoadError> {
        let token = ctx.require_token()?;
        Ok(FetchRequest::get(api.endpoint("/api/admin/users")).with_bearer(Some(token)))
    }

    fn parse(&self, body: &str) -> Self::Data {
        extract_list(body, "users")
    }
}
