//! Patient summaries for search results and episode lists.

use crate::config::UiConfig;
use crate::constants::CATEGORY_SEPARATOR;
use crate::values::DateValue;
use crate::{OpalError, OpalResult};
use serde::{Deserialize, Serialize};

/// Raw summary payload as sent by the server.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SummaryPayload {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub name: String,
    pub count: u32,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub episode_id: i64,
    #[serde(default)]
    pub hospital_number: String,
}

/// Display-ready patient summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientSummary {
    /// `"2012"` or `"2012-2014"`; `None` unless both episode dates are present and valid.
    pub years: Option<String>,
    pub name: String,
    pub count: u32,
    pub date_of_birth: Option<DateValue>,
    pub categories: String,
    pub link: String,
    pub hospital_number: String,
}

impl PatientSummary {
    pub fn new(payload: &SummaryPayload, cfg: &UiConfig) -> Self {
        Self {
            years: year_range(payload.start_date.as_deref(), payload.end_date.as_deref()),
            name: payload.name.clone(),
            count: payload.count,
            date_of_birth: present(payload.date_of_birth.as_deref()).map(DateValue::parse),
            categories: payload.categories.join(CATEGORY_SEPARATOR),
            link: cfg.episode_link(payload.episode_id),
            hospital_number: payload.hospital_number.clone(),
        }
    }

    /// Parses a JSON summary payload and derives the summary.
    pub fn from_json(text: &str, cfg: &UiConfig) -> OpalResult<Self> {
        let payload: SummaryPayload =
            serde_json::from_str(text).map_err(OpalError::Deserialization)?;
        Ok(Self::new(&payload, cfg))
    }
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

fn year_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start_year = DateValue::parse(present(start)?).year()?;
    let end_year = DateValue::parse(present(end)?).year()?;

    if start_year == end_year {
        Some(start_year.to_string())
    } else {
        Some(format!("{start_year}-{end_year}"))
    }
}
