//! Meal records and provider date handling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::QueryError;

/// Date format used by the provider (`MLSV_YMD`).
pub const PROVIDER_DATE_FORMAT: &str = "%Y%m%d";

/// One served meal for a school on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    pub date: NaiveDate,
    /// Provider meal label, e.g. 조식, 중식, 석식.
    pub meal_type: String,
    /// Dish text with `<br/>` line breaks and numeric allergy groups.
    pub raw_dish_text: String,
    pub allergy_annotation: Option<String>,
    pub calorie_info: Option<String>,
    /// Ingredient origin notes, `<br/>` separated.
    pub origin_info: Option<String>,
}

/// One display-ready dish line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedMenuLine {
    pub text: String,
}

impl NormalizedMenuLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

pub fn to_provider_date(date: NaiveDate) -> String {
    date.format(PROVIDER_DATE_FORMAT).to_string()
}

/// Parse a user or provider date: `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, QueryError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, PROVIDER_DATE_FORMAT))
        .map_err(|_| QueryError::InvalidDate(s.to_string()))
}
