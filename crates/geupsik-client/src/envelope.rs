//! Decoding of the NEIS response envelope.
//!
//! Every endpoint answers with
//!
//! ```json
//! {"schoolInfo": [{"head": [{"list_total_count": 1}, {"RESULT": {...}}]}, {"row": [...]}]}
//! ```
//!
//! When nothing matches, the endpoint key is absent and only a bare
//! `{"RESULT": {"CODE": "INFO-200", ...}}` is returned. That shape means
//! "no results", not failure.

use geupsik_core::meal::parse_date;
use geupsik_core::{MealRecord, SchoolCandidate};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ClientError;

pub(crate) const SCHOOL_ENDPOINT: &str = "schoolInfo";
pub(crate) const MEAL_ENDPOINT: &str = "mealServiceDietInfo";

const NO_DATA_CODE: &str = "INFO-200";

#[derive(Deserialize)]
struct SchoolRow {
    #[serde(rename = "SCHUL_NM")]
    name: String,
    #[serde(rename = "ATPT_OFCDC_SC_CODE")]
    office_code: String,
    #[serde(rename = "SD_SCHUL_CODE")]
    school_code: String,
    #[serde(rename = "ORG_RDNMA", default)]
    road_address: Option<String>,
}

#[derive(Deserialize)]
struct MealRow {
    #[serde(rename = "MLSV_YMD")]
    date: String,
    #[serde(rename = "MMEAL_SC_NM")]
    meal_type: String,
    #[serde(rename = "DDISH_NM")]
    dish_text: String,
    #[serde(rename = "CAL_INFO", default)]
    calorie_info: Option<String>,
    #[serde(rename = "ORPLC_INFO", default)]
    origin_info: Option<String>,
}

/// Decode a `schoolInfo` body into candidates, in provider order.
pub(crate) fn decode_schools(body: &str) -> Result<Vec<SchoolCandidate>, ClientError> {
    let rows: Vec<SchoolRow> = decode_rows(body, SCHOOL_ENDPOINT)?;
    Ok(rows
        .into_iter()
        .map(|row| SchoolCandidate {
            name: row.name,
            office_code: row.office_code,
            school_code: row.school_code,
            road_address_prefix: row.road_address.as_deref().and_then(address_prefix),
        })
        .collect())
}

/// Decode a `mealServiceDietInfo` body into meal records.
pub(crate) fn decode_meals(body: &str) -> Result<Vec<MealRecord>, ClientError> {
    let rows: Vec<MealRow> = decode_rows(body, MEAL_ENDPOINT)?;
    rows.into_iter()
        .map(|row| {
            let date = parse_date(&row.date).map_err(|_| {
                ClientError::MalformedResponse(format!("bad MLSV_YMD {:?}", row.date))
            })?;
            Ok(MealRecord {
                date,
                meal_type: row.meal_type,
                raw_dish_text: row.dish_text,
                allergy_annotation: None,
                calorie_info: row.calorie_info.filter(|s| !s.trim().is_empty()),
                origin_info: row.origin_info.filter(|s| !s.trim().is_empty()),
            })
        })
        .collect()
}

fn decode_rows<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<Vec<T>, ClientError> {
    let value: Value = serde_json::from_str(body)?;
    let obj = value
        .as_object()
        .ok_or_else(|| ClientError::MalformedResponse("top level is not an object".into()))?;

    let Some(sections) = obj.get(endpoint) else {
        log_bare_result(obj.get("RESULT"), endpoint);
        return Ok(Vec::new());
    };

    let sections = sections
        .as_array()
        .ok_or_else(|| ClientError::MalformedResponse(format!("{endpoint} is not an array")))?;
    let rows = sections
        .iter()
        .find_map(|section| section.get("row"))
        .ok_or_else(|| ClientError::MalformedResponse(format!("{endpoint} has no row section")))?;

    let rows: Vec<T> = serde_json::from_value(rows.clone())?;
    debug!(endpoint, rows = rows.len(), "decoded rows");
    Ok(rows)
}

fn log_bare_result(result: Option<&Value>, endpoint: &str) {
    let code = result
        .and_then(|r| r.get("CODE"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if code == NO_DATA_CODE {
        debug!(endpoint, "provider reported no data");
    } else {
        let message = result
            .and_then(|r| r.get("MESSAGE"))
            .and_then(Value::as_str)
            .unwrap_or("");
        warn!(endpoint, code, message, "provider answered without rows");
    }
}

/// First two words of a road address (province and district).
fn address_prefix(address: &str) -> Option<String> {
    let prefix: Vec<&str> = address.split_whitespace().take(2).collect();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SCHOOL_BODY: &str = r#"{
        "schoolInfo": [
            {"head": [{"list_total_count": 2}, {"RESULT": {"CODE": "INFO-000", "MESSAGE": "정상 처리되었습니다."}}]},
            {"row": [
                {"ATPT_OFCDC_SC_CODE": "B10", "SD_SCHUL_CODE": "7021319", "SCHUL_NM": "강남초등학교",
                 "ORG_RDNMA": "서울특별시 강남구 테헤란로 1", "SCHUL_KND_SC_NM": "초등학교"},
                {"ATPT_OFCDC_SC_CODE": "J10", "SD_SCHUL_CODE": "7531100", "SCHUL_NM": "강남초등학교",
                 "ORG_RDNMA": null}
            ]}
        ]
    }"#;

    const NO_DATA_BODY: &str =
        r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}}"#;

    #[test]
    fn schools_in_provider_order() {
        let schools = decode_schools(SCHOOL_BODY).unwrap();
        assert_eq!(schools.len(), 2);
        assert_eq!(schools[0].office_code, "B10");
        assert_eq!(schools[0].school_code, "7021319");
        assert_eq!(
            schools[0].road_address_prefix.as_deref(),
            Some("서울특별시 강남구")
        );
        assert_eq!(schools[1].office_code, "J10");
        assert_eq!(schools[1].road_address_prefix, None);
    }

    #[test]
    fn missing_key_means_no_results() {
        assert!(decode_schools(NO_DATA_BODY).unwrap().is_empty());
        assert!(decode_meals(NO_DATA_BODY).unwrap().is_empty());
        assert!(decode_meals("{}").unwrap().is_empty());
    }

    #[test]
    fn provider_error_code_is_still_empty() {
        let body = r#"{"RESULT": {"CODE": "ERROR-290", "MESSAGE": "인증키가 유효하지 않습니다."}}"#;
        assert!(decode_schools(body).unwrap().is_empty());
    }

    #[test]
    fn not_json_is_malformed() {
        let err = decode_schools("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        for body in [
            r#"[1, 2, 3]"#,
            r#"{"schoolInfo": {"row": []}}"#,
            r#"{"schoolInfo": [{"head": []}]}"#,
            r#"{"schoolInfo": [{"head": []}, {"row": [{"SCHUL_NM": "x"}]}]}"#,
        ] {
            let err = decode_schools(body).unwrap_err();
            assert!(
                matches!(err, ClientError::MalformedResponse(_)),
                "{body} gave {err:?}"
            );
        }
    }

    #[test]
    fn meals_decode_with_optional_fields() {
        let body = r#"{
            "mealServiceDietInfo": [
                {"head": [{"list_total_count": 2}, {"RESULT": {"CODE": "INFO-000"}}]},
                {"row": [
                    {"MLSV_YMD": "20240304", "MMEAL_SC_NM": "조식", "DDISH_NM": "토스트(1.2.6)"},
                    {"MLSV_YMD": "20240304", "MMEAL_SC_NM": "중식",
                     "DDISH_NM": "쌀밥<br/>김치찌개(5.6)<br/>우유(2)",
                     "CAL_INFO": "650.3 Kcal", "ORPLC_INFO": "쌀 : 국내산<br/>김치류 : 국내산",
                     "NTR_INFO": "탄수화물(g) : 90.1"}
                ]}
            ]
        }"#;
        let meals = decode_meals(body).unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].meal_type, "조식");
        assert_eq!(meals[0].calorie_info, None);
        assert_eq!(meals[1].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(meals[1].calorie_info.as_deref(), Some("650.3 Kcal"));
        assert_eq!(meals[1].raw_dish_text, "쌀밥<br/>김치찌개(5.6)<br/>우유(2)");
    }

    #[test]
    fn meal_with_bad_date_is_malformed() {
        let body = r#"{"mealServiceDietInfo": [{"head": []}, {"row": [
            {"MLSV_YMD": "2024-13-45", "MMEAL_SC_NM": "중식", "DDISH_NM": "쌀밥"}
        ]}]}"#;
        assert!(matches!(
            decode_meals(body),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
