use chrono::NaiveDate;
use geupsik_core::meal::to_provider_date;
use geupsik_core::{MealRecord, QueryError, SchoolCandidate, SchoolQuery};
use tracing::info;

use crate::envelope::{MEAL_ENDPOINT, SCHOOL_ENDPOINT, decode_meals, decode_schools};
use crate::{ClientError, HttpTransport, Transport};

/// Rows requested per call. Only the first page is ever fetched.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Client for the NEIS school lookup and meal service endpoints.
pub struct NeisClient<T: Transport = HttpTransport> {
    transport: T,
    api_key: Option<String>,
    page_size: u32,
}

impl<T: Transport> NeisClient<T> {
    pub fn new(transport: T, api_key: Option<String>) -> Self {
        Self {
            transport,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resolve a school name into candidate `(office_code, school_code)` pairs.
    ///
    /// An empty vector means the provider knows no matching school.
    pub async fn resolve(&self, query: &SchoolQuery) -> Result<Vec<SchoolCandidate>, ClientError> {
        let name = query.validated_name()?;

        let mut params = self.base_params();
        if let Some(region) = query.region {
            params.push(("ATPT_OFCDC_SC_CODE", region.code().to_string()));
        }
        if let Some(level) = query.level {
            params.push(("SCHUL_KND_SC_NM", level.code().to_string()));
        }
        params.push(("SCHUL_NM", name.to_string()));

        let body = self.transport.get(SCHOOL_ENDPOINT, &params).await?;
        let candidates = decode_schools(&body)?;
        info!(name, count = candidates.len(), "resolved school candidates");
        Ok(candidates)
    }

    /// Fetch every meal served on `date`. An empty vector means no meal is scheduled.
    pub async fn fetch(
        &self,
        office_code: &str,
        school_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealRecord>, ClientError> {
        let office_code = office_code.trim();
        let school_code = school_code.trim();
        if office_code.is_empty() {
            return Err(QueryError::EmptyCode("office code").into());
        }
        if school_code.is_empty() {
            return Err(QueryError::EmptyCode("school code").into());
        }

        let mut params = self.base_params();
        params.push(("ATPT_OFCDC_SC_CODE", office_code.to_string()));
        params.push(("SD_SCHUL_CODE", school_code.to_string()));
        params.push(("MLSV_YMD", to_provider_date(date)));

        let body = self.transport.get(MEAL_ENDPOINT, &params).await?;
        let meals = decode_meals(&body)?;
        info!(office_code, school_code, %date, count = meals.len(), "fetched meals");
        Ok(meals)
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("Type", "json".to_string()),
            ("pIndex", "1".to_string()),
            ("pSize", self.page_size.to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("KEY", key.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use async_trait::async_trait;
    use geupsik_core::{RegionCode, SchoolLevel};
    use std::sync::Mutex;

    /// Replays a canned response and records the last request.
    struct Canned {
        response: Result<String, u16>,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl Canned {
        fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                response: Err(status),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_params(&self) -> Vec<(String, String)> {
            self.seen.lock().unwrap().last().unwrap().1.clone()
        }
    }

    #[async_trait]
    impl Transport for Canned {
        async fn get(
            &self,
            endpoint: &str,
            params: &[(&str, String)],
        ) -> Result<String, ClientError> {
            self.seen.lock().unwrap().push((
                endpoint.to_string(),
                params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ));
            match &self.response {
                Ok(body) => Ok(body.clone()),
                Err(status) => Err(ClientError::Server {
                    status: *status,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    const NO_DATA: &str = r#"{"RESULT": {"CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다."}}"#;

    #[tokio::test]
    async fn empty_name_issues_no_request() {
        let client = NeisClient::new(Canned::ok(NO_DATA), None);
        let err = client.resolve(&SchoolQuery::new("  ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
        assert!(client.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_sends_only_supplied_filters() {
        let client = NeisClient::new(Canned::ok(NO_DATA), Some("secret".into())).with_page_size(50);
        client.resolve(&SchoolQuery::new("서초중학교")).await.unwrap();
        let params = client.transport.last_params();
        assert_eq!(param(&params, "SCHUL_NM"), Some("서초중학교"));
        assert_eq!(param(&params, "ATPT_OFCDC_SC_CODE"), None);
        assert_eq!(param(&params, "SCHUL_KND_SC_NM"), None);
        assert_eq!(param(&params, "KEY"), Some("secret"));
        assert_eq!(param(&params, "pIndex"), Some("1"));
        assert_eq!(param(&params, "pSize"), Some("50"));

        let query = SchoolQuery::new("서초")
            .with_region(RegionCode::Seoul)
            .with_level(SchoolLevel::Middle);
        client.resolve(&query).await.unwrap();
        let params = client.transport.last_params();
        assert_eq!(param(&params, "ATPT_OFCDC_SC_CODE"), Some("B10"));
        assert_eq!(param(&params, "SCHUL_KND_SC_NM"), Some("중학교"));
    }

    #[tokio::test]
    async fn blank_key_is_not_sent() {
        let client = NeisClient::new(Canned::ok(NO_DATA), Some(" ".into()));
        client.resolve(&SchoolQuery::new("a")).await.unwrap();
        assert_eq!(param(&client.transport.last_params(), "KEY"), None);
    }

    #[tokio::test]
    async fn fetch_formats_date_and_codes() {
        let client = NeisClient::new(Canned::ok(NO_DATA), None);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let meals = client.fetch("B10", "7021319", date).await.unwrap();
        assert!(meals.is_empty());

        let seen = client.transport.seen.lock().unwrap();
        let (endpoint, params) = seen.last().unwrap();
        assert_eq!(endpoint, MEAL_ENDPOINT);
        assert_eq!(param(params, "MLSV_YMD"), Some("20240101"));
        assert_eq!(param(params, "SD_SCHUL_CODE"), Some("7021319"));
    }

    #[tokio::test]
    async fn fetch_requires_codes() {
        let client = NeisClient::new(Canned::ok(NO_DATA), None);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = client.fetch("", "7021319", date).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
        let err = client.fetch("B10", " ", date).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let client = NeisClient::new(Canned::status(503), None);
        let err = client.resolve(&SchoolQuery::new("강남")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let client = NeisClient::new(Canned::ok("not json"), None);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = client.fetch("B10", "7021319", date).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
