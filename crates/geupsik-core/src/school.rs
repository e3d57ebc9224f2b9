//! School lookup query and resolved candidates.

use serde::{Deserialize, Serialize};

use crate::{QueryError, RegionCode, SchoolLevel};

/// A school-name search, optionally narrowed by region and level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolQuery {
    pub name_filter: String,
    pub region: Option<RegionCode>,
    pub level: Option<SchoolLevel>,
}

impl SchoolQuery {
    pub fn new(name_filter: impl Into<String>) -> Self {
        Self {
            name_filter: name_filter.into(),
            region: None,
            level: None,
        }
    }

    pub fn with_region(mut self, region: RegionCode) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_level(mut self, level: SchoolLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// The trimmed name filter, or [`QueryError::EmptyName`].
    pub fn validated_name(&self) -> Result<&str, QueryError> {
        let name = self.name_filter.trim();
        if name.is_empty() {
            return Err(QueryError::EmptyName);
        }
        Ok(name)
    }
}

/// One school returned by the provider's lookup.
///
/// `(office_code, school_code)` identifies the school; the display name is
/// not unique and must not be used for follow-up requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCandidate {
    pub name: String,
    pub office_code: String,
    pub school_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_address_prefix: Option<String>,
}

impl SchoolCandidate {
    /// True when both candidates refer to the same school.
    pub fn same_school(&self, other: &SchoolCandidate) -> bool {
        self.office_code == other.office_code && self.school_code == other.school_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_rejected() {
        assert_eq!(SchoolQuery::new("").validated_name(), Err(QueryError::EmptyName));
        assert_eq!(SchoolQuery::new("   ").validated_name(), Err(QueryError::EmptyName));
    }

    #[test]
    fn name_is_trimmed() {
        let q = SchoolQuery::new("  강남초등학교 ").with_level(SchoolLevel::Elementary);
        assert_eq!(q.validated_name(), Ok("강남초등학교"));
        assert_eq!(q.level, Some(SchoolLevel::Elementary));
    }

    #[test]
    fn same_school_ignores_name() {
        let a = SchoolCandidate {
            name: "강남초등학교".into(),
            office_code: "B10".into(),
            school_code: "7021319".into(),
            road_address_prefix: None,
        };
        let b = SchoolCandidate {
            name: "강남초".into(),
            ..a.clone()
        };
        assert!(a.same_school(&b));
    }

    #[test]
    fn candidate_json_omits_missing_address() {
        let c = SchoolCandidate {
            name: "서초중학교".into(),
            office_code: "B10".into(),
            school_code: "7000109".into(),
            road_address_prefix: None,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("road_address_prefix"));
        let parsed: SchoolCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }
}
