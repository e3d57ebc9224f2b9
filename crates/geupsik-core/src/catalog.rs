//! Static region and school-level catalog.
//!
//! Maps human-readable names to the codes the NEIS hub expects in its
//! `ATPT_OFCDC_SC_CODE` and `SCHUL_KND_SC_NM` filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::QueryError;

/// A provincial office of education.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionCode {
    Seoul,
    Busan,
    Daegu,
    Incheon,
    Gwangju,
    Daejeon,
    Ulsan,
    Sejong,
    Gyeonggi,
    Gangwon,
    Chungbuk,
    Chungnam,
    Jeonbuk,
    Jeonnam,
    Gyeongbuk,
    Gyeongnam,
    Jeju,
}

impl RegionCode {
    pub const ALL: [RegionCode; 17] = [
        RegionCode::Seoul,
        RegionCode::Busan,
        RegionCode::Daegu,
        RegionCode::Incheon,
        RegionCode::Gwangju,
        RegionCode::Daejeon,
        RegionCode::Ulsan,
        RegionCode::Sejong,
        RegionCode::Gyeonggi,
        RegionCode::Gangwon,
        RegionCode::Chungbuk,
        RegionCode::Chungnam,
        RegionCode::Jeonbuk,
        RegionCode::Jeonnam,
        RegionCode::Gyeongbuk,
        RegionCode::Gyeongnam,
        RegionCode::Jeju,
    ];

    /// Every region, in provider code order.
    pub fn all() -> impl Iterator<Item = RegionCode> {
        Self::ALL.into_iter()
    }

    // (office code, Korean name, short name, slug)
    fn entry(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            RegionCode::Seoul => ("B10", "서울특별시교육청", "서울", "seoul"),
            RegionCode::Busan => ("C10", "부산광역시교육청", "부산", "busan"),
            RegionCode::Daegu => ("D10", "대구광역시교육청", "대구", "daegu"),
            RegionCode::Incheon => ("E10", "인천광역시교육청", "인천", "incheon"),
            RegionCode::Gwangju => ("F10", "광주광역시교육청", "광주", "gwangju"),
            RegionCode::Daejeon => ("G10", "대전광역시교육청", "대전", "daejeon"),
            RegionCode::Ulsan => ("H10", "울산광역시교육청", "울산", "ulsan"),
            RegionCode::Sejong => ("I10", "세종특별자치시교육청", "세종", "sejong"),
            RegionCode::Gyeonggi => ("J10", "경기도교육청", "경기", "gyeonggi"),
            RegionCode::Gangwon => ("K10", "강원특별자치도교육청", "강원", "gangwon"),
            RegionCode::Chungbuk => ("M10", "충청북도교육청", "충북", "chungbuk"),
            RegionCode::Chungnam => ("N10", "충청남도교육청", "충남", "chungnam"),
            RegionCode::Jeonbuk => ("P10", "전북특별자치도교육청", "전북", "jeonbuk"),
            RegionCode::Jeonnam => ("Q10", "전라남도교육청", "전남", "jeonnam"),
            RegionCode::Gyeongbuk => ("R10", "경상북도교육청", "경북", "gyeongbuk"),
            RegionCode::Gyeongnam => ("S10", "경상남도교육청", "경남", "gyeongnam"),
            RegionCode::Jeju => ("T10", "제주특별자치도교육청", "제주", "jeju"),
        }
    }

    /// Provider office code, e.g. `B10`.
    pub fn code(self) -> &'static str {
        self.entry().0
    }

    /// Full Korean name of the office of education.
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Common two-syllable form, e.g. `경북`.
    pub fn short_name(self) -> &'static str {
        self.entry().2
    }

    pub fn slug(self) -> &'static str {
        self.entry().3
    }

    /// Reverse lookup from a provider office code.
    pub fn from_code(code: &str) -> Option<RegionCode> {
        Self::all().find(|r| r.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionCode {
    type Err = QueryError;

    /// Accepts the office code (`B10`), the slug (`seoul`), the short name
    /// (`경북`), the full Korean name, or a prefix of it that names exactly
    /// one office.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QueryError::UnknownRegion(String::new()));
        }
        if let Some(region) = Self::all().find(|r| {
            r.code().eq_ignore_ascii_case(s)
                || r.slug().eq_ignore_ascii_case(s)
                || r.short_name() == s
                || r.name() == s
        }) {
            return Ok(region);
        }

        let mut prefixed = Self::all().filter(|r| r.name().starts_with(s));
        match (prefixed.next(), prefixed.next()) {
            (Some(region), None) => Ok(region),
            (Some(_), Some(_)) => Err(QueryError::AmbiguousRegion(s.to_string())),
            _ => Err(QueryError::UnknownRegion(s.to_string())),
        }
    }
}

/// School level, used as the provider's school-kind filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchoolLevel {
    Elementary,
    Middle,
    High,
}

impl SchoolLevel {
    pub const ALL: [SchoolLevel; 3] = [SchoolLevel::Elementary, SchoolLevel::Middle, SchoolLevel::High];

    /// Value of the provider's `SCHUL_KND_SC_NM` filter.
    pub fn code(self) -> &'static str {
        match self {
            SchoolLevel::Elementary => "초등학교",
            SchoolLevel::Middle => "중학교",
            SchoolLevel::High => "고등학교",
        }
    }
}

impl fmt::Display for SchoolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SchoolLevel {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elementary" | "초등" | "초등학교" | "e" => Ok(SchoolLevel::Elementary),
            "middle" | "중" | "중학교" | "m" => Ok(SchoolLevel::Middle),
            "high" | "고등" | "고등학교" | "h" => Ok(SchoolLevel::High),
            other => Err(QueryError::UnknownLevel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_has_distinct_code() {
        let mut codes: Vec<&str> = RegionCode::all().map(RegionCode::code).collect();
        assert_eq!(codes.len(), 17);
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 17);
    }

    #[test]
    fn region_parses_code_slug_and_name() {
        assert_eq!("B10".parse::<RegionCode>().unwrap(), RegionCode::Seoul);
        assert_eq!("b10".parse::<RegionCode>().unwrap(), RegionCode::Seoul);
        assert_eq!("gyeonggi".parse::<RegionCode>().unwrap(), RegionCode::Gyeonggi);
        assert_eq!("부산".parse::<RegionCode>().unwrap(), RegionCode::Busan);
        assert_eq!(
            "제주특별자치도교육청".parse::<RegionCode>().unwrap(),
            RegionCode::Jeju
        );
    }

    #[test]
    fn unknown_region_is_an_error() {
        assert_eq!(
            "atlantis".parse::<RegionCode>(),
            Err(QueryError::UnknownRegion("atlantis".into()))
        );
        assert!("".parse::<RegionCode>().is_err());
    }

    #[test]
    fn region_parses_short_names() {
        assert_eq!("경북".parse::<RegionCode>().unwrap(), RegionCode::Gyeongbuk);
        assert_eq!("경남".parse::<RegionCode>().unwrap(), RegionCode::Gyeongnam);
        assert_eq!("전남".parse::<RegionCode>().unwrap(), RegionCode::Jeonnam);
        assert_eq!("충북".parse::<RegionCode>().unwrap(), RegionCode::Chungbuk);
        assert_eq!("충남".parse::<RegionCode>().unwrap(), RegionCode::Chungnam);
        for region in RegionCode::all() {
            assert_eq!(region.short_name().parse::<RegionCode>().unwrap(), region);
        }
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        assert_eq!(
            "대".parse::<RegionCode>(),
            Err(QueryError::AmbiguousRegion("대".into()))
        );
        assert_eq!(
            "경상".parse::<RegionCode>(),
            Err(QueryError::AmbiguousRegion("경상".into()))
        );
        assert_eq!("경상북".parse::<RegionCode>().unwrap(), RegionCode::Gyeongbuk);
    }

    #[test]
    fn from_code_roundtrips() {
        for region in RegionCode::all() {
            assert_eq!(RegionCode::from_code(region.code()), Some(region));
        }
        assert_eq!(RegionCode::from_code("Z99"), None);
    }

    #[test]
    fn level_codes() {
        assert_eq!(SchoolLevel::Elementary.code(), "초등학교");
        assert_eq!("middle".parse::<SchoolLevel>().unwrap(), SchoolLevel::Middle);
        assert_eq!("고등학교".parse::<SchoolLevel>().unwrap(), SchoolLevel::High);
        assert!("college".parse::<SchoolLevel>().is_err());
    }
}
