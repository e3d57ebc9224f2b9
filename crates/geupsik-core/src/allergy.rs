//! Allergen codes as published by the NEIS meal service.

/// Code → allergen name. Codes are contiguous from 1.
pub const ALLERGY_TABLE: &[(u8, &str)] = &[
    (1, "난류"),
    (2, "우유"),
    (3, "메밀"),
    (4, "땅콩"),
    (5, "대두"),
    (6, "밀"),
    (7, "고등어"),
    (8, "게"),
    (9, "새우"),
    (10, "돼지고기"),
    (11, "복숭아"),
    (12, "토마토"),
    (13, "아황산류"),
    (14, "호두"),
    (15, "닭고기"),
    (16, "쇠고기"),
    (17, "오징어"),
    (18, "조개류(굴,전복,홍합 포함)"),
    (19, "잣"),
];

/// Look up an allergen by its numeric token. Leading zeros are ignored.
pub fn allergen_name(token: &str) -> Option<&'static str> {
    let code: u8 = token.parse().ok()?;
    ALLERGY_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
