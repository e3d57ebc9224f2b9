//! Menu text normalisation.
//!
//! The provider packs a whole meal into one string: dishes are separated by
//! `<br/>` and each dish may carry parenthesised allergy codes, e.g.
//! `김치찌개(5.6.9.)`. Normalisation splits the dishes and rewrites each code
//! group into allergen names:
//!
//! ```text
//! 쌀밥<br/>김치찌개(5.6)<br/>우유(2)
//!   → ["쌀밥", "김치찌개(대두, 밀)", "우유(우유)"]
//! ```
//!
//! Only groups made purely of digits and dots are rewritten. Everything else,
//! including digits outside parentheses (`1등급`, `2색나물`) and parentheticals
//! with words in them, is passed through untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::allergy::allergen_name;
use crate::meal::{MealRecord, NormalizedMenuLine};

/// Line-break marker embedded by the provider.
pub const LINE_BREAK: &str = "<br/>";

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"));

// `(5)`, `(7.14)`, and the provider's trailing-dot form `(5.6.)`.
static CODE_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]+(?:\.[0-9]+)*)\.?\)").expect("code group pattern"));

/// Separator between allergen names inside a rewritten group.
const NAME_SEPARATOR: &str = ", ";

/// Normalise a meal record into display lines.
pub fn normalize(raw: &MealRecord) -> Vec<NormalizedMenuLine> {
    split_dishes(&raw.raw_dish_text)
        .map(|dish| NormalizedMenuLine::new(normalize_dish(dish)))
        .collect()
}

/// Split provider text on line breaks, trimming and dropping blank pieces.
pub fn split_dishes(text: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Rewrite every numeric allergy group in a single dish string.
///
/// Unknown codes stay as their numeral so nothing is lost.
pub fn normalize_dish(dish: &str) -> String {
    CODE_GROUP_RE
        .replace_all(dish, |caps: &Captures<'_>| {
            let names: Vec<&str> = caps[1]
                .split('.')
                .map(|token| allergen_name(token).unwrap_or(token))
                .collect();
            format!("({})", names.join(NAME_SEPARATOR))
        })
        .into_owned()
}

/// Distinct allergens mentioned anywhere in `text`, in order of first use.
///
/// Unknown codes are skipped here; they remain visible in the dish lines.
pub fn allergens_in(text: &str) -> Vec<&'static str> {
    let mut found: Vec<&'static str> = Vec::new();
    for caps in CODE_GROUP_RE.captures_iter(text) {
        for token in caps[1].split('.') {
            if let Some(name) = allergen_name(token)
                && !found.contains(&name)
            {
                found.push(name);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(text: &str) -> MealRecord {
        MealRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            meal_type: "중식".into(),
            raw_dish_text: text.into(),
            allergy_annotation: None,
            calorie_info: None,
            origin_info: None,
        }
    }

    fn lines(text: &str) -> Vec<String> {
        normalize(&record(text)).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn three_line_menu() {
        assert_eq!(
            lines("쌀밥<br/>김치찌개(5.6)<br/>우유(2)"),
            vec!["쌀밥", "김치찌개(대두, 밀)", "우유(우유)"]
        );
    }

    #[test]
    fn text_without_codes_unchanged() {
        for dish in ["쌀밥", "깍두기", "2색나물", "1등급 한우불고기", "사과 1/2"] {
            assert_eq!(normalize_dish(dish), dish);
        }
    }

    #[test]
    fn single_code_replaced_in_place() {
        assert_eq!(normalize_dish("두부조림(5)맛있음"), "두부조림(대두)맛있음");
    }

    #[test]
    fn multiple_codes_keep_order() {
        assert_eq!(normalize_dish("고등어구이(7.14)"), "고등어구이(고등어, 호두)");
        assert_eq!(normalize_dish("고등어구이(14.7)"), "고등어구이(호두, 고등어)");
    }

    #[test]
    fn unknown_code_kept() {
        assert_eq!(normalize_dish("특식(99)"), "특식(99)");
        assert_eq!(normalize_dish("특식(5.99.6)"), "특식(대두, 99, 밀)");
    }

    #[test]
    fn trailing_dot_group() {
        assert_eq!(
            normalize_dish("김치찌개 (5.6.9.10.13.)"),
            "김치찌개 (대두, 밀, 새우, 돼지고기, 아황산류)"
        );
    }

    #[test]
    fn non_numeric_parenthetical_untouched() {
        for dish in [
            "김치찌개(대두, 밀)",
            "과일(사과)",
            "볶음밥(5a)",
            "국(5..6)",
            "빵(.5)",
            "수프(1, 2)",
            "()",
        ] {
            assert_eq!(normalize_dish(dish), dish);
        }
    }

    #[test]
    fn several_groups_in_one_dish() {
        assert_eq!(normalize_dish("A(1)B(2)"), "A(난류)B(우유)");
    }

    #[test]
    fn idempotent_after_first_pass() {
        for dish in [
            "김치찌개(5.6)",
            "특식(99)",
            "우유(2)",
            "쌀밥",
            "조개국(18)",
        ] {
            let once = normalize_dish(dish);
            assert_eq!(normalize_dish(&once), once);
        }
    }

    #[test]
    fn blank_lines_dropped() {
        assert_eq!(lines("<br/>쌀밥 <br/>  <br/>국<br/>"), vec!["쌀밥", "국"]);
        assert!(lines("").is_empty());
    }

    #[test]
    fn provider_marker_splits() {
        let text = format!("쌀밥{LINE_BREAK}국{LINE_BREAK}");
        assert_eq!(lines(&text), vec!["쌀밥", "국"]);
    }

    #[test]
    fn line_break_variants() {
        assert_eq!(lines("a<br>b<br />c<BR/>d"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn deterministic() {
        let text = "쌀밥<br/>김치찌개(5.6)<br/>우유(2)";
        assert_eq!(lines(text), lines(text));
    }

    #[test]
    fn allergens_summary() {
        assert_eq!(
            allergens_in("쌀밥<br/>김치찌개(5.6)<br/>두부(5)<br/>특식(99.2)"),
            vec!["대두", "밀", "우유"]
        );
        assert!(allergens_in("쌀밥").is_empty());
    }
}
