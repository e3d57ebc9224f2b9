//! Text rendering of interaction outcomes.

use chrono::NaiveDate;
use geupsik_core::normalize::split_dishes;
use geupsik_core::{RegionCode, SchoolCandidate, SchoolLevel};
use geupsik_store::VoteCounts;

use crate::session::{MealView, Outcome};

/// Print an outcome to stdout. Returns false when the action failed.
pub fn print_outcome(outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Candidates(candidates) => {
            println!("여러 학교가 검색되었습니다. 번호를 골라 주세요:");
            print_candidates(candidates);
        }
        Outcome::Selected(school) => println!("선택한 학교: {}", describe(school)),
        Outcome::NoSchool(name) => {
            println!("입력하신 학교 정보를 찾을 수 없습니다: {name}");
        }
        Outcome::DateSet(date) => println!("날짜: {}", long_date(*date)),
        Outcome::Menu {
            school,
            date,
            meals,
            votes,
        } => print_menu(school, *date, meals, votes.as_ref()),
        Outcome::NoMeal { school, date } => {
            println!("=== {} {} ===", school.name, long_date(*date));
            println!("선택하신 날짜의 급식 정보가 없습니다.");
        }
        Outcome::Votes { date, counts } => {
            println!("{} 투표: {}", long_date(*date), vote_line(counts));
        }
        Outcome::Favorites(favs) => {
            if favs.is_empty() {
                println!("즐겨찾기한 학교가 없습니다.");
            } else {
                print_candidates(favs);
            }
        }
        Outcome::FavoriteChanged {
            school,
            added,
            changed,
        } => match (added, changed) {
            (true, true) => println!("즐겨찾기에 추가했습니다: {}", school.name),
            (true, false) => println!("이미 즐겨찾기에 있습니다: {}", school.name),
            (false, true) => println!("즐겨찾기에서 뺐습니다: {}", school.name),
            (false, false) => println!("즐겨찾기에 없는 학교입니다: {}", school.name),
        },
        Outcome::Countdown(countdown) => println!("{countdown}"),
        Outcome::Notice(msg) => println!("{msg}"),
        Outcome::Failed(msg) => {
            eprintln!("{msg}");
            return false;
        }
    }
    true
}

pub fn print_candidates(candidates: &[SchoolCandidate]) {
    for (i, school) in candidates.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, describe(school));
    }
}

pub fn print_regions() {
    for region in RegionCode::all() {
        println!(
            "  {:<5} {:<10} {:<4} {}",
            region.code(),
            region.slug(),
            region.short_name(),
            region.name()
        );
    }
    let levels: Vec<&str> = SchoolLevel::ALL.iter().map(|l| l.code()).collect();
    println!();
    println!("  levels: {}", levels.join(", "));
}

fn print_menu(school: &SchoolCandidate, date: NaiveDate, meals: &[MealView], votes: Option<&VoteCounts>) {
    println!("=== {} {} 급식 메뉴 ===", school.name, long_date(date));
    println!();
    for meal in meals {
        println!("[{}]", meal.meal_type);
        for line in &meal.lines {
            println!("  {}", line.text);
        }
        if !meal.allergens.is_empty() {
            println!("  {:<10} {}", "알레르기", meal.allergens.join(", "));
        }
        if let Some(note) = &meal.allergy_annotation {
            println!("  {:<10} {}", "비고", note);
        }
        if let Some(cal) = &meal.calorie_info {
            println!("  {:<10} {}", "열량", cal);
        }
        if let Some(origin) = &meal.origin_info {
            println!("  {:<10} {}", "원산지", origin_line(origin));
        }
        println!();
    }
    if let Some(counts) = votes {
        println!("투표: {}", vote_line(counts));
    }
}

fn describe(school: &SchoolCandidate) -> String {
    let region = RegionCode::from_code(&school.office_code)
        .map(|r| r.slug())
        .unwrap_or("?");
    let mut out = format!(
        "{} ({} {}/{})",
        school.name, region, school.office_code, school.school_code
    );
    if let Some(addr) = &school.road_address_prefix {
        out.push_str(" - ");
        out.push_str(addr);
    }
    out
}

/// Origin entries arrive `<br/>`-separated like the dishes.
fn origin_line(text: &str) -> String {
    split_dishes(text).collect::<Vec<_>>().join(", ")
}

fn long_date(date: NaiveDate) -> String {
    date.format("%Y년 %m월 %d일").to_string()
}

fn vote_line(counts: &VoteCounts) -> String {
    format!("좋아요 {} / 별로예요 {}", counts.good, counts.bad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_includes_codes_and_address() {
        let school = SchoolCandidate {
            name: "강남초등학교".into(),
            office_code: "B10".into(),
            school_code: "7021319".into(),
            road_address_prefix: Some("서울특별시 강남구".into()),
        };
        assert_eq!(
            describe(&school),
            "강남초등학교 (seoul B10/7021319) - 서울특별시 강남구"
        );
    }

    #[test]
    fn origin_entries_joined_on_one_line() {
        assert_eq!(
            origin_line("쌀 : 국내산<br/>김치류 : 국내산<br/>"),
            "쌀 : 국내산, 김치류 : 국내산"
        );
    }

    #[test]
    fn long_date_is_korean() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(long_date(d), "2024년 01월 01일");
    }

    #[test]
    fn failed_outcome_reports_false() {
        assert!(!print_outcome(&Outcome::Failed("x".into())));
        assert!(print_outcome(&Outcome::Notice("y".into())));
    }
}
