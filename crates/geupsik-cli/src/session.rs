//! Interaction handlers.
//!
//! Every user action goes through [`App::handle`], which takes the current
//! [`InteractionState`] by value and hands back the next one together with an
//! [`Outcome`] to render. Provider and store failures are turned into
//! outcomes here; nothing below the presentation layer reaches the user raw.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use geupsik_client::{ClientError, ErrorKind, HttpTransport, NeisClient, Transport};
use geupsik_core::normalize::{allergens_in, normalize};
use geupsik_core::{
    LunchCountdown, LunchWindow, NormalizedMenuLine, QueryError, RegionCode, SchoolCandidate,
    SchoolQuery, lunch_countdown,
};
use geupsik_store::{LocalStore, StoreError, VoteCounts, VoteKind, VoteStore};
use tracing::warn;

/// State owned by the presentation layer and threaded through each handler.
#[derive(Debug, Default)]
pub struct InteractionState {
    pub candidates: Vec<SchoolCandidate>,
    pub selected_candidate: Option<SchoolCandidate>,
    pub last_query_date: Option<NaiveDate>,
    pub vote_cache: HashMap<(NaiveDate, String), VoteCounts>,
}

#[derive(Debug, Clone)]
pub enum Action {
    Search(SchoolQuery),
    /// 1-based index into the last candidate list.
    Pick(usize),
    SetDate(NaiveDate),
    ShowMenu { raw: bool },
    Vote(VoteKind),
    ShowVotes,
    AddFavorite,
    RemoveFavorite,
    ListFavorites,
    Countdown(NaiveDateTime),
}

/// One rendered meal service.
#[derive(Debug, Clone)]
pub struct MealView {
    pub meal_type: String,
    pub lines: Vec<NormalizedMenuLine>,
    pub allergens: Vec<&'static str>,
    pub allergy_annotation: Option<String>,
    pub calorie_info: Option<String>,
    pub origin_info: Option<String>,
}

#[derive(Debug)]
pub enum Outcome {
    /// Several schools matched; the user has to pick one.
    Candidates(Vec<SchoolCandidate>),
    Selected(SchoolCandidate),
    NoSchool(String),
    DateSet(NaiveDate),
    Menu {
        school: SchoolCandidate,
        date: NaiveDate,
        meals: Vec<MealView>,
        votes: Option<VoteCounts>,
    },
    NoMeal {
        school: SchoolCandidate,
        date: NaiveDate,
    },
    Votes {
        date: NaiveDate,
        counts: VoteCounts,
    },
    Favorites(Vec<SchoolCandidate>),
    FavoriteChanged {
        school: SchoolCandidate,
        added: bool,
        changed: bool,
    },
    Countdown(LunchCountdown),
    /// Recoverable input problem, shown as a prompt.
    Notice(String),
    /// The action was abandoned.
    Failed(String),
}

pub struct App<T: Transport = HttpTransport> {
    client: NeisClient<T>,
    votes: Box<dyn VoteStore>,
    favorites: LocalStore,
    lunch: LunchWindow,
    today: NaiveDate,
}

impl<T: Transport> App<T> {
    pub fn new(
        client: NeisClient<T>,
        votes: Box<dyn VoteStore>,
        favorites: LocalStore,
        lunch: LunchWindow,
        today: NaiveDate,
    ) -> Self {
        Self {
            client,
            votes,
            favorites,
            lunch,
            today,
        }
    }

    pub async fn handle(
        &self,
        mut state: InteractionState,
        action: Action,
    ) -> (InteractionState, Outcome) {
        let outcome = match action {
            Action::Search(query) => self.search(&mut state, query).await,
            Action::Pick(n) => pick(&mut state, n),
            Action::SetDate(date) => {
                state.last_query_date = Some(date);
                Outcome::DateSet(date)
            }
            Action::ShowMenu { raw } => self.show_menu(&mut state, raw).await,
            Action::Vote(kind) => self.vote(&mut state, kind),
            Action::ShowVotes => self.show_votes(&mut state),
            Action::AddFavorite => self.change_favorite(&state, true),
            Action::RemoveFavorite => self.change_favorite(&state, false),
            Action::ListFavorites => match self.favorites.favorites() {
                Ok(favs) => Outcome::Favorites(favs),
                Err(e) => store_failure(e),
            },
            Action::Countdown(now) => Outcome::Countdown(lunch_countdown(now, self.lunch)),
        };
        (state, outcome)
    }

    async fn search(&self, state: &mut InteractionState, query: SchoolQuery) -> Outcome {
        let name = query.name_filter.trim().to_string();
        let candidates = match self.client.resolve(&query).await {
            Ok(c) => c,
            Err(e) => return client_failure(e),
        };
        state.selected_candidate = auto_select(&candidates, &name).cloned();
        state.candidates = candidates;

        match &state.selected_candidate {
            Some(school) => Outcome::Selected(school.clone()),
            None if state.candidates.is_empty() => Outcome::NoSchool(name),
            None => Outcome::Candidates(state.candidates.clone()),
        }
    }

    async fn show_menu(&self, state: &mut InteractionState, raw: bool) -> Outcome {
        let Some(school) = state.selected_candidate.clone() else {
            return Outcome::Notice("먼저 학교를 검색해서 선택해 주세요".into());
        };
        let date = *state.last_query_date.get_or_insert(self.today);

        let meals = match self
            .client
            .fetch(&school.office_code, &school.school_code, date)
            .await
        {
            Ok(m) => m,
            Err(e) => return client_failure(e),
        };
        if meals.is_empty() {
            return Outcome::NoMeal { school, date };
        }

        let meals = meals
            .iter()
            .map(|meal| MealView {
                meal_type: meal.meal_type.clone(),
                lines: if raw {
                    vec![NormalizedMenuLine::new(meal.raw_dish_text.clone())]
                } else {
                    normalize(meal)
                },
                allergens: allergens_in(&meal.raw_dish_text),
                allergy_annotation: meal.allergy_annotation.clone(),
                calorie_info: meal.calorie_info.clone(),
                origin_info: meal.origin_info.clone(),
            })
            .collect();

        // A broken vote store should not hide the menu.
        let votes = match self.cached_counts(state, date, &school.school_code) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(error = %e, "could not read vote counts");
                None
            }
        };

        Outcome::Menu {
            school,
            date,
            meals,
            votes,
        }
    }

    fn vote(&self, state: &mut InteractionState, kind: VoteKind) -> Outcome {
        let Some(school) = &state.selected_candidate else {
            return Outcome::Notice("투표할 학교를 먼저 선택해 주세요".into());
        };
        let date = state.last_query_date.unwrap_or(self.today);
        match self.votes.increment(date, &school.school_code, kind) {
            Ok(counts) => {
                state
                    .vote_cache
                    .insert((date, school.school_code.clone()), counts);
                Outcome::Votes { date, counts }
            }
            Err(e) => store_failure(e),
        }
    }

    fn show_votes(&self, state: &mut InteractionState) -> Outcome {
        let Some(school_code) = state
            .selected_candidate
            .as_ref()
            .map(|s| s.school_code.clone())
        else {
            return Outcome::Notice("학교를 먼저 선택해 주세요".into());
        };
        let date = state.last_query_date.unwrap_or(self.today);
        match self.cached_counts(state, date, &school_code) {
            Ok(counts) => Outcome::Votes { date, counts },
            Err(e) => store_failure(e),
        }
    }

    fn cached_counts(
        &self,
        state: &mut InteractionState,
        date: NaiveDate,
        school_code: &str,
    ) -> Result<VoteCounts, StoreError> {
        let key = (date, school_code.to_string());
        if let Some(counts) = state.vote_cache.get(&key) {
            return Ok(*counts);
        }
        let counts = self.votes.get_counts(date, school_code)?;
        state.vote_cache.insert(key, counts);
        Ok(counts)
    }

    fn change_favorite(&self, state: &InteractionState, add: bool) -> Outcome {
        let Some(school) = state.selected_candidate.clone() else {
            return Outcome::Notice("즐겨찾기할 학교를 먼저 선택해 주세요".into());
        };
        let result = if add {
            self.favorites.add_favorite(school.clone())
        } else {
            self.favorites
                .remove_favorite(&school.office_code, &school.school_code)
        };
        match result {
            Ok(changed) => Outcome::FavoriteChanged {
                school,
                added: add,
                changed,
            },
            Err(e) => store_failure(e),
        }
    }
}

/// A lone result, or the single exact-name match among several.
fn auto_select<'a>(candidates: &'a [SchoolCandidate], name: &str) -> Option<&'a SchoolCandidate> {
    if let [only] = candidates {
        return Some(only);
    }
    let mut exact = candidates.iter().filter(|c| c.name == name);
    match (exact.next(), exact.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn pick(state: &mut InteractionState, n: usize) -> Outcome {
    if state.candidates.is_empty() {
        return Outcome::Notice("선택할 검색 결과가 없습니다".into());
    }
    match n.checked_sub(1).and_then(|i| state.candidates.get(i)) {
        Some(school) => {
            state.selected_candidate = Some(school.clone());
            Outcome::Selected(school.clone())
        }
        None => Outcome::Notice(format!(
            "1부터 {} 사이의 번호를 골라 주세요",
            state.candidates.len()
        )),
    }
}

fn client_failure(e: ClientError) -> Outcome {
    match e.kind() {
        ErrorKind::InvalidQuery => Outcome::Notice(format!("입력을 확인해 주세요: {e}")),
        ErrorKind::Transport => {
            warn!(error = %e, "provider request failed");
            Outcome::Failed(format!("API 요청 중 오류가 발생했습니다: {e}"))
        }
        ErrorKind::MalformedResponse => {
            warn!(error = %e, "unexpected provider response");
            Outcome::Failed("급식 정보 응답을 해석할 수 없습니다".into())
        }
    }
}

/// Vote for a school addressed by its codes. Touches only the store.
pub fn vote_by_code(
    votes: &dyn VoteStore,
    office_code: &str,
    school_code: &str,
    date: NaiveDate,
    kind: VoteKind,
) -> Outcome {
    if let Err(e) = check_codes(office_code, school_code) {
        return Outcome::Notice(format!("입력을 확인해 주세요: {e}"));
    }
    match votes.increment(date, school_code.trim(), kind) {
        Ok(counts) => Outcome::Votes { date, counts },
        Err(e) => store_failure(e),
    }
}

/// Current counts for a school code on `date`.
pub fn votes_by_code(votes: &dyn VoteStore, school_code: &str, date: NaiveDate) -> Outcome {
    if school_code.trim().is_empty() {
        let e = QueryError::EmptyCode("school code");
        return Outcome::Notice(format!("입력을 확인해 주세요: {e}"));
    }
    match votes.get_counts(date, school_code.trim()) {
        Ok(counts) => Outcome::Votes { date, counts },
        Err(e) => store_failure(e),
    }
}

fn check_codes(office_code: &str, school_code: &str) -> Result<(), QueryError> {
    let office_code = office_code.trim();
    if office_code.is_empty() {
        return Err(QueryError::EmptyCode("office code"));
    }
    if RegionCode::from_code(office_code).is_none() {
        return Err(QueryError::UnknownRegion(office_code.to_string()));
    }
    if school_code.trim().is_empty() {
        return Err(QueryError::EmptyCode("school code"));
    }
    Ok(())
}

fn store_failure(e: StoreError) -> Outcome {
    warn!(error = %e, "store operation failed");
    Outcome::Failed(format!("저장소 오류: {e}"))
}
