//! The activity screen as a [`Feature`]: range and mode selection, habit
//! filter, day toggles, and the contribution grid derived from them.

use chrono::{FixedOffset, NaiveDate};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::{EffectHandler, Feature};
use crate::habits::{
    build_daily_memo_content, ActivityIndex, ActivityMode, ActivityWeekData, ContributionDay,
    RangeBounds, RangeKind, RangeSelector,
};
use crate::memo::Memo;
use crate::remote::MemosClient;
use crate::repository::MemoRepository;

#[derive(Debug, Clone)]
pub struct ActivityState {
    pub today: NaiveDate,
    pub offset: FixedOffset,
    pub range: RangeSelector,
    pub mode: ActivityMode,
    /// When set, `data` is projected onto this one habit tag.
    pub habit_filter: Option<String>,
    pub memos: Arc<Vec<Memo>>,
    pub index: Arc<ActivityIndex>,
    pub data: ActivityWeekData,
    pub loading: bool,
    pub error: Option<String>,
}

impl ActivityState {
    /// Empty state showing the month containing `today`.
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        let mut state = Self {
            today,
            offset,
            range: RangeSelector::containing(RangeKind::default(), today),
            mode: ActivityMode::default(),
            habit_filter: None,
            memos: Arc::new(Vec::new()),
            index: Arc::new(ActivityIndex::default()),
            data: ActivityWeekData::default(),
            loading: false,
            error: None,
        };
        state.refresh_data();
        state
    }

    pub fn with_mode(mut self, mode: ActivityMode) -> Self {
        self.mode = mode;
        self.refresh_data();
        self
    }

    pub fn with_range(mut self, range: RangeSelector) -> Self {
        self.range = range;
        self.refresh_data();
        self
    }

    pub fn day(&self, date: NaiveDate) -> Option<&ContributionDay> {
        self.data.find_day_by_date(date)
    }

    fn set_memos(&mut self, memos: Vec<Memo>) {
        self.index = Arc::new(ActivityIndex::from_memos(&memos, self.offset));
        self.memos = Arc::new(memos);
        self.refresh_data();
    }

    fn refresh_data(&mut self) {
        let data = self.index.build_range(self.range, self.mode, self.today);
        self.data = match &self.habit_filter {
            Some(tag) => data.for_habit_tag(tag),
            None => data,
        };
    }

    /// Habit view of `date` regardless of the current mode.
    fn habit_day(&self, date: NaiveDate) -> ContributionDay {
        self.index
            .build_day(date, &RangeBounds::new(date, date), ActivityMode::Habits, self.today)
    }

    /// The save effect that rewrites `date`'s daily memo with `done`, or
    /// `None` when the day cannot be edited.
    fn save_day(&self, date: NaiveDate, done: HashSet<String>) -> Option<ActivityEffect> {
        let day = self.habit_day(date);
        if !day.is_clickable {
            debug!(%date, "ignoring edit of a non-clickable day");
            return None;
        }
        let habits = self.index.habits_on(date);
        if habits.is_empty() {
            debug!(%date, "ignoring edit of a day without configured habits");
            return None;
        }

        Some(ActivityEffect::SaveMemo {
            id: day.daily_memo.map(|m| m.id),
            content: build_daily_memo_content(date, habits, &done),
        })
    }
}

#[derive(Debug, Clone)]
pub enum ActivityAction {
    Load,
    MemosLoaded(Vec<Memo>),
    LoadFailed(String),
    MemoSaved(Memo),
    SaveFailed(String),
    SetRange(RangeSelector),
    /// Switch to the range of this kind containing the current range's start.
    SetRangeKind(RangeKind),
    PreviousRange,
    NextRange,
    SetMode(ActivityMode),
    SelectHabit(Option<String>),
    ToggleHabit { date: NaiveDate, tag: String },
    SetDayHabits { date: NaiveDate, done: HashSet<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEffect {
    LoadMemos,
    /// Create (`id = None`) or overwrite a memo.
    SaveMemo { id: Option<String>, content: String },
}

pub struct ActivityFeature;

impl Feature for ActivityFeature {
    type State = ActivityState;
    type Action = ActivityAction;
    type Effect = ActivityEffect;

    fn reduce(state: &mut ActivityState, action: ActivityAction) -> Vec<ActivityEffect> {
        match action {
            ActivityAction::Load => {
                state.loading = true;
                state.error = None;
                return vec![ActivityEffect::LoadMemos];
            }
            ActivityAction::MemosLoaded(memos) => {
                state.loading = false;
                state.set_memos(memos);
            }
            ActivityAction::LoadFailed(message) | ActivityAction::SaveFailed(message) => {
                state.loading = false;
                state.error = Some(message);
            }
            ActivityAction::MemoSaved(memo) => {
                let mut memos = state.memos.as_ref().clone();
                match memos.iter_mut().find(|m| m.id == memo.id) {
                    Some(existing) => *existing = memo,
                    None => memos.push(memo),
                }
                state.set_memos(memos);
            }
            ActivityAction::SetRange(range) => {
                state.range = range;
                state.refresh_data();
            }
            ActivityAction::SetRangeKind(kind) => {
                let anchor = crate::habits::range_bounds(state.range).start;
                state.range = RangeSelector::containing(kind, anchor);
                state.refresh_data();
            }
            ActivityAction::PreviousRange => {
                state.range = state.range.previous();
                state.refresh_data();
            }
            ActivityAction::NextRange => {
                state.range = state.range.next();
                state.refresh_data();
            }
            ActivityAction::SetMode(mode) => {
                state.mode = mode;
                state.refresh_data();
            }
            ActivityAction::SelectHabit(tag) => {
                state.habit_filter = tag;
                state.refresh_data();
            }
            ActivityAction::ToggleHabit { date, tag } => {
                let day = state.habit_day(date);
                if !day.habit_statuses.iter().any(|s| s.tag == tag) {
                    debug!(%date, tag = %tag, "ignoring toggle of an unconfigured habit");
                    return Vec::new();
                }
                let mut done: HashSet<String> = day
                    .habit_statuses
                    .iter()
                    .filter(|s| s.done)
                    .map(|s| s.tag.clone())
                    .collect();
                if !done.remove(&tag) {
                    done.insert(tag);
                }
                return state.save_day(date, done).into_iter().collect();
            }
            ActivityAction::SetDayHabits { date, done } => {
                return state.save_day(date, done).into_iter().collect();
            }
        }
        Vec::new()
    }
}

/// Runs activity effects against a memo repository on the blocking pool.
///
/// With a server client attached, saves go to the server first and the
/// returned memo is mirrored into the repository.
pub struct ActivityEffects {
    repo: Arc<Mutex<Box<dyn MemoRepository>>>,
    remote: Option<Arc<MemosClient>>,
}

impl ActivityEffects {
    pub fn new(repo: Box<dyn MemoRepository>) -> Self {
        Self {
            repo: Arc::new(Mutex::new(repo)),
            remote: None,
        }
    }

    pub fn with_remote(mut self, client: MemosClient) -> Self {
        self.remote = Some(Arc::new(client));
        self
    }

    async fn with_repo<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn MemoRepository) -> crate::error::Result<T> + Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || {
            let mut guard = repo.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut **guard).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| format!("repository task failed: {e}"))?
    }

    async fn save(&self, id: Option<String>, content: String) -> Result<Memo, String> {
        let Some(client) = &self.remote else {
            return self
                .with_repo(move |repo| match id {
                    Some(id) => repo.update_memo(&id, &content),
                    None => repo.create_memo(&content),
                })
                .await;
        };

        let memo = match id {
            Some(id) => client.update_memo(&id, &content).await,
            None => client.create_memo(&content).await,
        }
        .map_err(|e| e.to_string())?;

        let mirrored = memo.clone();
        self.with_repo(move |repo| repo.upsert_memo(&mirrored)).await?;
        Ok(memo)
    }
}

impl EffectHandler<ActivityFeature> for ActivityEffects {
    async fn handle(&self, effect: ActivityEffect) -> Vec<ActivityAction> {
        match effect {
            ActivityEffect::LoadMemos => match self.with_repo(|repo| repo.list_memos()).await {
                Ok(memos) => vec![ActivityAction::MemosLoaded(memos)],
                Err(e) => {
                    warn!(error = %e, "failed to load memos");
                    vec![ActivityAction::LoadFailed(e)]
                }
            },
            ActivityEffect::SaveMemo { id, content } => match self.save(id, content).await {
                Ok(memo) => vec![ActivityAction::MemoSaved(memo)],
                Err(e) => {
                    warn!(error = %e, "failed to save memo");
                    vec![ActivityAction::SaveFailed(e)]
                }
            },
        }
    }
}
