//! Daily and weekly aggregation into contribution-grid data.

use chrono::{Days, FixedOffset, NaiveDate};
use std::collections::HashMap;

use super::parser::extract_completed_habits;
use super::range::{monday_on_or_before, range_bounds, RangeSelector};
use super::timeline::{
    applicable_config, build_config_timeline, count_posts_by_date, index_daily_memos,
};
use super::types::{
    completion_ratio, ActivityMode, ActivityWeek, ActivityWeekData, ContributionDay,
    DailyMemoRef, HabitConfig, HabitStatus, HabitsConfigEntry, RangeBounds,
};
use crate::memo::Memo;

/// Build one contribution day.
///
/// A day is clickable unless it lies in the future or before the first
/// configuration ever recorded. With no configuration at all, every past or
/// present day is clickable.
pub fn build_day_data(
    date: NaiveDate,
    bounds: &RangeBounds,
    mode: ActivityMode,
    timeline: &[HabitsConfigEntry],
    daily_memos: &HashMap<NaiveDate, DailyMemoRef>,
    post_counts: &HashMap<NaiveDate, u32>,
    today: NaiveDate,
) -> ContributionDay {
    let (completed_count, total_habits, habit_statuses, daily_memo) = match mode {
        ActivityMode::Habits => {
            let habits: &[HabitConfig] = applicable_config(timeline, date)
                .map(|entry| entry.habits.as_slice())
                .unwrap_or(&[]);
            let memo = daily_memos.get(&date);
            let known: Vec<String> = habits.iter().map(|h| h.tag.clone()).collect();
            let done = memo
                .map(|m| extract_completed_habits(&m.content, &known))
                .unwrap_or_default();

            let statuses: Vec<HabitStatus> = habits
                .iter()
                .map(|h| HabitStatus {
                    tag: h.tag.clone(),
                    label: h.label.clone(),
                    done: done.contains(&h.tag),
                })
                .collect();
            let completed = statuses.iter().filter(|s| s.done).count() as u32;
            (completed, habits.len() as u32, statuses, memo.cloned())
        }
        ActivityMode::Posts => (
            post_counts.get(&date).copied().unwrap_or(0),
            0,
            Vec::new(),
            None,
        ),
    };

    let before_first_config = timeline
        .first()
        .is_some_and(|first| date < first.effective_date);

    ContributionDay {
        date,
        completed_count,
        total_habits,
        completion_ratio: completion_ratio(completed_count, total_habits),
        habit_statuses,
        daily_memo,
        in_range: bounds.contains(date),
        is_clickable: date <= today && !before_first_config,
    }
}

/// Lay `bounds` out as Monday-starting weeks, building each day with `day_builder`.
///
/// Weeks always hold seven days; days outside `bounds` are still built and
/// carry `in_range = false`.
pub fn build_activity_weeks<F>(bounds: RangeBounds, mut day_builder: F) -> ActivityWeekData
where
    F: FnMut(NaiveDate) -> ContributionDay,
{
    let mut weeks = Vec::new();
    let mut week_start = monday_on_or_before(bounds.start);

    while week_start <= bounds.end {
        let days: Vec<ContributionDay> = (0..7u64)
            .filter_map(|offset| week_start.checked_add_days(Days::new(offset)))
            .map(&mut day_builder)
            .collect();
        weeks.push(ActivityWeek::new(week_start, days));

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    ActivityWeekData::from_weeks(weeks)
}

impl ActivityWeekData {
    /// The same grid restricted to one habit. Counts become 0 or 1 per day.
    pub fn for_habit(&self, habit: &HabitConfig) -> ActivityWeekData {
        self.for_habit_tag(&habit.tag)
    }

    pub fn for_habit_tag(&self, tag: &str) -> ActivityWeekData {
        let weeks = self
            .weeks
            .iter()
            .map(|week| {
                let days = week.days.iter().map(|day| project_day(day, tag)).collect();
                ActivityWeek::new(week.week_start, days)
            })
            .collect();
        ActivityWeekData::from_weeks(weeks)
    }

    /// The last seven in-range days, oldest first.
    pub fn last_seven_days(&self) -> Vec<&ContributionDay> {
        let in_range: Vec<&ContributionDay> = self
            .weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .filter(|d| d.in_range)
            .collect();
        let skip = in_range.len().saturating_sub(7);
        in_range.into_iter().skip(skip).collect()
    }

    pub fn find_day_by_date(&self, date: NaiveDate) -> Option<&ContributionDay> {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .find(|d| d.date == date)
    }
}

fn project_day(day: &ContributionDay, tag: &str) -> ContributionDay {
    let habit_statuses: Vec<HabitStatus> = day
        .habit_statuses
        .iter()
        .filter(|s| s.tag == tag)
        .take(1)
        .cloned()
        .collect();
    let total_habits = habit_statuses.len() as u32;
    let completed_count = habit_statuses.iter().filter(|s| s.done).count() as u32;

    ContributionDay {
        completed_count,
        total_habits,
        completion_ratio: completion_ratio(completed_count, total_habits),
        habit_statuses,
        ..day.clone()
    }
}

/// Precomputed per-memo-list state for building activity grids.
///
/// Rebuild whenever the memo list changes; the maxima in any
/// [`ActivityWeekData`] built from a stale index are stale too.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    timeline: Vec<HabitsConfigEntry>,
    daily_memos: HashMap<NaiveDate, DailyMemoRef>,
    post_counts: HashMap<NaiveDate, u32>,
}

impl ActivityIndex {
    /// Index `memos`, reading calendar dates in `offset`.
    pub fn from_memos(memos: &[Memo], offset: FixedOffset) -> Self {
        Self {
            timeline: build_config_timeline(memos, offset),
            daily_memos: index_daily_memos(memos),
            post_counts: count_posts_by_date(memos, offset),
        }
    }

    pub fn timeline(&self) -> &[HabitsConfigEntry] {
        &self.timeline
    }

    /// Habits configured on `date`, empty before the first config.
    pub fn habits_on(&self, date: NaiveDate) -> &[HabitConfig] {
        applicable_config(&self.timeline, date)
            .map(|entry| entry.habits.as_slice())
            .unwrap_or(&[])
    }

    pub fn daily_memo(&self, date: NaiveDate) -> Option<&DailyMemoRef> {
        self.daily_memos.get(&date)
    }

    pub fn build_day(
        &self,
        date: NaiveDate,
        bounds: &RangeBounds,
        mode: ActivityMode,
        today: NaiveDate,
    ) -> ContributionDay {
        build_day_data(
            date,
            bounds,
            mode,
            &self.timeline,
            &self.daily_memos,
            &self.post_counts,
            today,
        )
    }

    pub fn build_weeks(
        &self,
        bounds: RangeBounds,
        mode: ActivityMode,
        today: NaiveDate,
    ) -> ActivityWeekData {
        build_activity_weeks(bounds, |date| self.build_day(date, &bounds, mode, today))
    }

    /// Resolve `selector` and build its grid in one call.
    pub fn build_range(
        &self,
        selector: RangeSelector,
        mode: ActivityMode,
        today: NaiveDate,
    ) -> ActivityWeekData {
        self.build_weeks(range_bounds(selector), mode, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_memos() -> Vec<Memo> {
        vec![
            Memo::new("cfg", "#habits/config\nRun | run\nRead | read\nWrite | write")
                .created("2024-01-10T07:00:00Z"),
            Memo::new("d10", "#habits/daily 2024-01-10\n- [x] Run #habits/run\n- [x] Read #habits/read")
                .created("2024-01-10T21:00:00Z"),
            Memo::new("d12", "#habits/daily 2024-01-12\n#habits/write")
                .created("2024-01-12T21:00:00Z"),
            Memo::new("p1", "note").created("2024-01-11T09:00:00Z"),
            Memo::new("p2", "another note").created("2024-01-11T10:00:00Z"),
        ]
    }

    #[test]
    fn habit_day_counts_completions() {
        let index = ActivityIndex::from_memos(&sample_memos(), utc());
        let bounds = RangeBounds::new(date(2024, 1, 8), date(2024, 1, 14));
        let day = index.build_day(date(2024, 1, 10), &bounds, ActivityMode::Habits, date(2024, 1, 15));

        assert_eq!(day.total_habits, 3);
        assert_eq!(day.completed_count, 2);
        assert!((day.completion_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(day.daily_memo.as_ref().unwrap().id, "d10");
        let done: Vec<bool> = day.habit_statuses.iter().map(|s| s.done).collect();
        assert_eq!(done, vec![true, true, false]);
        assert!(day.in_range);
        assert!(day.is_clickable);
    }

    #[test]
    fn day_before_first_config_has_no_habits() {
        let index = ActivityIndex::from_memos(&sample_memos(), utc());
        let bounds = RangeBounds::new(date(2024, 1, 8), date(2024, 1, 14));
        let day = index.build_day(date(2024, 1, 9), &bounds, ActivityMode::Habits, date(2024, 1, 15));

        assert_eq!(day.total_habits, 0);
        assert_eq!(day.completion_ratio, 0.0);
        assert!(!day.is_clickable);
    }

    #[test]
    fn posts_mode_counts_plain_posts() {
        let index = ActivityIndex::from_memos(&sample_memos(), utc());
        let bounds = RangeBounds::new(date(2024, 1, 8), date(2024, 1, 14));
        let day = index.build_day(date(2024, 1, 11), &bounds, ActivityMode::Posts, date(2024, 1, 15));

        assert_eq!(day.completed_count, 2);
        assert_eq!(day.total_habits, 0);
        assert_eq!(day.completion_ratio, 0.0);
        assert!(day.habit_statuses.is_empty());
        assert!(day.daily_memo.is_none());
    }

    #[test]
    fn empty_timeline_never_restricts_past_days() {
        let index = ActivityIndex::from_memos(&[], utc());
        let bounds = RangeBounds::new(date(2000, 1, 1), date(2000, 1, 1));
        let past = index.build_day(date(2000, 1, 1), &bounds, ActivityMode::Habits, date(2024, 1, 1));
        assert!(past.is_clickable);
        let future = index.build_day(date(2024, 1, 2), &bounds, ActivityMode::Habits, date(2024, 1, 1));
        assert!(!future.is_clickable);
        assert!(!future.in_range);
    }

    #[test]
    fn weeks_are_full_and_monday_aligned() {
        let index = ActivityIndex::from_memos(&sample_memos(), utc());
        let data = index.build_range(
            RangeSelector::Month { year: 2024, month: 1 },
            ActivityMode::Habits,
            date(2024, 1, 31),
        );

        assert_eq!(data.weeks.len(), 5);
        for week in &data.weeks {
            assert_eq!(week.days.len(), 7);
            assert_eq!(week.days[0].date.weekday(), Weekday::Mon);
            assert_eq!(week.week_start, week.days[0].date);
        }
        assert_eq!(data.weeks[1].weekly_count, 3);
        assert_eq!(data.max_daily, 2);
        assert_eq!(data.max_weekly, 3);
    }

    #[test]
    fn boundary_days_are_flagged_out_of_range() {
        let index = ActivityIndex::from_memos(&[], utc());
        // 2024-02-01 is a Thursday.
        let data = index.build_range(
            RangeSelector::Month { year: 2024, month: 2 },
            ActivityMode::Posts,
            date(2024, 3, 1),
        );
        let first_week = &data.weeks[0];
        assert_eq!(first_week.week_start, date(2024, 1, 29));
        let flags: Vec<bool> = first_week.days.iter().map(|d| d.in_range).collect();
        assert_eq!(flags, vec![false, false, false, true, true, true, true]);
        let last_week = data.weeks.last().unwrap();
        assert_eq!(last_week.week_start, date(2024, 2, 26));
        assert!(!last_week.days[4].in_range);
    }

    #[test]
    fn for_habit_projects_single_habit() {
        let index = ActivityIndex::from_memos(&sample_memos(), utc());
        let data = index.build_range(
            RangeSelector::Week { start: date(2024, 1, 8) },
            ActivityMode::Habits,
            date(2024, 1, 15),
        );
        let write = index.habits_on(date(2024, 1, 12))[2].clone();
        let projected = data.for_habit(&write);

        let jan12 = projected.find_day_by_date(date(2024, 1, 12)).unwrap();
        assert_eq!(jan12.completed_count, 1);
        assert_eq!(jan12.total_habits, 1);
        assert_eq!(jan12.completion_ratio, 1.0);

        let jan10 = projected.find_day_by_date(date(2024, 1, 10)).unwrap();
        assert_eq!(jan10.completed_count, 0);
        assert_eq!(jan10.total_habits, 1);

        let jan9 = projected.find_day_by_date(date(2024, 1, 9)).unwrap();
        assert_eq!(jan9.total_habits, 0);

        assert_eq!(projected.max_daily, 1);
        assert_eq!(projected.max_weekly, 1);
        // source untouched
        assert_eq!(data.max_daily, 2);
    }

    #[test]
    fn last_seven_days_takes_tail_of_range() {
        let index = ActivityIndex::from_memos(&[], utc());
        let data = index.build_range(
            RangeSelector::Month { year: 2024, month: 2 },
            ActivityMode::Posts,
            date(2024, 3, 1),
        );
        let last: Vec<NaiveDate> = data.last_seven_days().iter().map(|d| d.date).collect();
        assert_eq!(last.len(), 7);
        assert_eq!(last[0], date(2024, 2, 23));
        assert_eq!(last[6], date(2024, 2, 29));
    }

    #[test]
    fn find_day_outside_grid_is_none() {
        let index = ActivityIndex::from_memos(&[], utc());
        let data = index.build_range(
            RangeSelector::Week { start: date(2024, 1, 8) },
            ActivityMode::Habits,
            date(2024, 1, 15),
        );
        assert!(data.find_day_by_date(date(2024, 1, 14)).is_some());
        assert!(data.find_day_by_date(date(2024, 1, 15)).is_none());
    }
}
