//! Itinerary and day types.
//!
//! An `Itinerary` is the in-memory snapshot of one trip plan: its days and
//! stops, its collaborators and its budget. Everything the engine computes
//! is derived from this snapshot.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::{Budget, Collaborator, DomainError, Stop, UserId};

/// Lifecycle state of an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItineraryStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

impl ItineraryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItineraryStatus::Planning => "planning",
            ItineraryStatus::Active => "active",
            ItineraryStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "planning" => Some(ItineraryStatus::Planning),
            "active" => Some(ItineraryStatus::Active),
            "completed" => Some(ItineraryStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ItineraryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of an itinerary.
///
/// A day's ordinal is its position in the itinerary plus one; it is never
/// stored on the day itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Day {
    pub date: Option<NaiveDate>,
    pub stops: Vec<Stop>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            stops: Vec::new(),
        }
    }

    pub fn with_stops(mut self, stops: Vec<Stop>) -> Self {
        self.stops = stops;
        self.renumber();
        self
    }

    /// Rewrite each stop's display order to match its position.
    pub fn renumber(&mut self) {
        for (i, stop) in self.stops.iter_mut().enumerate() {
            stop.order = i as u32;
        }
    }
}

/// A trip plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub owner: UserId,
    pub owner_name: Option<String>,
    pub is_public: bool,
    pub status: ItineraryStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub days: Vec<Day>,
    pub collaborators: Vec<Collaborator>,
    pub budget: Option<Budget>,
    /// Planning completeness percentage, computed by the backend.
    pub completeness: Option<u8>,
}

impl Itinerary {
    /// Create an empty private itinerary.
    pub fn new(id: impl Into<String>, owner: UserId, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            owner,
            owner_name: None,
            is_public: false,
            status: ItineraryStatus::Planning,
            start_date: None,
            end_date: None,
            days: Vec::new(),
            collaborators: Vec::new(),
            budget: None,
            completeness: None,
        }
    }

    /// Number of days.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// The day with the given 1-based ordinal.
    pub fn day_by_number(&self, number: u32) -> Option<&Day> {
        (number as usize)
            .checked_sub(1)
            .and_then(|idx| self.days.get(idx))
    }

    /// Replace the date range, regenerating one day per calendar date.
    ///
    /// Days whose date is still in range keep their stops. Undated days fill
    /// the remaining new dates in order. Expenses follow their day to its new
    /// position; expenses of a day that drops out move to the first day if
    /// its date was before the new start, else to the last day.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), DomainError> {
        if end < start {
            return Err(DomainError::InvalidDateRange { start, end });
        }

        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        let old_dates: Vec<Option<NaiveDate>> = self.days.iter().map(|d| d.date).collect();
        let mut new_index: Vec<Option<usize>> = vec![None; old_dates.len()];

        let mut dated: Vec<(usize, Day)> = Vec::new();
        let mut undated: Vec<(usize, Day)> = Vec::new();
        for (old, day) in self.days.drain(..).enumerate() {
            if day.date.is_some() {
                dated.push((old, day));
            } else {
                undated.push((old, day));
            }
        }
        let mut undated = undated.into_iter();

        let mut days = Vec::with_capacity(dates.len());
        for (idx, date) in dates.into_iter().enumerate() {
            let day = match dated.iter().position(|(_, d)| d.date == Some(date)) {
                Some(pos) => {
                    let (old, day) = dated.swap_remove(pos);
                    new_index[old] = Some(idx);
                    day
                }
                None => match undated.next() {
                    Some((old, mut day)) => {
                        day.date = Some(date);
                        new_index[old] = Some(idx);
                        day
                    }
                    None => Day::new(date),
                },
            };
            days.push(day);
        }

        self.days = days;
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.rekey_expenses(&new_index, &old_dates, start);
        Ok(())
    }

    /// Append a day dated one after the current last day.
    ///
    /// Returns the new day's 1-based ordinal.
    pub fn add_day(&mut self) -> u32 {
        let next_date = self
            .days
            .last()
            .and_then(|d| d.date)
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .or(self.start_date);

        let day = Day {
            date: next_date,
            stops: Vec::new(),
        };
        self.days.push(day);

        if let Some(date) = next_date {
            if self.start_date.is_none() {
                self.start_date = Some(date);
            }
            self.end_date = Some(date);
        }

        self.days.len() as u32
    }

    /// Remove an empty day, shifting later days one date earlier.
    ///
    /// A day that still has stops or expenses is refused.
    pub fn remove_day(&mut self, index: usize) -> Result<(), DomainError> {
        let day = self
            .days
            .get(index)
            .ok_or(DomainError::InvalidDayIndex(index))?;
        let number = index as u32 + 1;

        let has_expenses = self
            .budget
            .as_ref()
            .is_some_and(|b| b.expenses.iter().any(|e| e.day_number == number));
        if !day.stops.is_empty() || has_expenses {
            return Err(DomainError::DayNotEmpty(number));
        }

        let removed_date = self.days.remove(index).date;

        // Keep the range contiguous: everything after the gap moves up a day.
        let mut next = removed_date;
        for day in self.days.iter_mut().skip(index) {
            let current = day.date;
            if next.is_some() {
                day.date = next;
            }
            next = current;
        }
        if self.end_date.is_some() {
            self.end_date = self.days.last().and_then(|d| d.date).or(self.start_date);
        }

        if let Some(budget) = self.budget.as_mut() {
            for expense in budget.expenses.iter_mut() {
                if expense.day_number > number {
                    expense.day_number -= 1;
                }
            }
        }

        Ok(())
    }

    /// Insert a stop into a day. `position` defaults to the end.
    pub fn insert_stop(
        &mut self,
        day_index: usize,
        position: Option<usize>,
        stop: Stop,
    ) -> Result<(), DomainError> {
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(DomainError::InvalidDayIndex(day_index))?;

        let at = position.unwrap_or(day.stops.len()).min(day.stops.len());
        day.stops.insert(at, stop);
        day.renumber();
        Ok(())
    }

    /// Remove a stop from a day, returning it.
    pub fn remove_stop(&mut self, day_index: usize, stop_index: usize) -> Result<Stop, DomainError> {
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(DomainError::InvalidDayIndex(day_index))?;

        if stop_index >= day.stops.len() {
            return Err(DomainError::InvalidStopIndex {
                day: day_index,
                stop: stop_index,
            });
        }

        let stop = day.stops.remove(stop_index);
        day.renumber();
        Ok(stop)
    }

    /// Move a stop within its day.
    pub fn move_stop(&mut self, day_index: usize, from: usize, to: usize) -> Result<(), DomainError> {
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(DomainError::InvalidDayIndex(day_index))?;

        let len = day.stops.len();
        if from >= len || to >= len {
            return Err(DomainError::InvalidStopIndex {
                day: day_index,
                stop: from.max(to),
            });
        }

        let stop = day.stops.remove(from);
        day.stops.insert(to, stop);
        day.renumber();
        Ok(())
    }

    /// Re-point expenses after the days were rebuilt. `new_index[old]` is
    /// where the day at old index `old` ended up.
    fn rekey_expenses(
        &mut self,
        new_index: &[Option<usize>],
        old_dates: &[Option<NaiveDate>],
        start: NaiveDate,
    ) {
        let last = self.days.len() as u32;
        let Some(budget) = self.budget.as_mut() else {
            return;
        };

        for expense in budget.expenses.iter_mut() {
            let old = (expense.day_number as usize).checked_sub(1);
            expense.day_number = match old.and_then(|o| new_index.get(o).copied().flatten()) {
                Some(idx) => idx as u32 + 1,
                None if expense.day_number == 0 => 1,
                None => match old.and_then(|o| old_dates.get(o).copied().flatten()) {
                    Some(date) if date < start => 1,
                    _ => last,
                },
            };
        }
    }
}

/// List-view summary of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItinerarySummary {
    pub id: String,
    pub title: String,
    pub owner: UserId,
    pub is_public: bool,
    pub status: ItineraryStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub day_count: usize,
    pub completeness: Option<u8>,
}

impl From<&Itinerary> for ItinerarySummary {
    fn from(it: &Itinerary) -> Self {
        Self {
            id: it.id.clone(),
            title: it.title.clone(),
            owner: it.owner.clone(),
            is_public: it.is_public,
            status: it.status,
            start_date: it.start_date,
            end_date: it.end_date,
            day_count: it.days.len(),
            completeness: it.completeness,
        }
    }
}
