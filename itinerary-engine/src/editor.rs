//! Permission-checked editing of one itinerary.
//!
//! The editor owns the local snapshot. Every mutation checks the user's
//! role, validates, applies the change locally and then resubmits the whole
//! itinerary. A refused or invalid edit never reaches the backend. A failed
//! save leaves the local change in place; the last write wins.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::access::{Action, Member, Role, members, resolve_role};
use crate::api::{ApiError, ItineraryApi, NewItinerary, day_payload};
use crate::budget::{BudgetError, BudgetSummary, ExpenseDraft, add_expense, remove_expense, summarize, validate_total};
use crate::domain::{
    Budget, DEFAULT_CURRENCY, Day, DomainError, Expense, Itinerary, ItineraryStatus, Stop, UserId,
};
use crate::map::{MapProjector, Projection};

/// Errors from editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The user's role does not allow the action
    #[error("not permitted to {0}")]
    Forbidden(&'static str),

    /// Input rejected before any change
    #[error("invalid input: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// The backend call failed; local state keeps the change
    #[error("backend error: {0}")]
    Remote(#[from] ApiError),
}

/// Input for a new itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_public: bool,
}

/// Editing session over one itinerary.
pub struct ItineraryEditor<'a, A> {
    api: &'a A,
    user: Option<UserId>,
    itinerary: Itinerary,
    projector: MapProjector,
}

impl<'a, A: ItineraryApi> ItineraryEditor<'a, A> {
    /// Open an itinerary the user may at least view.
    pub async fn load(api: &'a A, user: Option<UserId>, id: &str) -> Result<Self, EditError> {
        let itinerary = api.get_itinerary(id).await?;
        let editor = Self::with_snapshot(api, user, itinerary);

        if !editor.role().can_read() {
            return Err(EditError::Forbidden("view this itinerary"));
        }
        debug!(id, role = ?editor.role(), "itinerary loaded");
        Ok(editor)
    }

    /// Create an itinerary with one empty day per date, owned by `user`.
    pub async fn create(api: &'a A, user: UserId, draft: ItineraryDraft) -> Result<Self, EditError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(EditError::Invalid("title is empty"));
        }
        if draft.end_date < draft.start_date {
            return Err(DomainError::InvalidDateRange {
                start: draft.start_date,
                end: draft.end_date,
            }
            .into());
        }

        let days = draft
            .start_date
            .iter_days()
            .take_while(|d| *d <= draft.end_date)
            .map(|d| day_payload(&Day::new(d)))
            .collect();

        let request = NewItinerary {
            title: title.to_string(),
            description: draft.description.filter(|d| !d.trim().is_empty()),
            is_public: draft.is_public,
            start_date: draft.start_date.format("%Y-%m-%d").to_string(),
            end_date: draft.end_date.format("%Y-%m-%d").to_string(),
            days,
        };

        let itinerary = api.create_itinerary(&request).await?;
        debug!(id = %itinerary.id, "itinerary created");
        Ok(Self::with_snapshot(api, Some(user), itinerary))
    }

    /// Wrap an already loaded snapshot.
    pub fn with_snapshot(api: &'a A, user: Option<UserId>, itinerary: Itinerary) -> Self {
        Self {
            api,
            user,
            itinerary,
            projector: MapProjector::default(),
        }
    }

    pub fn with_projector(mut self, projector: MapProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn role(&self) -> Role {
        resolve_role(self.user.as_ref(), &self.itinerary)
    }

    /// Read-only view of the snapshot.
    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn members(&self) -> Vec<Member> {
        members(&self.itinerary)
    }

    /// Budget summary, if the itinerary has a budget.
    pub fn summary(&self) -> Option<BudgetSummary> {
        self.itinerary
            .budget
            .as_ref()
            .map(|b| summarize(b, &self.itinerary.days))
    }

    /// Map projection of the days, highlighting `active_day`.
    pub fn projection(&self, active_day: Option<usize>) -> Projection {
        self.projector.project(&self.itinerary.days, &[], active_day)
    }

    /// Add an expense. An itinerary without a budget gets one with a zero
    /// ceiling in the default currency.
    pub async fn add_expense(
        &mut self,
        draft: ExpenseDraft,
        active_day: Option<u32>,
    ) -> Result<Expense, EditError> {
        self.authorize(Action::Modify, "add expenses")?;

        let day_count = self.itinerary.day_count();
        let created = self.itinerary.budget.is_none();
        let budget = self
            .itinerary
            .budget
            .get_or_insert_with(|| Budget::new(Decimal::ZERO, DEFAULT_CURRENCY));

        let result = add_expense(budget, draft, day_count, active_day).cloned();
        if result.is_err() && created {
            self.itinerary.budget = None;
        }
        let expense = result?;

        self.save().await?;
        Ok(expense)
    }

    /// Remove an expense. Unknown ids change nothing and make no request.
    pub async fn remove_expense(&mut self, id: &str) -> Result<Option<Expense>, EditError> {
        self.authorize(Action::Modify, "remove expenses")?;

        let Some(removed) = self
            .itinerary
            .budget
            .as_mut()
            .and_then(|b| remove_expense(b, id))
        else {
            return Ok(None);
        };

        self.save().await?;
        Ok(Some(removed))
    }

    /// Set the budget ceiling, and the currency if given.
    pub async fn set_budget(&mut self, total: Decimal, currency: Option<&str>) -> Result<(), EditError> {
        self.authorize(Action::Modify, "change the budget")?;
        let total = validate_total(total)?;

        let currency = currency.map(str::trim).filter(|c| !c.is_empty());
        match self.itinerary.budget.as_mut() {
            Some(budget) => {
                budget.total = total;
                if let Some(currency) = currency {
                    budget.currency = currency.to_string();
                }
            }
            None => {
                self.itinerary.budget =
                    Some(Budget::new(total, currency.unwrap_or(DEFAULT_CURRENCY)));
            }
        }

        self.save().await
    }

    /// Insert a stop into a day; `position` defaults to the end.
    pub async fn add_stop(
        &mut self,
        day_index: usize,
        position: Option<usize>,
        stop: Stop,
    ) -> Result<(), EditError> {
        self.authorize(Action::Modify, "add stops")?;
        self.itinerary.insert_stop(day_index, position, stop)?;
        self.save().await
    }

    pub async fn remove_stop(&mut self, day_index: usize, stop_index: usize) -> Result<Stop, EditError> {
        self.authorize(Action::Modify, "remove stops")?;
        let stop = self.itinerary.remove_stop(day_index, stop_index)?;
        self.save().await?;
        Ok(stop)
    }

    pub async fn move_stop(&mut self, day_index: usize, from: usize, to: usize) -> Result<(), EditError> {
        self.authorize(Action::Modify, "reorder stops")?;
        self.itinerary.move_stop(day_index, from, to)?;
        self.save().await
    }

    /// Append a day. Returns its 1-based number.
    pub async fn add_day(&mut self) -> Result<u32, EditError> {
        self.authorize(Action::Modify, "add days")?;
        let number = self.itinerary.add_day();
        self.save().await?;
        Ok(number)
    }

    pub async fn remove_day(&mut self, index: usize) -> Result<(), EditError> {
        self.authorize(Action::Modify, "remove days")?;
        self.itinerary.remove_day(index)?;
        self.save().await
    }

    pub async fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), EditError> {
        self.authorize(Action::Modify, "change dates")?;
        self.itinerary.set_date_range(start, end)?;
        self.save().await
    }

    pub async fn set_visibility(&mut self, is_public: bool) -> Result<(), EditError> {
        self.authorize(Action::Modify, "change visibility")?;
        if self.itinerary.is_public == is_public {
            return Ok(());
        }
        self.itinerary.is_public = is_public;
        self.save().await
    }

    pub async fn set_status(&mut self, status: ItineraryStatus) -> Result<(), EditError> {
        self.authorize(Action::Modify, "change status")?;
        if self.itinerary.status == status {
            return Ok(());
        }
        self.itinerary.status = status;
        self.save().await
    }

    /// Remove a collaborator. Only the owner may remove others; anyone may
    /// remove themselves. The owner is not a collaborator and cannot be
    /// removed.
    pub async fn remove_collaborator(&mut self, user: &UserId) -> Result<(), EditError> {
        self.authorize(Action::RemoveCollaborator(user.clone()), "remove this collaborator")?;
        if *user == self.itinerary.owner {
            return Err(EditError::Invalid("the owner cannot be removed"));
        }

        self.itinerary.collaborators.retain(|c| c.user != *user);
        self.api
            .remove_collaborator(&self.itinerary.id, user)
            .await
            .inspect_err(|e| warn!(id = %self.itinerary.id, %user, error = %e, "failed to remove collaborator"))?;
        Ok(())
    }

    /// Delete the itinerary. Owner only.
    pub async fn delete(self) -> Result<(), EditError> {
        self.authorize(Action::Delete, "delete this itinerary")?;
        self.api.delete_itinerary(&self.itinerary.id).await?;
        debug!(id = %self.itinerary.id, "itinerary deleted");
        Ok(())
    }

    fn authorize(&self, action: Action, description: &'static str) -> Result<(), EditError> {
        if self.role().allows(&action, self.user.as_ref()) {
            Ok(())
        } else {
            debug!(id = %self.itinerary.id, user = ?self.user, ?action, "refused");
            Err(EditError::Forbidden(description))
        }
    }

    async fn save(&self) -> Result<(), EditError> {
        self.api
            .update_itinerary(&self.itinerary)
            .await
            .inspect_err(|e| warn!(id = %self.itinerary.id, error = %e, "failed to save itinerary"))?;
        Ok(())
    }
}
