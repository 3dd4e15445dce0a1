//! The calendar synchronization engine.
//!
//! Event creation and deletion failures are counted per event and never
//! abort the pass. Failures to find or create the calendar itself, or to
//! delete it, abort with [`FitpalError::ExternalService`].

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use fitpal_db::models::{Exercise, FitnessPlan, GOOGLE_PROVIDER, Profile};
use fitpal_db::queries::{plan_items, plans as plan_queries, users as user_queries};

use super::events::{meal_event, workout_event};
use super::provider::{CalendarError, CalendarProvider, Credentials, NewCalendar};
use super::{DEFAULT_CALENDAR_NAME, SyncOutcome, SyncScope};
use crate::error::{FitpalError, Result};
use crate::profile::load_profile;

const CALENDAR_DESCRIPTION: &str = "Fitness and Nutrition Plan from your FitPal app.";

pub struct CalendarSync<'a> {
    pool: &'a PgPool,
    provider: &'a dyn CalendarProvider,
    calendar_name: String,
}

impl<'a> CalendarSync<'a> {
    pub fn new(pool: &'a PgPool, provider: &'a dyn CalendarProvider) -> Self {
        Self {
            pool,
            provider,
            calendar_name: DEFAULT_CALENDAR_NAME.to_owned(),
        }
    }

    #[must_use]
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        self.calendar_name = name.into();
        self
    }

    /// The user's Google credentials, or `NotConnected`.
    async fn credentials(&self, user_id: Uuid) -> Result<Credentials> {
        let account = user_queries::get_linked_account(self.pool, user_id, GOOGLE_PROVIDER)
            .await?
            .ok_or(FitpalError::NotConnected)?;
        Ok(Credentials {
            access_token: account.access_token,
            refresh_token: account.refresh_token,
        })
    }

    async fn owned_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<FitnessPlan> {
        plan_queries::get_plan_for_user(self.pool, user_id, plan_id)
            .await?
            .ok_or_else(|| FitpalError::not_found(format!("plan {plan_id}")))
    }

    /// The calendar id for `plan`: the stored one, else an existing
    /// calendar with the configured name, else a newly created one. The id
    /// is stored on the plan.
    pub async fn ensure_calendar(
        &self,
        credentials: &Credentials,
        plan: &mut FitnessPlan,
        profile: &Profile,
    ) -> Result<String> {
        if let Some(id) = &plan.external_calendar_id {
            return Ok(id.clone());
        }

        let id = match self.find_calendar(credentials).await? {
            Some(id) => {
                info!(calendar_id = %id, name = %self.calendar_name, "reusing existing calendar");
                id
            }
            None => {
                let calendar = NewCalendar {
                    summary: self.calendar_name.clone(),
                    description: CALENDAR_DESCRIPTION.to_owned(),
                    time_zone: profile.time_zone.clone(),
                };
                let id = self
                    .provider
                    .create_calendar(credentials, &calendar)
                    .await
                    .map_err(external("create calendar"))?;
                info!(calendar_id = %id, name = %self.calendar_name, "calendar created");
                id
            }
        };

        plan_queries::set_external_calendar_id(self.pool, plan.id, &id).await?;
        plan.external_calendar_id = Some(id.clone());
        Ok(id)
    }

    async fn find_calendar(&self, credentials: &Credentials) -> Result<Option<String>> {
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .provider
                .list_calendars(credentials, page_token.as_deref())
                .await
                .map_err(external("list calendars"))?;
            if let Some(found) = page.items.into_iter().find(|c| c.summary == self.calendar_name) {
                return Ok(Some(found.id));
            }
            match page.next_page_token {
                Some(next) if page_token.as_deref() != Some(next.as_str()) => page_token = Some(next),
                _ => return Ok(None),
            }
        }
    }

    /// Create events for the plan's workouts, meals or both. Items that
    /// already carry an event id are skipped.
    pub async fn sync_plan(&self, user_id: Uuid, plan_id: Uuid, scope: SyncScope) -> Result<SyncOutcome> {
        let credentials = self.credentials(user_id).await?;
        let mut plan = self.owned_plan(user_id, plan_id).await?;
        let profile = load_profile(self.pool, user_id).await?;
        let calendar_id = self.ensure_calendar(&credentials, &mut plan, &profile).await?;

        let mut outcome = SyncOutcome::default();
        if scope.includes_workout() {
            let pass = self.sync_workouts(&credentials, &calendar_id, &plan, &profile).await?;
            if pass.success_count > 0 {
                plan_queries::set_workout_added(self.pool, plan.id, true).await?;
            }
            outcome += pass;
        }
        if scope.includes_nutrition() {
            let pass = self.sync_meals(&credentials, &calendar_id, &plan, &profile).await?;
            if pass.success_count > 0 {
                plan_queries::set_nutrition_added(self.pool, plan.id, true).await?;
            }
            outcome += pass;
        }

        info!(
            %plan_id,
            %scope,
            success = outcome.success_count,
            failure = outcome.failure_count,
            "plan synced to calendar"
        );
        Ok(outcome)
    }

    async fn sync_workouts(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        plan: &FitnessPlan,
        profile: &Profile,
    ) -> Result<SyncOutcome> {
        let mut exercises: HashMap<Uuid, Vec<Exercise>> = HashMap::new();
        for ex in plan_items::list_exercises_for_plan(self.pool, plan.id).await? {
            exercises.entry(ex.workout_day_id).or_default().push(ex);
        }

        let mut pass = SyncOutcome::default();
        for day in plan_items::list_workout_days(self.pool, plan.id).await? {
            if day.is_rest_day || day.external_event_id.is_some() {
                continue;
            }
            let day_exercises = exercises.get(&day.id).map(Vec::as_slice).unwrap_or_default();
            let Some(event) = workout_event(plan, &day, day_exercises, profile) else {
                warn!(workout_day_id = %day.id, day_of_week = day.day_of_week, "workout day has no valid date");
                pass.record(false);
                continue;
            };

            match self.provider.create_event(credentials, calendar_id, &event).await {
                Ok(event_id) => {
                    plan_items::set_workout_day_event_id(self.pool, day.id, Some(&event_id)).await?;
                    pass.record(true);
                }
                Err(e) => {
                    warn!(workout_day_id = %day.id, error = %e, "failed to create workout event");
                    pass.record(false);
                }
            }
        }
        Ok(pass)
    }

    async fn sync_meals(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        plan: &FitnessPlan,
        profile: &Profile,
    ) -> Result<SyncOutcome> {
        let days = plan_items::list_nutrition_days(self.pool, plan.id).await?;
        let by_id: HashMap<Uuid, _> = days.iter().map(|d| (d.id, d)).collect();

        let mut pass = SyncOutcome::default();
        for meal in plan_items::list_meals_for_plan(self.pool, plan.id).await? {
            if meal.external_event_id.is_some() {
                continue;
            }
            let Some(event) = by_id
                .get(&meal.nutrition_day_id)
                .and_then(|day| meal_event(plan, day, &meal, profile))
            else {
                warn!(meal_id = %meal.id, "meal has no valid date");
                pass.record(false);
                continue;
            };

            match self.provider.create_event(credentials, calendar_id, &event).await {
                Ok(event_id) => {
                    plan_items::set_meal_event_id(self.pool, meal.id, Some(&event_id)).await?;
                    pass.record(true);
                }
                Err(e) => {
                    warn!(meal_id = %meal.id, error = %e, "failed to create meal event");
                    pass.record(false);
                }
            }
        }
        Ok(pass)
    }

    /// Delete the events created for the plan's workouts, meals or both.
    /// The scope's calendar flag is cleared afterwards even if some
    /// deletions failed.
    pub async fn unsync_plan(&self, user_id: Uuid, plan_id: Uuid, scope: SyncScope) -> Result<SyncOutcome> {
        let credentials = self.credentials(user_id).await?;
        let plan = self.owned_plan(user_id, plan_id).await?;
        let calendar_id = plan.external_calendar_id.as_deref();

        let mut outcome = SyncOutcome::default();
        if scope.includes_workout() {
            let mut pass = SyncOutcome::default();
            for day in plan_items::list_workout_days(self.pool, plan.id).await? {
                let Some(event_id) = day.external_event_id.as_deref() else {
                    continue;
                };
                let removed = self.remove_event(&credentials, calendar_id, event_id).await;
                if removed {
                    plan_items::set_workout_day_event_id(self.pool, day.id, None).await?;
                }
                pass.record(removed);
            }
            plan_queries::set_workout_added(self.pool, plan.id, false).await?;
            outcome += pass;
        }
        if scope.includes_nutrition() {
            let mut pass = SyncOutcome::default();
            for meal in plan_items::list_meals_for_plan(self.pool, plan.id).await? {
                let Some(event_id) = meal.external_event_id.as_deref() else {
                    continue;
                };
                let removed = self.remove_event(&credentials, calendar_id, event_id).await;
                if removed {
                    plan_items::set_meal_event_id(self.pool, meal.id, None).await?;
                }
                pass.record(removed);
            }
            plan_queries::set_nutrition_added(self.pool, plan.id, false).await?;
            outcome += pass;
        }

        info!(
            %plan_id,
            %scope,
            success = outcome.success_count,
            failure = outcome.failure_count,
            "plan removed from calendar"
        );
        Ok(outcome)
    }

    /// True when the event is gone afterwards. Without a calendar id there
    /// is nothing left at the provider to delete.
    async fn remove_event(&self, credentials: &Credentials, calendar_id: Option<&str>, event_id: &str) -> bool {
        let Some(calendar_id) = calendar_id else {
            return true;
        };
        match self.provider.delete_event(credentials, calendar_id, event_id).await {
            Ok(()) | Err(CalendarError::NotFound(_)) => true,
            Err(e) => {
                warn!(%event_id, error = %e, "failed to delete calendar event");
                false
            }
        }
    }

    /// Delete the user's calendar and forget every calendar reference held
    /// by their plans. Returns false when no synced plan with a calendar
    /// exists.
    pub async fn delete_calendar(&self, user_id: Uuid) -> Result<bool> {
        let credentials = self.credentials(user_id).await?;

        let Some(plan) = plan_queries::first_synced_plan_for_user(self.pool, user_id).await? else {
            return Ok(false);
        };
        let Some(calendar_id) = plan.external_calendar_id else {
            return Ok(false);
        };

        match self.provider.delete_calendar(&credentials, &calendar_id).await {
            Ok(()) | Err(CalendarError::NotFound(_)) => {}
            Err(e) => return Err(external("delete calendar")(e)),
        }
        plan_queries::clear_calendar_state_for_user(self.pool, user_id).await?;

        info!(%user_id, %calendar_id, "calendar deleted");
        Ok(true)
    }
}

fn external(action: &'static str) -> impl Fn(CalendarError) -> FitpalError {
    move |e| FitpalError::ExternalService(format!("failed to {action}: {e}"))
}
