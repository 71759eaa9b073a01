//! Claim Discord commands - submission, listing, review and the dashboard.
//!
//! Each command resolves the author's profile, calls into `core::claim` and
//! formats the result. Rejections (validation, authorization, state) are returned
//! as errors and echoed to the user by the framework's error hook.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_profile, commands::format, handlers::autocomplete},
        core::{
            category,
            claim::{self, NewClaim, ReviewDecision, StatusFilter},
            profile::{self, Role},
            report::{self, ReportWindow},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Claim status choices offered by `/claims`.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        #[name = "All"]
        All,
        #[name = "Pending"]
        Pending,
        #[name = "Approved"]
        Approved,
        #[name = "Denied"]
        Denied,
    }

    impl From<StatusChoice> for StatusFilter {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::All => Self::All,
                StatusChoice::Pending => Self::Pending,
                StatusChoice::Approved => Self::Approved,
                StatusChoice::Denied => Self::Denied,
            }
        }
    }

    /// Which dashboard panel to show.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, poise::ChoiceParameter)]
    pub enum DashboardView {
        #[default]
        #[name = "Claims"]
        Claims,
        #[name = "Reports"]
        Reports,
    }

    /// Submits a new expense claim.
    ///
    /// Mileage and trip locations are only kept for categories that track mileage.
    /// Admins may submit on behalf of another employee.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, prefix_command)]
    pub async fn submit_claim(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense category"]
        #[autocomplete = "autocomplete::autocomplete_category_name"]
        category: String,
        #[description = "Amount claimed, e.g. 42.50"] amount: String,
        #[description = "What the expense was for"]
        #[max_length = 500]
        description: String,
        #[description = "Distance travelled (mileage categories)"] mileage: Option<f64>,
        #[description = "Trip start (mileage categories)"]
        #[max_length = 80]
        start_location: Option<String>,
        #[description = "Trip end (mileage categories)"]
        #[max_length = 80]
        end_location: Option<String>,
        #[description = "Link to the receipt"]
        #[max_length = 200]
        receipt_url: Option<String>,
        #[description = "Employee to submit for (admins only)"] employee: Option<serenity::User>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let author = author_profile(ctx).await?;

        let category_id = category::get_category_by_name(db, &category)
            .await?
            .map(|c| c.id);
        let new_claim = NewClaim {
            category_id,
            amount,
            description,
            mileage,
            start_location,
            end_location,
            receipt_url,
        };

        let created = match employee {
            Some(user) => {
                claim::submit_claim_on_behalf(db, &author.id, &user.id.to_string(), new_claim)
                    .await?
            }
            None => claim::submit_claim(db, &author.id, new_claim).await?,
        };

        ctx.say(format!(
            "✅ Claim `#{}` for **${:.2}** submitted and pending review.",
            created.id, created.amount
        ))
        .await?;
        Ok(())
    }

    /// Lists claims, optionally filtered by status.
    ///
    /// Employees see their own claims; admins see everyone's.
    #[poise::command(slash_command, prefix_command)]
    pub async fn claims(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show claims with this status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let author = author_profile(ctx).await?;
        let is_privileged = profile::role_of(&author).is_privileged();

        let filter = status.map_or(StatusFilter::All, StatusFilter::from);
        let claims = claim::filter_by_status(
            claim::list_claims(db, &author.id, is_privileged).await?,
            filter,
        );

        let title = if is_privileged { "All Claims" } else { "My Claims" };
        ctx.say(format::claim_list(title, &claims)?).await?;
        Ok(())
    }

    /// Shows one claim in detail.
    #[poise::command(slash_command, prefix_command)]
    pub async fn claim(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Claim number"] id: i64,
    ) -> Result<()> {
        let author = author_profile(ctx).await?;
        let display = claim::get_claim(&ctx.data().database, &author.id, id).await?;
        ctx.say(format::claim_details(&display)?).await?;
        Ok(())
    }

    async fn review(
        ctx: poise::Context<'_, BotData, Error>,
        id: i64,
        decision: ReviewDecision,
    ) -> Result<()> {
        let data = ctx.data();
        let author = author_profile(ctx).await?;

        let reviewed =
            claim::review_claim(&data.database, data.policy, id, &author.id, decision).await?;

        let verb = match decision {
            ReviewDecision::Approved => "✅ Approved",
            ReviewDecision::Denied => "⛔ Denied",
        };
        ctx.say(format!(
            "{verb} claim `#{}` (${:.2} for <@{}>).",
            reviewed.id, reviewed.amount, reviewed.employee_id
        ))
        .await?;
        Ok(())
    }

    /// Approves a pending claim (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Claim number"] id: i64,
    ) -> Result<()> {
        review(ctx, id, ReviewDecision::Approved).await
    }

    /// Denies a pending claim (admins only).
    #[poise::command(slash_command, prefix_command)]
    pub async fn deny(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Claim number"] id: i64,
    ) -> Result<()> {
        review(ctx, id, ReviewDecision::Denied).await
    }

    /// Shows your dashboard.
    ///
    /// The claims view shows status counters and the latest claims. The reports
    /// view, available to admins, shows category totals for the last six months.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Panel to show (default: Claims)"] view: Option<DashboardView>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let author = author_profile(ctx).await?;
        let role = profile::role_of(&author);

        let title = match role {
            Role::Employee => "Employee",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        };
        let mut response = format!(
            "🏠 **{title} Dashboard** - {}\n\n",
            profile::display_name(&author)
        );

        match view.unwrap_or_default() {
            DashboardView::Claims => {
                let claims = claim::list_claims(db, &author.id, role.is_privileged()).await?;
                response.push_str(&format::status_summary(&claim::summarize_statuses(&claims)));
                response.push_str("\n\n");
                let title = if role.is_privileged() {
                    "Recent Claims"
                } else {
                    "My Recent Claims"
                };
                response.push_str(&format::claim_list(title, &claims)?);
            }
            DashboardView::Reports => {
                if !role.is_privileged() {
                    return Err(Error::unauthorized("view reports"));
                }
                let window = ReportWindow::last_six_months(chrono::Utc::now());
                let rows =
                    report::fetch_category_totals(db, window, None, data.reports.sort).await?;
                response.push_str(&format::report_table(&rows, &window.label(), None)?);
            }
        }

        ctx.say(response).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
