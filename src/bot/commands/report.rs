//! Report Discord commands - category totals, CSV export and saved snapshots.
//!
//! All report commands are limited to admins. Reports cover the last six months
//! and can be narrowed to a single employee.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, author_profile, commands::format, handlers::autocomplete},
        core::{
            profile,
            report::{self, ReportRow, ReportWindow},
            snapshot,
        },
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Category totals for the current window, plus the labels that describe them.
    struct LiveReport {
        rows: Vec<ReportRow>,
        window: ReportWindow,
        employee_id: Option<String>,
        employee_label: Option<String>,
    }

    impl LiveReport {
        fn csv(&self) -> String {
            report::to_csv(
                &self.rows,
                &self.window.label(),
                self.employee_label.as_deref(),
            )
        }
    }

    async fn live_report(
        ctx: poise::Context<'_, BotData, Error>,
        employee: Option<serenity::User>,
    ) -> Result<LiveReport> {
        let data = ctx.data();
        let db = &data.database;
        let author = author_profile(ctx).await?;
        profile::require_privileged(db, &author.id, "view reports").await?;

        let employee_id = employee.as_ref().map(|user| user.id.to_string());
        let employee_label = match &employee {
            Some(user) => Some(
                profile::get_profile(db, &user.id.to_string())
                    .await?
                    .map_or_else(|| user.name.clone(), |p| report::employee_label(&p)),
            ),
            None => None,
        };

        let window = ReportWindow::last_six_months(Utc::now());
        let rows =
            report::fetch_category_totals(db, window, employee_id.as_deref(), data.reports.sort)
                .await?;

        Ok(LiveReport {
            rows,
            window,
            employee_id,
            employee_label,
        })
    }

    /// Shows claim totals per category for the last six months.
    #[poise::command(slash_command, prefix_command)]
    pub async fn report(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only include this employee's claims"] employee: Option<serenity::User>,
    ) -> Result<()> {
        let live = live_report(ctx, employee).await?;
        ctx.say(format::report_table(
            &live.rows,
            &live.window.label(),
            live.employee_label.as_deref(),
        )?)
        .await?;
        Ok(())
    }

    /// Downloads the current report as a CSV file.
    #[poise::command(slash_command, prefix_command)]
    pub async fn report_csv(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only include this employee's claims"] employee: Option<serenity::User>,
    ) -> Result<()> {
        let live = live_report(ctx, employee).await?;
        let csv = live.csv();
        if csv.is_empty() {
            ctx.say("📊 No report data available for this period.").await?;
            return Ok(());
        }

        let filename =
            report::live_csv_filename(Utc::now().date_naive(), live.employee_id.as_deref());
        ctx.send(
            poise::CreateReply::default()
                .content(format!("📎 `{filename}`"))
                .attachment(serenity::CreateAttachment::bytes(csv.into_bytes(), filename)),
        )
        .await?;
        Ok(())
    }

    /// Saves the current report as a snapshot for later download.
    #[poise::command(slash_command, prefix_command)]
    pub async fn save_report(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only include this employee's claims"] employee: Option<serenity::User>,
    ) -> Result<()> {
        let live = live_report(ctx, employee).await?;
        let filename =
            report::snapshot_filename(Utc::now().date_naive(), live.employee_id.as_deref());

        snapshot::save_snapshot(&ctx.data().store, &filename, &live.csv()).await?;
        info!("{} saved report snapshot {filename}", ctx.author().id);

        ctx.say(format!("💾 Saved report as `{filename}`.")).await?;
        Ok(())
    }

    /// Lists saved report snapshots, newest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn saved_reports(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let author = author_profile(ctx).await?;
        profile::require_privileged(&ctx.data().database, &author.id, "view reports").await?;

        let snapshots = snapshot::list_snapshots(&ctx.data().store).await?;
        ctx.say(format::snapshot_list(&snapshots)?).await?;
        Ok(())
    }

    /// Downloads a saved report snapshot.
    #[poise::command(slash_command, prefix_command)]
    pub async fn download_report(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Snapshot file name"]
        #[autocomplete = "autocomplete::autocomplete_snapshot_name"]
        name: String,
    ) -> Result<()> {
        let author = author_profile(ctx).await?;
        profile::require_privileged(&ctx.data().database, &author.id, "view reports").await?;

        let csv = snapshot::download_snapshot(&ctx.data().store, &name).await?;
        ctx.send(
            poise::CreateReply::default()
                .content(format!("📎 `{name}`"))
                .attachment(serenity::CreateAttachment::bytes(csv.into_bytes(), name.clone())),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
