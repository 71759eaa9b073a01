//! Message formatting shared by the claim, report and admin commands.
//!
//! Everything here is plain string building so it can be tested without Discord.
//! Every list builder stays inside [`LIST_BUDGET`] characters, whatever the stored
//! text looks like.

use crate::{
    core::{
        claim::{ClaimDisplay, ClaimStatus, StatusSummary},
        profile,
        report::{ALL_EMPLOYEES, ReportRow, format_total},
        snapshot::StoredObject,
    },
    entities::{category, profile as profile_entity},
    errors::Result,
};
use std::fmt::Write;

/// Discord rejects message content longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Budget for one list reply. The rest of [`MESSAGE_LIMIT`] is left for a header
/// such as the dashboard's.
pub const LIST_BUDGET: usize = MESSAGE_LIMIT - 250;

/// Most entries shown in one list.
pub const MAX_LISTED: usize = 15;

/// Descriptions longer than this are cut in list views.
pub const MAX_DESCRIPTION_CHARS: usize = 50;

/// Names longer than this are cut in lists and tables.
pub const MAX_NAME_CHARS: usize = 40;

// Room kept for the "...and N more" footer.
const FOOTER_ROOM: usize = 32;

/// Cuts `text` to at most `max_chars` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Appends up to `max_lines` of `lines`, then `suffix`, then a count of what was left out.
///
/// Lines stop early once the next one would push `response` past [`LIST_BUDGET`].
fn push_capped(
    response: &mut String,
    lines: &[String],
    max_lines: usize,
    suffix: &str,
) -> Result<()> {
    let mut used = response.chars().count() + suffix.chars().count() + FOOTER_ROOM;
    let mut shown = 0;
    for line in lines.iter().take(max_lines) {
        let cost = line.chars().count() + 1;
        if used + cost > LIST_BUDGET {
            break;
        }
        writeln!(response, "{line}")?;
        used += cost;
        shown += 1;
    }
    response.push_str(suffix);
    if shown < lines.len() {
        write!(response, "_...and {} more_", lines.len() - shown)?;
    }
    Ok(())
}

/// Emoji shown next to a claim status.
#[must_use]
pub fn status_icon(status: &str) -> &'static str {
    match status.parse::<ClaimStatus>() {
        Ok(ClaimStatus::Pending) => "🕒",
        Ok(ClaimStatus::Approved) => "✅",
        Ok(ClaimStatus::Denied) => "⛔",
        Err(_) => "❔",
    }
}

/// One-line summary of a claim for list views.
#[must_use]
pub fn claim_line(display: &ClaimDisplay) -> String {
    let claim = &display.claim;
    let who = display
        .employee_email
        .as_deref()
        .filter(|email| !email.is_empty())
        .map_or_else(
            || format!(" <@{}>", claim.employee_id),
            |email| format!(" {}", truncate(email, MAX_NAME_CHARS)),
        );
    format!(
        "{} `#{}` **${:.2}** {}{} - {} ({})",
        status_icon(&claim.status),
        claim.id,
        claim.amount,
        truncate(
            display.category_name.as_deref().unwrap_or("Uncategorized"),
            MAX_NAME_CHARS
        ),
        who,
        truncate(&claim.description, MAX_DESCRIPTION_CHARS),
        claim.submitted_on.format("%Y-%m-%d"),
    )
}

/// Bulleted claim list, capped at [`MAX_LISTED`] entries.
pub fn claim_list(title: &str, claims: &[ClaimDisplay]) -> Result<String> {
    let mut response = format!("📋 **{title}**\n\n");
    if claims.is_empty() {
        response.push_str("_No claims found_");
        return Ok(response);
    }

    let lines: Vec<String> = claims.iter().map(claim_line).collect();
    push_capped(&mut response, &lines, MAX_LISTED, "")?;
    Ok(response)
}

/// Full detail view of a single claim.
pub fn claim_details(display: &ClaimDisplay) -> Result<String> {
    let claim = &display.claim;
    let mut response = format!(
        "{} **Claim #{}** ({})\n\n",
        status_icon(&claim.status),
        claim.id,
        claim.status
    );
    writeln!(&mut response, "👤 Employee: <@{}>", claim.employee_id)?;
    if let Some(email) = display.employee_email.as_deref().filter(|e| !e.is_empty()) {
        writeln!(&mut response, "📧 Email: {}", truncate(email, MAX_NAME_CHARS * 2))?;
    }
    writeln!(
        &mut response,
        "📂 Category: {}",
        display.category_name.as_deref().unwrap_or("Uncategorized")
    )?;
    writeln!(&mut response, "💰 Amount: ${:.2}", claim.amount)?;
    writeln!(
        &mut response,
        "📝 Description: {}",
        truncate(&claim.description, MESSAGE_LIMIT / 2)
    )?;
    writeln!(
        &mut response,
        "📅 Submitted: {}",
        claim.submitted_on.format("%Y-%m-%d %H:%M UTC")
    )?;

    if let Some(mileage) = claim.mileage {
        writeln!(&mut response, "🚗 Mileage: {mileage:.1}")?;
    }
    if let (Some(from), Some(to)) = (&claim.start_location, &claim.end_location) {
        writeln!(
            &mut response,
            "📍 Route: {} → {}",
            truncate(from, MAX_NAME_CHARS * 2),
            truncate(to, MAX_NAME_CHARS * 2)
        )?;
    }
    if let Some(receipt) = &claim.receipt_url {
        writeln!(&mut response, "🧾 Receipt: {}", truncate(receipt, MAX_NAME_CHARS * 5))?;
    }
    if let Some(submitted_by) = claim
        .submitted_by
        .as_deref()
        .filter(|by| *by != claim.employee_id)
    {
        writeln!(&mut response, "✍️ Submitted by: <@{submitted_by}>")?;
    }
    if let (Some(reviewer), Some(reviewed_on)) = (&claim.reviewed_by, claim.reviewed_on) {
        writeln!(
            &mut response,
            "🔎 Reviewed by <@{reviewer}> on {}",
            reviewed_on.format("%Y-%m-%d %H:%M UTC")
        )?;
    }
    Ok(response)
}

/// Dashboard counters.
#[must_use]
pub fn status_summary(summary: &StatusSummary) -> String {
    format!(
        "**Total:** {} | ✅ **Approved:** {} | 🕒 **Pending:** {} | ⛔ **Denied:** {}",
        summary.total, summary.approved, summary.pending, summary.denied
    )
}

/// Category totals as a text table.
pub fn report_table(
    rows: &[ReportRow],
    date_range_label: &str,
    employee_label: Option<&str>,
) -> Result<String> {
    let mut response = String::from("📊 **Claims by Category**\n");
    writeln!(&mut response, "Period: {date_range_label}")?;
    writeln!(
        &mut response,
        "Employee: {}\n",
        truncate(employee_label.unwrap_or(ALL_EMPLOYEES), MAX_NAME_CHARS)
    )?;

    if rows.is_empty() {
        response.push_str("_No claims in this period_");
        return Ok(response);
    }

    let names: Vec<String> = rows
        .iter()
        .map(|row| truncate(&row.category_name, MAX_NAME_CHARS))
        .collect();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    let lines: Vec<String> = names
        .iter()
        .zip(rows)
        .map(|(name, row)| format!("{name:<width$}  {:>12}", format_total(row.total_amount)))
        .collect();

    response.push_str("```\n");
    push_capped(&mut response, &lines, rows.len(), "```\n")?;
    Ok(response.trim_end().to_string())
}

/// Saved snapshots, newest first.
pub fn snapshot_list(snapshots: &[StoredObject]) -> Result<String> {
    let mut response = String::from("🗂️ **Saved Reports**\n\n");
    if snapshots.is_empty() {
        response.push_str("_No saved reports yet. Use `/save_report` to create one._");
        return Ok(response);
    }

    let lines: Vec<String> = snapshots
        .iter()
        .map(|snapshot| {
            format!(
                "• `{}` - {} ({} bytes)",
                snapshot.name,
                snapshot.updated_at.format("%Y-%m-%d %H:%M UTC"),
                snapshot.size
            )
        })
        .collect();
    push_capped(&mut response, &lines, MAX_LISTED * 2, "")?;
    Ok(response)
}

/// Expense categories, marking the ones that track mileage.
pub fn category_list(categories: &[category::Model]) -> Result<String> {
    let mut response = String::from("📂 **Expense Categories**\n\n");
    let lines: Vec<String> = categories
        .iter()
        .map(|cat| {
            let mileage = if cat.requires_mileage { " 🚗 (mileage)" } else { "" };
            format!("• **{}**{mileage}", truncate(&cat.name, MAX_NAME_CHARS))
        })
        .collect();
    push_capped(&mut response, &lines, lines.len(), "")?;
    Ok(response)
}

/// Profiles with their mention, role and email.
pub fn profile_list(profiles: &[profile_entity::Model]) -> Result<String> {
    let mut response = String::from("👥 **Profiles**\n\n");
    let lines: Vec<String> = profiles
        .iter()
        .map(|p| {
            let email = if p.email.is_empty() {
                "no email".to_string()
            } else {
                truncate(&p.email, MAX_NAME_CHARS)
            };
            format!(
                "• **{}** <@{}> - {} ({email})",
                truncate(&profile::display_name(p), MAX_NAME_CHARS),
                p.id,
                profile::role_of(p)
            )
        })
        .collect();
    push_capped(&mut response, &lines, MAX_LISTED * 2, "")?;
    Ok(response)
}
