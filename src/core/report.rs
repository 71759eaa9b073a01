//! Report generation business logic.
//!
//! Aggregates claim amounts per category over a trailing window, optionally for a
//! single employee, and serializes the result as CSV. Amounts are summed as exact
//! decimals and rounded half away from zero to cents, so `100.00 + 50.005` reports
//! as `150.01`. All functions here are framework-agnostic; the bot layer only
//! formats what they return.

use crate::{
    core::profile::display_name,
    entities::{Category, Claim, category, claim, profile},
    errors::Result,
};
use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use sea_orm::{JoinType, QueryOrder, QuerySelect, RelationTrait, prelude::*};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::{collections::HashMap, str::FromStr};
use tracing::debug;

/// Metadata label used when a report covers every employee.
pub const ALL_EMPLOYEES: &str = "All Employees";

/// Months subtracted from "now" for the default report window.
const WINDOW_MONTHS_BACK: u32 = 5;

/// Row ordering for category totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSort {
    /// Largest total first, ties broken by category name
    #[default]
    TotalDesc,
    /// Alphabetical by category name
    CategoryName,
}

/// Inclusive time window a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// First instant included
    pub start: DateTime<Utc>,
    /// Last instant included
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window covering `[start, end]`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The default window, `[now - 5 months, now]`: six calendar months counting
    /// the current one. A day past the end of the earlier month clamps to its last day.
    #[must_use]
    pub fn last_six_months(now: DateTime<Utc>) -> Self {
        let start = now
            .checked_sub_months(Months::new(WINDOW_MONTHS_BACK))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// Whether `instant` falls inside the window (both ends inclusive).
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Human-readable range such as `"May 2026 - October 2026"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.start.format("%B %Y"), self.end.format("%B %Y"))
    }
}

/// Total claimed in one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Category being totalled
    pub category_id: i64,
    /// Display name of the category
    pub category_name: String,
    /// Sum of claim amounts, rounded to cents
    pub total_amount: Decimal,
}

/// Converts a stored amount to an exact decimal using its shortest round-trip form,
/// so `50.005_f64` becomes `50.005` rather than its binary expansion.
#[must_use]
pub fn amount_to_decimal(amount: f64) -> Decimal {
    Decimal::from_str(&amount.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(amount))
        .unwrap_or(Decimal::ZERO)
}

/// Rounds a total half away from zero to exactly two decimal places.
#[must_use]
pub fn round_total(total: Decimal) -> Decimal {
    let mut rounded = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Formats a total with exactly two decimals, e.g. `150.01` or `100.00`.
#[must_use]
pub fn format_total(total: Decimal) -> String {
    round_total(total).to_string()
}

/// Orders report rows in place.
pub fn sort_rows(rows: &mut [ReportRow], sort: ReportSort) {
    match sort {
        ReportSort::TotalDesc => rows.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.category_name.cmp(&b.category_name))
        }),
        ReportSort::CategoryName => rows.sort_by(|a, b| {
            a.category_name
                .cmp(&b.category_name)
                .then_with(|| a.category_id.cmp(&b.category_id))
        }),
    }
}

/// Groups `(category_id, category_name, amount)` entries into rounded, sorted rows.
fn fold_totals<I>(entries: I, sort: ReportSort) -> Vec<ReportRow>
where
    I: IntoIterator<Item = (i64, String, Decimal)>,
{
    let mut totals: HashMap<i64, ReportRow> = HashMap::new();
    for (category_id, category_name, amount) in entries {
        totals
            .entry(category_id)
            .or_insert_with(|| ReportRow {
                category_id,
                category_name,
                total_amount: Decimal::ZERO,
            })
            .total_amount += amount;
    }

    let mut rows: Vec<ReportRow> = totals
        .into_values()
        .map(|mut row| {
            row.total_amount = round_total(row.total_amount);
            row
        })
        .collect();
    sort_rows(&mut rows, sort);
    rows
}

/// Computes per-category totals over already loaded claims.
///
/// Claims outside `window`, belonging to another employee when `employee_filter` is
/// set, or without a known category are left out. The result does not depend on the
/// order of `claims`.
#[must_use]
pub fn compute_category_totals(
    claims: &[claim::Model],
    categories: &[category::Model],
    window: ReportWindow,
    employee_filter: Option<&str>,
    sort: ReportSort,
) -> Vec<ReportRow> {
    let names: HashMap<i64, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let entries = claims
        .iter()
        .filter(|c| window.contains(c.submitted_on))
        .filter(|c| employee_filter.is_none_or(|id| c.employee_id == id))
        .filter_map(|c| {
            let category_id = c.category_id?;
            let name = names.get(&category_id)?;
            Some((category_id, (*name).to_string(), amount_to_decimal(c.amount)))
        });

    fold_totals(entries, sort)
}

/// Loads claims and categories from the store and totals them in process.
pub async fn load_category_totals(
    db: &DatabaseConnection,
    window: ReportWindow,
    employee_filter: Option<&str>,
    sort: ReportSort,
) -> Result<Vec<ReportRow>> {
    let claims = Claim::find().all(db).await?;
    let categories = Category::find().all(db).await?;
    Ok(compute_category_totals(
        &claims,
        &categories,
        window,
        employee_filter,
        sort,
    ))
}

/// Reads a monetary value that may arrive as a JSON number or a numeric string.
#[must_use]
pub fn coerce_amount(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => n.as_f64().map(amount_to_decimal),
        JsonValue::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Store-side variant of [`load_category_totals`].
///
/// The window, employee filter and category join run inside the store; the
/// per-category fold is the same one [`compute_category_totals`] uses, so both paths
/// produce identical totals. String-typed amounts in the result set are coerced.
pub async fn fetch_category_totals(
    db: &DatabaseConnection,
    window: ReportWindow,
    employee_filter: Option<&str>,
    sort: ReportSort,
) -> Result<Vec<ReportRow>> {
    let mut query = Claim::find()
        .select_only()
        .column(claim::Column::CategoryId)
        .column_as(category::Column::Name, "category_name")
        .column(claim::Column::Amount)
        .join(JoinType::InnerJoin, claim::Relation::Category.def())
        .filter(claim::Column::SubmittedOn.gte(window.start))
        .filter(claim::Column::SubmittedOn.lte(window.end));
    if let Some(employee_id) = employee_filter {
        query = query.filter(claim::Column::EmployeeId.eq(employee_id));
    }

    let rows = query
        .order_by_asc(claim::Column::Id)
        .into_json()
        .all(db)
        .await?;
    debug!("Store returned {} claim rows for aggregation", rows.len());

    let entries = rows.iter().filter_map(|row| {
        let category_id = row.get("category_id")?.as_i64()?;
        let category_name = row.get("category_name")?.as_str()?.to_string();
        let amount = coerce_amount(row.get("amount")?)?;
        Some((category_id, category_name, amount))
    });

    Ok(fold_totals(entries, sort))
}

// Quotes one CSV field. Only text fields go through here; totals stay bare.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Serializes report rows as CSV.
///
/// Two metadata rows (date range and employee filter) precede the
/// `"Category Name","Total Amount"` header. Category names are quoted with embedded
/// quotes doubled; totals are unquoted with two decimals. Lines are joined with `\n`
/// and there is no trailing newline. An empty `rows` yields an empty string.
#[must_use]
pub fn to_csv(rows: &[ReportRow], date_range_label: &str, employee_label: Option<&str>) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(format!("{},{}", quote("Report Date Range:"), quote(date_range_label)));
    lines.push(format!(
        "{},{}",
        quote("Employee Filter:"),
        quote(employee_label.unwrap_or(ALL_EMPLOYEES))
    ));
    lines.push(format!("{},{}", quote("Category Name"), quote("Total Amount")));
    lines.extend(
        rows.iter()
            .map(|row| format!("{},{}", quote(&row.category_name), format_total(row.total_amount))),
    );

    lines.join("\n")
}

/// Label for the "Employee Filter:" metadata row of a filtered report.
#[must_use]
pub fn employee_label(employee: &profile::Model) -> String {
    display_name(employee)
}

fn filename_suffix(employee_id: Option<&str>) -> String {
    employee_id.map_or_else(String::new, |id| {
        format!("-{}", id.chars().take(8).collect::<String>())
    })
}

/// Name under which a report snapshot is stored:
/// `claims-report-<YYYY-MM-DD>[-<first 8 chars of employee id>].csv`.
#[must_use]
pub fn snapshot_filename(date: NaiveDate, employee_id: Option<&str>) -> String {
    format!(
        "claims-report-{}{}.csv",
        date.format("%Y-%m-%d"),
        filename_suffix(employee_id)
    )
}

/// Name offered for a direct download of live report data.
#[must_use]
pub fn live_csv_filename(date: NaiveDate, employee_id: Option<&str>) -> String {
    format!("live-{}", snapshot_filename(date, employee_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::profile::Role;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn row(id: i64, name: &str, cents: i64) -> ReportRow {
        ReportRow {
            category_id: id,
            category_name: name.to_string(),
            total_amount: Decimal::new(cents, 2),
        }
    }

    fn categories() -> Vec<category::Model> {
        vec![
            category_model(1, "Travel", true),
            category_model(2, "Medical", false),
        ]
    }

    #[test]
    fn test_default_window_subtracts_five_months() {
        let window = ReportWindow::last_six_months(at(2026, 10, 19));
        assert_eq!(window.start, at(2026, 5, 19));
        assert_eq!(window.end, at(2026, 10, 19));
        assert_eq!(window.label(), "May 2026 - October 2026");
    }

    #[test]
    fn test_default_window_crosses_year_and_clamps_day() {
        let window = ReportWindow::last_six_months(at(2026, 2, 28));
        assert_eq!(window.start, at(2025, 9, 28));
        assert_eq!(window.label(), "September 2025 - February 2026");

        let window = ReportWindow::last_six_months(at(2026, 7, 31));
        assert_eq!(window.start, at(2026, 2, 28));
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = ReportWindow::new(at(2026, 1, 1), at(2026, 1, 31));
        assert!(window.contains(at(2026, 1, 1)));
        assert!(window.contains(at(2026, 1, 31)));
        assert!(!window.contains(at(2025, 12, 31)));
        assert!(!window.contains(at(2026, 2, 1)));
    }

    #[test]
    fn test_rounding_at_half_cent_boundary() {
        let claims = vec![
            claim_model(1, "e1", Some(1), 100.00, at(2026, 3, 1)),
            claim_model(2, "e1", Some(1), 50.005, at(2026, 3, 2)),
        ];
        let window = ReportWindow::new(at(2026, 1, 1), at(2026, 12, 31));

        let rows = compute_category_totals(&claims, &categories(), window, None, ReportSort::TotalDesc);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_amount, Decimal::new(15001, 2));
        assert_eq!(format_total(rows[0].total_amount), "150.01");
    }

    #[test]
    fn test_totals_exclude_out_of_window_employee_and_unknown_categories() {
        let claims = vec![
            claim_model(1, "e1", Some(1), 10.0, at(2026, 3, 1)),
            claim_model(2, "e1", Some(1), 99.0, at(2025, 3, 1)),
            claim_model(3, "e2", Some(2), 5.0, at(2026, 3, 1)),
            claim_model(4, "e1", None, 7.0, at(2026, 3, 1)),
            claim_model(5, "e1", Some(2), 2.5, at(2026, 4, 1)),
            // Category id with no matching category
            claim_model(6, "e1", Some(99), 40.0, at(2026, 4, 1)),
        ];
        let window = ReportWindow::new(at(2026, 1, 1), at(2026, 12, 31));

        let all = compute_category_totals(&claims, &categories(), window, None, ReportSort::TotalDesc);
        assert_eq!(all, vec![row(1, "Travel", 1000), row(2, "Medical", 750)]);

        let only_e1 =
            compute_category_totals(&claims, &categories(), window, Some("e1"), ReportSort::TotalDesc);
        assert_eq!(only_e1, vec![row(1, "Travel", 1000), row(2, "Medical", 250)]);
    }

    #[test]
    fn test_totals_invariant_under_reordering() {
        let mut claims = vec![
            claim_model(1, "e1", Some(1), 0.1, at(2026, 3, 1)),
            claim_model(2, "e2", Some(2), 0.2, at(2026, 3, 2)),
            claim_model(3, "e1", Some(1), 0.7, at(2026, 3, 3)),
            claim_model(4, "e3", Some(2), 19.99, at(2026, 3, 4)),
            claim_model(5, "e2", Some(1), 3.333, at(2026, 3, 5)),
        ];
        let window = ReportWindow::new(at(2026, 1, 1), at(2026, 12, 31));
        let expected =
            compute_category_totals(&claims, &categories(), window, None, ReportSort::TotalDesc);

        claims.reverse();
        assert_eq!(
            compute_category_totals(&claims, &categories(), window, None, ReportSort::TotalDesc),
            expected
        );

        claims.swap(0, 3);
        claims.swap(1, 4);
        assert_eq!(
            compute_category_totals(&claims, &categories(), window, None, ReportSort::TotalDesc),
            expected
        );
    }

    #[test]
    fn test_sort_orders() {
        let mut rows = vec![
            row(1, "Travel", 500),
            row(2, "Equipment", 900),
            row(3, "Medical", 500),
        ];

        sort_rows(&mut rows, ReportSort::TotalDesc);
        let names: Vec<&str> = rows.iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(names, vec!["Equipment", "Medical", "Travel"]);

        sort_rows(&mut rows, ReportSort::CategoryName);
        let names: Vec<&str> = rows.iter().map(|r| r.category_name.as_str()).collect();
        assert_eq!(names, vec!["Equipment", "Medical", "Travel"]);

        rows[0].total_amount = Decimal::ZERO;
        sort_rows(&mut rows, ReportSort::TotalDesc);
        assert_eq!(rows[2].category_name, "Equipment");
    }

    #[test]
    fn test_csv_layout() {
        let rows = vec![row(1, "Travel", 15001), row(2, "Medical", 10000)];
        let csv = to_csv(&rows, "May 2026 - October 2026", None);

        assert_eq!(
            csv,
            "\"Report Date Range:\",\"May 2026 - October 2026\"\n\
             \"Employee Filter:\",\"All Employees\"\n\
             \"Category Name\",\"Total Amount\"\n\
             \"Travel\",150.01\n\
             \"Medical\",100.00"
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_csv_escapes_quotes_in_names_and_labels() {
        let rows = vec![row(1, "Bob's \"Travel\"", 4200)];
        let csv = to_csv(&rows, "range", Some("Ann \"Annie\" Lee"));

        assert!(csv.contains("\"Bob's \"\"Travel\"\"\",42.00"));
        assert!(csv.contains("\"Employee Filter:\",\"Ann \"\"Annie\"\" Lee\""));
    }

    #[test]
    fn test_csv_round_trips_through_a_csv_parser() {
        let rows = vec![
            row(1, "Bob's \"Travel\"", 15001),
            row(2, "Meals, snacks", 5),
            row(3, "Plain", 123_456),
        ];
        let csv = to_csv(&rows, "May 2026 - October 2026", Some("Ada Lovelace"));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(&records[0][1], "May 2026 - October 2026");
        assert_eq!(&records[1][1], "Ada Lovelace");
        assert_eq!(&records[2][0], "Category Name");

        let parsed: Vec<(String, Decimal)> = records[3..]
            .iter()
            .map(|r| (r[0].to_string(), Decimal::from_str(&r[1]).unwrap()))
            .collect();
        let expected: Vec<(String, Decimal)> = rows
            .iter()
            .map(|r| (r.category_name.clone(), r.total_amount))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_csv_empty_rows() {
        assert_eq!(to_csv(&[], "range", None), "");
    }

    #[test]
    fn test_snapshot_filenames() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(snapshot_filename(date, None), "claims-report-2026-10-19.csv");
        assert_eq!(
            snapshot_filename(date, Some("123456789012345678")),
            "claims-report-2026-10-19-12345678.csv"
        );
        assert_eq!(snapshot_filename(date, Some("42")), "claims-report-2026-10-19-42.csv");
        assert_eq!(live_csv_filename(date, None), "live-claims-report-2026-10-19.csv");
    }

    #[test]
    fn test_employee_label() {
        let mut ada = profile_model("1", "employee");
        ada.first_name = "Ada".to_string();
        ada.last_name = Some("Lovelace".to_string());
        assert_eq!(employee_label(&ada), "Ada Lovelace");

        ada.last_name = None;
        assert_eq!(employee_label(&ada), "Ada");
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(
            coerce_amount(&serde_json::json!("150.005")),
            Some(Decimal::new(150_005, 3))
        );
        assert_eq!(coerce_amount(&serde_json::json!(50.005)), Some(Decimal::new(50_005, 3)));
        assert_eq!(coerce_amount(&serde_json::json!(12)), Some(Decimal::new(12, 0)));
        assert_eq!(coerce_amount(&serde_json::json!("abc")), None);
        assert_eq!(coerce_amount(&serde_json::json!(null)), None);
    }

    #[tokio::test]
    async fn test_store_side_totals_match_in_process_totals() -> Result<()> {
        let (db, travel) = setup_with_travel_category().await?;
        let medical = create_test_category(&db, "Medical", false).await?;
        create_test_profile(&db, "other", Role::Employee).await?;

        insert_claim_at(&db, EMPLOYEE_ID, travel.id, 100.00, days_ago(10)).await?;
        insert_claim_at(&db, EMPLOYEE_ID, travel.id, 50.005, days_ago(20)).await?;
        insert_claim_at(&db, "other", medical.id, 19.99, days_ago(30)).await?;
        insert_claim_at(&db, "other", medical.id, 1000.0, days_ago(400)).await?;

        let window = ReportWindow::last_six_months(Utc::now());
        for employee in [None, Some(EMPLOYEE_ID), Some("other")] {
            let in_process = load_category_totals(&db, window, employee, ReportSort::TotalDesc).await?;
            let store_side = fetch_category_totals(&db, window, employee, ReportSort::TotalDesc).await?;
            assert_eq!(in_process, store_side);
        }

        let all = fetch_category_totals(&db, window, None, ReportSort::TotalDesc).await?;
        assert_eq!(
            all,
            vec![
                row(travel.id, "Travel", 15001),
                row(medical.id, "Medical", 1999),
            ]
        );
        Ok(())
    }
}
