//! Read-only reporting over training packages.
//!
//! The repository layer fetches raw rows (sales entries, flattened training
//! labels, package training types, client profiles) and the functions here
//! derive the report payloads. Nothing in this module mutates state.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Placeholder reported for categories without matching clients.
pub const NOT_AVAILABLE: &str = "N/A";

/// Average year length used for age computation.
const DAYS_PER_YEAR: f64 = 365.25;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// Start instants of the today / this-month / this-year sales windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindows {
    pub today: Timestamp,
    pub month: Timestamp,
    pub year: Timestamp,
}

impl SalesWindows {
    /// Windows anchored on calendar boundaries in `now`'s time zone.
    ///
    /// The server passes `chrono::Local::now()`, so "today" is the local
    /// calendar day of the server.
    pub fn starting_from<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let date = now.date_naive();
        let first_of_month = date.with_day(1).unwrap_or(date);
        let first_of_year = date.with_ordinal(1).unwrap_or(date);

        Self {
            today: local_midnight(&tz, date),
            month: local_midnight(&tz, first_of_month),
            year: local_midnight(&tz, first_of_year),
        }
    }
}

/// Midnight of `date` in `tz`, as UTC.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Timestamp {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Summed package totals per window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub today_sales: f64,
    pub monthly_sales: f64,
    pub yearly_sales: f64,
}

/// Raw rows per window, returned by the debug projection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesBuckets<T: Serialize> {
    pub today_sales_records: Vec<T>,
    pub monthly_sales_records: Vec<T>,
    pub yearly_sales_records: Vec<T>,
}

/// Sum `total` over the rows created within each window.
///
/// `entry` extracts `(created_at, total)` from a row.
pub fn sales_totals<T>(
    rows: &[T],
    windows: &SalesWindows,
    entry: impl Fn(&T) -> (Timestamp, f64),
) -> SalesTotals {
    let mut totals = SalesTotals {
        today_sales: 0.0,
        monthly_sales: 0.0,
        yearly_sales: 0.0,
    };
    for row in rows {
        let (created_at, total) = entry(row);
        if created_at >= windows.today {
            totals.today_sales += total;
        }
        if created_at >= windows.month {
            totals.monthly_sales += total;
        }
        if created_at >= windows.year {
            totals.yearly_sales += total;
        }
    }
    totals
}

/// Same window filter as [`sales_totals`], projecting the matched rows.
pub fn sales_buckets<T: Clone + Serialize>(
    rows: &[T],
    windows: &SalesWindows,
    created_at: impl Fn(&T) -> Timestamp,
) -> SalesBuckets<T> {
    let since = |start: Timestamp| -> Vec<T> {
        rows.iter()
            .filter(|r| created_at(r) >= start)
            .cloned()
            .collect()
    };
    SalesBuckets {
        today_sales_records: since(windows.today),
        monthly_sales_records: since(windows.month),
        yearly_sales_records: since(windows.year),
    }
}

// ---------------------------------------------------------------------------
// Training usage
// ---------------------------------------------------------------------------

/// Occurrence count of one training label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub training: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingUsageStats {
    pub most_used: LabelCount,
    pub least_used: LabelCount,
    pub ranked: Vec<LabelCount>,
}

/// Count labels in first-seen order, then stable-sort by count descending.
fn rank<I>(labels: I) -> Vec<LabelCount>
where
    I: IntoIterator<Item = String>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<LabelCount> = Vec::new();

    for label in labels {
        match positions.get(&label) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                positions.insert(label.clone(), counts.len());
                counts.push(LabelCount {
                    training: label,
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Rank training labels flattened across every session of every package.
///
/// Ties keep first-seen order, so the most-used entry is the first label to
/// reach the top count and the least-used entry is the last label ranked.
pub fn training_usage<I>(labels: I) -> Result<TrainingUsageStats, CoreError>
where
    I: IntoIterator<Item = String>,
{
    let ranked = rank(labels);

    let (Some(most_used), Some(least_used)) = (ranked.first().cloned(), ranked.last().cloned())
    else {
        return Err(CoreError::NoData(
            "No training usage recorded for the selected packages".to_string(),
        ));
    };

    Ok(TrainingUsageStats {
        most_used,
        least_used,
        ranked,
    })
}

// ---------------------------------------------------------------------------
// Training types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingTypeCount {
    pub training_type: String,
    pub count: i64,
}

/// Count packages per training type; missing or blank types are skipped.
pub fn training_type_counts<I>(types: I) -> Vec<TrainingTypeCount>
where
    I: IntoIterator<Item = Option<String>>,
{
    rank(
        types
            .into_iter()
            .flatten()
            .filter(|t| !t.trim().is_empty()),
    )
    .into_iter()
    .map(|c| TrainingTypeCount {
        training_type: c.training,
        count: c.count,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Demographics
// ---------------------------------------------------------------------------

/// Closed set of training categories covered by the demographics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingCategory {
    Health,
    Shape,
    Sports,
    Strength,
}

impl TrainingCategory {
    /// Report order.
    pub const ALL: [TrainingCategory; 4] = [
        TrainingCategory::Health,
        TrainingCategory::Shape,
        TrainingCategory::Sports,
        TrainingCategory::Strength,
    ];

    /// Label matched against `training_packages.training_type`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Shape => "Shape",
            Self::Sports => "Sports",
            Self::Strength => "Strength",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Client fields joined onto a package for the demographics report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub user_id: DbId,
    pub name: String,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicUser {
    pub id: DbId,
    pub name: String,
    pub gender: Option<String>,
    pub age: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDemographics {
    pub training_type: String,
    pub top_gender: String,
    pub gender_count: i64,
    pub male: i64,
    pub female: i64,
    pub average_age_bracket: String,
    pub users: Vec<DemographicUser>,
}

impl CategoryDemographics {
    fn empty(category: TrainingCategory) -> Self {
        Self {
            training_type: category.label().to_string(),
            top_gender: NOT_AVAILABLE.to_string(),
            gender_count: 0,
            male: 0,
            female: 0,
            average_age_bracket: NOT_AVAILABLE.to_string(),
            users: Vec::new(),
        }
    }
}

/// Whole years between `birth_date` and `now`, using 365.25-day years.
///
/// The birth date is taken as midnight UTC.
pub fn age_at(birth_date: NaiveDate, now: Timestamp) -> i64 {
    let born = birth_date.and_time(NaiveTime::MIN).and_utc();
    let millis = (now - born).num_milliseconds() as f64;
    (millis / (DAYS_PER_YEAR * MILLIS_PER_DAY)).floor() as i64
}

/// Age bracket label for a mean age.
pub fn age_bracket(mean_age: f64) -> &'static str {
    if mean_age <= 25.0 {
        "25 & below"
    } else if mean_age <= 35.0 {
        "26-35"
    } else if mean_age <= 45.0 {
        "36-45"
    } else if mean_age <= 60.0 {
        "46-60"
    } else {
        "Above 60"
    }
}

/// Build the per-category demographics report.
///
/// `rows` pairs a package's training type with its client. Each client is
/// counted once per category. Every category in [`TrainingCategory::ALL`]
/// is present in the output, in that order; categories without clients
/// carry neutral defaults. Ties between genders report `"Male"`.
pub fn training_demographics(
    rows: &[(String, ClientProfile)],
    now: Timestamp,
) -> Vec<CategoryDemographics> {
    TrainingCategory::ALL
        .into_iter()
        .map(|category| {
            let mut clients: Vec<&ClientProfile> = Vec::new();
            for (training_type, client) in rows {
                if TrainingCategory::from_label(training_type) == Some(category)
                    && !clients.iter().any(|c| c.user_id == client.user_id)
                {
                    clients.push(client);
                }
            }
            summarize(category, &clients, now)
        })
        .collect()
}

fn has_gender(client: &ClientProfile, gender: &str) -> bool {
    client
        .gender
        .as_deref()
        .is_some_and(|g| g.eq_ignore_ascii_case(gender))
}

fn summarize(
    category: TrainingCategory,
    clients: &[&ClientProfile],
    now: Timestamp,
) -> CategoryDemographics {
    if clients.is_empty() {
        return CategoryDemographics::empty(category);
    }

    let male = clients.iter().filter(|c| has_gender(c, "male")).count() as i64;
    let female = clients.iter().filter(|c| has_gender(c, "female")).count() as i64;

    let (top_gender, gender_count) = match (male, female) {
        (0, 0) => (NOT_AVAILABLE.to_string(), 0),
        (m, f) if m >= f => ("Male".to_string(), m),
        (_, f) => ("Female".to_string(), f),
    };

    let users: Vec<DemographicUser> = clients
        .iter()
        .map(|c| DemographicUser {
            id: c.user_id,
            name: c.name.clone(),
            gender: c.gender.clone(),
            age: c.birth_date.map(|b| age_at(b, now)),
        })
        .collect();

    let ages: Vec<i64> = users.iter().filter_map(|u| u.age).collect();
    let average_age_bracket = if ages.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        let mean = ages.iter().sum::<i64>() as f64 / ages.len() as f64;
        age_bracket(mean).to_string()
    };

    CategoryDemographics {
        training_type: category.label().to_string(),
        top_gender,
        gender_count,
        male,
        female,
        average_age_bracket,
        users,
    }
}
