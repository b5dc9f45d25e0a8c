//! Report aggregation: label/series pairs for the seven report types,
//! bucketed by reporting period where the type is time-based.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use stockwise_core::domain::order::SoldLine;
use stockwise_core::errors::{ApplicationError, DomainError};
use stockwise_core::scenarios::ScenarioKind;
use stockwise_db::{OrderRepository, ProductRepository};

use crate::persistence_error;

const DAILY_BUCKETS: i64 = 30;
const WEEKLY_BUCKETS: i64 = 12;
const MONTHLY_BUCKETS: i32 = 12;

/// Floor for the daily-sales denominator when a product has no recorded
/// sales in the window.
const MIN_DAILY_SALES: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| DomainError::UnknownPeriod { requested: value.to_string() })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<ReportDataset>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutput {
    Series(ReportSeries),
    Warning { message: String },
    Error { message: String },
}

/// Bucket label for one calendar date under a reporting period: the date
/// itself, its ISO week, or its calendar month.
fn label_for(period: ReportPeriod, date: NaiveDate) -> String {
    match period {
        ReportPeriod::Daily => date.format("%Y-%m-%d").to_string(),
        ReportPeriod::Weekly => {
            let iso = date.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        ReportPeriod::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
    }
}

fn months_back(year: i32, month: u32, back: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - back;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

/// The fixed label set for a period, oldest first. Always exactly N
/// buckets; gaps are later filled with zero.
fn period_labels(period: ReportPeriod, today: NaiveDate) -> Vec<String> {
    match period {
        ReportPeriod::Daily => (0..DAILY_BUCKETS)
            .rev()
            .map(|back| label_for(period, today - Duration::days(back)))
            .collect(),
        ReportPeriod::Weekly => (0..WEEKLY_BUCKETS)
            .rev()
            .map(|back| label_for(period, today - Duration::weeks(back)))
            .collect(),
        ReportPeriod::Monthly => (0..MONTHLY_BUCKETS)
            .rev()
            .map(|back| {
                let (year, month) = months_back(today.year(), today.month(), back);
                format!("{year:04}-{month:02}")
            })
            .collect(),
    }
}

/// First instant of the oldest bucket, so the read window covers every
/// bucket in full.
fn window_start(period: ReportPeriod, today: NaiveDate) -> DateTime<Utc> {
    let start_date = match period {
        ReportPeriod::Daily => today - Duration::days(DAILY_BUCKETS - 1),
        ReportPeriod::Weekly => {
            let oldest = today - Duration::weeks(WEEKLY_BUCKETS - 1);
            oldest - Duration::days(i64::from(oldest.weekday().num_days_from_monday()))
        }
        ReportPeriod::Monthly => {
            let (year, month) = months_back(today.year(), today.month(), MONTHLY_BUCKETS - 1);
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
        }
    };
    start_date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

fn bucketize(
    lines: &[SoldLine],
    labels: &[String],
    period: ReportPeriod,
    value: impl Fn(&SoldLine) -> f64,
) -> Vec<f64> {
    let index: HashMap<&str, usize> =
        labels.iter().enumerate().map(|(position, label)| (label.as_str(), position)).collect();

    let mut data = vec![0.0; labels.len()];
    for line in lines {
        let label = label_for(period, line.order_date.date_naive());
        if let Some(&position) = index.get(label.as_str()) {
            data[position] += value(line);
        }
    }
    data
}

pub struct ReportAggregator {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl ReportAggregator {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    /// Builds one report. The read path has no side effects: repeated calls
    /// against unchanged data return identical output.
    pub async fn generate_report(&self, report: &str, period: &str) -> ReportOutput {
        let kind = match report.parse::<ScenarioKind>() {
            Ok(kind) => kind,
            Err(_) => {
                return ReportOutput::Error {
                    message: DomainError::UnknownReport { requested: report.to_string() }
                        .to_string(),
                }
            }
        };
        let period = match period.parse::<ReportPeriod>() {
            Ok(period) => period,
            Err(error) => return ReportOutput::Error { message: error.to_string() },
        };

        match self.build(kind, period).await {
            Ok(output) => output,
            Err(error) => {
                tracing::error!(report = kind.as_str(), error = %error, "report failed");
                ReportOutput::Error { message: error.user_message() }
            }
        }
    }

    async fn build(
        &self,
        kind: ScenarioKind,
        period: ReportPeriod,
    ) -> Result<ReportOutput, ApplicationError> {
        match kind {
            ScenarioKind::Seasonal => {
                self.bucketed_series(period, "Units Sold", |line| line.quantity as f64).await
            }
            ScenarioKind::Sales => {
                self.bucketed_series(period, "Sales", |line| {
                    line.revenue().to_f64().unwrap_or(0.0)
                })
                .await
            }
            ScenarioKind::Stockout => self.stockout_report().await,
            ScenarioKind::Pricing => self.pricing_report().await,
            ScenarioKind::Reordering => self.reordering_report().await,
            ScenarioKind::Expiry => self.expiry_report().await,
            ScenarioKind::Restructure => self.restructure_report().await,
        }
    }

    async fn bucketed_series(
        &self,
        period: ReportPeriod,
        dataset_label: &str,
        value: impl Fn(&SoldLine) -> f64,
    ) -> Result<ReportOutput, ApplicationError> {
        let today = Utc::now().date_naive();
        let labels = period_labels(period, today);
        let since = window_start(period, today);

        let lines = self.orders.sold_lines_since(since).await.map_err(persistence_error)?;
        let data = bucketize(&lines, &labels, period, value);

        Ok(ReportOutput::Series(ReportSeries {
            labels,
            datasets: vec![ReportDataset { label: dataset_label.to_string(), data }],
        }))
    }

    /// Days of stock left per product, from real sales over the last 30
    /// days with a 0.1/day floor when the window is empty.
    async fn stockout_report(&self) -> Result<ReportOutput, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;
        let since = Utc::now() - Duration::days(DAILY_BUCKETS);
        let units_sold = self.orders.units_sold_since(since).await.map_err(persistence_error)?;

        let mut labels = Vec::with_capacity(products.len());
        let mut data = Vec::with_capacity(products.len());
        for product in &products {
            let sold = units_sold.get(&product.id).copied().unwrap_or(0);
            let daily = if sold > 0 { sold as f64 / DAILY_BUCKETS as f64 } else { MIN_DAILY_SALES };
            let days_left = (product.quantity as f64 / daily * 10.0).round() / 10.0;
            labels.push(product.name.clone());
            data.push(days_left);
        }

        Ok(ReportOutput::Series(ReportSeries {
            labels,
            datasets: vec![ReportDataset { label: "Days of Stock Left".to_string(), data }],
        }))
    }

    /// Current price against all-time units sold, one point per product.
    async fn pricing_report(&self) -> Result<ReportOutput, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;
        let units_sold = self
            .orders
            .units_sold_since(DateTime::<Utc>::UNIX_EPOCH)
            .await
            .map_err(persistence_error)?;

        let labels: Vec<String> = products.iter().map(|product| product.name.clone()).collect();
        let prices: Vec<f64> =
            products.iter().map(|product| product.price.to_f64().unwrap_or(0.0)).collect();
        let sold: Vec<f64> = products
            .iter()
            .map(|product| units_sold.get(&product.id).copied().unwrap_or(0) as f64)
            .collect();

        Ok(ReportOutput::Series(ReportSeries {
            labels,
            datasets: vec![
                ReportDataset { label: "Price".to_string(), data: prices },
                ReportDataset { label: "Units Sold".to_string(), data: sold },
            ],
        }))
    }

    /// Products at or below their reorder level.
    async fn reordering_report(&self) -> Result<ReportOutput, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;
        let below: Vec<_> = products.iter().filter(|product| product.is_low_stock()).collect();

        Ok(ReportOutput::Series(ReportSeries {
            labels: below.iter().map(|product| product.name.clone()).collect(),
            datasets: vec![ReportDataset {
                label: "Quantity".to_string(),
                data: below.iter().map(|product| product.quantity as f64).collect(),
            }],
        }))
    }

    /// Days to expiry per product, or a warning when the catalog carries no
    /// expiry dates at all.
    async fn expiry_report(&self) -> Result<ReportOutput, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;
        let today = Utc::now().date_naive();

        let dated: Vec<_> = products
            .iter()
            .filter_map(|product| product.expiry_date.map(|date| (product, date)))
            .collect();
        if dated.is_empty() {
            return Ok(ReportOutput::Warning {
                message:
                    "No expiry data available. Add expiry dates to products to enable this report."
                        .to_string(),
            });
        }

        Ok(ReportOutput::Series(ReportSeries {
            labels: dated.iter().map(|(product, _)| product.name.clone()).collect(),
            datasets: vec![ReportDataset {
                label: "Days to Expiry".to_string(),
                data: dated
                    .iter()
                    .map(|(_, date)| (*date - today).num_days() as f64)
                    .collect(),
            }],
        }))
    }

    /// Stock allocation by category.
    async fn restructure_report(&self) -> Result<ReportOutput, ApplicationError> {
        let products = self.products.list().await.map_err(persistence_error)?;

        let mut by_category: BTreeMap<String, i64> = BTreeMap::new();
        for product in &products {
            *by_category.entry(product.category.clone()).or_insert(0) += product.quantity;
        }

        Ok(ReportOutput::Series(ReportSeries {
            labels: by_category.keys().cloned().collect(),
            datasets: vec![ReportDataset {
                label: "Stock Allocation".to_string(),
                data: by_category.values().map(|quantity| *quantity as f64).collect(),
            }],
        }))
    }
}
