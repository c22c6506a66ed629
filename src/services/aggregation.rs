//! Read-only statistics over a snapshot of bookings.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::db::queries::PlatformTotals;
use crate::models::{Booking, BookingStatus};

/// Number of most recent months kept in the revenue series.
pub const REVENUE_MONTHS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Revenue of confirmed and completed bookings bucketed by the month they
/// were created in, oldest first, limited to the last [`REVENUE_MONTHS`]
/// months that have any revenue.
pub fn monthly_revenue(bookings: &[Booking]) -> Vec<MonthlyRevenue> {
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for booking in bookings.iter().filter(|b| b.status.is_billable()) {
        let key = (booking.created_at.year(), booking.created_at.month());
        *buckets.entry(key).or_insert(0.0) += booking.total_price;
    }

    let skip = buckets.len().saturating_sub(REVENUE_MONTHS);
    buckets
        .into_iter()
        .skip(skip)
        .map(|((year, month), total)| MonthlyRevenue { year, month, total })
        .collect()
}

/// Value the chart bars are scaled against. Never below 1.
pub fn revenue_scale(series: &[MonthlyRevenue]) -> f64 {
    series.iter().map(|m| m.total).fold(1.0, f64::max)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusDistribution {
    pub pending: u64,
    pub confirmed: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl StatusDistribution {
    pub fn total(&self) -> u64 {
        self.pending + self.confirmed + self.completed + self.cancelled
    }

    pub fn count(&self, status: &BookingStatus) -> u64 {
        match status {
            BookingStatus::Pending => self.pending,
            BookingStatus::Confirmed => self.confirmed,
            BookingStatus::Completed => self.completed,
            BookingStatus::Cancelled => self.cancelled,
            BookingStatus::Unrecognized(_) => 0,
        }
    }

    /// Share of `status` in percent, rounded to one decimal.
    pub fn percentage(&self, status: &BookingStatus) -> f64 {
        let total = self.total().max(1) as f64;
        round_to(100.0 * self.count(status) as f64 / total, 1)
    }

    pub fn percentages(&self) -> StatusPercentages {
        StatusPercentages {
            pending: self.percentage(&BookingStatus::Pending),
            confirmed: self.percentage(&BookingStatus::Confirmed),
            completed: self.percentage(&BookingStatus::Completed),
            cancelled: self.percentage(&BookingStatus::Cancelled),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusPercentages {
    pub pending: f64,
    pub confirmed: f64,
    pub completed: f64,
    pub cancelled: f64,
}

/// Bookings per known status. Unrecognized statuses are not counted.
pub fn status_distribution(bookings: &[Booking]) -> StatusDistribution {
    let mut dist = StatusDistribution::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Pending => dist.pending += 1,
            BookingStatus::Confirmed => dist.confirmed += 1,
            BookingStatus::Completed => dist.completed += 1,
            BookingStatus::Cancelled => dist.cancelled += 1,
            BookingStatus::Unrecognized(_) => {}
        }
    }
    dist
}

/// Headline ratios, as whole percentages (or whole currency units for the
/// average). A zero denominator yields 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub confirmation_rate: f64,
    pub cancellation_rate: f64,
    pub average_revenue_per_booking: f64,
    pub active_user_rate: f64,
}

pub fn key_metrics(dist: &StatusDistribution, totals: &PlatformTotals) -> KeyMetrics {
    let dist_total = dist.total() as f64;

    KeyMetrics {
        confirmation_rate: percent(
            (dist.confirmed + dist.completed) as f64,
            dist_total,
        ),
        cancellation_rate: percent(dist.cancelled as f64, dist_total),
        average_revenue_per_booking: ratio(totals.total_revenue, totals.total_bookings as f64)
            .round(),
        active_user_rate: percent(dist_total, totals.total_users as f64),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub revenue_scale: f64,
    pub distribution: StatusDistribution,
    pub distribution_total: u64,
    pub percentages: StatusPercentages,
    pub metrics: KeyMetrics,
}

pub fn build_report(bookings: &[Booking], totals: &PlatformTotals) -> StatsReport {
    let monthly = monthly_revenue(bookings);
    let distribution = status_distribution(bookings);

    StatsReport {
        revenue_scale: revenue_scale(&monthly),
        monthly_revenue: monthly,
        distribution_total: distribution.total(),
        percentages: distribution.percentages(),
        metrics: key_metrics(&distribution, totals),
        distribution,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn percent(numerator: f64, denominator: f64) -> f64 {
    (ratio(numerator, denominator) * 100.0).round()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn booking(status: &str, total: f64, created: &str) -> Booking {
        let created_at =
            NaiveDateTime::parse_from_str(&format!("{created} 12:00:00"), "%Y-%m-%d %H:%M:%S")
                .unwrap();
        Booking {
            id: format!("b-{created}-{status}-{total}"),
            user_id: "u-1".to_string(),
            hotel_id: "h-1".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            total_price: total,
            status: BookingStatus::parse(status),
            created_at,
            updated_at: created_at,
        }
    }

    fn with_statuses(counts: &[(&str, usize)]) -> Vec<Booking> {
        counts
            .iter()
            .flat_map(|(status, n)| (0..*n).map(move |_| booking(status, 10.0, "2024-01-15")))
            .collect()
    }

    #[test]
    fn test_monthly_revenue_excludes_cancelled() {
        let bookings = vec![
            booking("CONFIRMED", 100.0, "2024-01-05"),
            booking("COMPLETED", 50.0, "2024-01-20"),
            booking("CANCELLED", 999.0, "2024-01-21"),
        ];
        let series = monthly_revenue(&bookings);
        assert_eq!(
            series,
            vec![MonthlyRevenue {
                year: 2024,
                month: 1,
                total: 150.0
            }]
        );
    }

    #[test]
    fn test_monthly_revenue_ignores_pending_and_unknown() {
        let bookings = vec![
            booking("PENDING", 80.0, "2024-02-01"),
            booking("REFUNDED", 80.0, "2024-02-01"),
        ];
        assert!(monthly_revenue(&bookings).is_empty());
    }

    #[test]
    fn test_monthly_revenue_keeps_last_six_in_order() {
        // 14 months spanning a year boundary, inserted in reverse order
        let mut bookings = vec![];
        for i in (0..14).rev() {
            let year = 2023 + (i / 12);
            let month = (i % 12) + 1;
            bookings.push(booking(
                "CONFIRMED",
                (i + 1) as f64,
                &format!("{year}-{month:02}-10"),
            ));
        }

        let series = monthly_revenue(&bookings);
        assert_eq!(series.len(), 6);
        let keys: Vec<(i32, u32)> = series.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(
            keys,
            vec![(2023, 9), (2023, 10), (2023, 11), (2023, 12), (2024, 1), (2024, 2)]
        );
        assert!(series.windows(2).all(|w| (w[0].year, w[0].month) < (w[1].year, w[1].month)));
        assert_eq!(series.last().unwrap().total, 14.0);
    }

    #[test]
    fn test_month_ordering_is_numeric() {
        // October must sort after February
        let bookings = vec![
            booking("CONFIRMED", 1.0, "2024-10-01"),
            booking("CONFIRMED", 2.0, "2024-02-01"),
        ];
        let months: Vec<u32> = monthly_revenue(&bookings).iter().map(|m| m.month).collect();
        assert_eq!(months, vec![2, 10]);
    }

    #[test]
    fn test_revenue_scale_floor() {
        assert_eq!(revenue_scale(&[]), 1.0);
        let series = vec![
            MonthlyRevenue { year: 2024, month: 1, total: 0.5 },
        ];
        assert_eq!(revenue_scale(&series), 1.0);
        let series = vec![
            MonthlyRevenue { year: 2024, month: 1, total: 40.0 },
            MonthlyRevenue { year: 2024, month: 2, total: 90.0 },
        ];
        assert_eq!(revenue_scale(&series), 90.0);
    }

    #[test]
    fn test_status_distribution_and_percentages() {
        let bookings = with_statuses(&[
            ("PENDING", 4),
            ("CONFIRMED", 3),
            ("COMPLETED", 2),
            ("CANCELLED", 1),
        ]);
        let dist = status_distribution(&bookings);
        assert_eq!(
            dist,
            StatusDistribution {
                pending: 4,
                confirmed: 3,
                completed: 2,
                cancelled: 1
            }
        );
        let pct = dist.percentages();
        assert_eq!(pct.pending, 40.0);
        assert_eq!(pct.confirmed, 30.0);
        assert_eq!(pct.completed, 20.0);
        assert_eq!(pct.cancelled, 10.0);
    }

    #[test]
    fn test_unrecognized_status_excluded_from_total() {
        let bookings = with_statuses(&[("PENDING", 1), ("CONFIRMED", 2), ("ON_HOLD", 5)]);
        let dist = status_distribution(&bookings);
        assert_eq!(dist.total(), 3);
        assert_eq!(dist.percentage(&BookingStatus::Confirmed), 66.7);
        assert_eq!(dist.percentage(&BookingStatus::Pending), 33.3);
    }

    #[test]
    fn test_empty_input() {
        let series = monthly_revenue(&[]);
        assert!(series.is_empty());

        let dist = status_distribution(&[]);
        assert_eq!(dist, StatusDistribution::default());
        let pct = dist.percentages();
        assert_eq!(pct.pending, 0.0);
        assert_eq!(pct.cancelled, 0.0);

        let metrics = key_metrics(&dist, &PlatformTotals::default());
        assert_eq!(metrics.confirmation_rate, 0.0);
        assert_eq!(metrics.cancellation_rate, 0.0);
        assert_eq!(metrics.average_revenue_per_booking, 0.0);
        assert_eq!(metrics.active_user_rate, 0.0);
    }

    #[test]
    fn test_key_metrics() {
        let dist = StatusDistribution {
            pending: 4,
            confirmed: 3,
            completed: 2,
            cancelled: 1,
        };
        let totals = PlatformTotals {
            total_users: 20,
            total_bookings: 12,
            total_revenue: 1000.0,
            ..Default::default()
        };
        let metrics = key_metrics(&dist, &totals);
        assert_eq!(metrics.confirmation_rate, 50.0);
        assert_eq!(metrics.cancellation_rate, 10.0);
        // Uses platform totals, not the distribution total
        assert_eq!(metrics.average_revenue_per_booking, 83.0);
        assert_eq!(metrics.active_user_rate, 50.0);
    }

    #[test]
    fn test_build_report() {
        let bookings = vec![
            booking("CONFIRMED", 200.0, "2024-03-02"),
            booking("PENDING", 50.0, "2024-03-03"),
        ];
        let report = build_report(&bookings, &PlatformTotals::default());
        assert_eq!(report.monthly_revenue.len(), 1);
        assert_eq!(report.revenue_scale, 200.0);
        assert_eq!(report.distribution_total, 2);
        assert_eq!(report.percentages.confirmed, 50.0);
    }
}
