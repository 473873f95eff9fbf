//! Detection batch aggregation.
//!
//! This module reduces a batch of detection records into the summary
//! statistics served by the analytics endpoint. One pass over the
//! batch, no shared state between invocations.

use crate::models::{
    AnalyticsReport, AnalyticsSummary, CategoryCount, DetectionRecord, TrendPoint,
};
use std::collections::HashMap;

/// Labels of the synthetic trend points, oldest first.
const TREND_TIMES: [&str; 4] = ["9AM", "10AM", "11AM", "12PM"];

/// Reduce a detection batch to summary statistics.
///
/// An empty batch yields [`AnalyticsReport::Empty`] so that no ratio
/// is ever derived from a zero count.
pub fn summarize(records: &[DetectionRecord]) -> AnalyticsReport {
    if records.is_empty() {
        return AnalyticsReport::Empty;
    }

    let total = records.len() as u32;
    let mut confidence_sum = 0.0;
    let mut alerts = 0u32;

    // Ordered label -> count mapping preserving first-seen order.
    let mut categories: Vec<CategoryCount> = Vec::new();
    let mut index_by_label: HashMap<&str, usize> = HashMap::new();

    for record in records {
        confidence_sum += record.confidence;
        if record.alert {
            alerts += 1;
        }

        match index_by_label.get(record.label.as_str()) {
            Some(&i) => categories[i].count += 1,
            None => {
                index_by_label.insert(record.label.as_str(), categories.len());
                categories.push(CategoryCount {
                    name: record.label.clone(),
                    count: 1,
                });
            }
        }
    }

    let accuracy = round2(1.0 - f64::from(alerts) / f64::from(total));
    let avg_confidence = round2(confidence_sum / f64::from(total));

    AnalyticsReport::Summary(AnalyticsSummary {
        detection_accuracy: accuracy,
        total_detections: total,
        safety_alerts: alerts,
        avg_confidence,
        detections_by_category: categories,
        accuracy_trend: accuracy_trend(accuracy),
    })
}

/// Build the four-point synthetic trend ending at `accuracy`.
///
/// A linear ramp of +0.01 per point. Values are intentionally not
/// clamped to `[0, 1]` and may dip below zero for very low accuracies.
fn accuracy_trend(accuracy: f64) -> Vec<TrendPoint> {
    TREND_TIMES
        .iter()
        .enumerate()
        .map(|(i, time)| TrendPoint {
            time: (*time).to_string(),
            acc: round2(accuracy - 0.01 * (TREND_TIMES.len() - 1 - i) as f64),
        })
        .collect()
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, confidence: f64, alert: bool) -> DetectionRecord {
        DetectionRecord {
            label: label.to_string(),
            confidence,
            alert,
        }
    }

    fn summary_of(records: &[DetectionRecord]) -> AnalyticsSummary {
        match summarize(records) {
            AnalyticsReport::Summary(summary) => summary,
            AnalyticsReport::Empty => panic!("expected a computed summary"),
        }
    }

    #[test]
    fn test_empty_batch_is_sentinel() {
        assert_eq!(summarize(&[]), AnalyticsReport::Empty);
    }

    #[test]
    fn test_mixed_batch() {
        let records = vec![
            record("Worker", 0.9, false),
            record("Worker", 0.8, true),
            record("Hard Hat", 1.0, false),
        ];

        let summary = summary_of(&records);
        assert_eq!(summary.total_detections, 3);
        assert_eq!(summary.safety_alerts, 1);
        assert_eq!(summary.detection_accuracy, 0.67);
        assert_eq!(summary.avg_confidence, 0.9);
        assert_eq!(
            summary.detections_by_category,
            vec![
                CategoryCount {
                    name: "Worker".to_string(),
                    count: 2
                },
                CategoryCount {
                    name: "Hard Hat".to_string(),
                    count: 1
                },
            ]
        );
        assert_eq!(
            summary.accuracy_trend,
            vec![
                TrendPoint {
                    time: "9AM".to_string(),
                    acc: 0.64
                },
                TrendPoint {
                    time: "10AM".to_string(),
                    acc: 0.65
                },
                TrendPoint {
                    time: "11AM".to_string(),
                    acc: 0.66
                },
                TrendPoint {
                    time: "12PM".to_string(),
                    acc: 0.67
                },
            ]
        );
    }

    #[test]
    fn test_category_counts_sum_to_total() {
        let records = vec![
            record("Worker", 0.5, false),
            record("Safety Vest", 0.6, false),
            record("Worker", 0.7, true),
            record("No Helmet", 0.8, true),
            record("Safety Vest", 0.9, false),
        ];

        let summary = summary_of(&records);
        let category_total: u32 = summary
            .detections_by_category
            .iter()
            .map(|c| c.count)
            .sum();
        assert_eq!(category_total, summary.total_detections);
        assert!(summary.safety_alerts <= summary.total_detections);
    }

    #[test]
    fn test_category_order_is_first_seen() {
        let records = vec![
            record("No Helmet", 0.4, true),
            record("Worker", 0.9, false),
            record("No Helmet", 0.5, true),
        ];

        let summary = summary_of(&records);
        let names: Vec<&str> = summary
            .detections_by_category
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["No Helmet", "Worker"]);
    }

    #[test]
    fn test_trend_has_four_increasing_points() {
        let records = vec![record("Worker", 0.9, false), record("Worker", 0.8, true)];

        let summary = summary_of(&records);
        assert_eq!(summary.accuracy_trend.len(), 4);
        for pair in summary.accuracy_trend.windows(2) {
            assert!(pair[0].acc < pair[1].acc);
        }
        assert_eq!(
            summary.accuracy_trend.last().unwrap().acc,
            summary.detection_accuracy
        );
    }

    #[test]
    fn test_trend_is_not_clamped_below_zero() {
        // Every record alerting drives accuracy to 0.0.
        let records = vec![record("No Helmet", 0.9, true), record("No Helmet", 0.8, true)];

        let summary = summary_of(&records);
        assert_eq!(summary.detection_accuracy, 0.0);
        assert_eq!(summary.accuracy_trend[0].acc, -0.03);
        assert_eq!(summary.accuracy_trend[3].acc, 0.0);
    }

    #[test]
    fn test_perfect_batch() {
        let records = vec![record("Worker", 1.0, false)];

        let summary = summary_of(&records);
        assert_eq!(summary.detection_accuracy, 1.0);
        assert_eq!(summary.safety_alerts, 0);
        assert_eq!(summary.avg_confidence, 1.0);
        assert_eq!(summary.accuracy_trend[0].acc, 0.97);
    }

    #[test]
    fn test_accuracy_rounds_to_two_decimals() {
        let mut records = vec![record("Worker", 0.75, false); 5];
        records.push(record("Worker", 0.75, true));
        records.push(record("Worker", 0.75, true));

        // 1 - 2/7 = 0.714285.. -> 0.71
        let summary = summary_of(&records);
        assert_eq!(summary.detection_accuracy, 0.71);
        assert_eq!(summary.avg_confidence, 0.75);
    }
}
