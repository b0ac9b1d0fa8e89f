use chrono::NaiveDate;

use crate::logic::grading::percentage;

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

/// `"17/20 (85.0%)"`, or `"N/A"` when no percentage can be computed.
pub fn format_grade(score: Option<f64>, max_score: Option<f64>) -> String {
    match (score, max_score, percentage(score, max_score)) {
        (Some(score), Some(max_score), Some(p)) => {
            format!("{}/{} ({})", score, max_score, format_percentage(p, 1))
        }
        _ => "N/A".to_string(),
    }
}

/// `"Mar 05, 2024"`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

pub fn format_gpa(gpa: f64) -> String {
    format!("{:.2}", gpa)
}
