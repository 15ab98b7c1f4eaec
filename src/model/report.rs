//! Aggregate views computed from the test collection.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAverage {
    pub student_id: i64,
    pub test_count: usize,
    pub average: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseAverage {
    pub course_id: i64,
    pub test_count: usize,
    pub average: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub teacher_id: i64,
    pub teacher_name: String,
    pub courses: Vec<CourseTestCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTestCount {
    pub course_id: i64,
    pub course_name: String,
    pub test_count: usize,
}

/// Mean of the given percentages rounded to two decimals. `None` for an empty input.
pub fn mean_percentage(percentages: &[f64]) -> Option<f64> {
    if percentages.is_empty() {
        return None;
    }
    // Running mean: the plain sum of large finite percentages can overflow.
    let mean = percentages
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, p)| mean + (p - mean) / (i + 1) as f64);
    let scaled = mean * 100.0;
    Some(if scaled.is_finite() { scaled.round() / 100.0 } else { mean })
}
