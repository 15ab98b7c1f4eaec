//! Typed records as returned to API callers. Field names serialize as camelCase.

use crate::model::EntityKind;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A record type stored in one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> i64;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub room: Option<String>,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub teacher_id: i64,
    pub semester: String,
    pub room: String,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub grade: i64,
    pub student_number: String,
    #[serde(default)]
    pub homeroom: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub test_name: String,
    pub date: NaiveDate,
    pub mark: f64,
    pub out_of: f64,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Test {
    /// `mark / outOf * 100`.
    pub fn percentage(&self) -> f64 {
        self.mark / self.out_of * 100.0
    }
}

impl Entity for Teacher {
    const KIND: EntityKind = EntityKind::Teacher;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for Course {
    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Entity for Test {
    const KIND: EntityKind = EntityKind::Test;

    fn id(&self) -> i64 {
        self.id
    }
}
