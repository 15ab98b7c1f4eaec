//! Referential integrity and aggregates over the four record collections.

use crate::error::{RecordsError, StoreError};
use crate::model::{
    mean_percentage, Course, CourseAverage, CourseTestCount, Entity, EntityKind, Student,
    StudentAverage, Teacher, TeacherSummary, Test,
};
use crate::service::FieldValidator;
use crate::store::{Document, DocumentStore};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Academic records over any [`DocumentStore`].
///
/// Create, update and delete hold a single write lock for their whole
/// check-then-write sequence, because reference checks read other collections.
pub struct RecordsStore {
    store: Arc<dyn DocumentStore>,
    write_lock: Mutex<()>,
}

impl RecordsStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn list<E: Entity>(&self) -> Result<Vec<E>, RecordsError> {
        let docs = self.store.list(E::KIND).await?;
        docs.into_iter().map(decode::<E>).collect()
    }

    pub async fn get<E: Entity>(&self, id: i64) -> Result<E, RecordsError> {
        let doc = self
            .store
            .get(E::KIND, id)
            .await?
            .ok_or_else(|| RecordsError::NotFound(E::KIND.not_found_message()))?;
        decode(doc)
    }

    pub async fn create<E: Entity>(&self, fields: Document) -> Result<E, RecordsError> {
        let fields = FieldValidator::validate_create(E::KIND, fields)?;
        FieldValidator::validate_record(E::KIND, &fields)?;
        let _guard = self.write_lock.lock().await;
        self.check_references(E::KIND, &fields).await?;
        let doc = self.store.insert(E::KIND, fields).await?;
        let record: E = decode(doc)?;
        tracing::info!(collection = E::KIND.collection(), id = record.id(), "record created");
        Ok(record)
    }

    /// Applies a partial update. Only the supplied fields change.
    pub async fn update<E: Entity>(&self, id: i64, patch: Document) -> Result<E, RecordsError> {
        FieldValidator::validate_patch(E::KIND, &patch)?;
        let _guard = self.write_lock.lock().await;
        let mut fields = self
            .store
            .get(E::KIND, id)
            .await?
            .ok_or_else(|| RecordsError::NotFound(E::KIND.not_found_message()))?;
        self.check_references(E::KIND, &patch).await?;
        fields.extend(patch);
        fields.remove("id");
        FieldValidator::validate_record(E::KIND, &fields)?;
        // Decode before writing so a stored record always matches its type.
        decode::<E>(crate::store::with_id(id, fields.clone()))?;
        let doc = self
            .store
            .replace(E::KIND, id, fields)
            .await?
            .ok_or_else(|| RecordsError::NotFound(E::KIND.not_found_message()))?;
        tracing::info!(collection = E::KIND.collection(), id, "record updated");
        decode(doc)
    }

    /// Deletes a record unless another record still references it.
    pub async fn delete<E: Entity>(&self, id: i64) -> Result<E, RecordsError> {
        let _guard = self.write_lock.lock().await;
        if self.store.get(E::KIND, id).await?.is_none() {
            return Err(RecordsError::NotFound(E::KIND.not_found_message()));
        }
        for (dependent, field) in E::KIND.dependents() {
            let docs = self.store.list(dependent).await?;
            if docs.iter().any(|d| reference_in(d, field) == Some(id)) {
                return Err(RecordsError::Conflict(E::KIND.delete_conflict_message(dependent)));
            }
        }
        let doc = self
            .store
            .delete(E::KIND, id)
            .await?
            .ok_or_else(|| RecordsError::NotFound(E::KIND.not_found_message()))?;
        tracing::info!(collection = E::KIND.collection(), id, "record deleted");
        decode(doc)
    }

    /// Resolves a foreign key: the referenced record must exist in `target`.
    pub async fn resolve_reference(
        &self,
        target: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Document, RecordsError> {
        let invalid = || RecordsError::Validation(target.invalid_reference_message(field));
        let id = value.as_i64().ok_or_else(invalid)?;
        self.store.get(target, id).await?.ok_or_else(invalid)
    }

    async fn check_references(&self, kind: EntityKind, fields: &Document) -> Result<(), RecordsError> {
        for (field, target) in kind.references() {
            if let Some(v) = fields.get(field).filter(|v| !v.is_null()) {
                self.resolve_reference(target, field, v).await?;
            }
        }
        Ok(())
    }

    pub async fn tests_for_student(&self, student_id: i64) -> Result<Vec<Test>, RecordsError> {
        self.get::<Student>(student_id).await?;
        let tests = self.list::<Test>().await?;
        Ok(tests.into_iter().filter(|t| t.student_id == student_id).collect())
    }

    pub async fn tests_for_course(&self, course_id: i64) -> Result<Vec<Test>, RecordsError> {
        self.get::<Course>(course_id).await?;
        let tests = self.list::<Test>().await?;
        Ok(tests.into_iter().filter(|t| t.course_id == course_id).collect())
    }

    pub async fn average_for_student(&self, student_id: i64) -> Result<StudentAverage, RecordsError> {
        let tests = self.tests_for_student(student_id).await?;
        let average = average_of(&tests)
            .ok_or_else(|| RecordsError::NotFound("No tests found for student".into()))?;
        Ok(StudentAverage {
            student_id,
            test_count: tests.len(),
            average,
        })
    }

    pub async fn average_for_course(&self, course_id: i64) -> Result<CourseAverage, RecordsError> {
        let tests = self.tests_for_course(course_id).await?;
        let average = average_of(&tests)
            .ok_or_else(|| RecordsError::NotFound("No tests found for course".into()))?;
        Ok(CourseAverage {
            course_id,
            test_count: tests.len(),
            average,
        })
    }

    /// Courses taught by the teacher with the number of tests recorded in each.
    pub async fn teacher_summary(&self, teacher_id: i64) -> Result<TeacherSummary, RecordsError> {
        let teacher = self.get::<Teacher>(teacher_id).await?;
        let courses = self.list::<Course>().await?;
        let tests = self.list::<Test>().await?;
        let courses = courses
            .into_iter()
            .filter(|c| c.teacher_id == teacher_id)
            .map(|c| CourseTestCount {
                course_id: c.id,
                test_count: tests.iter().filter(|t| t.course_id == c.id).count(),
                course_name: c.name,
            })
            .collect();
        Ok(TeacherSummary {
            teacher_id,
            teacher_name: teacher.full_name(),
            courses,
        })
    }
}

fn average_of(tests: &[Test]) -> Option<f64> {
    let percentages: Vec<f64> = tests.iter().map(Test::percentage).collect();
    mean_percentage(&percentages)
}

fn reference_in(doc: &Document, field: &str) -> Option<i64> {
    doc.get(field).and_then(Value::as_i64)
}

fn decode<E: Entity>(doc: Document) -> Result<E, RecordsError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| {
        RecordsError::Store(StoreError::Corrupt {
            collection: E::KIND.collection(),
            message: e.to_string(),
        })
    })
}
