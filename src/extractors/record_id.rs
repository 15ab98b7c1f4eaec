//! Extract a record id from the `:id` path segment.

use crate::error::{AppError, RecordsError};
use crate::model::Entity;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::marker::PhantomData;

/// Numeric id of a record of type `E`. A segment that is not an integer is
/// rejected as "<Entity> not found", since no such record can exist.
#[derive(Debug)]
pub struct RecordId<E>(pub i64, PhantomData<fn() -> E>);

impl<E> RecordId<E> {
    pub fn get(&self) -> i64 {
        self.0
    }
}

#[async_trait]
impl<S, E> FromRequestParts<S> for RecordId<E>
where
    S: Send + Sync,
    E: Entity,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let not_found = || AppError::from(RecordsError::NotFound(E::KIND.not_found_message()));
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| not_found())?;
        let id = raw.trim().parse::<i64>().map_err(|_| not_found())?;
        Ok(RecordId(id, PhantomData))
    }
}
