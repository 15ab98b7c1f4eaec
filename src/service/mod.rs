//! RecordsStore: validated CRUD and aggregates over an injected document store.

mod records;
mod validation;
pub use records::RecordsStore;
pub use validation::FieldValidator;
