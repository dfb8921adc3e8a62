use thiserror::Error;

/// Client-side form check that failed before anything was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct InvalidField {
    pub field: &'static str,
    pub reason: &'static str,
}

impl InvalidField {
    pub(crate) const fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

pub(crate) fn required(field: &'static str, value: &str) -> Result<(), InvalidField> {
    if value.trim().is_empty() {
        Err(InvalidField::new(field, "is required"))
    } else {
        Ok(())
    }
}

impl From<InvalidField> for crate::client::RequestError {
    fn from(err: InvalidField) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}
