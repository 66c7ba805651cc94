//! Applicant and guarantor records.

use serde::{Deserialize, Serialize};

/// The loan applicant snapshot embedded in a credential at issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub phone: String,
}

impl Applicant {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// A third party who scanned a credential and recorded an action.
///
/// Guarantors are deduplicated per credential by `(name, phone)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guarantor {
    pub name: String,
    pub phone: String,
}

impl Guarantor {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Deduplication key: same name + phone means the same guarantor.
    pub fn dedup_key(&self) -> (String, String) {
        (self.name.clone(), self.phone.clone())
    }
}
