use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EmploymentType {
    #[default]
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
}

/// A posted position in the `jobs` collection. Jobs are never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobOpening {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub description: String,
    pub posted_at: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type", default)]
    pub employment_type: EmploymentType,
    pub description: String,
}

impl NewJob {
    pub fn into_job(self, posted_at: i64) -> JobOpening {
        JobOpening {
            id: String::new(),
            title: self.title,
            department: self.department,
            location: self.location,
            employment_type: self.employment_type,
            description: self.description,
            posted_at,
            is_active: true,
        }
    }
}
