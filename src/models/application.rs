use serde::{Deserialize, Serialize};

/// A candidate's submission. `job_title` is copied from the job at submission
/// time and is not kept in sync afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: String,
    pub job_id: String,
    pub job_title: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub resume_link: String,
    pub applied_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub job_id: String,
    pub job_title: String,
    pub applicant_name: String,
    pub email: String,
    pub phone: String,
    pub resume_link: String,
}

impl NewApplication {
    pub fn into_application(self, applied_at: i64) -> JobApplication {
        JobApplication {
            id: String::new(),
            job_id: self.job_id,
            job_title: self.job_title,
            applicant_name: self.applicant_name,
            email: self.email,
            phone: self.phone,
            resume_link: self.resume_link,
            applied_at,
        }
    }
}
