use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{JobOpening, NewApplication, NewBooking, NewJob, ServiceType};

/// Field-level form errors keyed by the form's field name.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    digits(phone).len() == 10
}

fn is_valid_email(email: &str) -> bool {
    email.contains('@')
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingForm {
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub service_type: Option<String>,
    pub preferred_date: String,
    pub preferred_time: String,
    pub address: String,
    pub notes: Option<String>,
}

pub fn validate_booking(form: BookingForm) -> Result<NewBooking, FieldErrors> {
    let mut errors = FieldErrors::default();

    if form.customer_name.trim().is_empty() {
        errors.add("customerName", "Name is required");
    }
    if !is_valid_phone(&form.phone_number) {
        errors.add("phoneNumber", "Please enter a valid 10-digit phone number");
    }
    if !is_valid_email(&form.email) {
        errors.add("email", "Please enter a valid email");
    }
    if form.preferred_date.trim().is_empty() {
        errors.add("preferredDate", "Date is required");
    }
    if form.preferred_time.trim().is_empty() {
        errors.add("preferredTime", "Time is required");
    }
    if form.address.trim().is_empty() {
        errors.add("address", "Address is required for home service");
    }

    // Missing or blank falls back to the first listed service
    let service_type = match form.service_type.as_deref().map(str::trim) {
        None | Some("") => ServiceType::ScreenReplacement,
        Some(name) => ServiceType::parse(name).unwrap_or_else(|| {
            errors.add("serviceType", "Please choose a service from the list");
            ServiceType::ScreenReplacement
        }),
    };

    let notes = form
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    errors.into_result(NewBooking {
        customer_name: form.customer_name.trim().to_string(),
        phone_number: form.phone_number.trim().to_string(),
        email: form.email.trim().to_string(),
        service_type,
        preferred_date: form.preferred_date.trim().to_string(),
        preferred_time: form.preferred_time.trim().to_string(),
        address: form.address.trim().to_string(),
        notes,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_link: String,
}

/// Builds the application against `job`, copying its current title.
pub fn validate_application(
    form: ApplicationForm,
    job: &JobOpening,
) -> Result<NewApplication, FieldErrors> {
    let mut errors = FieldErrors::default();

    if form.name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    if !is_valid_email(&form.email) {
        errors.add("email", "Please enter a valid email");
    }
    if form.phone.trim().is_empty() {
        errors.add("phone", "Phone is required");
    }
    if form.resume_link.trim().is_empty() {
        errors.add("resumeLink", "Please provide a URL to your resume or profile");
    }

    errors.into_result(NewApplication {
        job_id: job.id.clone(),
        job_title: job.title.clone(),
        applicant_name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        resume_link: form.resume_link.trim().to_string(),
    })
}

pub fn validate_job(job: NewJob) -> Result<NewJob, FieldErrors> {
    let mut errors = FieldErrors::default();

    for (field, value) in [
        ("title", &job.title),
        ("department", &job.department),
        ("location", &job.location),
        ("description", &job.description),
    ] {
        if value.trim().is_empty() {
            errors.add(field, format!("{field} is required"));
        }
    }

    errors.into_result(job)
}
