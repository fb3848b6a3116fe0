use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceType {
    #[serde(rename = "Screen Replacement")]
    ScreenReplacement,
    #[serde(rename = "Battery Change")]
    BatteryChange,
    #[serde(rename = "Water Damage Repair")]
    WaterDamage,
    #[serde(rename = "Charging Port Repair")]
    ChargingPort,
    #[serde(rename = "Software & Unlocking")]
    SoftwareIssue,
    #[serde(rename = "Camera Lens Repair")]
    CameraRepair,
    #[serde(rename = "Other Diagnosis")]
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 7] = [
        ServiceType::ScreenReplacement,
        ServiceType::BatteryChange,
        ServiceType::WaterDamage,
        ServiceType::ChargingPort,
        ServiceType::SoftwareIssue,
        ServiceType::CameraRepair,
        ServiceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ScreenReplacement => "Screen Replacement",
            ServiceType::BatteryChange => "Battery Change",
            ServiceType::WaterDamage => "Water Damage Repair",
            ServiceType::ChargingPort => "Charging Port Repair",
            ServiceType::SoftwareIssue => "Software & Unlocking",
            ServiceType::CameraRepair => "Camera Lens Repair",
            ServiceType::Other => "Other Diagnosis",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A customer repair request as stored in the `bookings` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub order_id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub service_type: ServiceType,
    pub preferred_date: String,
    pub preferred_time: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: i64,
}

impl Booking {
    pub fn tel_link(&self) -> String {
        format!("tel:{}", self.phone_number)
    }

    pub fn whatsapp_link(&self) -> Option<String> {
        let digits: String = self
            .phone_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }

        let message = format!(
            "Hello {}, this is regarding your Ecare order {} for {}.",
            self.customer_name,
            self.order_id,
            self.service_type.as_str()
        );
        reqwest::Url::parse_with_params(&format!("https://wa.me/{digits}"), &[("text", message)])
            .ok()
            .map(String::from)
    }

    /// Case-insensitive match on name or order id, plain substring on phone.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        let lower = term.to_lowercase();
        self.customer_name.to_lowercase().contains(&lower)
            || self.order_id.to_lowercase().contains(&lower)
            || self.phone_number.contains(term)
    }
}

/// Booking fields supplied by the customer; everything else is stamped at write time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub service_type: ServiceType,
    pub preferred_date: String,
    pub preferred_time: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, order_id: String, created_at: i64) -> Booking {
        Booking {
            id: String::new(),
            order_id,
            customer_name: self.customer_name,
            phone_number: self.phone_number,
            email: self.email,
            service_type: self.service_type,
            preferred_date: self.preferred_date,
            preferred_time: self.preferred_time,
            address: self.address,
            notes: self.notes,
            status: BookingStatus::Pending,
            created_at,
        }
    }
}

/// `BK-<last 4 digits of the timestamp>-<100..=999>`. Uniqueness is not checked.
pub fn generate_order_id(now_millis: i64) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(100..=999);
    format!("BK-{:04}-{suffix}", now_millis.rem_euclid(10_000))
}
