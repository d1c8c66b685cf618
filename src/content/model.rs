use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::content::{Entity, Submission};
use crate::core::validation::{email, required};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub client_name: String,
    pub category: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub description: String,
    // Derived from the dates on every write.
    #[serde(default)]
    pub days_completed: u32,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
}

impl Project {
    pub const DEFAULT_CATEGORY: &'static str = "Residential Cleaning";

    /// Inclusive number of days between start and end, in either order.
    pub fn days_between(start: NaiveDate, end: NaiveDate) -> u32 {
        let days = (end - start).num_days().unsigned_abs();
        u32::try_from(days).unwrap_or(u32::MAX - 1) + 1
    }
}

impl Entity for Project {
    const COLLECTION: &'static str = "projects";
    const PUBLIC_READ: bool = true;

    fn validate(&self) -> Result<()> {
        required("title", "Title", &self.title)?;
        required("description", "Description", &self.description)
    }

    fn prepare(&mut self) {
        if self.category.trim().is_empty() {
            self.category = Project::DEFAULT_CATEGORY.to_owned();
        }
        self.days_completed = Project::days_between(self.start_date, self.end_date);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo_url: String,
}

impl Entity for TeamMember {
    const COLLECTION: &'static str = "team";
    const PUBLIC_READ: bool = true;

    fn validate(&self) -> Result<()> {
        required("name", "Name", &self.name)?;
        required("role", "Role", &self.role)?;
        if self.photo_url.trim().is_empty() {
            return Err(Error::validation("photo_url", "Please upload a photo"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ServiceCategory {
    #[default]
    Residential,
    Commercial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: ServiceCategory,
    #[serde(default)]
    pub image: String,
}

impl Entity for Service {
    const COLLECTION: &'static str = "services";
    const PUBLIC_READ: bool = true;

    fn validate(&self) -> Result<()> {
        required("title", "Service title", &self.title)?;
        required("description", "Service description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub image: String,
}

impl Entity for Testimonial {
    const COLLECTION: &'static str = "testimonials";
    const PUBLIC_READ: bool = true;

    fn validate(&self) -> Result<()> {
        required("name", "Client name", &self.name)?;
        required("text", "Client feedback", &self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
}

impl Entity for Consultation {
    const COLLECTION: &'static str = "consultations";
    const PUBLIC_READ: bool = false;

    fn validate(&self) -> Result<()> {
        required("name", "Name", &self.name)?;
        email(&self.email)?;
        required("phone", "Phone", &self.phone)?;
        required("date", "Date", &self.date)?;
        required("time", "Time", &self.time)
    }
}

impl Submission for Consultation {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: String,
}

impl Entity for QuoteRequest {
    const COLLECTION: &'static str = "quotes";
    const PUBLIC_READ: bool = false;

    fn validate(&self) -> Result<()> {
        required("name", "Name", &self.name)?;
        email(&self.email)?;
        required("phone", "Phone", &self.phone)
    }
}

impl Submission for QuoteRequest {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl Entity for ContactMessage {
    const COLLECTION: &'static str = "contactMessages";
    const PUBLIC_READ: bool = false;

    fn validate(&self) -> Result<()> {
        required("name", "Name", &self.name)?;
        email(&self.email)?;
        required("message", "Message", &self.message)
    }
}

impl Submission for ContactMessage {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn days_between_is_inclusive() {
        assert_eq!(Project::days_between(date("2024-05-01"), date("2024-05-01")), 1);
        assert_eq!(Project::days_between(date("2024-05-01"), date("2024-05-03")), 3);
        assert_eq!(Project::days_between(date("2024-05-03"), date("2024-05-01")), 3);
    }

    #[test]
    fn project_prepare_fills_derived_fields() {
        let mut project = Project {
            title: "Kitchen Deep Clean".into(),
            client_name: "Ann".into(),
            category: "".into(),
            location: "Leeds".into(),
            start_date: date("2024-05-01"),
            end_date: date("2024-05-10"),
            description: "Degreased everything".into(),
            days_completed: 0,
            main_image: None,
            additional_images: vec![],
        };
        project.prepare();
        assert_eq!(project.category, Project::DEFAULT_CATEGORY);
        assert_eq!(project.days_completed, 10);

        let doc = serde_json::to_value(&project).unwrap();
        assert_eq!(doc["clientName"], "Ann");
        assert_eq!(doc["startDate"], "2024-05-01");
        assert_eq!(doc["daysCompleted"], 10);
    }

    #[test]
    fn team_member_needs_photo() {
        let member = TeamMember {
            name: "Ann".into(),
            role: "Supervisor".into(),
            bio: "".into(),
            photo_url: "".into(),
        };
        assert_eq!(member.validate().unwrap_err().message(), "Please upload a photo");
    }

    #[test]
    fn contact_message_checks_email() {
        let message = ContactMessage {
            name: "Bob".into(),
            email: "bob".into(),
            message: "Hi".into(),
        };
        assert!(message.validate().is_err());
    }
}
