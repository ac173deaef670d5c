use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

/// Geocoded point plus the address components the geocoder resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Vec<Career>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBootcamp {
    #[validate(
        required(message = "Please add a name"),
        length(min = 1, max = 50, message = "Name can not be more than 50 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Please add a description"),
        length(min = 1, max = 500, message = "Description can not be more than 500 characters")
    )]
    pub description: Option<String>,

    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,

    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,

    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    #[validate(
        required(message = "Please add an address"),
        length(min = 1, message = "Please add an address")
    )]
    pub address: Option<String>,

    #[validate(
        required(message = "Please add at least one career"),
        length(min = 1, message = "Please add at least one career")
    )]
    pub careers: Option<Vec<Career>>,

    #[validate(range(min = 0.0, message = "Average cost can not be negative"))]
    pub average_cost: Option<f64>,

    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

/// Partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BootcampUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Name can not be more than 50 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 500, message = "Description can not be more than 500 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Option<Vec<Career>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Average cost can not be negative"))]
    pub average_cost: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_assistance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_guarantee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_gi: Option<bool>,
}

impl NewBootcamp {
    /// Build the stored record. Call after `validate()` succeeded.
    pub fn into_bootcamp(self, owner: Uuid, location: Option<Location>) -> Bootcamp {
        Bootcamp {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            website: self.website,
            phone: self.phone,
            email: self.email,
            address: self.address,
            location,
            careers: self.careers.unwrap_or_default(),
            average_rating: None,
            average_cost: self.average_cost,
            photo: default_photo(),
            housing: self.housing.unwrap_or(false),
            job_assistance: self.job_assistance.unwrap_or(false),
            job_guarantee: self.job_guarantee.unwrap_or(false),
            accept_gi: self.accept_gi.unwrap_or(false),
            user: owner,
            created_at: Utc::now(),
        }
    }
}
