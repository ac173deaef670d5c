use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub weeks: i64,
    pub tuition: f64,
    pub minimum_skill: SkillLevel,
    #[serde(default)]
    pub scholarship_available: bool,
    pub bootcamp: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[validate(
        required(message = "Please add a course title"),
        length(min = 1, message = "Please add a course title")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Please add a description"),
        length(min = 1, message = "Please add a description")
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Please add number of weeks"),
        range(min = 1, message = "Weeks must be at least 1")
    )]
    pub weeks: Option<i64>,

    #[validate(
        required(message = "Please add a tuition cost"),
        range(min = 0.0, message = "Tuition can not be negative")
    )]
    pub tuition: Option<f64>,

    #[validate(required(message = "Please add a minimum skill"))]
    pub minimum_skill: Option<SkillLevel>,

    pub scholarship_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Please add a course title"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Please add a description"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Weeks must be at least 1"))]
    pub weeks: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Tuition can not be negative"))]
    pub tuition: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_skill: Option<SkillLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_available: Option<bool>,
}

impl NewCourse {
    pub fn into_course(self, bootcamp: Uuid, owner: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            weeks: self.weeks.unwrap_or_default(),
            tuition: self.tuition.unwrap_or_default(),
            minimum_skill: self.minimum_skill.unwrap_or(SkillLevel::Beginner),
            scholarship_available: self.scholarship_available.unwrap_or(false),
            bootcamp,
            user: owner,
            created_at: Utc::now(),
        }
    }
}
