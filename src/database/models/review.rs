use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub rating: i64,
    pub bootcamp: Uuid,
    pub user: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReview {
    #[validate(
        required(message = "Please add a title for the review"),
        length(min = 1, max = 100, message = "Title can not be more than 100 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Please add some text"),
        length(min = 1, message = "Please add some text")
    )]
    pub text: Option<String>,

    #[validate(
        required(message = "Please add a rating"),
        range(min = 1, max = 10, message = "Rating must be between 1 and 10")
    )]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Title can not be more than 100 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Please add some text"))]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 10, message = "Rating must be between 1 and 10"))]
    pub rating: Option<i64>,
}

impl NewReview {
    pub fn into_review(self, bootcamp: Uuid, user: Uuid) -> Review {
        Review {
            id: Uuid::new_v4(),
            title: self.title.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            rating: self.rating.unwrap_or_default(),
            bootcamp,
            user,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_between_one_and_ten() {
        let review = NewReview { title: Some("t".into()), text: Some("x".into()), rating: Some(11) };
        let errors = review.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rating"));

        let review = NewReview { rating: Some(10), ..review };
        assert!(review.validate().is_ok());
    }
}
