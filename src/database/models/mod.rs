pub mod bootcamp;
pub mod course;
pub mod review;
pub mod user;

pub use bootcamp::{Bootcamp, BootcampUpdate, Career, Location, NewBootcamp};
pub use course::{Course, CourseUpdate, NewCourse, SkillLevel};
pub use review::{NewReview, Review, ReviewUpdate};
pub use user::{NewUser, Role, User, UserUpdate};
