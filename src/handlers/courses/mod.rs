pub mod collection;
pub mod record;

pub use collection::bootcamp_courses_get;
pub use collection::get as courses_get;
pub use collection::post as courses_post;
pub use record::delete as course_delete;
pub use record::get as course_get;
pub use record::put as course_put;
