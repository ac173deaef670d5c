pub mod collection;
pub mod record;

pub use collection::bootcamp_reviews_get;
pub use collection::get as reviews_get;
pub use collection::post as reviews_post;
pub use record::delete as review_delete;
pub use record::get as review_get;
pub use record::put as review_put;
