mod excerpt;
mod models;
mod range;

pub use excerpt::{strip_tags, trim_words};
pub use models::*;
pub use range::DateRange;
