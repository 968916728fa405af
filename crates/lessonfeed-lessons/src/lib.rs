//! Lesson list and lesson creation client.

pub mod client;
pub mod error;
pub mod model;

pub use client::LessonsClient;
pub use error::LessonsError;
pub use model::{Lesson, LessonPage, NewLesson, Pagination};
