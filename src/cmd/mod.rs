pub mod compare;
pub mod merge;
pub mod score;
pub mod summary;
