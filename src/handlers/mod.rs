pub mod chair;
pub mod internal;
pub mod ride;
