//! Database access for drafts and final responses

pub mod drafts;
pub mod responses;
