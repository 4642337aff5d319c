pub mod community_notes;
pub mod member;
