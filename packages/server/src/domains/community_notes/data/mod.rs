pub mod community_note;

pub use community_note::{AuthorTallyData, CommunityNoteData, VoteSetsData};
