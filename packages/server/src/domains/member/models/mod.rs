pub mod member_note_stats;

pub use member_note_stats::MemberNoteStats;
