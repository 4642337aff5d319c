// HTTP routes
pub mod community_notes;
pub mod health;
pub mod stream;

pub use community_notes::*;
pub use health::*;
pub use stream::*;
