pub mod emoji_entry;
pub mod icon_mapping;
pub mod icon_usage;
pub mod session;

pub use emoji_entry::EmojiEntry;
pub use icon_mapping::IconMapping;
pub use icon_usage::IconUsage;
pub use session::DocumentSession;
