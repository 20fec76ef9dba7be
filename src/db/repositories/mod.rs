mod emojis;
mod icon_mappings;
mod icon_usage;
mod sessions;
