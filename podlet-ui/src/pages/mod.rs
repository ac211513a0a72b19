pub mod boot;
pub mod library;
pub mod now_playing;
pub mod root;
pub mod search;
pub mod settings;
