pub mod asset;
pub mod chat;
pub mod video;
