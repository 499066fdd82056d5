pub mod channel_points;
pub mod chat;
pub mod token;
pub mod users;
