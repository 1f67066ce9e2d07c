pub mod friends;
pub mod users;
