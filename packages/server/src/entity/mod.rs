pub mod photo;
pub mod plant;
pub mod sync_lease;
pub mod sync_token;
