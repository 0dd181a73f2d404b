pub mod feed_client;
pub mod feed_structs;
