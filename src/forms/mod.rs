pub mod comments;
pub mod filter;
pub mod posts;
pub mod tags;
