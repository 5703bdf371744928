pub mod connection;
pub mod listings;
pub mod pages;
pub mod scrapes;
