pub mod auth;
pub mod earthquakes;
pub mod feed;
pub mod flights;
pub mod satellites;
pub mod scheduled;
