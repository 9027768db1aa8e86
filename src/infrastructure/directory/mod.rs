//! Charger directory adapters

mod http;

pub use http::HttpChargerDirectory;
