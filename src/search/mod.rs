pub mod cache;
pub mod client;

pub use cache::QueryCache;
pub use client::{CityLookup, CitySearch, CitySearchResult, HttpCityLookup};
