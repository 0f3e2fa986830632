//! Request / response bodies of the JSON API.

pub mod messages;
