mod client;

pub use client::SiteClient;
