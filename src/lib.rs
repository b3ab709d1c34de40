pub mod api_connection;
pub mod cli;
pub mod config;
pub mod custom_items;
pub mod grocery_aggregator;
pub mod grocery_export;
pub mod ingredient_normalizer;
pub mod models;
pub mod prep;
pub mod section_order;
pub mod sections;
pub mod units;
