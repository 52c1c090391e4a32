pub mod aggregates;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod export;
pub mod html;
pub mod http_client;
pub mod portraits;
pub mod server;
pub mod similarity;
pub mod units;
