pub mod config;
pub mod export;
pub mod fetch;
pub mod group;
pub mod html;
pub mod knockout;
pub mod locate;
pub mod mapping;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod row;
pub mod score;
pub mod store;
pub mod teams;
