#![forbid(unsafe_code)]

pub mod charts;
pub mod clean;
pub mod cli;
pub mod crawl;
pub mod dataset;
pub mod detail;
pub mod fetch;
pub mod formats;
mod html;
pub mod listing;
pub mod logging;
pub mod pipeline;
pub mod report;
