pub mod analyzers;
pub mod config;
pub mod duration;
pub mod logging;
pub mod model;
pub mod output;
pub mod source;
