pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod report;
pub mod routes;
pub mod scan;
pub mod util;
pub mod watch;

pub use model::{Group, HttpMethod, ParseResult, Route};
pub use routes::{ParserOptions, RouteParser, parse_source};
