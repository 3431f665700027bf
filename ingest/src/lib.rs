pub mod parser;
pub mod reconcile;

pub use parser::{parse, parse_all, ParseError, ResultRecord};
pub use reconcile::{reconcile, Reconciliation};
