pub mod counters;
pub mod outcome;
pub mod result;
pub mod tree;

pub use counters::{Counter, Counters};
pub use outcome::Outcome;
pub use result::{Browser, BrowserResult, SpecResult};
pub use tree::{BrowserSuite, BrowserTotals, ClassSuite, ReportTree, TestCase};
