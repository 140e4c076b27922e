//! Regular pattern algebra and regular expression syntax for the
//! [`reglang`] crate.
//!
//! The [`RegularPattern`] trait is the capability every representation of a
//! regular language implements: grammar nodes, regular expression trees and
//! the automata themselves all build with the same operations. The crate
//! also provides the two regular expression representations bridging
//! automata back to text: the algebraic [`SimpleRegex`] and the printable
//! [`RegexPattern`] with its dialect encoders.
//!
//! [`reglang`]: <https://github.com/timothee-haudebourg/reglang-rs>
pub mod pattern;
pub use pattern::{Repeat, RegularPattern};

pub mod simple;
pub use simple::{SimpleRegex, ToRegex};

pub mod regex;
pub use regex::RegexPattern;

pub mod dialect;
pub use dialect::{Dialect, ECMASCRIPT, ECMASCRIPT_LITERAL, SWIFT_REGEX};
