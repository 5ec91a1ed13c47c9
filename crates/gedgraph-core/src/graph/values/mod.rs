//! Typed property values
//!
//! Each value keeps the raw text it was parsed from. Text that does not
//! parse is retained verbatim and the value reports itself invalid.

mod date;
mod name;
mod sex;

pub use date::{DateFormat, DateValue};
pub use name::NameValue;
pub use sex::SexValue;
