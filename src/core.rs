//! Session core: language catalog, history, translation provider and the
//! session manager tying them together.

pub mod catalog;
pub mod history;
pub mod session;
pub mod translator;
