//! Route handlers.

mod about;
mod index;

pub use about::{AboutController, AUTHOR_VIEW, LICENCE_VIEW, SPECIFICATION_VIEW};
pub use index::{IndexController, OPERATOR_OPTION_VIEW, RESULTS_VIEW, SHOW_ENTRY_VIEW};
