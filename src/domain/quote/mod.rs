//! Quote bounded context: the aggregate and its status lifecycle.

mod quote;
mod status;

pub use quote::Quote;
pub use status::{QuoteStatus, TransitionCheck, TransitionDenial, TransitionRule, TRANSITIONS};
