//! Quote command handlers.

mod delete_quote;
mod override_price;
mod transition_quote;

pub use delete_quote::{DeleteQuoteCommand, DeleteQuoteHandler};
pub use override_price::{OverridePriceCommand, OverridePriceHandler, OverridePriceResult};
pub use transition_quote::{
    TransitionQuoteCommand, TransitionQuoteHandler, TransitionQuoteResult,
};
