mod dto;
mod flow;
mod validation;

pub use dto::{CreatedOrder, CustomerDetails, Field, OrderPayload};
pub use flow::{CheckoutError, CheckoutFlow, CheckoutPhase};
pub use validation::validate_customer;
