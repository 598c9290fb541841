// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (Order, OrderedProduct, RequestedItem)
// - Commands (CreateOrder)
// - Errors (OrderError, ErrorKind)
// - Row reconstruction (flat store rows → orders)
// - Command handler (creation path)
// - Query handler (retrieval path)
//
// ============================================================================

pub mod command_handler;
pub mod commands;
pub mod errors;
pub mod query_handler;
pub mod reconstruct;
pub mod value_objects;

pub use command_handler::OrderCommandHandler;
pub use commands::CreateOrder;
pub use errors::{ErrorKind, OrderError};
pub use query_handler::OrderQueryHandler;
pub use reconstruct::OrderRow;
pub use value_objects::Order;

#[cfg(test)]
pub use reconstruct::rows_to_orders;
#[cfg(test)]
pub use value_objects::{OrderedProduct, RequestedItem};
