//! The backend agnostic description of a read: a canonical filter tree, an
//! ordering and a page window, plus the pieces shared by every dialect
//! compiler (operator vocabulary, identifier allow-list, skip handling).

mod compiled;
mod date_part;
mod error;
mod field_mapper;
mod ident;
mod operator;
mod order_by;

pub mod filter;
pub mod pagination;

pub use compiled::*;
pub use date_part::*;
pub use error::*;
pub use field_mapper::*;
pub use filter::*;
pub use ident::*;
pub use operator::*;
pub use order_by::*;
pub use pagination::{
    CursorPosition, CursorToken, PageWindow, Paginate, Pagination, PaginationParams, PaginationSettings,
};

pub use query_value::{Params, QueryValue};
