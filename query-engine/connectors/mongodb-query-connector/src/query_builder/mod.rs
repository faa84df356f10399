mod read_query_builder;

pub use read_query_builder::*;
