use crate::{FindQuery, PipelineQuery};
use bson::{Bson, Document};
use std::fmt::Write;
use tracing::debug;

// Shell-like rendering of the queries, for debugging.
pub(crate) fn log_find(coll_name: &str, query: &FindQuery) {
    let mut buffer = String::new();

    if fmt_find(&mut buffer, coll_name, query).is_ok() {
        debug!(target: "mongodb_query_connector::query", item_type = "query", is_query = true, query = %buffer);
    }
}

pub(crate) fn log_pipeline(coll_name: &str, query: &PipelineQuery) {
    let mut buffer = String::new();

    if fmt_pipeline(&mut buffer, coll_name, query).is_ok() {
        debug!(target: "mongodb_query_connector::query", item_type = "query", is_query = true, query = %buffer);
    }
}

macro_rules! write_indented {
    ($buffer:expr, $depth:expr, $fmt_str:literal, $($args:expr)*) => {
        write!($buffer, "{}{}", indent($depth), format!($fmt_str, $($args)*))?;
    };
}

fn fmt_find(buffer: &mut String, coll_name: &str, find: &FindQuery) -> std::fmt::Result {
    write!(buffer, "db.{coll_name}.find(")?;
    fmt_doc(buffer, &find.filter, 1)?;

    if !find.options.is_empty() {
        write!(buffer, ", ")?;
        fmt_doc(buffer, &find.options, 1)?;
    }

    write!(buffer, ")")
}

fn fmt_pipeline(buffer: &mut String, coll_name: &str, pipeline: &PipelineQuery) -> std::fmt::Result {
    write!(buffer, "db.{coll_name}.aggregate(")?;

    let stages: Vec<_> = pipeline
        .stages
        .iter()
        .map(|stage| Bson::Document(stage.clone()))
        .collect();

    fmt_list(buffer, &stages, 1)?;
    write!(buffer, ")")
}

#[cfg(debug_assertions)]
fn indent(depth: usize) -> String {
    " ".repeat(4 * depth)
}

#[cfg(not(debug_assertions))]
fn indent(_: usize) -> String {
    String::from(" ")
}

fn fmt_doc(buffer: &mut String, doc: &Document, depth: usize) -> std::fmt::Result {
    if cfg!(debug_assertions) {
        writeln!(buffer, "{{")?;
    } else {
        write!(buffer, "{{")?;
    }

    for (key, value) in doc {
        write_indented!(buffer, depth, "{}: ", key);
        fmt_val(buffer, value, depth)?;

        if cfg!(debug_assertions) {
            writeln!(buffer, ",")?;
        } else {
            write!(buffer, ",")?;
        }
    }

    write_indented!(buffer, depth.saturating_sub(1), "}}",);
    Ok(())
}

fn fmt_list(buffer: &mut String, list: &[Bson], depth: usize) -> std::fmt::Result {
    if cfg!(debug_assertions) {
        writeln!(buffer, "[")?;
    } else {
        write!(buffer, "[")?;
    }

    for item in list {
        write_indented!(buffer, depth, "",);
        fmt_val(buffer, item, depth)?;

        if cfg!(debug_assertions) {
            writeln!(buffer, ",")?;
        } else {
            write!(buffer, ",")?;
        }
    }

    write_indented!(buffer, depth.saturating_sub(1), "]",);
    Ok(())
}

fn fmt_val(buffer: &mut String, val: &Bson, depth: usize) -> std::fmt::Result {
    match val {
        Bson::Array(ary) => fmt_list(buffer, ary, depth + 1),
        Bson::Document(doc) => fmt_doc(buffer, doc, depth + 1),
        val => write!(buffer, "{val}"),
    }
}
