use bson::Document;
use query_structure::{Compiled, OrderBy, SkipPolicy, SkippedCondition};

/// `{ field: 1 | -1 }` in input order, `None` when no entry survives.
pub fn order_document(order_by: &[OrderBy], policy: SkipPolicy) -> Result<Option<Document>, SkippedCondition> {
    let mut order = Document::new();

    for entry in order_by {
        let compiled = Compiled::from(entry.field_ref()).map(|field| field.dotted());

        if let Some(key) = policy.accept(&entry.field, compiled)? {
            let direction: i32 = if entry.sort_order.is_descending() { -1 } else { 1 };
            order.insert(key, direction);
        }
    }

    Ok(Some(order).filter(|order| !order.is_empty()))
}
