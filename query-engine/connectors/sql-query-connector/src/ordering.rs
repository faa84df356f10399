use crate::{Select, Visitor};
use query_structure::{Compiled, OrderBy, SkipPolicy, SkippedCondition};

impl<D: Visitor> Select<D> {
    /// Appends one `ORDER BY` entry per valid item, in input order. Items
    /// naming an invalid field go through the skip policy.
    pub fn order_by(&mut self, order_by: &[OrderBy], policy: SkipPolicy) -> Result<&mut Self, SkippedCondition> {
        for entry in order_by {
            let compiled = Compiled::from(entry.field_ref())
                .map(|field| format!("{} {}", D::visit_field(&field), entry.sort_order));

            if let Some(ordering) = policy.accept(&entry.field, compiled)? {
                self.ordering.push(ordering);
            }
        }

        Ok(self)
    }
}
