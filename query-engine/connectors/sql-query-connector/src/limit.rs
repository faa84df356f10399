use crate::{Select, Visitor};
use query_structure::{ensure_identifier, InvariantViolation, PageWindow, QueryValue};

impl<D: Visitor> Select<D> {
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Applies a page window: its limit and offset, and for a cursor a
    /// `field > ?` predicate on the last seen key.
    pub fn paginate(&mut self, window: PageWindow) -> Result<&mut Self, InvariantViolation> {
        if let Some(after) = window.after {
            let field = ensure_identifier(&after.field)?;

            self.conditions.push(format!("{field} > {}", D::C_PARAM));
            self.parameters.push(QueryValue::Int(after.last_id));
        }

        self.limit = window.limit;
        self.offset = window.offset;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Postgres, Select};
    use pretty_assertions::assert_eq;
    use query_structure::{CursorPosition, InvariantViolation, PageWindow, QueryValue};

    #[test]
    fn cursor_windows_add_a_predicate() {
        let mut select = Select::<Postgres>::from_table("users");

        select
            .paginate(PageWindow {
                limit: Some(10),
                offset: None,
                after: Some(CursorPosition {
                    field: "id".into(),
                    last_id: 42,
                }),
            })
            .unwrap();

        let (sql, params) = select.build().unwrap();

        assert_eq!("SELECT * FROM users WHERE id > $1 LIMIT 10", sql);
        assert_eq!(vec![QueryValue::Int(42)], params);
    }

    #[test]
    fn unsafe_cursor_fields_are_rejected() {
        let mut select = Select::<Postgres>::from_table("users");

        let res = select.paginate(PageWindow {
            limit: Some(10),
            offset: None,
            after: Some(CursorPosition {
                field: "id; --".into(),
                last_id: 1,
            }),
        });

        assert_eq!(
            Err(InvariantViolation::UnsafeIdentifier("id; --".into())),
            res.map(|_| ())
        );
    }
}
