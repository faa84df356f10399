use crate::{CompilerConfig, QueryRequest};
use influxdb_query_connector::InfluxQueryBuilder;
use mongodb_query_connector::{bson::Document, MongoReadQueryBuilder};
use query_structure::{
    is_safe_identifier, FieldNameMapper, FilterExpression, OrderBy, PageWindow, PaginationSettings, QueryValue,
    SnakeCaseMapper,
};
use sql_query_connector::{Select, Visitor};
use tracing::warn;

/// A rendered SQL statement and its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<QueryValue>,
}

/// The arguments of `coll.find(filter, options)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MongoQuery {
    pub filter: Document,
    pub options: Document,
}

/// Compiles requests with one configuration.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    config: CompilerConfig,
    settings: PaginationSettings,
    default_order_by: Vec<OrderBy>,
}

/// A request after parsing, normalization and pagination.
struct Prepared {
    filter: FilterExpression,
    order_by: Vec<OrderBy>,
    fields: Vec<String>,
    window: PageWindow,
}

impl QueryCompiler {
    pub fn new(config: CompilerConfig) -> crate::Result<Self> {
        let config = config.validate()?;
        let default_order_by = config.default_ordering()?;
        let settings = config.pagination_settings();

        Ok(Self {
            config,
            settings,
            default_order_by,
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn compile_sql<D: Visitor>(&self, table: &str, request: &QueryRequest) -> crate::Result<SqlQuery> {
        let prepared = self.prepare(request)?;
        let policy = self.config.skip_policy;

        let mut select = Select::<D>::from_table(table);

        select
            .columns(prepared.fields)
            .filter(&prepared.filter, policy)?
            .order_by(&prepared.order_by, policy)?
            .paginate(prepared.window)?;

        let (sql, params) = select.build()?;

        Ok(SqlQuery { sql, params })
    }

    pub fn compile_mongo(&self, collection: &str, request: &QueryRequest) -> crate::Result<MongoQuery> {
        let (filter, options) = self.mongo_builder(collection, request)?.build();
        Ok(MongoQuery { filter, options })
    }

    /// The same read as an aggregation pipeline.
    pub fn compile_mongo_pipeline(&self, collection: &str, request: &QueryRequest) -> crate::Result<Vec<Document>> {
        Ok(self.mongo_builder(collection, request)?.build_pipeline())
    }

    pub fn compile_influx(&self, measurement: &str, request: &QueryRequest) -> crate::Result<String> {
        let prepared = self.prepare(request)?;
        let policy = self.config.skip_policy;

        let mut builder = InfluxQueryBuilder::new(measurement);

        builder
            .fields(prepared.fields)
            .filter(&prepared.filter, policy)?
            .order_by(&prepared.order_by, policy)?
            .paginate(prepared.window)?;

        Ok(builder.build()?)
    }

    fn mongo_builder(&self, collection: &str, request: &QueryRequest) -> crate::Result<MongoReadQueryBuilder> {
        let prepared = self.prepare(request)?;
        let policy = self.config.skip_policy;

        let mut builder = MongoReadQueryBuilder::new(collection);

        builder
            .filter(&prepared.filter, policy)?
            .order_by(&prepared.order_by, policy)?
            .paginate(prepared.window)?;

        if !prepared.fields.is_empty() {
            builder.project(&prepared.fields)?;
        }

        Ok(builder)
    }

    fn prepare(&self, request: &QueryRequest) -> crate::Result<Prepared> {
        let mut filter = request.filter.resolve()?;
        let mut order_by = OrderBy::with_default(request.order_by.resolve()?, self.default_order_by.clone());
        let mut fields = request.fields.clone();

        if self.config.normalize_field_names {
            SnakeCaseMapper.map_filter(&mut filter);
            SnakeCaseMapper.map_order_by(&mut order_by);
            SnakeCaseMapper.map_fields(&mut fields);
        }

        fields.retain(|field| {
            let safe = is_safe_identifier(field) && !field.starts_with('.') && !field.ends_with('.');

            if !safe {
                warn!(target: "query_compiler", field = field.as_str(), "Dropping projected field.");
            }

            safe
        });

        let window = request.pagination.window(&self.settings);

        Ok(Prepared {
            filter,
            order_by,
            fields,
            window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sql_query_connector::Postgres;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn unsafe_fields_are_dropped_with_a_warning() {
        let compiler = QueryCompiler::new(CompilerConfig::default()).unwrap();
        let request = QueryRequest::default().with_fields(["name", "name, password", ".hidden"]);

        let query = compiler.compile_sql::<Postgres>("users", &request).unwrap();

        assert_eq!("SELECT name FROM users", query.sql);
        assert!(logs_contain("Dropping projected field."));
        assert!(logs_contain("name, password"));
    }

    #[test]
    fn default_ordering_yields_to_the_request() {
        let config = CompilerConfig {
            default_order_by: Some("-created_at".into()),
            ..Default::default()
        };

        let compiler = QueryCompiler::new(config).unwrap();

        let defaulted = compiler.prepare(&QueryRequest::default()).unwrap();
        assert_eq!(vec![OrderBy::desc("created_at")], defaulted.order_by);

        let request = QueryRequest::default().with_order_by(crate::OrderInput::Grammar("name".into()));
        let explicit = compiler.prepare(&request).unwrap();
        assert_eq!(vec![OrderBy::asc("name")], explicit.order_by);
    }
}
