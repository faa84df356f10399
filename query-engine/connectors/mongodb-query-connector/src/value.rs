use bson::Bson;
use query_structure::QueryValue;

pub trait IntoBson {
    fn into_bson(self) -> Bson;
}

impl IntoBson for QueryValue {
    fn into_bson(self) -> Bson {
        match self {
            QueryValue::Null => Bson::Null,
            QueryValue::Boolean(b) => Bson::Boolean(b),
            QueryValue::Int(i) => Bson::Int64(i),
            QueryValue::Float(f) => Bson::Double(f),
            QueryValue::String(s) => Bson::String(s),
            QueryValue::List(list) => Bson::Array(list.into_iter().map(IntoBson::into_bson).collect()),
        }
    }
}

impl IntoBson for Vec<QueryValue> {
    fn into_bson(self) -> Bson {
        QueryValue::List(self).into_bson()
    }
}
