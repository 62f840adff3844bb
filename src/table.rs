//! Conversion of JSON data into tables, and CSV export.

use std::{borrow::Cow, fs::File, io, path::Path};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::Error;

/// The column name used when normalizing a list of scalar values.
pub const SCALAR_COLUMN: &str = "Column_A";

/// A rectangular table: named columns, and rows with one value (possibly
/// null) per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// The column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in order. Every row has exactly one value per column.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value in the given row and column, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Write the table as CSV: a header row with the column names, then one
    /// record per row. No index column is added.
    pub fn write_csv<W: io::Write>(&self, w: W) -> Result<(), Error> {
        let mut wtr = csv::Writer::from_writer(w);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| cell_text(v).into_owned()))?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn from_records(records: Vec<IndexMap<String, Value>>) -> Self {
        let columns: IndexSet<String> = records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect();

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.swap_remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }
}

/// The text of a single cell: empty for null, strings as-is, anything else
/// as compact JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// The input shapes [normalize] recognizes, checked in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    /// A single mapping, converted to one row.
    Record(&'a Map<String, Value>),
    /// A list where every element is a mapping (including the empty list).
    Records {
        /// The elements.
        records: Vec<&'a Map<String, Value>>,
        /// Whether any element has a mapping or list as a value.
        nested: bool,
    },
    /// A list with no mapping elements, converted to a single column.
    Scalars(&'a [Value]),
    /// A list with both mapping and non-mapping elements. Rejected.
    Mixed,
    /// Anything else, e.g. a bare string or number. Rejected.
    Unsupported,
}

impl<'a> Shape<'a> {
    /// Classify a JSON value.
    pub fn of(data: &'a Value) -> Self {
        let items = match data {
            Value::Object(map) => return Shape::Record(map),
            Value::Array(items) => items,
            _ => return Shape::Unsupported,
        };

        let records: Vec<_> = items.iter().filter_map(Value::as_object).collect();
        if records.len() == items.len() {
            let nested = records
                .iter()
                .any(|r| r.values().any(|v| v.is_object() || v.is_array()));
            Shape::Records { records, nested }
        } else if records.is_empty() {
            Shape::Scalars(items)
        } else {
            Shape::Mixed
        }
    }
}

/// Convert JSON data into a table.
///
/// - A mapping becomes one row. Nested mappings are flattened into dotted
///   column names, so `{"a": {"x": 1}}` has the column `a.x`.
/// - A list of mappings becomes one row per element, flattened the same way
///   whenever any element is nested. The columns are the union of all keys,
///   in order of first appearance; missing cells are null.
/// - A list of scalars becomes a single column named [SCALAR_COLUMN].
///
/// Lists held as values are kept as cell values. A list mixing mappings and
/// scalars, or a bare scalar, is rejected with [Error::DataShape].
pub fn normalize(data: &Value) -> Result<Table, Error> {
    let table = match Shape::of(data) {
        Shape::Record(record) => Table::from_records(vec![flatten(record)]),
        Shape::Records {
            records,
            nested: true,
        } => Table::from_records(records.into_iter().map(flatten).collect()),
        Shape::Records {
            records,
            nested: false,
        } => Table::from_records(
            records
                .into_iter()
                .map(|r| r.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .collect(),
        ),
        Shape::Scalars(values) => Table {
            columns: vec![SCALAR_COLUMN.to_owned()],
            rows: values.iter().map(|v| vec![v.clone()]).collect(),
        },
        Shape::Mixed => {
            return Err(shape_error("mixed types: expected either all-mapping or all-scalar"));
        }
        Shape::Unsupported => {
            return Err(shape_error(
                "expected a mapping, a list of mappings, or a list of scalars",
            ));
        }
    };

    Ok(table)
}

fn shape_error(msg: &str) -> Error {
    let err = Error::DataShape(msg.to_owned());
    error!("{err}");
    err
}

fn flatten(record: &Map<String, Value>) -> IndexMap<String, Value> {
    let mut out = IndexMap::new();
    flatten_into(None, record, &mut out);
    out
}

fn flatten_into(
    prefix: Option<&str>,
    record: &Map<String, Value>,
    out: &mut IndexMap<String, Value>,
) {
    for (key, value) in record {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(inner) => flatten_into(Some(&name), inner, out),
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

/// Convert JSON data into a table with [normalize] and write it to a CSV
/// file. If the data can't be converted, nothing is written and no file is
/// created.
pub fn export_csv(data: &Value, destination: impl AsRef<Path>) -> Result<(), Error> {
    let destination = destination.as_ref();
    let table = normalize(data)?;

    let file = File::create(destination).inspect_err(|e| {
        error!("Data export to {} failed: {e}", destination.display());
    })?;

    table.write_csv(file).inspect_err(|e| {
        error!("Data export to {} failed: {e}", destination.display());
    })?;

    info!("Data successfully exported to {}", destination.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn single_record() {
        let table = normalize(&json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.rows(), [vec![json!(1), json!(2)]]);
    }

    #[test]
    fn single_nested_record() {
        let table = normalize(&json!({"id": 1, "owner": {"name": "x", "meta": {"tz": "UTC"}}}))
            .unwrap();
        assert_eq!(table.columns(), ["id", "owner.name", "owner.meta.tz"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "owner.meta.tz"), Some(&json!("UTC")));
    }

    #[test]
    fn records_take_column_union() {
        let table = normalize(&json!([{"a": 1}, {"a": 2, "b": 3}])).unwrap();
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(
            table.rows(),
            [vec![json!(1), Value::Null], vec![json!(2), json!(3)]]
        );
    }

    #[test]
    fn nested_records_are_flattened() {
        let table = normalize(&json!([{"a": {"x": 1}}, {"a": {"x": 2}}])).unwrap();
        assert_eq!(table.columns(), ["a.x"]);
        assert_eq!(table.rows(), [vec![json!(1)], vec![json!(2)]]);
    }

    #[test]
    fn heterogeneous_nesting_flattens_everything() {
        let data = json!([{"a": 1, "b": {"c": 2}}, {"a": 3, "b": 4}]);
        assert_matches!(Shape::of(&data), Shape::Records { nested: true, .. });

        let table = normalize(&data).unwrap();
        assert_eq!(table.columns(), ["a", "b.c", "b"]);
        assert_eq!(
            table.rows(),
            [
                vec![json!(1), json!(2), Value::Null],
                vec![json!(3), Value::Null, json!(4)]
            ]
        );
    }

    #[test]
    fn lists_stay_as_values() {
        let data = json!([{"name": "x", "groups": ["a", "b"]}]);
        assert_matches!(Shape::of(&data), Shape::Records { nested: true, .. });

        let table = normalize(&data).unwrap();
        assert_eq!(table.columns(), ["name", "groups"]);
        assert_eq!(table.get(0, "groups"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn scalars() {
        let table = normalize(&json!([1, 2, 3])).unwrap();
        assert_eq!(table.columns(), [SCALAR_COLUMN]);
        assert_eq!(table.rows(), [vec![json!(1)], vec![json!(2)], vec![json!(3)]]);
    }

    #[test]
    fn empty_list() {
        let table = normalize(&json!([])).unwrap();
        assert!(table.columns().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn mixed_list_is_rejected() {
        let data = json!([{"a": 1}, 2]);
        assert_eq!(Shape::of(&data), Shape::Mixed);
        assert_matches!(normalize(&data), Err(Error::DataShape(msg)) if msg.contains("mixed types"));
    }

    #[test]
    fn scalars_are_rejected() {
        for data in [json!(1), json!("x"), Value::Null, json!(true)] {
            assert_eq!(Shape::of(&data), Shape::Unsupported);
            assert_matches!(normalize(&data), Err(Error::DataShape(_)));
        }
    }

    #[test]
    fn csv_rendering() {
        let table = normalize(&json!([
            {"name": "a, b", "n": 1.5, "ok": true, "tags": ["x"]},
            {"name": "c"}
        ]))
        .unwrap();

        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "name,n,ok,tags\n\"a, b\",1.5,true,\"[\"\"x\"\"]\"\nc,,,\n"
        );
    }

    #[test]
    fn export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        let data = json!([{"a": 1}, {"a": 2, "b": 3}, {"b": 4}]);

        export_csv(&data, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines, ["a,b", "1,", "2,3", ",4"]);
    }

    #[test]
    fn export_of_bad_shape_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");

        let result = export_csv(&json!([{"a": 1}, 2]), &path);
        assert_matches!(result, Err(Error::DataShape(_)));
        assert!(!path.exists());
    }
}
