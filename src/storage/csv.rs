//! Tabular (CSV) rendering of search results
//!
//! Each result becomes one row. Specifications are spread into
//! `spec_<name>` columns; the column set is the union over all rows.

use crate::results::SearchResult;
use std::collections::HashMap;

/// Columns every row carries, in output order
const BASE_COLUMNS: [&str; 6] = ["description", "location", "price", "contact", "website", "datetime"];

/// Prefix for specification columns
pub const SPEC_PREFIX: &str = "spec_";

/// Flattened results ready to be written as CSV
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<HashMap<String, String>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value, if the row has one for `column`
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Render with a header line; absent cells are left empty
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, self.columns.iter().map(String::as_str));
        for row in &self.rows {
            push_line(
                &mut out,
                self.columns
                    .iter()
                    .map(|c| row.get(c).map(String::as_str).unwrap_or("")),
            );
        }
        out
    }
}

/// Flatten results into a table.
///
/// When a result repeats a specification name the later value wins.
pub fn flatten(results: &[SearchResult]) -> Table {
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut rows = Vec::with_capacity(results.len());

    for result in results {
        let mut row = HashMap::new();
        row.insert("description".to_string(), result.description.clone());
        row.insert("location".to_string(), result.location.clone());
        if let Some(ref price) = result.price {
            row.insert("price".to_string(), price.clone());
        }
        if let Some(ref contact) = result.contact {
            row.insert("contact".to_string(), contact.clone());
        }
        row.insert("website".to_string(), result.website.clone());
        row.insert("datetime".to_string(), result.datetime.to_rfc3339());

        for spec in &result.specifications {
            let column = format!("{}{}", SPEC_PREFIX, spec.name);
            if !columns.contains(&column) {
                columns.push(column.clone());
            }
            row.insert(column, spec.value.clone());
        }
        rows.push(row);
    }

    Table { columns, rows }
}

fn push_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line = fields.map(escape).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

fn escape(field: &str) -> String {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_spec_name_keeps_later_value() {
        let result = SearchResult::new("Hauler", "Raleigh, NC", "https://a.example.com")
            .with_spec("Hours", "1200")
            .with_spec("Hours", "1500");
        let table = flatten(&[result]);

        assert_eq!(table.cell(0, "spec_Hours"), Some("1500"));
        assert_eq!(
            table.columns().iter().filter(|c| *c == "spec_Hours").count(),
            1
        );
    }

    #[test]
    fn test_columns_are_union_across_rows() {
        let a = SearchResult::new("A", "X", "w").with_spec("Hours", "10");
        let b = SearchResult::new("B", "Y", "w").with_spec("Capacity", "5000 lb");
        let table = flatten(&[a, b]);

        assert_eq!(
            &table.columns()[BASE_COLUMNS.len()..],
            &["spec_Hours".to_string(), "spec_Capacity".to_string()]
        );
        assert_eq!(table.cell(0, "spec_Capacity"), None);
        assert_eq!(table.cell(1, "spec_Hours"), None);

        let csv = table.to_csv();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "description,location,price,contact,website,datetime,spec_Hours,spec_Capacity"
        );
        assert!(lines[1].starts_with("A,X,,,w,"));
        assert!(lines[1].ends_with(",10,"));
        assert!(lines[2].ends_with(",,5000 lb"));
    }

    #[test]
    fn test_escaping() {
        let result = SearchResult::new("Boom lift, 60\" platform", "Austin, TX", "w")
            .with_contact("line one\nline two");
        let csv = flatten(&[result]).to_csv();

        assert!(csv.contains("\"Boom lift, 60\"\" platform\""));
        assert!(csv.contains("\"Austin, TX\""));
        assert!(csv.contains("\"line one\nline two\""));
    }

    #[test]
    fn test_empty_results() {
        let table = flatten(&[]);
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
