use std::collections::HashMap;

use serde_json::{Map, Value};

/// PostgreSQL truncates identifiers longer than this many bytes.
pub const MAX_IDENT_BYTES: usize = 63;

/// A single worksheet cell as typed by the spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    // Whole numbers arrive as 3.0 from some sheets.
                    if f.fract() == 0.0 && f.abs() < 9.0e15 {
                        Cell::Int(f as i64)
                    } else {
                        Cell::Float(f)
                    }
                }
            },
            Value::String(s) if s.is_empty() => Cell::Null,
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// Column type inferred from the cells of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE PRECISION",
            Self::Boolean => "BOOLEAN",
            Self::Text => "TEXT",
        }
    }

    fn infer<'a>(cells: impl Iterator<Item = &'a Cell>) -> Self {
        let mut inferred: Option<ColumnType> = None;
        for cell in cells {
            let kind = match cell {
                Cell::Null => continue,
                Cell::Bool(_) => Self::Boolean,
                Cell::Int(_) => Self::BigInt,
                Cell::Float(_) => Self::Double,
                Cell::Text(_) => return Self::Text,
            };
            inferred = Some(match (inferred, kind) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(Self::BigInt), Self::Double) | (Some(Self::Double), Self::BigInt) => Self::Double,
                _ => return Self::Text,
            });
        }
        inferred.unwrap_or(Self::Text)
    }

    /// JSON form of a cell for a column of this type.
    fn encode(&self, cell: &Cell) -> Value {
        match (self, cell) {
            (_, Cell::Null) => Value::Null,
            (Self::BigInt, Cell::Int(i)) => Value::from(*i),
            (Self::Double, Cell::Int(i)) => Value::from(*i as f64),
            (Self::Double, Cell::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            (Self::Boolean, Cell::Bool(b)) => Value::Bool(*b),
            (_, other) => other.to_text().map(Value::String).unwrap_or(Value::Null),
        }
    }
}

/// Rows of one worksheet, header applied, fully-empty rows removed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build a table from worksheet values where the first row is the header.
    pub fn from_values(name: &str, values: &[Vec<Value>]) -> Self {
        let Some((header, data)) = values.split_first() else {
            return Self {
                name: name.to_string(),
                columns: Vec::new(),
                rows: Vec::new(),
            };
        };

        let width = data.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);

        let mut rows: Vec<Vec<Cell>> = data
            .iter()
            .map(|row| {
                (0..width)
                    .map(|i| row.get(i).map(Cell::from_json).unwrap_or(Cell::Null))
                    .collect::<Vec<_>>()
            })
            .filter(|row| !row.iter().all(Cell::is_null))
            .collect();

        let header_names: Vec<Option<String>> = (0..width)
            .map(|i| header.get(i).and_then(header_name))
            .collect();

        // Drop unnamed columns that carry no data at all.
        let keep: Vec<bool> = header_names
            .iter()
            .enumerate()
            .map(|(i, h)| h.is_some() || rows.iter().any(|r| !r[i].is_null()))
            .collect();
        if keep.iter().any(|k| !k) {
            for row in &mut rows {
                let mut i = 0;
                row.retain(|_| {
                    let kept = keep[i];
                    i += 1;
                    kept
                });
            }
        }

        let columns = dedupe_columns(
            header_names
                .into_iter()
                .enumerate()
                .filter(|(i, _)| keep[*i])
                .map(|(i, h)| h.unwrap_or_else(|| format!("Unnamed: {i}")))
                .map(|column| {
                    let clamped = clamp_ident(&column, MAX_IDENT_BYTES);
                    if clamped.len() < column.len() {
                        tracing::warn!(
                            table = %name,
                            column = %column,
                            truncated = %clamped,
                            "column name too long, truncating"
                        );
                    }
                    clamped.to_string()
                })
                .collect(),
        );

        Self {
            name: name.to_string(),
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.columns.len())
            .map(|i| ColumnType::infer(self.rows.iter().map(|r| &r[i])))
            .collect()
    }

    /// Rows as JSON objects keyed by column name, cells coerced to `types`.
    pub fn records(&self, rows: &[Vec<Cell>], types: &[ColumnType]) -> Value {
        Value::Array(
            rows.iter()
                .map(|row| {
                    let mut object = Map::with_capacity(self.columns.len());
                    for ((column, ty), cell) in self.columns.iter().zip(types).zip(row) {
                        object.insert(column.clone(), ty.encode(cell));
                    }
                    Value::Object(object)
                })
                .collect(),
        )
    }
}

fn header_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!name.is_empty()).then_some(name)
}

/// Longest prefix of `name` within `max` bytes, cut on a char boundary.
fn clamp_ident(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Repeated names get `.1`, `.2`, ... suffixes in order of appearance.
/// The base name is shortened when the suffix would push it past the identifier limit.
fn dedupe_columns(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        while let Some(count) = seen.get_mut(&candidate) {
            *count += 1;
            let suffix = format!(".{count}");
            candidate = format!("{}{suffix}", clamp_ident(&name, MAX_IDENT_BYTES - suffix.len()));
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}
