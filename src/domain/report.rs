use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Date(DateTime<Utc>),
    Empty,
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map_or(Cell::Empty, Cell::Text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub work_items: Table,
    pub files_in_modules: Table,
}

impl Report {
    pub fn tables(&self) -> [&Table; 2] {
        [&self.work_items, &self.files_in_modules]
    }
}
