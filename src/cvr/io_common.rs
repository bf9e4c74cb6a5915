use std::path::Path;

/// The cells of a ballot table, before any interpretation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// The line of the first row in the source file (the header is line 1).
    pub first_lineno: usize,
}

impl Table {
    /// Keeps the first `limit` rows, or all of them.
    pub fn limited(self, limit: Option<usize>) -> Table {
        match limit {
            Some(n) if n < self.rows.len() => Table {
                rows: self.rows.into_iter().take(n).collect(),
                ..self
            },
            _ => self,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputProvider {
    Csv,
    Xlsx,
}

impl InputProvider {
    pub fn parse(s: &str) -> Option<InputProvider> {
        match s {
            "csv" => Some(InputProvider::Csv),
            // ES&S tabulators export to Excel.
            "xlsx" | "ess" => Some(InputProvider::Xlsx),
            _ => None,
        }
    }

    pub fn from_path(path: &str) -> InputProvider {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => InputProvider::Xlsx,
            _ => InputProvider::Csv,
        }
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit() {
        let table = Table {
            header: vec!["Cast Vote Record".to_string()],
            rows: vec![vec!["1".to_string()], vec!["2".to_string()], vec!["3".to_string()]],
            first_lineno: 2,
        };
        assert_eq!(table.clone().limited(None).rows.len(), 3);
        assert_eq!(table.clone().limited(Some(10)).rows.len(), 3);
        let first = table.limited(Some(2));
        assert_eq!(first.rows, vec![vec!["1".to_string()], vec!["2".to_string()]]);
        assert_eq!(first.first_lineno, 2);
    }

    #[test]
    fn providers() {
        assert_eq!(InputProvider::parse("csv"), Some(InputProvider::Csv));
        assert_eq!(InputProvider::parse("ess"), Some(InputProvider::Xlsx));
        assert_eq!(InputProvider::parse("cdf"), None);
        assert_eq!(InputProvider::from_path("ward9.XLSX"), InputProvider::Xlsx);
        assert_eq!(InputProvider::from_path("ward9_fall18.csv"), InputProvider::Csv);
        assert_eq!(simplify_file_name("/data/ward9_fall18.csv"), "ward9_fall18.csv");
    }
}
