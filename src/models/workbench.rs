//! Workbench report exports.

use serde::Serialize;

use super::scan::ExportFormat;

/// One workbench filter, sent as `filter.N.filter`, `filter.N.quality`,
/// `filter.N.value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbenchFilter {
    pub filter: String,
    pub quality: String,
    pub value: String,
}

impl WorkbenchFilter {
    pub fn new(filter: &str, quality: &str, value: impl ToString) -> Self {
        Self {
            filter: filter.to_string(),
            quality: quality.to_string(),
            value: value.to_string(),
        }
    }
}

/// Query parameters of `GET workbenches/export`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbenchExportOptions {
    pub format: ExportFormat,
    pub report: String,
    pub chapter: String,
    /// Days of history to include; `0` means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<u32>,
    #[serde(rename = "filter", skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<WorkbenchFilter>,
    #[serde(rename = "filter.search_type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
}

impl Default for WorkbenchExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Nessus,
            report: "vulnerabilities".to_string(),
            chapter: "vuln_by_plugin".to_string(),
            date_range: None,
            filters: Vec::new(),
            search_type: None,
        }
    }
}

impl WorkbenchExportOptions {
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_filter(mut self, filter: WorkbenchFilter) -> Self {
        self.filters.push(filter);
        self.search_type.get_or_insert_with(|| "and".to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiRequest;

    #[test]
    fn test_options_flatten_to_query() {
        let options = WorkbenchExportOptions::default()
            .with_format(ExportFormat::Csv)
            .with_filter(WorkbenchFilter::new("severity", "eq", "Critical"));

        let request = ApiRequest::get("workbenches/export").query(&options).unwrap();
        let pairs = request.query_pairs();

        for expected in [
            ("format", "csv"),
            ("report", "vulnerabilities"),
            ("chapter", "vuln_by_plugin"),
            ("filter.0.filter", "severity"),
            ("filter.0.quality", "eq"),
            ("filter.0.value", "Critical"),
            ("filter.search_type", "and"),
        ] {
            assert!(
                pairs.contains(&(expected.0.to_string(), expected.1.to_string())),
                "missing {:?} in {:?}",
                expected,
                pairs
            );
        }
    }
}
