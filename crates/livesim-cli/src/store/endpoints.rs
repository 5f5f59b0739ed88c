//! Table store URL builders
//!
//! Helper functions to construct PostgREST endpoint URLs.

use crate::store::types::EqFilter;

/// Path prefix of the REST interface under the project URL
pub const REST_PREFIX: &str = "/rest/v1";

/// Build the URL addressing a whole table
pub fn table_url(base_url: &str, table: &str) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        REST_PREFIX,
        urlencoding::encode(table)
    )
}

/// Build a table URL narrowed by equality filters (all must hold)
pub fn filtered_table_url(base_url: &str, table: &str, filters: &[EqFilter]) -> String {
    let mut url = table_url(base_url, table);

    for (i, filter) in filters.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(&urlencoding::encode(&filter.column));
        url.push('=');
        url.push_str(&filter_expression(filter));
    }

    url
}

/// Render the right-hand side of a filter, e.g. `eq.T1` or `is.null`
pub fn filter_expression(filter: &EqFilter) -> String {
    match filter.value {
        Some(ref value) => format!("eq.{}", urlencoding::encode(value)),
        None => "is.null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let url = table_url("https://demo.supabase.co", "SmartTransit_Integrated");
        assert_eq!(url, "https://demo.supabase.co/rest/v1/SmartTransit_Integrated");
    }

    #[test]
    fn test_table_url_trailing_slash() {
        let url = table_url("https://demo.supabase.co/", "trips");
        assert_eq!(url, "https://demo.supabase.co/rest/v1/trips");
    }

    #[test]
    fn test_filtered_table_url() {
        let filters = vec![
            EqFilter::new("datetime", Some("2024-01-01T00:00:00".to_string())),
            EqFilter::new("trip_id", Some("T 1&2".to_string())),
        ];
        let url = filtered_table_url("https://demo.supabase.co", "trips", &filters);
        assert_eq!(
            url,
            "https://demo.supabase.co/rest/v1/trips?datetime=eq.2024-01-01T00%3A00%3A00&trip_id=eq.T%201%262"
        );
    }

    #[test]
    fn test_null_filter_expression() {
        let filter = EqFilter::new("trip_id", None);
        assert_eq!(filter_expression(&filter), "is.null");
    }
}
