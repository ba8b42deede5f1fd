/// Collapse the whitespace in a multi-line SQL literal so logged queries
/// stay on one line.
pub fn sql(query: &str) -> String {
    query.split_whitespace().collect::<Vec<&str>>().join(" ")
}
