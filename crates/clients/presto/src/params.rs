//! Bound parameter transport.
//!
//! Presto binds parameters to a prepared statement: the statement text travels URL-encoded in
//! the `X-Presto-Prepared-Statement` request header and the submitted body is
//! `EXECUTE <name> USING <value>, ...`. Values are rendered as VARCHAR literals here, the only
//! place they are turned into statement syntax; the prepared text itself never contains them.

use url::form_urlencoded;

/// Renders a value as a Presto VARCHAR literal, doubling embedded single quotes.
pub fn varchar_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            literal.push('\'');
        }
        literal.push(ch);
    }
    literal.push('\'');
    literal
}

/// Value of the prepared statement header registering `sql` under `name`.
pub fn prepared_statement_header(name: &str, sql: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(sql.as_bytes()).collect();
    format!("{name}={encoded}")
}

/// Body executing the prepared statement `name` with `params` bound positionally.
pub fn execute_statement(name: &str, params: &[String]) -> String {
    let values = params
        .iter()
        .map(|value| varchar_literal(value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("EXECUTE {name} USING {values}")
}
