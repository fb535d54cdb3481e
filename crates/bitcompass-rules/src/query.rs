//! Query-string construction for the REST `rules` endpoint.

use bitcompass_core::RuleKind;

/// Upper bound the client asks for in one page.
pub const MAX_LIMIT: u32 = 100;

/// Filters shared by list and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFilter {
    pub kind: Option<RuleKind>,
    pub limit: u32,
}

impl RuleFilter {
    #[must_use]
    pub const fn new(kind: Option<RuleKind>, limit: u32) -> Self {
        Self { kind, limit }
    }

    fn clamped_limit(self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// `select=*&order=created_at.desc&limit=N[&kind=eq.K]`
pub(crate) fn list_query(filter: RuleFilter) -> String {
    let mut query = format!(
        "select=*&order=created_at.desc&limit={}",
        filter.clamped_limit()
    );
    if let Some(kind) = filter.kind {
        query.push_str(&format!("&kind=eq.{kind}"));
    }
    query
}

/// List query plus a case-insensitive match on title, description or body.
pub(crate) fn search_query(term: &str, filter: RuleFilter) -> String {
    let pattern = quote_filter_value(&format!("*{}*", like_literal(term.trim())));
    let or = format!("(title.ilike.{pattern},description.ilike.{pattern},body.ilike.{pattern})");
    format!("{}&or={}", list_query(filter), urlencoding::encode(&or))
}

/// `select=*&id=eq.<id>&limit=1`
pub(crate) fn id_query(id: &str) -> String {
    format!("select=*&id=eq.{}&limit=1", urlencoding::encode(id.trim()))
}

/// Make `%`, `_` and `\` match themselves inside an `ilike` pattern.
///
/// The REST layer rewrites every `*` to `%` before escapes apply, so a literal
/// `*` cannot be expressed; it becomes the single-character wildcard `_`.
fn like_literal(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '*' => out.push('_'),
            other => out.push(other),
        }
    }
    out
}

/// Double-quote a filter value so `,` `.` `(` `)` inside it are literal.
fn quote_filter_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
