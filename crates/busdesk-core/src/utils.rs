//! Small helpers shared by the proxy and the list pages

/// Number of pages needed for `total` rows at `limit` rows per page
///
/// A zero `limit` yields zero pages.
#[must_use]
pub fn page_count(total: u64, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
}

/// Trim a raw search term, returning `None` when nothing is left
#[must_use]
pub fn normalize_search(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// Case-insensitive substring match
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Take the rows of one 1-based page out of an in-memory result set
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> Vec<T> {
    let skip = usize::try_from(u64::from(page.saturating_sub(1)) * u64::from(limit))
        .unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}

/// Extract the token from an `Authorization: Bearer <token>` header value
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Find the value of cookie `name` in a `Cookie` header value
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

/// Token a caller presented: the bearer `Authorization` value first, then
/// cookie `cookie_name` from any of the `Cookie` header values
#[must_use]
pub fn presented_token<'a, I>(authorization: Option<&'a str>, cookies: I, cookie_name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    authorization.and_then(bearer_token).or_else(|| {
        cookies
            .into_iter()
            .find_map(|header| cookie_value(header, cookie_name))
    })
}
