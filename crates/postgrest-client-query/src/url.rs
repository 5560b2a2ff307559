//! Query-string merging for request URLs.
//!
//! Every filter and transform call funnels through [`merge_params`], which
//! rebuilds the query section of the URL from scratch: existing pairs first
//! (in discovery order), new pairs appended. A key written again replaces
//! its previous value (last write wins).

use url::Url;

/// Merge `params` into the query string of `url`.
///
/// - An empty `params` returns the URL unchanged (no spurious `?`).
/// - Pairs already on the URL keep their order; a key present in `params`
///   drops its old pair and the new one is appended.
/// - Existing pairs without a key or a value (`?flag`, `?a=`) are dropped.
/// - Keys and values are percent-encoded; only RFC 3986 unreserved
///   characters stay literal, so `& = ? # +` and non-ASCII never leak.
pub fn merge_params<I, K, V>(url: &Url, params: I) -> Url
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut incoming: Vec<(String, String)> = Vec::new();
    for (key, value) in params {
        let key = key.as_ref().to_string();
        incoming.retain(|(k, _)| *k != key);
        incoming.push((key, value.as_ref().to_string()));
    }
    if incoming.is_empty() {
        return url.clone();
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .filter(|(k, _)| !incoming.iter().any(|(key, _)| key == k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.extend(incoming);

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut merged = url.clone();
    merged.set_query(Some(&query));
    merged
}

/// Decoded value of the first `key` pair on the URL, if any.
pub fn get_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn pairs(u: &Url) -> Vec<(String, String)> {
        u.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn empty_params_is_noop() {
        let base = url("https://x/y?z=1");
        let merged = merge_params(&base, Vec::<(&str, &str)>::new());
        assert_eq!(merged, base);

        let bare = url("https://x/y");
        assert_eq!(
            merge_params(&bare, Vec::<(&str, &str)>::new()).as_str(),
            "https://x/y"
        );
    }

    #[test]
    fn keeps_existing_and_appends_new() {
        let merged = merge_params(&url("https://x/y?z=1"), [("a", "eq.2")]);
        assert_eq!(merged.as_str(), "https://x/y?z=1&a=eq.2");
        assert_eq!(
            pairs(&merged),
            vec![
                ("z".to_string(), "1".to_string()),
                ("a".to_string(), "eq.2".to_string())
            ]
        );
    }

    #[test]
    fn adds_query_to_bare_url() {
        let merged = merge_params(&url("http://localhost:3000/users"), [("select", "*")]);
        assert_eq!(merged.as_str(), "http://localhost:3000/users?select=%2A");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let merged = merge_params(&url("https://x/y"), [("name", "eq.a&b=c?d#e+f")]);
        assert_eq!(
            merged.query(),
            Some("name=eq.a%26b%3Dc%3Fd%23e%2Bf")
        );
        assert_eq!(get_param(&merged, "name").as_deref(), Some("eq.a&b=c?d#e+f"));
    }

    #[test]
    fn non_ascii_is_escaped() {
        let merged = merge_params(&url("https://x/y"), [("city", "eq.Zürich")]);
        assert_eq!(merged.query(), Some("city=eq.Z%C3%BCrich"));
    }

    #[test]
    fn last_write_wins() {
        let once = merge_params(&url("https://x/y?age=gt.1&select=id"), [("age", "gt.5")]);
        assert_eq!(
            pairs(&once),
            vec![
                ("select".to_string(), "id".to_string()),
                ("age".to_string(), "gt.5".to_string())
            ]
        );
    }

    #[test]
    fn drops_existing_pairs_without_value() {
        let merged = merge_params(&url("https://x/y?flag&z=1&empty=&=v"), [("a", "eq.2")]);
        assert_eq!(merged.as_str(), "https://x/y?z=1&a=eq.2");
    }

    #[test]
    fn repeated_merge_is_idempotent() {
        let base = url("https://x/y");
        let once = merge_params(&base, [("id", "eq.1")]);
        let twice = merge_params(&once, [("id", "eq.1")]);
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_keys_within_one_call_collapse() {
        let merged = merge_params(&url("https://x/y"), [("id", "eq.1"), ("id", "eq.2")]);
        assert_eq!(merged.query(), Some("id=eq.2"));
    }

    #[test]
    fn already_encoded_values_survive_remerge() {
        let first = merge_params(&url("https://x/y"), [("tags", "cs.{a,b}")]);
        let second = merge_params(&first, [("limit", "10")]);
        assert_eq!(get_param(&second, "tags").as_deref(), Some("cs.{a,b}"));
        assert_eq!(second.query(), Some("tags=cs.%7Ba%2Cb%7D&limit=10"));
    }

    #[test]
    fn get_param_missing() {
        assert_eq!(get_param(&url("https://x/y?a=1"), "b"), None);
    }
}
