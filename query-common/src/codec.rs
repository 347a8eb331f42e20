use url::form_urlencoded;
use url::Url;

use crate::error::QueryError;
use crate::models::{QueryState, QueryValue};

/// 解析查询字符串
///
/// `key[]=a&key[]=b` 或 `key[0]=a&key[1]=b` 合并为多值参数；普通参数重复出现时后者覆盖前者。
pub fn parse_query(input: &str) -> QueryState {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut state = QueryState::new();

    for (raw_key, value) in form_urlencoded::parse(input.as_bytes()) {
        match list_key(&raw_key) {
            Some(name) => {
                let mut values = match state.get(name) {
                    Some(QueryValue::List(existing)) => existing.clone(),
                    _ => Vec::new(),
                };
                values.push(value.into_owned());
                state.set(name, values);
            }
            None => state.set(raw_key.into_owned(), value.into_owned()),
        }
    }

    state
}

// `name[]` / `name[3]` -> `name`
fn list_key(key: &str) -> Option<&str> {
    let open = key.find('[')?;
    if open == 0 || !key.ends_with(']') {
        return None;
    }
    Some(&key[..open])
}

/// 序列化查询状态，空值参数不输出
pub fn to_query_string(state: &QueryState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in state.iter() {
        match value {
            QueryValue::Single(single) => {
                if !single.is_empty() {
                    serializer.append_pair(key, single);
                }
            }
            QueryValue::List(values) => {
                let list_key = format!("{}[]", key);
                for item in values {
                    serializer.append_pair(&list_key, item);
                }
            }
        }
    }
    serializer.finish()
}

/// 拆分 URL 为基础部分与查询状态，片段（`#...`）被丢弃
pub fn split_url(url: &str) -> (&str, QueryState) {
    let without_fragment = url.split('#').next().unwrap_or(url);
    match without_fragment.split_once('?') {
        Some((base, query)) => (base, parse_query(query)),
        None => (without_fragment, QueryState::new()),
    }
}

/// 拼接基础 URL 与查询状态
pub fn join_url(base: &str, state: &QueryState) -> String {
    let query = to_query_string(state);
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}

/// 解析绝对 URL
pub fn parse_url(url: &str) -> Result<Url, QueryError> {
    Url::parse(url).map_err(|source| QueryError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_lists_and_encoding() {
        let state = parse_query("?q=red+shoes&color[]=red&color[]=dark%20blue&size[0]=42&p=2");

        assert_eq!(state.get_single("q"), Some("red shoes"));
        assert_eq!(state.get("color"), Some(&QueryValue::from(vec!["red", "dark blue"])));
        assert_eq!(state.get("size"), Some(&QueryValue::from(vec!["42"])));
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["q", "color", "size", "p"]);
    }

    #[test]
    fn repeated_plain_key_keeps_last_value() {
        let state = parse_query("p=1&p=3");
        assert_eq!(state.get_single("p"), Some("3"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn bracket_only_key_is_not_a_list() {
        let state = parse_query("%5B%5D=x");
        assert_eq!(state.get_single("[]"), Some("x"));
    }

    #[test]
    fn serializes_lists_with_brackets_and_skips_empty() {
        let mut state = QueryState::new();
        state.set("color", vec!["red", "blue"]);
        state.set("brand", "");
        state.set("price", "{{from}}-{{to}}");

        let query = to_query_string(&state);
        assert_eq!(
            query,
            "color%5B%5D=red&color%5B%5D=blue&price=%7B%7Bfrom%7D%7D-%7B%7Bto%7D%7D"
        );
        assert_eq!(parse_query(&query).get("color"), state.get("color"));
    }

    #[test]
    fn split_and_join_url() {
        let (base, state) = split_url("/shoes.html?q=boot&p=2#top");
        assert_eq!(base, "/shoes.html");
        assert_eq!(state.get_single("p"), Some("2"));
        assert_eq!(join_url(base, &state), "/shoes.html?q=boot&p=2");
        assert_eq!(join_url(base, &QueryState::new()), "/shoes.html");
    }

    #[test]
    fn rejects_relative_url_as_absolute() {
        assert!(matches!(parse_url("/shoes.html"), Err(QueryError::InvalidUrl { .. })));
        assert!(parse_url("https://shop.example/shoes.html").is_ok());
    }
}
