use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 查询参数值 - 单值或多值（多选筛选）
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryValue {
    /// 单个值，例如 `?color=red`
    Single(String),
    /// 多个值，例如 `?color[]=red&color[]=blue`
    List(Vec<String>),
}

impl QueryValue {
    /// 空字符串或空列表都视为空值
    pub fn is_empty(&self) -> bool {
        match self {
            QueryValue::Single(value) => value.is_empty(),
            QueryValue::List(values) => values.is_empty(),
        }
    }

    /// 第一个值（单值时即其本身）
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value.as_str()),
            QueryValue::List(values) => values.first().map(String::as_str),
        }
    }

    /// 统一转换为列表形式
    pub fn to_list(&self) -> Vec<String> {
        match self {
            QueryValue::Single(value) => vec![value.clone()],
            QueryValue::List(values) => values.clone(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            QueryValue::Single(value) => std::slice::from_ref(value),
            QueryValue::List(values) => values,
        };
        values.iter().map(String::as_str)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::List(values)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(values: Vec<&str>) -> Self {
        QueryValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// 查询状态 - 按出现顺序保存的参数名到参数值的映射
///
/// 参数名区分大小写，同名参数只保留一个条目；`set` 覆盖已有条目时保持其原有位置。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryState {
    entries: Vec<(String, QueryValue)>,
}

impl QueryState {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// 读取单值参数；多值参数取第一个值
    pub fn get_single(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::first)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 设置参数，已存在时原位覆盖，否则追加到末尾
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// 在当前状态上应用一组变更，返回目标页面的完整查询状态
    ///
    /// 未出现在 `delta` 中的参数原样保留；`delta` 中的空值表示删除该参数。
    pub fn merged(&self, delta: &QueryState) -> QueryState {
        let mut result = self.clone();
        for (key, value) in delta.iter() {
            if value.is_empty() {
                result.remove(key);
            } else {
                result.set(key, value.clone());
            }
        }
        result
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = QueryState::new();
        for (key, value) in iter {
            state.set(key, value);
        }
        state
    }
}

impl IntoIterator for QueryState {
    type Item = (String, QueryValue);
    type IntoIter = std::vec::IntoIter<(String, QueryValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// 以 JSON 对象的形式序列化，保持参数顺序
impl Serialize for QueryState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QueryState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QueryStateVisitor;

        impl<'de> Visitor<'de> for QueryStateVisitor {
            type Value = QueryState;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of query parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<QueryState, A::Error> {
                let mut state = QueryState::new();
                while let Some((key, value)) = access.next_entry::<String, QueryValue>()? {
                    state.set(key, value);
                }
                Ok(state)
            }
        }

        deserializer.deserialize_map(QueryStateVisitor)
    }
}
