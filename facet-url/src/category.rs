use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CategoryError;
use crate::models::Category;

/// 分类仓库 - 按 ID 读取分类
pub trait CategoryRepository {
    fn get(&self, id: u64) -> Result<Category, CategoryError>;
}

impl<R: CategoryRepository + ?Sized> CategoryRepository for &R {
    fn get(&self, id: u64) -> Result<Category, CategoryError> {
        (**self).get(id)
    }
}

/// 内存分类表，供命令行与 WASM 模块使用
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<Category>", into = "Vec<Category>")]
pub struct CategoryTable {
    categories: HashMap<u64, Category>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl From<Vec<Category>> for CategoryTable {
    fn from(categories: Vec<Category>) -> Self {
        let mut table = CategoryTable::new();
        for category in categories {
            table.insert(category);
        }
        table
    }
}

impl From<CategoryTable> for Vec<Category> {
    fn from(table: CategoryTable) -> Self {
        let mut categories: Vec<Category> = table.categories.into_values().collect();
        categories.sort_by_key(|category| category.id);
        categories
    }
}

impl CategoryRepository for CategoryTable {
    fn get(&self, id: u64) -> Result<Category, CategoryError> {
        self.categories
            .get(&id)
            .cloned()
            .ok_or(CategoryError::NotFound(id))
    }
}

/// 从叶子分类向上查找到根节点（不含根节点），返回根节点在前的路径
pub fn ancestor_path<R: CategoryRepository>(
    repository: &R,
    leaf: &Category,
    root_id: u64,
) -> Result<Vec<u64>, CategoryError> {
    let mut path = vec![leaf.id];
    let mut current = leaf.clone();

    while current.parent_id != root_id {
        let parent_id = current.parent_id;
        if path.contains(&parent_id) {
            return Err(CategoryError::Cycle(parent_id));
        }
        path.push(parent_id);
        current = repository.get(parent_id)?;
    }

    path.reverse();
    Ok(path)
}
