use std::collections::BTreeMap;

/// 一份文档解析后的参数表
///
/// `values` 与 `pages` 使用相同的参数名作为键。`BTreeMap` 保证按参数名
/// 升序遍历，这也是比对结果的排序依据。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// 参数名 -> 参数值
    pub values: BTreeMap<String, String>,
    /// 参数名 -> 页码（纯数字，或空字符串表示未记录）
    pub pages: BTreeMap<String, String>,
}

impl ParsedDocument {
    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 获取参数值，不存在时返回 `None`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// 获取页码，不存在时返回 `None`
    pub fn page(&self, name: &str) -> Option<&str> {
        self.pages.get(name).map(String::as_str)
    }
}
