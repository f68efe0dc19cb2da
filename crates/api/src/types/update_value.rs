//! 部分更新的三态字段
//!
//! 区分"设置为某值"、"显式置空"和"不修改"。配合`#[serde(default)]`使用：
//! 字段缺失反序列化为`NoChange`，显式null为`Unset`，其余为`Set`。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum UpdateField<T> {
    /// 设置为指定值
    Set(T),
    /// 显式清空（可空字段置null）
    Unset,
    /// 不修改
    #[default]
    NoChange,
}

impl<T> UpdateField<T> {
    pub fn is_change(&self) -> bool {
        !matches!(self, UpdateField::NoChange)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, UpdateField::Unset)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            UpdateField::Set(value) => Some(value),
            _ => None,
        }
    }

    /// 应用到现有值：Set覆盖，Unset清空，NoChange保留
    pub fn apply_to(self, existing: Option<T>) -> Option<T> {
        match self {
            UpdateField::Set(value) => Some(value),
            UpdateField::Unset => None,
            UpdateField::NoChange => existing,
        }
    }
}

impl<'de, T> Deserialize<'de> for UpdateField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // 字段缺失根本不会走到这里（由#[serde(default)]兜底），
        // 因此null一定是显式传入的
        match Option::<T>::deserialize(deserializer)? {
            Some(value) => Ok(UpdateField::Set(value)),
            None => Ok(UpdateField::Unset),
        }
    }
}

impl<T> fmt::Display for UpdateField<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateField::Set(value) => write!(f, "Set({value})"),
            UpdateField::Unset => write!(f, "Unset"),
            UpdateField::NoChange => write!(f, "NoChange"),
        }
    }
}
