// ==========================================
// 工作量再分配引擎 - 行映射辅助
// ==========================================
// 职责: 数据库文本列 <-> 强类型字段
// ==========================================

use crate::repository::error::RepositoryResult;
use rusqlite::types::Type;
use std::collections::BTreeSet;

/// 集合 -> JSON 文本数组
pub(crate) fn set_to_json(set: &BTreeSet<String>) -> RepositoryResult<String> {
    Ok(serde_json::to_string(set)?)
}

/// JSON 文本数组 -> 集合（空白字符串视为空集合）
pub(crate) fn set_from_json(idx: usize, raw: &str) -> rusqlite::Result<BTreeSet<String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeSet::new());
    }
    serde_json::from_str::<BTreeSet<String>>(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 枚举列解析，未知值转为列转换错误
pub(crate) fn enum_from_db<T>(
    idx: usize,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法识别的枚举值: {}", raw).into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Priority;

    #[test]
    fn test_set_json_roundtrip_is_sorted() {
        let set: BTreeSet<String> = ["en", "ar"].iter().map(|s| s.to_string()).collect();
        let json = set_to_json(&set).unwrap();
        assert_eq!(json, r#"["ar","en"]"#);
        assert_eq!(set_from_json(0, &json).unwrap(), set);
        assert!(set_from_json(0, "  ").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_enum_is_conversion_error() {
        let err = enum_from_db(3, "critical", Priority::from_str).unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(3, _, _)));
    }
}
