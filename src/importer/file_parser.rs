// ==========================================
// 工作量再分配引擎 - CSV 文件解析
// ==========================================
// 输出: (文件行号, 表头 -> 单元格) 列表, 行号从 1 开始（表头为第 1 行）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 一行原始记录
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 读取单元格（缺列视为空）
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// 读取必填单元格
    pub fn require(&self, column: &str) -> ImportResult<&str> {
        let value = self.get(column);
        if value.is_empty() {
            return Err(ImportError::FieldMappingError {
                row: self.line,
                message: format!("{} 不能为空", column),
            });
        }
        Ok(value)
    }
}

pub struct CsvParser;

impl CsvParser {
    pub fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = file_path.extension() {
            if ext != "csv" {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(records.len() + 2);

            let fields: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.trim().to_string()))
                .collect();

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord { line, fields });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_keeps_line_numbers_and_skips_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "user_id, unit_id").unwrap();
        writeln!(f, " a ,U1").unwrap();
        writeln!(f, ",").unwrap();
        writeln!(f, "b,U1").unwrap();
        drop(f);

        let records = CsvParser.parse_to_raw_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].get("user_id"), "a");
        assert_eq!(records[1].line, 4);
        assert_eq!(records[1].get("missing"), "");
        assert!(records[1].require("missing").is_err());
    }

    #[test]
    fn test_missing_file_and_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            CsvParser.parse_to_raw_records(&missing),
            Err(ImportError::FileNotFound(_))
        ));

        let xlsx = dir.path().join("roster.xlsx");
        File::create(&xlsx).unwrap();
        assert!(matches!(
            CsvParser.parse_to_raw_records(&xlsx),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
