use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// 已识别的列名 (大小写敏感)
pub const CODE_COLUMN: &str = "Code";
pub const RETAIL_COLUMN: &str = "Retail";
pub const BILLING_COLUMN: &str = "Billing";
pub const REMARKS_COLUMN: &str = "Remarks";

/// 新建数据文件时使用的表头
pub const DEFAULT_COLUMNS: [&str; 4] = [CODE_COLUMN, RETAIL_COLUMN, BILLING_COLUMN, REMARKS_COLUMN];

/// 库存行
///
/// 数量字段保存原始单元格文本，未修改的行写回时逐字节不变；
/// 数值通过 `retail_qty` / `billing_qty` 按宽松规则读取。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub code: String,
    pub retail: Option<String>,
    pub billing: Option<String>,
    pub remarks: Option<String>,
    /// 未识别的列，按文件中的列顺序透传
    pub extra: IndexMap<String, String>,
    /// 加载时各单元格在文件中的列顺序
    layout: Vec<String>,
}

impl Row {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn with_retail(mut self, retail: impl Into<String>) -> Self {
        self.retail = Some(retail.into());
        self
    }

    pub fn with_billing(mut self, billing: impl Into<String>) -> Self {
        self.billing = Some(billing.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn with_extra(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(column.into(), value.into());
        self
    }

    /// 零售数量，缺失或无法解析时为 0
    pub fn retail_qty(&self) -> f64 {
        coerce_qty(self.retail.as_deref())
    }

    /// 已售数量，缺失或无法解析时为 0
    pub fn billing_qty(&self) -> f64 {
        coerce_qty(self.billing.as_deref())
    }

    /// 按列名读取单元格文本
    pub fn cell(&self, column: &str) -> Option<&str> {
        match column {
            CODE_COLUMN => Some(self.code.as_str()),
            RETAIL_COLUMN => self.retail.as_deref(),
            BILLING_COLUMN => self.billing.as_deref(),
            REMARKS_COLUMN => self.remarks.as_deref(),
            other => self.extra.get(other).map(String::as_str),
        }
    }

    /// 按列名写入单元格文本；已识别列的空单元格视为缺失
    pub fn set_cell(&mut self, column: &str, value: &str) {
        if !self.layout.iter().any(|c| c == column) {
            self.layout.push(column.to_string());
        }
        let non_empty = (!value.is_empty()).then(|| value.to_string());
        match column {
            CODE_COLUMN => self.code = value.to_string(),
            RETAIL_COLUMN => self.retail = non_empty,
            BILLING_COLUMN => self.billing = non_empty,
            REMARKS_COLUMN => self.remarks = non_empty,
            other => {
                self.extra.insert(other.to_string(), value.to_string());
            }
        }
    }

    /// 局部更新：只修改补丁中出现的字段
    pub fn apply(&mut self, patch: &RowPatch) {
        if let Some(retail) = patch.retail {
            self.retail = Some(format_qty(retail));
        }
        if let Some(billing) = patch.billing {
            self.billing = Some(format_qty(billing));
        }
        if let Some(remarks) = &patch.remarks {
            self.remarks = remarks.clone();
        }
    }

    /// 序列化后 JSON 对象中出现的键 (空单元格不出现)
    pub fn keys(&self) -> Vec<&str> {
        self.entries().into_iter().map(|(k, _)| k).collect()
    }

    /// 按文件列顺序输出；不在文件中的列 (新建行或补丁新增) 排在后面
    fn entries(&self) -> Vec<(&str, Value)> {
        let mut columns: Vec<&str> = self.layout.iter().map(String::as_str).collect();
        for known in DEFAULT_COLUMNS {
            if !columns.contains(&known) {
                columns.push(known);
            }
        }
        for column in self.extra.keys() {
            if !columns.contains(&column.as_str()) {
                columns.push(column.as_str());
            }
        }

        columns
            .into_iter()
            .filter_map(|column| self.json_cell(column).map(|value| (column, value)))
            .collect()
    }

    fn json_cell(&self, column: &str) -> Option<Value> {
        match column {
            RETAIL_COLUMN | BILLING_COLUMN => self.cell(column).map(qty_cell_json),
            other => self
                .cell(other)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string())),
        }
    }
}

/// 行的 JSON 形式：列名 -> 值，省略空单元格
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in &entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// 局部更新补丁 (数量已按宽松规则转换)
///
/// `remarks`: `None` 表示未提供，`Some(None)` 表示显式清空。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPatch {
    pub retail: Option<f64>,
    pub billing: Option<f64>,
    pub remarks: Option<Option<String>>,
}

impl RowPatch {
    pub fn retail(mut self, qty: f64) -> Self {
        self.retail = Some(qty);
        self
    }

    pub fn billing(mut self, qty: f64) -> Self {
        self.billing = Some(qty);
        self
    }

    pub fn remarks(mut self, remarks: Option<String>) -> Self {
        self.remarks = Some(remarks);
        self
    }
}

/// 有序数据集，对应文件中唯一的一张表
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// 文件表头，保持原样
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// 使用默认表头构建
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 第一个编码相等的行 (字符串比较)；编码为空的单元格不参与匹配
    pub fn position_of(&self, code: &str) -> Option<usize> {
        if code.is_empty() {
            return None;
        }
        self.rows.iter().position(|row| row.code == code)
    }

    /// 写出时的表头：原表头，加上行里出现但表头缺失的列
    pub fn header(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        for row in &self.rows {
            for known in DEFAULT_COLUMNS {
                if !header.iter().any(|c| c == known) && row.cell(known).is_some_and(|v| !v.is_empty()) {
                    header.push(known.to_string());
                }
            }
            for column in row.extra.keys() {
                if !header.contains(column) {
                    header.push(column.clone());
                }
            }
        }
        header
    }
}

/// 宽松数量转换：缺失、空白或无法解析的值都按 0 计
pub fn coerce_qty(raw: Option<&str>) -> f64 {
    match raw.map(str::trim) {
        None | Some("") => 0.0,
        Some(text) => parse_finite(text).unwrap_or(0.0),
    }
}

/// 请求体中的数量值转换，规则与单元格一致
pub fn coerce_json_qty(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => coerce_qty(Some(s)),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

/// 数量的规范文本：整数不带小数点
pub fn format_qty(qty: f64) -> String {
    if qty == 0.0 || !qty.is_finite() {
        return "0".to_string();
    }
    qty.to_string()
}

/// 数量的 JSON 值：整数输出为整数
pub fn qty_json(qty: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if qty.fract() == 0.0 && qty.abs() <= MAX_SAFE_INTEGER {
        Value::from(qty as i64)
    } else {
        serde_json::Number::from_f64(qty)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(0))
    }
}

pub(crate) fn serialize_qty<S: Serializer>(qty: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    qty_json(*qty).serialize(serializer)
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn qty_cell_json(raw: &str) -> Value {
    match parse_finite(raw.trim()) {
        Some(qty) => qty_json(qty),
        None => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_qty_is_lenient() {
        assert_eq!(coerce_qty(Some("12")), 12.0);
        assert_eq!(coerce_qty(Some(" 2.5 ")), 2.5);
        assert_eq!(coerce_qty(Some("abc")), 0.0);
        assert_eq!(coerce_qty(Some("")), 0.0);
        assert_eq!(coerce_qty(Some("NaN")), 0.0);
        assert_eq!(coerce_qty(Some("inf")), 0.0);
        assert_eq!(coerce_qty(None), 0.0);
    }

    #[test]
    fn coerce_json_qty_matches_cell_rules() {
        assert_eq!(coerce_json_qty(&json!(7)), 7.0);
        assert_eq!(coerce_json_qty(&json!("8")), 8.0);
        assert_eq!(coerce_json_qty(&json!("x")), 0.0);
        assert_eq!(coerce_json_qty(&json!(null)), 0.0);
        assert_eq!(coerce_json_qty(&json!(true)), 1.0);
        assert_eq!(coerce_json_qty(&json!([1])), 0.0);
    }

    #[test]
    fn format_qty_drops_trailing_zero() {
        assert_eq!(format_qty(5.0), "5");
        assert_eq!(format_qty(2.5), "2.5");
        assert_eq!(format_qty(-0.0), "0");
        assert_eq!(format_qty(-3.0), "-3");
    }

    #[test]
    fn apply_touches_only_patched_fields() {
        let mut row = Row::new("A1")
            .with_retail("10")
            .with_billing("4")
            .with_remarks("keep")
            .with_extra("Shelf", "B2");

        row.apply(&RowPatch::default().retail(5.0));

        assert_eq!(row.retail.as_deref(), Some("5"));
        assert_eq!(row.billing.as_deref(), Some("4"));
        assert_eq!(row.remarks.as_deref(), Some("keep"));
        assert_eq!(row.extra.get("Shelf").map(String::as_str), Some("B2"));
    }

    #[test]
    fn apply_distinguishes_cleared_from_omitted_remarks() {
        let mut row = Row::new("A1").with_remarks("old");
        row.apply(&RowPatch::default().billing(1.0));
        assert_eq!(row.remarks.as_deref(), Some("old"));

        row.apply(&RowPatch::default().remarks(None));
        assert_eq!(row.remarks, None);
    }

    #[test]
    fn row_serializes_like_a_sheet_record() {
        let row = Row::new("007")
            .with_retail("12")
            .with_billing("abc")
            .with_extra("Shelf", "B2")
            .with_extra("Empty", "");

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            json!({"Code": "007", "Retail": 12, "Billing": "abc", "Shelf": "B2"})
        );
        assert_eq!(row.keys(), vec!["Code", "Retail", "Billing", "Shelf"]);
    }

    #[test]
    fn header_appends_columns_missing_from_file() {
        let mut dataset = Dataset::new(vec!["Code".into()], vec![]);
        dataset.rows.push(Row::new("A").with_retail("1").with_extra("Shelf", "B2"));

        assert_eq!(dataset.header(), vec!["Code", "Retail", "Shelf"]);
    }

    #[test]
    fn position_of_uses_first_string_match() {
        let dataset = Dataset::from_rows(vec![
            Row::new("01").with_retail("1"),
            Row::new("1").with_retail("2"),
            Row::new("1").with_retail("3"),
        ]);

        assert_eq!(dataset.position_of("1"), Some(1));
        assert_eq!(dataset.position_of("001"), None);
    }

    #[test]
    fn blank_code_never_matches() {
        let dataset = Dataset::from_rows(vec![Row::new("A"), Row::new("")]);
        assert_eq!(dataset.position_of(""), None);
    }

    #[test]
    fn loaded_row_keeps_file_column_order() {
        let mut row = Row::default();
        for (column, value) in [("Shelf", "S1"), ("Code", "A"), ("Retail", "1")] {
            row.set_cell(column, value);
        }
        row.apply(&RowPatch::default().billing(2.0));

        assert_eq!(row.keys(), vec!["Shelf", "Code", "Retail", "Billing"]);
    }
}
