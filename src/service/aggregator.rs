use crate::models::{Analysis, AnalysisResult, Row};

/// 计算库存统计 (纯函数，无 I/O)
///
/// - 合计按数据集顺序逐行累加 (f64)，相同输入结果确定
/// - 最低/最高库存单次线性扫描，严格小于/严格大于才替换，相等时保留先出现的行
/// - 最低库存的初始比较基准为正无穷，最高库存的初始基准为 0：
///   零售数量全部非正时，最高库存会报告第一行
pub fn analyze(rows: &[Row]) -> Analysis {
    let Some(first) = rows.first() else {
        return Analysis::Empty;
    };

    let mut total_available = 0.0;
    let mut total_sold = 0.0;

    let mut lowest = first;
    let mut lowest_qty = f64::INFINITY;
    let mut highest = first;
    let mut highest_qty = 0.0;

    for row in rows {
        let retail = row.retail_qty();
        total_available += retail;
        total_sold += row.billing_qty();

        if retail < lowest_qty {
            lowest = row;
            lowest_qty = retail;
        }
        if retail > highest_qty {
            highest = row;
            highest_qty = retail;
        }
    }

    Analysis::Summary(AnalysisResult {
        total_available,
        total_sold,
        lowest: lowest.clone(),
        highest: highest.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, retail: &str) -> Row {
        Row::new(code).with_retail(retail)
    }

    fn summary(rows: &[Row]) -> AnalysisResult {
        analyze(rows).summary().cloned().expect("expected a summary")
    }

    #[test]
    fn empty_dataset_is_distinguishable() {
        assert_eq!(analyze(&[]), Analysis::Empty);
    }

    #[test]
    fn first_occurrence_wins_ties() {
        let rows = vec![row("a", "10"), row("b", "3"), row("c", "3"), row("d", "20")];
        let result = summary(&rows);

        assert_eq!(result.total_available, 36.0);
        assert_eq!(result.lowest.code, "b");
        assert_eq!(result.highest.code, "d");
    }

    #[test]
    fn equal_highest_keeps_first() {
        let rows = vec![row("a", "7"), row("b", "7")];
        let result = summary(&rows);
        assert_eq!(result.highest.code, "a");
        assert_eq!(result.lowest.code, "a");
    }

    #[test]
    fn totals_include_billing_and_ignore_garbage() {
        let rows = vec![
            Row::new("a").with_retail("4").with_billing("1"),
            Row::new("b").with_retail("abc").with_billing("2.5"),
            Row::new("c"),
        ];
        let result = summary(&rows);

        assert_eq!(result.total_available, 4.0);
        assert_eq!(result.total_sold, 3.5);
        assert_eq!(result.lowest.code, "b");
        assert_eq!(result.highest.code, "a");
    }

    #[test]
    fn unparseable_row_is_not_highest_when_positive_values_exist() {
        let rows = vec![row("bad", "abc"), row("ok", "2")];
        assert_eq!(summary(&rows).highest.code, "ok");
    }

    #[test]
    fn all_negative_reports_first_row_as_highest() {
        let rows = vec![row("a", "-5"), row("b", "-1"), row("c", "-9")];
        let result = summary(&rows);

        assert_eq!(result.highest.code, "a");
        assert_eq!(result.lowest.code, "c");
    }

    #[test]
    fn serializes_with_sheet_style_keys() {
        let rows = vec![row("a", "10"), row("b", "2")];
        let value = serde_json::to_value(summary(&rows)).unwrap();

        assert_eq!(value["totalAvailable"], 12);
        assert_eq!(value["totalSold"], 0);
        assert_eq!(value["lowestStock"]["Code"], "b");
        assert_eq!(value["highestStock"]["Retail"], 10);
    }
}
