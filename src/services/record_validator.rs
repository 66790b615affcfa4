//! 记录校验服务 - 业务能力层
//!
//! 在任何自动化开始之前校验整批数据，收集全部违规而不是遇到第一个就停止

use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info};

use crate::error::{Rule, ValidationError, Violation};
use crate::models::Record;

/// DD/MM/YYYY，只接受 ASCII 数字
static DATE_FORMAT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$"));
/// MM/YYYY
static MONTH_YEAR_FORMAT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}/[0-9]{4}$"));

/// 校验整批记录
///
/// 全部通过时原样返回；否则返回包含所有违规的 `ValidationError`
pub fn validate_records(records: Vec<Record>) -> Result<Vec<Record>, ValidationError> {
    info!("🔍 正在校验表格数据...");

    let violations: Vec<Violation> = records.iter().flat_map(check_record).collect();

    if !violations.is_empty() {
        let err = ValidationError { violations };
        error!("❌ 数据校验失败:");
        for message in err.messages() {
            error!("   - {}", message);
        }
        return Err(err);
    }

    info!("✅ 校验完成: {} 条记录有效", records.len());
    Ok(records)
}

/// 单条记录的全部违规
pub fn check_record(record: &Record) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut push = |field: &'static str, rule: Rule| {
        violations.push(Violation {
            line_number: record.line_number,
            field,
            rule,
        })
    };

    if record.rubric_code.is_empty() {
        push("rubric_code", Rule::Required);
    }
    if record.provider_code.is_empty() {
        push("provider_code", Rule::Required);
    }
    if record.gross_amount.is_empty() {
        push("gross_amount", Rule::Required);
    }
    if !record.expected_payment_date.is_empty()
        && !matches_format(&record.expected_payment_date, &DATE_FORMAT)
    {
        push("expected_payment_date", Rule::DateFormat);
    }
    if !record.period_ref.is_empty() && !matches_format(&record.period_ref, &MONTH_YEAR_FORMAT) {
        push("period_ref", Rule::MonthYearFormat);
    }

    violations
}

fn matches_format(value: &str, format: &LazyLock<Result<Regex, regex::Error>>) -> bool {
    matches!(&**format, Ok(re) if re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: usize, cells: &[&str]) -> Record {
        let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        Record::from_cells(line, &cells)
    }

    #[test]
    fn valid_batch_is_returned_unchanged() {
        let records = vec![
            record(1, &["101", "9001", "11/2024", "150,00", "05/12/2024", "obs"]),
            record(2, &["102", "9002", "", "10"]),
        ];
        let validated = validate_records(records.clone()).expect("应通过校验");
        assert_eq!(validated, records);
    }

    #[test]
    fn date_format_is_strict() {
        assert!(check_record(&record(1, &["1", "2", "", "3", "05/12/2024"])).is_empty());

        let violations = check_record(&record(1, &["1", "2", "", "3", "2024-12-05"]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "expected_payment_date");
        assert_eq!(violations[0].rule, Rule::DateFormat);

        assert_eq!(check_record(&record(1, &["1", "2", "", "3", "5/12/2024"])).len(), 1);
        assert_eq!(check_record(&record(1, &["1", "2", "", "3", "05/12/2024x"])).len(), 1);
        // 非 ASCII 数字不接受
        assert_eq!(check_record(&record(1, &["1", "2", "", "3", "٠٥/12/2024"])).len(), 1);
    }

    #[test]
    fn month_year_format_is_strict() {
        assert!(check_record(&record(1, &["1", "2", "12/2024", "3"])).is_empty());
        let violations = check_record(&record(1, &["1", "2", "2024/12", "3"]));
        assert_eq!(violations[0].rule, Rule::MonthYearFormat);
        assert_eq!(check_record(&record(1, &["1", "2", "1/2024", "3"])).len(), 1);
    }

    #[test]
    fn format_patterns_compile() {
        assert!(DATE_FORMAT.is_ok());
        assert!(MONTH_YEAR_FORMAT.is_ok());
    }

    #[test]
    fn every_violation_in_batch_is_reported() {
        let records = vec![
            record(1, &["", "9001", "", "10"]),
            record(2, &["102", "9002", "", "10"]),
            record(3, &["103", "", "13/2024x", "", "2024-12-05"]),
        ];

        let err = validate_records(records).expect_err("应校验失败");

        assert_eq!(err.violations.len(), 5);
        let lines: Vec<usize> = err.violations.iter().map(|v| v.line_number).collect();
        assert_eq!(lines, vec![1, 3, 3, 3, 3]);

        let messages = err.messages();
        assert!(messages[0].contains("第 1 行"));
        assert!(messages[0].contains("rubric_code"));
        assert!(messages.iter().any(|m| m.contains("第 3 行") && m.contains("gross_amount")));
        assert_eq!(err.to_string(), "发现 5 个数据校验错误");
    }
}
