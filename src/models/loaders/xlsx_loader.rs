use crate::error::AppError;
use crate::models::record::Record;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

/// 从表格文件（第一个工作表）加载记录
///
/// 只负责读取和转换，不做校验
pub async fn load_records(path: &Path, skip_header: bool) -> Result<Vec<Record>, AppError> {
    if !path.exists() {
        return Err(AppError::InputNotFound {
            path: path.display().to_string(),
        });
    }

    tracing::info!("📊 正在读取表格: {}", path.display());

    let owned: PathBuf = path.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || read_first_sheet(&owned))
        .await
        .map_err(|e| AppError::Spreadsheet {
            path: path.display().to_string(),
            message: e.to_string(),
        })??;

    let records = records_from_rows(rows, skip_header);
    tracing::info!("✅ 表格读取完成，共 {} 条记录", records.len());
    Ok(records)
}

fn read_first_sheet(path: &Path) -> Result<Vec<Vec<String>>, AppError> {
    let spreadsheet_error = |message: String| AppError::Spreadsheet {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("表格中没有工作表".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// 单元格转为去除首尾空白的字符串
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| dt.to_string()),
        other => other.to_string().trim().to_string(),
    }
}

/// 由原始行构建记录
///
/// 完全空白的行先被移除，行号按剩余行从 1 开始编号
pub fn records_from_rows(rows: Vec<Vec<String>>, skip_header: bool) -> Vec<Record> {
    rows.into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .skip(usize::from(skip_header))
        .enumerate()
        .map(|(index, row)| Record::from_cells(index + 1, &row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn blank_rows_are_dropped_before_numbering() {
        let rows = vec![
            row(&["101", "9001", "11/2024", "150,00", "05/12/2024", "obs"]),
            row(&["", "  ", ""]),
            row(&[" 102 ", "9002", "", "99,90"]),
        ];

        let records = records_from_rows(rows, false);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[0].notes, "obs");
        assert_eq!(records[1].line_number, 2);
        assert_eq!(records[1].rubric_code, "102");
        assert_eq!(records[1].expected_payment_date, "");
    }

    #[test]
    fn header_can_be_skipped() {
        let rows = vec![
            row(&["rubrica", "prestador", "mes", "valor", "data", "obs"]),
            row(&["101", "9001", "", "1"]),
        ];

        let records = records_from_rows(rows, true);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_number, 1);
        assert_eq!(records[0].rubric_code, "101");
    }

    #[test]
    fn numeric_cells_render_without_trailing_zero() {
        assert_eq!(cell_to_string(&Data::Float(1234.0)), "1234");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String(" abc ".to_string())), "abc");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let result = load_records(Path::new("nao_existe.xlsx"), false).await;
        assert!(matches!(result, Err(AppError::InputNotFound { .. })));
    }
}
