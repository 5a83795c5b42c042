// ==========================================
// 中润设备日报系统 - 产物落盘与校验
// ==========================================
// 职责: 临时路径写入 + 原子改名；产物结构回读校验
// ==========================================

use crate::domain::ReportArtifact;
use crate::render::{RenderError, RenderResult};
use calamine::{open_workbook, Reader, Xlsx};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// xlsx 容器标准二进制签名（ZIP local file header）
const XLSX_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// 生成同目录临时路径（同一文件系统内 rename 才是原子的）
pub fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

/// 以"临时文件 + 原子改名"的方式落盘
///
/// `write_fn` 把内容写到给定的临时路径；写入或改名失败时清理
/// 临时文件，保证磁盘上不留半成品。
pub fn write_atomic<F>(final_path: &Path, write_fn: F) -> RenderResult<()>
where
    F: FnOnce(&Path) -> RenderResult<()>,
{
    if let Some(parent) = final_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_sibling(final_path);
    match write_fn(&tmp).and_then(|_| fs::rename(&tmp, final_path).map_err(RenderError::from)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

/// 回读校验生成的产物并提取结构元数据
///
/// 校验: 文件存在、非空、容器签名正确、可被标准读取器打开。
/// 元数据: 工作表名与每表已填充行数。
pub fn verify(path: &Path) -> RenderResult<ReportArtifact> {
    let metadata = fs::metadata(path)
        .map_err(|_| RenderError::ArtifactInvalid(format!("产物不存在: {}", path.display())))?;
    if metadata.len() == 0 {
        return Err(RenderError::ArtifactInvalid(format!(
            "产物为空文件: {}",
            path.display()
        )));
    }

    let head = fs::read(path)?;
    if head.len() < 4 || head[..4] != XLSX_SIGNATURE {
        return Err(RenderError::ArtifactInvalid(format!(
            "产物不是合法的 xlsx 容器: {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| RenderError::ArtifactInvalid(format!("产物无法打开: {}", e)))?;
    let sheet_names = workbook.sheet_names().to_owned();

    let mut row_count_per_sheet = BTreeMap::new();
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| RenderError::ArtifactInvalid(format!("工作表 {} 读取失败: {}", name, e)))?;
        row_count_per_sheet.insert(name.clone(), range.height());
    }

    Ok(ReportArtifact {
        path: path.to_path_buf(),
        sheet_names,
        row_count_per_sheet,
    })
}
