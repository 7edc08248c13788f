// 该文件是 Huitu （绘图） 项目的一部分。
// src/input/raw_output_file.rs - 推理输出记录文件
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, tensor::RawOutput};

#[derive(Error, Debug)]
pub enum RawOutputFileError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 推理引擎导出的 JSON 输出，格式为 {"outputs": [{"shape": [...], "data": [...]}, ...]}
pub struct RawOutputFile {
  raw: RawOutput,
}

impl FromUrlWithScheme for RawOutputFile {
  const SCHEME: &'static str = "json";
}

impl FromUrl for RawOutputFile {
  type Error = RawOutputFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(RawOutputFileError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: url.scheme().to_string(),
      });
    }
    Self::open(url.path())
  }
}

impl RawOutputFile {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RawOutputFileError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let raw: RawOutput = serde_json::from_str(&content)?;
    info!("读取推理输出 {}: {} 个张量", path.display(), raw.len());
    for (i, tensor) in raw.outputs.iter().enumerate() {
      debug!(
        "输出 {} ({}): 形状 {:?}",
        i,
        tensor.name.as_deref().unwrap_or("-"),
        tensor.shape
      );
    }
    Ok(Self { raw })
  }

  pub fn into_raw(self) -> RawOutput {
    self.raw
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_recorded_outputs() {
    let path = std::env::temp_dir().join(format!("huitu-raw-{}.json", std::process::id()));
    std::fs::write(
      &path,
      r#"{"outputs": [{"shape": [1, 1], "data": [0.31]}, {"name": "prob", "shape": [1, 2], "data": [0.2, 0.8]}]}"#,
    )
    .unwrap();
    let url = Url::parse(&format!("json://{}", path.display())).unwrap();

    let file = RawOutputFile::from_url(&url);
    std::fs::remove_file(&path).ok();

    let raw = file.unwrap().into_raw();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.get(1).unwrap().argmax(), Some(1));
  }

  #[test]
  fn malformed_json_is_reported() {
    let path = std::env::temp_dir().join(format!("huitu-raw-bad-{}.json", std::process::id()));
    std::fs::write(&path, "{\"outputs\": 3}").unwrap();
    let result = RawOutputFile::open(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(RawOutputFileError::JsonError(_))));
  }
}
