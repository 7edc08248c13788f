// 该文件是 Huitu （绘图） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{DecodedOutput, ModelType},
  output::Render,
  render::{RenderError, RenderFallback, Renderer},
};

/// 输出文件名：<模型类型>-output_1.png
pub fn output_file_name(model_type: &ModelType) -> String {
  format!("{}-output_1.png", model_type)
}

/// 将渲染结果写入输出目录
pub struct SaveImageFileOutput {
  directory: PathBuf,
  model_type: Option<ModelType>,
  overlay_asset: Option<PathBuf>,
  renderer: Renderer,
  fallback: RenderFallback,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("渲染错误: {0}")]
  RenderError(#[from] RenderError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("未指定模型类型, 无法确定输出文件名")]
  MissingModelType,
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(Self::new(uri.path()))
  }
}

impl SaveImageFileOutput {
  pub fn new<P: AsRef<Path>>(directory: P) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      model_type: None,
      overlay_asset: None,
      renderer: Renderer::default(),
      fallback: RenderFallback::default(),
    }
  }

  pub fn with_model_type(mut self, model_type: ModelType) -> Self {
    self.model_type = Some(model_type);
    self
  }

  pub fn with_overlay_asset(mut self, overlay_asset: Option<PathBuf>) -> Self {
    self.overlay_asset = overlay_asset;
    self
  }

  pub fn with_renderer(mut self, renderer: Renderer) -> Self {
    self.renderer = renderer;
    self
  }

  pub fn with_fallback(mut self, fallback: RenderFallback) -> Self {
    self.fallback = fallback;
    self
  }

  /// 模型类型未设置或为空标签时不生成文件名
  pub fn model_type(&self) -> Result<&ModelType, SaveImageFileError> {
    self
      .model_type
      .as_ref()
      .filter(|model_type| !model_type.as_str().is_empty())
      .ok_or(SaveImageFileError::MissingModelType)
  }

  pub fn output_path(&self) -> Result<PathBuf, SaveImageFileError> {
    Ok(self.directory.join(output_file_name(self.model_type()?)))
  }

  fn save_image(&self, image: &RgbImage) -> Result<(), SaveImageFileError> {
    if !self.directory.as_os_str().is_empty() {
      std::fs::create_dir_all(&self.directory).map_err(SaveImageFileError::IoError)?;
    }

    let path = self.output_path()?;
    image.save(&path).map_err(SaveImageFileError::ImageError)?;

    warn!("保存图像到文件: {}", path.display());

    Ok(())
  }
}

impl Render<RgbImage, DecodedOutput> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &RgbImage, result: &DecodedOutput) -> Result<(), Self::Error> {
    let model_type = self.model_type()?;
    let rendered = self
      .renderer
      .render(model_type, frame, self.overlay_asset.as_deref(), result);
    let image = self.fallback.apply(frame, rendered)?;
    self.save_image(&image)
  }
}
