// 该文件是 Huitu （绘图） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{actual}'")]
  SchemeMismatch {
    expected: &'static str,
    actual: String,
  },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 单张源图像
pub struct ImageFileInput {
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemeMismatch {
        expected: Self::SCHEME,
        actual: url.scheme().to_string(),
      });
    }

    Self::open(url.path())
  }
}

impl ImageFileInput {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    info!(
      "读取图像 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    Ok(ImageFileInput {
      image: Some(image.into_rgb8()),
    })
  }

  pub fn into_frames(self) -> ImageFileInputFrames {
    ImageFileInputFrames { inner: self }
  }
}

pub struct ImageFileInputFrames {
  inner: ImageFileInput,
}

impl Iterator for ImageFileInputFrames {
  type Item = RgbImage;

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.image.take()
  }
}
