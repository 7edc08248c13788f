// 该文件是 Huitu （绘图） 项目的一部分。
// src/render/draw.rs - 文字与标记绘制
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

use std::{
  fmt,
  path::{Path, PathBuf},
};

use ab_glyph::{Font, FontArc, InvalidFont, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut};
use thiserror::Error;
use tracing::{debug, info};

use crate::render::RenderError;

// 字号 1.0 对应的像素高度（近似 Hershey Simplex 字体）
const PX_PER_FONT_SCALE: f32 = 30.0;

// 内置默认字体（DejaVu Sans）
const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Error, Debug)]
pub enum FontError {
  #[error("无法读取字体文件 {0}: {1}")]
  IoError(PathBuf, std::io::Error),
  #[error("字体文件 {0} 无效: {1}")]
  InvalidFont(PathBuf, InvalidFont),
  #[error("内置字体无效: {0}")]
  EmbeddedFont(InvalidFont),
}

/// 绘制工具，持有只读字体，可在多线程间共享
#[derive(Clone, Default)]
pub struct Painter {
  font: Option<FontArc>,
}

impl fmt::Debug for Painter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Painter")
      .field("has_font", &self.font.is_some())
      .finish()
  }
}

impl Painter {
  pub fn new(font: FontArc) -> Self {
    Self { font: Some(font) }
  }

  /// 不带字体，仅能绘制不含文字的结果
  pub fn without_font() -> Self {
    Self { font: None }
  }

  pub fn from_font_file<P: AsRef<Path>>(path: P) -> Result<Self, FontError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| FontError::IoError(path.to_path_buf(), e))?;
    let font = FontArc::try_from_vec(data).map_err(|e| FontError::InvalidFont(path.to_path_buf(), e))?;
    info!("加载字体: {}", path.display());
    Ok(Self::new(font))
  }

  /// 使用内置的 DejaVu Sans 字体
  pub fn embedded() -> Result<Self, FontError> {
    let font = FontArc::try_from_slice(EMBEDDED_FONT).map_err(FontError::EmbeddedFont)?;
    debug!("使用内置字体");
    Ok(Self::new(font))
  }

  pub fn require_font(&self) -> Result<&FontArc, RenderError> {
    self.font.as_ref().ok_or(RenderError::MissingFont)
  }

  /// 绘制文字，anchor 为文字基线左端点；thickness 以像素计的笔画粗细
  pub fn draw_text(
    &self,
    image: &mut RgbImage,
    text: &str,
    anchor: (i32, i32),
    font_scale: f32,
    thickness: u32,
    color: Rgb<u8>,
  ) -> Result<(), RenderError> {
    let font = self.require_font()?;
    let scale = PxScale::from(font_scale * PX_PER_FONT_SCALE);
    let ascent = font.as_scaled(scale).ascent().round() as i32;

    let (x, y) = (anchor.0, anchor.1 - ascent);
    // 多次偏移叠加模拟粗笔画
    let spread = (thickness.saturating_sub(1) / 2) as i32;
    for dy in -spread..=spread {
      for dx in -spread..=spread {
        draw_text_mut(image, color, x + dx, y + dy, scale, font, text);
      }
    }
    Ok(())
  }

  pub fn draw_marker(&self, image: &mut RgbImage, center: (i32, i32), radius: i32, color: Rgb<u8>) {
    draw_filled_circle_mut(image, center, radius, color);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_font_is_reported() {
    let painter = Painter::without_font();
    let mut image = RgbImage::new(16, 16);
    let err = painter
      .draw_text(&mut image, "p0", (2, 12), 0.7, 2, Rgb([255, 255, 255]))
      .unwrap_err();
    assert!(matches!(err, RenderError::MissingFont));
    assert!(image.pixels().all(|p| p.0 == [0, 0, 0]));
  }

  #[test]
  fn bad_font_file_fails_to_load() {
    let path = std::env::temp_dir().join(format!("huitu-bad-font-{}.ttf", std::process::id()));
    std::fs::write(&path, b"not a font").unwrap();
    let result = Painter::from_font_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(FontError::InvalidFont(..))));
    assert!(matches!(
      Painter::from_font_file("/nonexistent/font.ttf"),
      Err(FontError::IoError(..))
    ));
  }

  #[test]
  fn marker_is_clipped_at_image_edge() {
    let painter = Painter::without_font();
    let mut image = RgbImage::new(10, 10);
    painter.draw_marker(&mut image, (0, 0), 4, Rgb([0, 0, 255]));
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255]);
    assert_eq!(image.get_pixel(9, 9).0, [0, 0, 0]);
  }

  #[test]
  fn text_sits_on_baseline() {
    let painter = Painter::embedded().unwrap();
    let mut image = RgbImage::new(200, 60);
    painter
      .draw_text(&mut image, "Color", (5, 40), 1.0, 1, Rgb([0, 255, 0]))
      .unwrap();

    let painted: Vec<(u32, u32)> = image
      .enumerate_pixels()
      .filter(|(_, _, p)| p.0[1] > 0)
      .map(|(x, y, _)| (x, y))
      .collect();
    assert!(!painted.is_empty());
    assert!(image.pixels().all(|p| p.0[0] == 0 && p.0[2] == 0));
    // 字号 1.0 约 30 像素，无下伸部的文字位于基线之上
    assert!(painted.iter().all(|&(x, y)| x >= 5 && (12..=42).contains(&y)));
    assert!(painted.iter().any(|&(_, y)| y >= 36));
  }
}
