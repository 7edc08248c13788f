// 该文件是 Huitu （绘图） 项目的一部分。
// src/render/mask.rs - 置信度阈值与掩码叠加
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

use image::{GrayImage, Luma, Rgb, RgbImage};
use tracing::debug;

use crate::{
  render::RenderError,
  tensor::{ProbabilityMap, ProbabilityStack},
};

pub const CONFIDENCE_CUTOFF: f32 = 0.5;
pub const DETECTED: u8 = 255;
// TEXT 模型中“有文字”的通道
const TEXT_CHANNEL: usize = 1;
// 掩码信号所在的颜色通道（绿色）
const MASK_CHANNEL: usize = 1;

/// 大于 cutoff 的位置置为 255，其余为 0
pub fn threshold(map: &ProbabilityMap, cutoff: f32) -> GrayImage {
  let (width, height) = map.dimensions();
  GrayImage::from_fn(width, height, |x, y| {
    if map.get_pixel(x, y)[0] > cutoff {
      Luma([DETECTED])
    } else {
      Luma([0])
    }
  })
}

/// 去掉最后一个背景通道，逐通道阈值化后饱和相加
pub fn threshold_pose(stack: &ProbabilityStack, cutoff: f32) -> Result<GrayImage, RenderError> {
  let classes = stack.len().checked_sub(1).filter(|&n| n > 0).ok_or(RenderError::MissingChannel {
    index: 1,
    channels: stack.len(),
  })?;
  debug!("POSE 热图: {} 个类别通道", classes);

  let (width, height) = stack.dimensions();
  let mut merged = GrayImage::new(width, height);
  for plane in &stack.channels()[..classes] {
    let binary = threshold(plane, cutoff);
    for (acc, value) in merged.pixels_mut().zip(binary.pixels()) {
      acc[0] = acc[0].saturating_add(value[0]);
    }
  }
  Ok(merged)
}

pub fn threshold_text(stack: &ProbabilityStack, cutoff: f32) -> Result<GrayImage, RenderError> {
  let plane = stack.channel(TEXT_CHANNEL).ok_or(RenderError::MissingChannel {
    index: TEXT_CHANNEL,
    channels: stack.len(),
  })?;
  Ok(threshold(plane, cutoff))
}

/// 二值图放入绿色通道，其余通道为 0
pub fn make_mask(binary: &GrayImage) -> RgbImage {
  let (width, height) = binary.dimensions();
  RgbImage::from_fn(width, height, |x, y| {
    let mut pixel = Rgb([0u8; 3]);
    pixel[MASK_CHANNEL] = binary.get_pixel(x, y)[0];
    pixel
  })
}

/// 逐像素饱和相加
pub fn composite(image: &RgbImage, mask: &RgbImage) -> Result<RgbImage, RenderError> {
  if image.dimensions() != mask.dimensions() {
    return Err(RenderError::ShapeMismatch {
      expected: image.dimensions(),
      actual: mask.dimensions(),
    });
  }

  let mut output = image.clone();
  for (pixel, m) in output.pixels_mut().zip(mask.pixels()) {
    for c in 0..3 {
      pixel[c] = pixel[c].saturating_add(m[c]);
    }
  }
  Ok(output)
}
