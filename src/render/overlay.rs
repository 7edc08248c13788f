// 该文件是 Huitu （绘图） 项目的一部分。
// src/render/overlay.rs - 带透明通道的贴图叠加
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

use image::{
  ImageReader, Rgb, RgbImage, RgbaImage,
  imageops::{self, FilterType},
};
use tracing::{debug, info};

use crate::render::RenderError;

/// 需要用到的最大扁平下标为 69
pub const REQUIRED_LANDMARK_VALUES: usize = 70;

// 缩放参考点（扁平下标）
const SCALE_FROM: usize = 36;
const SCALE_TO: usize = 68;
// 放置参考点：第 0 与第 2 个关键点
// 列偏移用 x 与贴图宽度，行偏移用 y 与贴图高度，两轴不可交换
const ANCHOR_A: usize = 0;
const ANCHOR_B: usize = 4;

fn require_landmarks(points: &[i32]) -> Result<(), RenderError> {
  if points.len() < REQUIRED_LANDMARK_VALUES {
    return Err(RenderError::InsufficientLandmarks {
      required: REQUIRED_LANDMARK_VALUES,
      actual: points.len(),
    });
  }
  Ok(())
}

/// 第 36/37 与 68/69 两个坐标之间的欧氏距离
pub fn overlay_scale(points: &[i32]) -> Result<f32, RenderError> {
  require_landmarks(points)?;
  let dx = f64::from(points[SCALE_FROM]) - f64::from(points[SCALE_TO]);
  let dy = f64::from(points[SCALE_FROM + 1]) - f64::from(points[SCALE_TO + 1]);
  Ok(dx.hypot(dy) as f32)
}

/// 贴图左上角位置 (left, top)：两个锚点的中点减去贴图半宽/半高
pub fn overlay_placement(points: &[i32], width: u32, height: u32) -> Result<(i64, i64), RenderError> {
  require_landmarks(points)?;
  let center_x = (f64::from(points[ANCHOR_A]) + f64::from(points[ANCHOR_B])) / 2.0;
  let center_y = (f64::from(points[ANCHOR_A + 1]) + f64::from(points[ANCHOR_B + 1])) / 2.0;
  let left = (center_x - f64::from(width) / 2.0) as i64;
  let top = (center_y - f64::from(height) / 2.0) as i64;
  Ok((left, top))
}

/// 读取并解码贴图，不保留文件句柄
pub fn load_overlay_asset(path: &Path) -> Result<RgbaImage, RenderError> {
  let asset_load = |source| RenderError::AssetLoad {
    path: path.to_path_buf(),
    source,
  };
  let asset = ImageReader::open(path)
    .map_err(|e| asset_load(image::ImageError::IoError(e)))?
    .with_guessed_format()
    .map_err(|e| asset_load(image::ImageError::IoError(e)))?
    .decode()
    .map_err(asset_load)?;
  debug!(
    "贴图 {} 尺寸: {}x{}",
    path.display(),
    asset.width(),
    asset.height()
  );
  Ok(asset.into_rgba8())
}

/// 按关键点几何缩放贴图，并将不透明像素写入原图副本
pub fn overlay_asset(image: &RgbImage, asset: &RgbaImage, points: &[i32]) -> Result<RgbImage, RenderError> {
  let scale = overlay_scale(points)?;
  let (asset_w, asset_h) = asset.dimensions();
  if asset_w == 0 || asset_h == 0 {
    return Err(RenderError::DegenerateOverlay { scale });
  }

  let width = scale as u32;
  let height = (f64::from(scale) * f64::from(asset_h) / f64::from(asset_w)) as u32;
  if width == 0 || height == 0 {
    return Err(RenderError::DegenerateOverlay { scale });
  }

  // 先检查位置，越界时不做缩放
  let (left, top) = overlay_placement(points, width, height)?;
  let (image_w, image_h) = image.dimensions();
  if left < 0
    || top < 0
    || left + i64::from(width) > i64::from(image_w)
    || top + i64::from(height) > i64::from(image_h)
  {
    return Err(RenderError::OverlayBounds {
      left,
      top,
      width,
      height,
      image_width: image_w,
      image_height: image_h,
    });
  }
  let resized = imageops::resize(asset, width, height, FilterType::Triangle);
  info!("贴图位置 ({}, {}), 尺寸 {}x{}", left, top, width, height);

  let mut output = image.clone();
  let (left, top) = (left as u32, top as u32);
  for (x, y, pixel) in resized.enumerate_pixels() {
    if pixel[3] != 0 {
      output.put_pixel(left + x, top + y, Rgb([pixel[0], pixel[1], pixel[2]]));
    }
  }
  Ok(output)
}

pub fn overlay(image: &RgbImage, asset_path: &Path, points: &[i32]) -> Result<RgbImage, RenderError> {
  require_landmarks(points)?;
  let asset = load_overlay_asset(asset_path)?;
  overlay_asset(image, &asset, points)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgba;

  /// 构造 70 个值的关键点序列：锚点 0/2，缩放点 36/68（扁平下标）
  fn landmarks(anchor_a: (i32, i32), anchor_b: (i32, i32), from: (i32, i32), to: (i32, i32)) -> Vec<i32> {
    let mut points = vec![0; REQUIRED_LANDMARK_VALUES];
    points[0] = anchor_a.0;
    points[1] = anchor_a.1;
    points[4] = anchor_b.0;
    points[5] = anchor_b.1;
    points[36] = from.0;
    points[37] = from.1;
    points[68] = to.0;
    points[69] = to.1;
    points
  }

  #[test]
  fn scale_is_euclidean_distance() {
    let points = landmarks((0, 0), (0, 0), (0, 0), (3, 4));
    assert_eq!(overlay_scale(&points).unwrap(), 5.0);
  }

  #[test]
  fn short_landmark_list_is_rejected() {
    assert!(matches!(
      overlay_scale(&[0; 68]),
      Err(RenderError::InsufficientLandmarks {
        required: 70,
        actual: 68
      })
    ));
  }

  #[test]
  fn placement_centers_asset_between_anchors() {
    let points = landmarks((10, 20), (30, 40), (0, 0), (0, 0));
    assert_eq!(overlay_placement(&points, 8, 4).unwrap(), (16, 28));
  }

  #[test]
  fn opaque_pixels_are_copied() {
    let image = RgbImage::from_pixel(40, 40, Rgb([1, 2, 3]));
    let asset = RgbaImage::from_pixel(4, 2, Rgba([200, 100, 50, 255]));
    // 缩放为 8x4，中心 (20, 20)
    let points = landmarks((20, 20), (20, 20), (0, 0), (8, 0));
    let output = overlay_asset(&image, &asset, &points).unwrap();

    for (x, y, pixel) in output.enumerate_pixels() {
      let inside = (16..24).contains(&x) && (18..22).contains(&y);
      if inside {
        assert_eq!(pixel.0, [200, 100, 50]);
      } else {
        assert_eq!(pixel.0, [1, 2, 3]);
      }
    }
  }

  #[test]
  fn transparent_pixels_are_skipped() {
    let image = RgbImage::from_pixel(40, 40, Rgb([9, 9, 9]));
    let asset = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 0]));
    let points = landmarks((20, 20), (20, 20), (0, 0), (8, 0));
    let output = overlay_asset(&image, &asset, &points).unwrap();
    assert_eq!(output, image);
  }

  #[test]
  fn placement_outside_image_is_rejected() {
    let image = RgbImage::from_pixel(20, 20, Rgb([5, 5, 5]));
    let asset = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let points = landmarks((2, 2), (2, 2), (0, 0), (10, 0));
    let err = overlay_asset(&image, &asset, &points).unwrap_err();
    assert!(matches!(err, RenderError::OverlayBounds { left: -3, top: -3, .. }));

    let points = landmarks((18, 10), (18, 10), (0, 0), (6, 0));
    assert!(matches!(
      overlay_asset(&image, &asset, &points),
      Err(RenderError::OverlayBounds { .. })
    ));
    assert!(image.pixels().all(|p| p.0 == [5, 5, 5]));
  }

  #[test]
  fn extreme_anchor_is_out_of_bounds() {
    let image = RgbImage::from_pixel(20, 20, Rgb([5, 5, 5]));
    let asset = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
    let points = landmarks((i32::MAX, i32::MAX), (i32::MAX, i32::MAX), (0, 0), (8, 0));
    assert!(matches!(
      overlay_asset(&image, &asset, &points),
      Err(RenderError::OverlayBounds { width: 8, height: 8, .. })
    ));

    let points = landmarks((i32::MIN, 0), (i32::MIN, 0), (i32::MIN, 0), (i32::MAX, 0));
    assert!(matches!(
      overlay_asset(&image, &asset, &points),
      Err(RenderError::OverlayBounds { .. })
    ));
  }

  #[test]
  fn oversized_overlay_is_rejected_before_resizing() {
    // 60000x60000 的 RGBA 缓冲需要约 14 GB，越界检查必须先于缩放
    let image = RgbImage::from_pixel(640, 480, Rgb([5, 5, 5]));
    let asset = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
    let points = landmarks((320, 240), (320, 240), (0, 0), (60000, 0));
    let err = overlay_asset(&image, &asset, &points).unwrap_err();
    assert!(matches!(
      err,
      RenderError::OverlayBounds {
        width: 60000,
        height: 60000,
        image_width: 640,
        image_height: 480,
        ..
      }
    ));
  }

  #[test]
  fn tiny_scale_is_degenerate() {
    let image = RgbImage::new(20, 20);
    let asset = RgbaImage::from_pixel(10, 1, Rgba([255, 255, 255, 255]));
    let points = landmarks((10, 10), (10, 10), (0, 0), (5, 0));
    assert!(matches!(
      overlay_asset(&image, &asset, &points),
      Err(RenderError::DegenerateOverlay { .. })
    ));
  }

  #[test]
  fn asset_round_trips_through_file() {
    let path = std::env::temp_dir().join(format!("huitu-overlay-{}.png", std::process::id()));
    RgbaImage::from_pixel(4, 2, Rgba([0, 255, 0, 255])).save(&path).unwrap();
    let image = RgbImage::new(40, 40);
    let points = landmarks((20, 20), (20, 20), (0, 0), (8, 0));
    let result = overlay(&image, &path, &points);
    std::fs::remove_file(&path).ok();

    let output = result.unwrap();
    assert_eq!(output.get_pixel(20, 20).0, [0, 255, 0]);
  }

  #[test]
  fn missing_asset_is_a_load_error() {
    let image = RgbImage::new(40, 40);
    let points = landmarks((20, 20), (20, 20), (0, 0), (8, 0));
    let err = overlay(&image, Path::new("/nonexistent/glasses.png"), &points).unwrap_err();
    assert!(matches!(err, RenderError::AssetLoad { .. }));
  }
}
