// 该文件是 Huitu （绘图） 项目的一部分。
// src/render/landmark.rs - 关键点绘制
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

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::render::{RenderError, draw::Painter};

pub const MARKER_RADIUS: i32 = 4;
const MARKER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_FONT_SCALE: f32 = 0.7;
const LABEL_THICKNESS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkMarker {
  pub index: usize,
  pub x: i32,
  pub y: i32,
  pub label: String,
}

/// 将 [x0, y0, x1, y1, ...] 拆成带编号的标记
pub fn landmark_markers(points: &[i32]) -> Result<Vec<LandmarkMarker>, RenderError> {
  if points.len() % 2 != 0 {
    return Err(RenderError::OddLandmarkCount { len: points.len() });
  }

  Ok(
    points
      .chunks_exact(2)
      .enumerate()
      .map(|(index, pair)| LandmarkMarker {
        index,
        x: pair[0],
        y: pair[1],
        label: format!("p{}", index),
      })
      .collect(),
  )
}

pub fn render_landmarks(
  painter: &Painter,
  image: &RgbImage,
  points: &[i32],
) -> Result<RgbImage, RenderError> {
  let markers = landmark_markers(points)?;
  if !markers.is_empty() {
    painter.require_font()?;
  }
  debug!("绘制 {} 个关键点", markers.len());

  let mut output = image.clone();
  for marker in &markers {
    let center = (marker.x, marker.y);
    painter.draw_marker(&mut output, center, MARKER_RADIUS, MARKER_COLOR);
    painter.draw_text(
      &mut output,
      &marker.label,
      center,
      LABEL_FONT_SCALE,
      LABEL_THICKNESS,
      LABEL_COLOR,
    )?;
  }
  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn two_points_make_two_markers() {
    let markers = landmark_markers(&[10, 10, 20, 20]).unwrap();
    assert_eq!(
      markers,
      vec![
        LandmarkMarker {
          index: 0,
          x: 10,
          y: 10,
          label: "p0".into()
        },
        LandmarkMarker {
          index: 1,
          x: 20,
          y: 20,
          label: "p1".into()
        },
      ]
    );
  }

  #[test]
  fn odd_point_list_is_rejected() {
    assert!(matches!(
      landmark_markers(&[1, 2, 3]),
      Err(RenderError::OddLandmarkCount { len: 3 })
    ));
    let image = RgbImage::new(8, 8);
    assert!(matches!(
      render_landmarks(&Painter::without_font(), &image, &[1, 2, 3]),
      Err(RenderError::OddLandmarkCount { len: 3 })
    ));
  }

  #[test]
  fn empty_list_needs_no_font() {
    let image = RgbImage::new(8, 8);
    let output = render_landmarks(&Painter::without_font(), &image, &[]).unwrap();
    assert_eq!(output, image);
  }

  #[test]
  fn missing_font_leaves_no_partial_drawing() {
    let image = RgbImage::new(32, 32);
    let err = render_landmarks(&Painter::without_font(), &image, &[10, 10]).unwrap_err();
    assert!(matches!(err, RenderError::MissingFont));
  }

  #[test]
  fn markers_are_drawn_at_points() {
    let painter = Painter::embedded().unwrap();
    let image = RgbImage::new(64, 64);
    let output = render_landmarks(&painter, &image, &[10, 10, 40, 40]).unwrap();
    // 标签从锚点向右书写，锚点左侧只有标记
    assert_eq!(output.get_pixel(7, 10).0, [0, 0, 255]);
    assert_eq!(output.get_pixel(37, 40).0, [0, 0, 255]);
    assert_eq!(output.get_pixel(60, 3).0, [0, 0, 0]);

    let labels: Vec<(u32, u32)> = output
      .enumerate_pixels()
      .filter(|(_, _, p)| p.0[0] > 0)
      .map(|(x, y, _)| (x, y))
      .collect();
    assert!(labels.iter().any(|&(x, y)| x >= 40 && y < 45));
    assert!(labels.iter().all(|&(x, _)| x >= 10));
  }
}
