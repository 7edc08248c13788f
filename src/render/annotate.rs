// 该文件是 Huitu （绘图） 项目的一部分。
// src/render/annotate.rs - 类别结果文字标注
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
use tracing::info;

use crate::{
  model::labels::{LabelError, decode_car_meta, decode_gender},
  render::{RenderError, draw::Painter},
};

const ACCENT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CAR_META_SCALE_STEP: u32 = 1000;
const GENDER_SCALE_STEP: u32 = 5000;

pub fn car_meta_scaler(height: u32) -> u32 {
  (height / CAR_META_SCALE_STEP).max(1)
}

pub fn gender_scaler(height: u32) -> u32 {
  (height / GENDER_SCALE_STEP).max(1)
}

pub fn car_meta_caption(color: usize, kind: usize) -> Result<String, LabelError> {
  let (color, kind) = decode_car_meta(color, kind)?;
  Ok(format!("Color: {}, Type: {}", color, kind))
}

pub fn gender_caption(age: u32, gender: usize) -> Result<String, LabelError> {
  let (age, gender) = decode_gender(age, gender)?;
  Ok(format!("{},{} ", age, gender))
}

pub fn render_car_meta(
  painter: &Painter,
  image: &RgbImage,
  color: usize,
  kind: usize,
) -> Result<RgbImage, RenderError> {
  let caption = car_meta_caption(color, kind)?;
  painter.require_font()?;
  info!("车辆属性: {}", caption);

  let scaler = car_meta_scaler(image.height());
  let anchor = ((50 * scaler) as i32, (100 * scaler) as i32);
  let mut output = image.clone();
  painter.draw_text(&mut output, &caption, anchor, 2.0 * scaler as f32, 3 * scaler, ACCENT_COLOR)?;
  Ok(output)
}

pub fn render_gender(
  painter: &Painter,
  image: &RgbImage,
  age: u32,
  gender: usize,
) -> Result<RgbImage, RenderError> {
  let caption = gender_caption(age, gender)?;
  painter.require_font()?;
  info!("年龄/性别: {}", caption);

  let scaler = gender_scaler(image.height());
  let anchor = (20, image.height() as i32 - 10);
  let mut output = image.clone();
  painter.draw_text(&mut output, &caption, anchor, 2.0 * scaler as f32, 3 * scaler, ACCENT_COLOR)?;
  Ok(output)
}
