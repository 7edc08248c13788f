// 该文件是 Huitu （绘图） 项目的一部分。
// src/model/decode.rs - 原始输出解码
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

use image::imageops::{self, FilterType};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  model::{DecodedOutput, ModelType},
  tensor::{ProbabilityMap, ProbabilityStack, RawOutput, Tensor, TensorError},
};

// GENDER 模型的年龄输出为 age / 100
const AGE_SCALE: f32 = 100.0;

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
  #[error("{model} 模型缺少第 {index} 个输出张量")]
  MissingTensor { model: String, index: usize },
  #[error("第 {index} 个输出张量为空")]
  EmptyTensor { index: usize },
  #[error("第 {index} 个输出张量形状 {shape:?} 无效: {reason}")]
  BadShape {
    index: usize,
    shape: Vec<usize>,
    reason: &'static str,
  },
  #[error("张量错误: {0}")]
  Tensor(#[from] TensorError),
}

/// 按模型类型解码原始输出，width/height 为原图尺寸
pub fn decode(
  model_type: &ModelType,
  raw: &RawOutput,
  width: u32,
  height: u32,
) -> Result<DecodedOutput, DecodeError> {
  match model_type {
    ModelType::Pose | ModelType::Text => {
      let tensor = tensor_at(model_type, raw, 0)?;
      let stack = decode_heatmaps(tensor, 0, width, height)?;
      debug!("热图通道数: {}", stack.len());
      Ok(DecodedOutput::Heatmaps(stack))
    }
    ModelType::CarMeta => {
      let color = argmax_at(model_type, raw, 0)?;
      let kind = argmax_at(model_type, raw, 1)?;
      debug!("车辆属性: color={}, type={}", color, kind);
      Ok(DecodedOutput::CarMeta { color, kind })
    }
    ModelType::Facial | ModelType::Glass => {
      let tensor = tensor_at(model_type, raw, 0)?;
      let points = decode_landmarks(tensor, 0, width, height)?;
      debug!("关键点数量: {}", points.len() / 2);
      Ok(DecodedOutput::Landmarks(points))
    }
    ModelType::Gender => {
      let age_tensor = tensor_at(model_type, raw, 0)?;
      let age = *age_tensor
        .data
        .first()
        .ok_or(DecodeError::EmptyTensor { index: 0 })?;
      let age = (age * AGE_SCALE).round().max(0.0) as u32;
      let gender = argmax_at(model_type, raw, 1)?;
      debug!("年龄: {}, 性别下标: {}", age, gender);
      Ok(DecodedOutput::AgeGender { age, gender })
    }
    ModelType::Unknown(tag) => {
      warn!("未知模型类型 {}，跳过解码", tag);
      Ok(DecodedOutput::Passthrough)
    }
  }
}

fn tensor_at<'a>(
  model_type: &ModelType,
  raw: &'a RawOutput,
  index: usize,
) -> Result<&'a Tensor, DecodeError> {
  let tensor = raw.get(index).ok_or_else(|| DecodeError::MissingTensor {
    model: model_type.to_string(),
    index,
  })?;
  tensor.validate()?;
  Ok(tensor)
}

fn argmax_at(model_type: &ModelType, raw: &RawOutput, index: usize) -> Result<usize, DecodeError> {
  tensor_at(model_type, raw, index)?
    .argmax()
    .ok_or(DecodeError::EmptyTensor { index })
}

/// [.., C, h, w] 热图缩放到原图尺寸
fn decode_heatmaps(
  tensor: &Tensor,
  index: usize,
  width: u32,
  height: u32,
) -> Result<ProbabilityStack, DecodeError> {
  let bad_shape = |reason| DecodeError::BadShape {
    index,
    shape: tensor.shape.clone(),
    reason,
  };

  let (channels, map_h, map_w) = match tensor.shape.as_slice() {
    [h, w] => (1, *h, *w),
    [lead @ .., c, h, w] if lead.iter().all(|&d| d == 1) => (*c, *h, *w),
    [_, _, _, ..] => return Err(bad_shape("不支持批量维度")),
    _ => return Err(bad_shape("热图至少需要二维")),
  };
  if channels == 0 || map_h == 0 || map_w == 0 {
    return Err(DecodeError::EmptyTensor { index });
  }

  let (Ok(map_h), Ok(map_w)) = (u32::try_from(map_h), u32::try_from(map_w)) else {
    return Err(bad_shape("热图尺寸超出范围"));
  };

  let stack = ProbabilityStack::from_chw(channels, map_h, map_w, &tensor.data)?;
  if stack.dimensions() == (width, height) {
    return Ok(stack);
  }

  let planes: Vec<ProbabilityMap> = stack
    .channels()
    .iter()
    .map(|plane| imageops::resize(plane, width, height, FilterType::Triangle))
    .collect();
  Ok(ProbabilityStack::new(planes)?)
}

/// 归一化的 (x, y) 序列换算为像素坐标
fn decode_landmarks(
  tensor: &Tensor,
  index: usize,
  width: u32,
  height: u32,
) -> Result<Vec<i32>, DecodeError> {
  if tensor.data.len() % 2 != 0 {
    return Err(DecodeError::BadShape {
      index,
      shape: tensor.shape.clone(),
      reason: "关键点坐标数量必须为偶数",
    });
  }

  Ok(
    tensor
      .data
      .chunks_exact(2)
      .flat_map(|pair| [(pair[0] * width as f32) as i32, (pair[1] * height as f32) as i32])
      .collect(),
  )
}
