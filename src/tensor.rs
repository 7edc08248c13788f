// 该文件是 Huitu （绘图） 项目的一部分。
// src/tensor.rs - 推理输出张量定义
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

use image::{ImageBuffer, Luma};
use serde::Deserialize;
use thiserror::Error;

/// 单个概率平面，值域通常为 [0, 1]
pub type ProbabilityMap = ImageBuffer<Luma<f32>, Vec<f32>>;

#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
  #[error("数据长度不匹配: 形状 {shape:?} 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch {
    shape: Vec<usize>,
    expected: usize,
    actual: usize,
  },
  #[error("概率图尺寸不一致: 第 {index} 个通道为 {actual:?}, 期望 {expected:?}")]
  PlaneMismatch {
    index: usize,
    expected: (u32, u32),
    actual: (u32, u32),
  },
  #[error("概率图栈为空")]
  Empty,
  #[error("形状 {shape:?} 的元素数量溢出")]
  ShapeOverflow { shape: Vec<usize> },
}

/// 形状对应的元素数量，溢出时返回 None
pub fn element_count(shape: &[usize]) -> Option<usize> {
  shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// 推理引擎导出的原始输出张量
#[derive(Debug, Clone, Deserialize)]
pub struct Tensor {
  #[serde(default)]
  pub name: Option<String>,
  pub shape: Vec<usize>,
  pub data: Vec<f32>,
}

impl Tensor {
  pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, TensorError> {
    let tensor = Self {
      name: None,
      shape,
      data,
    };
    tensor.validate()?;
    Ok(tensor)
  }

  pub fn validate(&self) -> Result<(), TensorError> {
    let expected = element_count(&self.shape).ok_or_else(|| TensorError::ShapeOverflow {
      shape: self.shape.clone(),
    })?;
    if expected != self.data.len() {
      return Err(TensorError::LengthMismatch {
        shape: self.shape.clone(),
        expected,
        actual: self.data.len(),
      });
    }
    Ok(())
  }

  /// 最大值所在下标，空张量返回 None
  pub fn argmax(&self) -> Option<usize> {
    self
      .data
      .iter()
      .enumerate()
      .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
        Some((_, bv)) if bv >= v => best,
        _ => Some((i, v)),
      })
      .map(|(i, _)| i)
  }
}

/// 一次推理调用的全部输出，按输出顺序排列
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutput {
  pub outputs: Vec<Tensor>,
}

impl RawOutput {
  pub fn get(&self, index: usize) -> Option<&Tensor> {
    self.outputs.get(index)
  }

  pub fn len(&self) -> usize {
    self.outputs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.outputs.is_empty()
  }
}

/// 同尺寸概率平面的有序集合（C×H×W）
#[derive(Debug, Clone)]
pub struct ProbabilityStack {
  channels: Box<[ProbabilityMap]>,
}

impl ProbabilityStack {
  pub fn new(channels: Vec<ProbabilityMap>) -> Result<Self, TensorError> {
    let first = channels.first().ok_or(TensorError::Empty)?.dimensions();
    for (index, plane) in channels.iter().enumerate() {
      if plane.dimensions() != first {
        return Err(TensorError::PlaneMismatch {
          index,
          expected: first,
          actual: plane.dimensions(),
        });
      }
    }
    Ok(Self {
      channels: channels.into_boxed_slice(),
    })
  }

  /// 从 C×H×W 连续数据构造
  pub fn from_chw(channels: usize, height: u32, width: u32, data: &[f32]) -> Result<Self, TensorError> {
    let shape = vec![channels, height as usize, width as usize];
    let (plane_size, expected) = element_count(&shape[1..])
      .and_then(|plane| Some((plane, plane.checked_mul(channels)?)))
      .ok_or_else(|| TensorError::ShapeOverflow { shape: shape.clone() })?;
    if channels == 0 || plane_size == 0 || data.len() != expected {
      return Err(TensorError::LengthMismatch {
        shape,
        expected,
        actual: data.len(),
      });
    }

    let planes = data
      .chunks_exact(plane_size)
      .filter_map(|plane| ProbabilityMap::from_raw(width, height, plane.to_vec()))
      .collect();
    Self::new(planes)
  }

  pub fn channels(&self) -> &[ProbabilityMap] {
    &self.channels
  }

  pub fn channel(&self, index: usize) -> Option<&ProbabilityMap> {
    self.channels.get(index)
  }

  pub fn len(&self) -> usize {
    self.channels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.channels.is_empty()
  }

  pub fn dimensions(&self) -> (u32, u32) {
    self.channels[0].dimensions()
  }
}
