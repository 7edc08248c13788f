// 该文件是 Huitu （绘图） 项目的一部分。
// src/model.rs - 模型类型与解码结果
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

use std::{convert::Infallible, fmt, str::FromStr};

use image::RgbImage;
use tracing::debug;

use crate::tensor::{ProbabilityStack, RawOutput};

pub mod decode;
pub mod labels;

pub use self::decode::DecodeError;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 模型类型标签，决定使用哪种解码与渲染算法
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelType {
  Pose,
  Text,
  CarMeta,
  Facial,
  Glass,
  Gender,
  Unknown(String),
}

impl ModelType {
  pub fn as_str(&self) -> &str {
    match self {
      ModelType::Pose => "POSE",
      ModelType::Text => "TEXT",
      ModelType::CarMeta => "CAR_META",
      ModelType::Facial => "FACIAL",
      ModelType::Glass => "GLASS",
      ModelType::Gender => "GENDER",
      ModelType::Unknown(tag) => tag,
    }
  }
}

impl FromStr for ModelType {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "POSE" => ModelType::Pose,
      "TEXT" => ModelType::Text,
      "CAR_META" => ModelType::CarMeta,
      "FACIAL" => ModelType::Facial,
      "GLASS" => ModelType::Glass,
      "GENDER" => ModelType::Gender,
      other => ModelType::Unknown(other.to_string()),
    })
  }
}

impl From<&str> for ModelType {
  fn from(s: &str) -> Self {
    match s.parse() {
      Ok(model_type) => model_type,
      Err(never) => match never {},
    }
  }
}

impl fmt::Display for ModelType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 解码后的推理结果，语义由模型类型决定
#[derive(Debug, Clone)]
pub enum DecodedOutput {
  /// POSE 的关键点热图栈，或 TEXT 的两通道分割概率图
  Heatmaps(ProbabilityStack),
  /// CAR_META 的颜色与车型类别下标
  CarMeta { color: usize, kind: usize },
  /// FACIAL / GLASS 的扁平坐标序列 [x0, y0, x1, y1, ...]
  Landmarks(Vec<i32>),
  /// GENDER 的年龄与性别类别下标
  AgeGender { age: u32, gender: usize },
  /// 未知模型，不做任何解码
  Passthrough,
}

impl DecodedOutput {
  pub fn kind_name(&self) -> &'static str {
    match self {
      DecodedOutput::Heatmaps(_) => "heatmaps",
      DecodedOutput::CarMeta { .. } => "car-meta",
      DecodedOutput::Landmarks(_) => "landmarks",
      DecodedOutput::AgeGender { .. } => "age-gender",
      DecodedOutput::Passthrough => "passthrough",
    }
  }
}

/// 回放推理引擎导出的原始输出，按输入帧尺寸解码
pub struct RecordedModel {
  model_type: ModelType,
  raw: RawOutput,
}

impl RecordedModel {
  pub fn new(model_type: ModelType, raw: RawOutput) -> Self {
    Self { model_type, raw }
  }
}

impl Model for RecordedModel {
  type Input = RgbImage;
  type Output = DecodedOutput;
  type Error = DecodeError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let (width, height) = input.dimensions();
    debug!(
      "解码 {} 模型输出，共 {} 个张量，目标尺寸 {}x{}",
      self.model_type,
      self.raw.len(),
      width,
      height
    );
    decode::decode(&self.model_type, &self.raw, width, height)
  }
}
