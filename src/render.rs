// 该文件是 Huitu （绘图） 项目的一部分。
// src/render.rs - 按模型类型分派的结果渲染
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
use tracing::{debug, error, warn};

use crate::model::{DecodedOutput, ModelType, labels::LabelError};

pub mod annotate;
pub mod draw;
pub mod landmark;
pub mod mask;
pub mod overlay;

pub use self::draw::{FontError, Painter};

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("尺寸不一致: 期望 {expected:?}, 实际 {actual:?}")]
  ShapeMismatch { expected: (u32, u32), actual: (u32, u32) },
  #[error("概率图缺少第 {index} 个通道, 共 {channels} 个通道")]
  MissingChannel { index: usize, channels: usize },
  #[error("{0}")]
  OutOfRange(#[from] LabelError),
  #[error("关键点坐标数量为奇数: {len}")]
  OddLandmarkCount { len: usize },
  #[error("关键点坐标不足: 需要 {required} 个, 实际 {actual} 个")]
  InsufficientLandmarks { required: usize, actual: usize },
  #[error("无法加载贴图 {path}: {source}")]
  AssetLoad {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
  #[error("贴图越界: 位置 ({left}, {top}), 尺寸 {width}x{height}, 图像尺寸 {image_width}x{image_height}")]
  OverlayBounds {
    left: i64,
    top: i64,
    width: u32,
    height: u32,
    image_width: u32,
    image_height: u32,
  },
  #[error("贴图缩放后尺寸为零, 缩放长度 {scale}")]
  DegenerateOverlay { scale: f32 },
  #[error("GLASS 模型需要贴图路径")]
  MissingOverlayAsset,
  #[error("未加载字体, 无法绘制文字")]
  MissingFont,
  #[error("{model} 模型不能渲染 {kind} 类型的结果")]
  OutputMismatch { model: String, kind: &'static str },
}

/// 渲染失败时的处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderFallback {
  /// 直接返回错误
  Strict,
  /// 记录错误并使用未标注的原图
  #[default]
  SourceImage,
}

impl RenderFallback {
  pub fn apply(
    self,
    source: &RgbImage,
    result: Result<RgbImage, RenderError>,
  ) -> Result<RgbImage, RenderError> {
    match (self, result) {
      (_, Ok(image)) => Ok(image),
      (RenderFallback::Strict, Err(e)) => Err(e),
      (RenderFallback::SourceImage, Err(e)) => {
        error!("渲染失败, 使用原图: {}", e);
        Ok(source.clone())
      }
    }
  }
}

/// 结果渲染器，只持有只读的绘制资源
#[derive(Debug, Clone, Default)]
pub struct Renderer {
  painter: Painter,
}

impl Renderer {
  pub fn new(painter: Painter) -> Self {
    Self { painter }
  }

  /// 根据模型类型选择渲染方式；原图只读，失败不会破坏原图
  pub fn render(
    &self,
    model_type: &ModelType,
    image: &RgbImage,
    overlay_asset: Option<&Path>,
    decoded: &DecodedOutput,
  ) -> Result<RgbImage, RenderError> {
    let mismatch = || RenderError::OutputMismatch {
      model: model_type.to_string(),
      kind: decoded.kind_name(),
    };
    debug!("渲染 {} 模型结果 ({})", model_type, decoded.kind_name());

    match model_type {
      ModelType::Pose => {
        let DecodedOutput::Heatmaps(stack) = decoded else {
          return Err(mismatch());
        };
        let binary = mask::threshold_pose(stack, mask::CONFIDENCE_CUTOFF)?;
        mask::composite(image, &mask::make_mask(&binary))
      }
      ModelType::Text => {
        let DecodedOutput::Heatmaps(stack) = decoded else {
          return Err(mismatch());
        };
        let binary = mask::threshold_text(stack, mask::CONFIDENCE_CUTOFF)?;
        mask::composite(image, &mask::make_mask(&binary))
      }
      ModelType::CarMeta => {
        let DecodedOutput::CarMeta { color, kind } = decoded else {
          return Err(mismatch());
        };
        annotate::render_car_meta(&self.painter, image, *color, *kind)
      }
      ModelType::Facial => {
        let DecodedOutput::Landmarks(points) = decoded else {
          return Err(mismatch());
        };
        landmark::render_landmarks(&self.painter, image, points)
      }
      ModelType::Glass => {
        let DecodedOutput::Landmarks(points) = decoded else {
          return Err(mismatch());
        };
        let asset = overlay_asset.ok_or(RenderError::MissingOverlayAsset)?;
        overlay::overlay(image, asset, points)
      }
      ModelType::Gender => {
        let DecodedOutput::AgeGender { age, gender } = decoded else {
          return Err(mismatch());
        };
        annotate::render_gender(&self.painter, image, *age, *gender)
      }
      ModelType::Unknown(tag) => {
        warn!("未知模型类型 {}, 无法生成标注图像", tag);
        Ok(image.clone())
      }
    }
  }
}
