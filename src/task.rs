// 该文件是 Huitu （绘图） 项目的一部分。
// src/task.rs - 单次解码与渲染任务
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

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 单次任务各阶段耗时
#[derive(Debug, Clone, Copy)]
pub struct OneShotReport {
  pub decode: Duration,
  pub render: Duration,
}

/// 取第一帧：解码一次，渲染并输出一次
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = OneShotReport;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    if input.next().is_some() {
      warn!("输入包含多帧, 仅处理第一帧");
    }

    info!("输入帧获取成功, 开始解码...");
    let now = Instant::now();
    let result = model.infer(&frame)?;
    let decode = now.elapsed();
    info!("解码完成, 耗时: {:.2?}", decode);

    let now = Instant::now();
    output.render_result(&frame, &result)?;
    let render = now.elapsed();
    info!("渲染完成, 耗时: {:.2?}", render);

    Ok(OneShotReport { decode, render })
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use image::RgbImage;

  use super::*;
  use crate::{
    model::{DecodedOutput, ModelType, RecordedModel},
    render::{RenderError, Renderer},
    tensor::{RawOutput, Tensor},
  };

  struct Collect {
    model_type: ModelType,
    rendered: RefCell<Vec<RgbImage>>,
  }

  impl Render<RgbImage, DecodedOutput> for Collect {
    type Error = RenderError;

    fn render_result(&self, frame: &RgbImage, result: &DecodedOutput) -> Result<(), Self::Error> {
      let image = Renderer::default().render(&self.model_type, frame, None, result)?;
      self.rendered.borrow_mut().push(image);
      Ok(())
    }
  }

  fn text_model() -> RecordedModel {
    let mut data = vec![0.0; 8];
    // 第二通道左上角为文字
    data[4] = 0.9;
    let raw = RawOutput {
      outputs: vec![Tensor::new(vec![1, 2, 2, 2], data).unwrap()],
    };
    RecordedModel::new(ModelType::Text, raw)
  }

  #[test]
  fn renders_first_frame_once() {
    let output = Collect {
      model_type: ModelType::Text,
      rendered: RefCell::new(Vec::new()),
    };
    let frames = vec![RgbImage::new(2, 2)];
    OneShotTask.run_task(frames.into_iter(), text_model(), &output).unwrap();

    let rendered = output.rendered.borrow();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].get_pixel(0, 0).0, [0, 255, 0]);
    assert_eq!(rendered[0].get_pixel(1, 1).0, [0, 0, 0]);
  }

  #[test]
  fn empty_input_is_an_error() {
    let output = Collect {
      model_type: ModelType::Text,
      rendered: RefCell::new(Vec::new()),
    };
    let result = OneShotTask.run_task(std::iter::empty::<RgbImage>(), text_model(), &output);
    assert!(result.is_err());
    assert!(output.rendered.borrow().is_empty());
  }

  #[test]
  fn decode_failure_stops_before_rendering() {
    let output = Collect {
      model_type: ModelType::CarMeta,
      rendered: RefCell::new(Vec::new()),
    };
    let model = RecordedModel::new(ModelType::CarMeta, RawOutput::default());
    let result = OneShotTask.run_task(vec![RgbImage::new(2, 2)].into_iter(), model, &output);
    assert!(result.is_err());
    assert!(output.rendered.borrow().is_empty());
  }
}
