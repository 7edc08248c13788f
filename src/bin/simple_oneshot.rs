// 该文件是 Huitu （绘图） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像结果渲染
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

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use huitu::{
  FromUrl,
  input::{ImageFileInput, RawOutputFile},
  model::{ModelType, RecordedModel},
  output::SaveImageFileOutput,
  render::{Painter, RenderFallback, Renderer},
  task::{OneShotTask, Task},
};

/// Huitu 单次渲染参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 源图像，例如 image:///data/car.png
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 推理输出记录，例如 json:///data/car-output.json
  #[arg(long, value_name = "RAW_OUTPUT")]
  pub raw_output: Url,
  /// 模型类型: POSE, TEXT, CAR_META, FACIAL, GLASS 或 GENDER
  #[arg(long, value_name = "TYPE")]
  pub model_type: String,
  /// 输出目录，例如 image:///data/outputs
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// GLASS 模型使用的贴图（带透明通道）
  #[arg(long, value_name = "FILE")]
  pub glass: Option<PathBuf>,
  /// 文字渲染字体，缺省时使用内置字体
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,
  /// 渲染失败时直接报错，而不是输出原图
  #[arg(long)]
  pub strict: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  let model_type = ModelType::from(args.model_type.as_str());

  info!("模型类型: {}", model_type);
  info!("输入来源: {}", args.input);
  info!("推理输出: {}", args.raw_output);
  info!("输出路径: {}", args.output);

  let painter = match &args.font {
    Some(path) => Painter::from_font_file(path)?,
    None => Painter::embedded()?,
  };
  let fallback = if args.strict {
    RenderFallback::Strict
  } else {
    RenderFallback::SourceImage
  };

  let input = ImageFileInput::from_url(&args.input)?;
  let raw = RawOutputFile::from_url(&args.raw_output)?.into_raw();
  let model = RecordedModel::new(model_type.clone(), raw);
  let output = SaveImageFileOutput::from_url(&args.output)?
    .with_model_type(model_type)
    .with_overlay_asset(args.glass)
    .with_renderer(Renderer::new(painter))
    .with_fallback(fallback);

  let report = OneShotTask.run_task(input.into_frames(), model, &output)?;
  info!(
    "完成: {} (解码 {:.2?}, 渲染 {:.2?})",
    output.output_path()?.display(),
    report.decode,
    report.render
  );

  Ok(())
}
