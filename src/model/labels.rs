// 该文件是 Huitu （绘图） 项目的一部分。
// src/model/labels.rs - 类别标签表
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

use thiserror::Error;

pub const CAR_COLORS: [&str; 7] = ["white", "gray", "yellow", "red", "green", "blue", "black"];
pub const CAR_TYPES: [&str; 4] = ["car", "bus", "truck", "van"];
pub const GENDER_TYPES: [&str; 2] = ["female", "male"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
  #[error("类别下标越界: {table}[{index}], 表长度 {len}")]
  OutOfRange {
    table: &'static str,
    index: usize,
    len: usize,
  },
}

fn lookup(table: &'static str, labels: &[&'static str], index: usize) -> Result<&'static str, LabelError> {
  labels.get(index).copied().ok_or(LabelError::OutOfRange {
    table,
    index,
    len: labels.len(),
  })
}

/// 车辆颜色与车型
pub fn decode_car_meta(color: usize, kind: usize) -> Result<(&'static str, &'static str), LabelError> {
  let color = lookup("CAR_COLORS", &CAR_COLORS, color)?;
  let kind = lookup("CAR_TYPES", &CAR_TYPES, kind)?;
  Ok((color, kind))
}

/// 年龄原样返回，性别查表
pub fn decode_gender(age: u32, gender: usize) -> Result<(u32, &'static str), LabelError> {
  Ok((age, lookup("GENDER_TYPES", &GENDER_TYPES, gender)?))
}
