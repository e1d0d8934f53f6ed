/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Untyped text grids produced by the table scraper

use scr_core::Statement;
use serde::{Deserialize, Serialize};

/// One metric row: the label cell and `(column label, raw text)` pairs in
/// column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
  pub label: String,
  pub cells: Vec<(String, String)>,
}

/// A scraped statement table. Values are not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
  pub statement: Statement,
  /// Column labels after the metric label column, e.g. `"Mar 2024"`, `"TTM"`
  pub columns: Vec<String>,
  pub rows: Vec<RawRow>,
}

impl RawTable {
  pub fn new(statement: Statement, columns: Vec<String>) -> Self {
    Self { statement, columns, rows: Vec::new() }
  }

  /// Append a row, pairing values with columns by position.
  ///
  /// Short rows are padded with empty cells so every row spans every
  /// column; surplus values are dropped.
  pub fn push_row<I, S>(&mut self, label: impl Into<String>, values: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut values = values.into_iter();
    let cells = self
      .columns
      .iter()
      .map(|column| (column.clone(), values.next().map(Into::into).unwrap_or_default()))
      .collect();
    self.rows.push(RawRow { label: label.into(), cells });
  }

  /// Builder form of [`RawTable::push_row`]
  pub fn with_row<I, S>(mut self, label: impl Into<String>, values: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.push_row(label, values);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}
