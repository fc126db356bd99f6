//! 局面フェーズ係数のフィッティング
//!
//! JSONL 形式のサンプル（フェーズ特徴ベクトル・目的値・重み）から
//! 重み付き最小二乗で係数を求める。
//!
//! ```text
//! {"phase": [1.0, 0.25, 0.0, 0.0], "target": 112.0}
//! {"phase": [0.0, 0.5, 0.5, 0.0], "target": -40.5, "weight": 2.0}
//! ```

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rshogi_linalg::{NormalEquations, PHASE_VEC_LENGTH, PhaseVector};
use serde::{Deserialize, Serialize};

use crate::common::io::open_reader;

fn default_weight() -> f64 {
    1.0
}

/// 教師データの1レコード
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseRecord {
    pub phase: [f64; PHASE_VEC_LENGTH],
    pub target: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl PhaseRecord {
    fn validate(&self) -> Result<()> {
        if !self.phase.iter().all(|x| x.is_finite()) || !self.target.is_finite() {
            bail!("non-finite value");
        }
        if !(self.weight.is_finite() && self.weight >= 0.0) {
            bail!("weight must be finite and non-negative (got {})", self.weight);
        }
        Ok(())
    }

    #[inline]
    pub fn features(&self) -> PhaseVector {
        PhaseVector::from(self.phase)
    }
}

/// 読み込み済みのデータセット
#[derive(Debug, Default)]
pub struct PhaseDataset {
    records: Vec<PhaseRecord>,
    skipped: usize,
}

impl PhaseDataset {
    /// ファイル（`.gz` 可、`-` は標準入力）から読み込む
    pub fn load<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<Self> {
        let reader = open_reader(path.as_ref())
            .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
        Self::from_reader(reader, limit)
    }

    /// 1行1レコードで読み込む
    ///
    /// 空行は無視し、壊れた行（UTF-8 として不正なものを含む）・不正な値を含む行は
    /// 警告を出して読み飛ばす。読み込み自体の I/O エラーは返す。
    pub fn from_reader<R: BufRead>(mut reader: R, limit: Option<usize>) -> Result<Self> {
        let mut dataset = Self::default();
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            if limit.is_some_and(|lim| dataset.records.len() >= lim) {
                break;
            }

            buf.clear();
            line_no += 1;
            let n = reader
                .read_until(b'\n', &mut buf)
                .with_context(|| format!("Failed to read line {line_no}"))?;
            if n == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    log::warn!("Skipping line {line_no}: {e}");
                    dataset.skipped += 1;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let parsed = serde_json::from_str::<PhaseRecord>(line)
                .map_err(anyhow::Error::from)
                .and_then(|record| record.validate().map(|()| record));
            match parsed {
                Ok(record) => dataset.records.push(record),
                Err(e) => {
                    log::warn!("Skipping line {line_no}: {e}");
                    dataset.skipped += 1;
                }
            }
        }

        Ok(dataset)
    }

    pub fn records(&self) -> &[PhaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 読み飛ばした行数
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// フィッティングの設定
#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    /// 対角に加える L2 正則化項
    pub ridge: f64,
    /// 特異判定の許容誤差
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            ridge: 0.0,
            tolerance: rshogi_linalg::DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

/// フィッティング結果
#[derive(Debug, Clone, Serialize)]
pub struct FitReport {
    pub coefficients: [f64; PHASE_VEC_LENGTH],
    pub samples: usize,
    pub skipped: usize,
    /// 重み付き二乗平均平方根誤差
    pub rmse: f64,
}

/// 正規方程式を組み立てて係数を解く
pub fn fit(dataset: &PhaseDataset, config: &FitConfig) -> Result<FitReport> {
    if dataset.is_empty() {
        bail!("no valid samples to fit");
    }

    let mut eq = NormalEquations::<PHASE_VEC_LENGTH>::new();
    for record in dataset.records() {
        eq.add_sample(&record.features(), record.target, record.weight);
    }
    log::debug!("accumulated {} samples", eq.sample_count());

    let beta = eq.solve(config.ridge, config.tolerance).with_context(|| {
        format!(
            "phase feature matrix is singular with ridge={} (try a positive --ridge)",
            config.ridge
        )
    })?;

    Ok(FitReport {
        coefficients: beta.into_array(),
        samples: dataset.len(),
        skipped: dataset.skipped(),
        rmse: weighted_rmse(dataset, &beta),
    })
}

/// 重み付き RMSE（重みの総和が 0 のときは 0）
pub fn weighted_rmse(dataset: &PhaseDataset, beta: &PhaseVector) -> f64 {
    let mut sum_sq = 0.0;
    let mut sum_w = 0.0;
    for record in dataset.records() {
        let residual = record.target - record.features().dot(beta);
        sum_sq += record.weight * residual * residual;
        sum_w += record.weight;
    }
    if sum_w > 0.0 { (sum_sq / sum_w).sqrt() } else { 0.0 }
}
