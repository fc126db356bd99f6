//! 局面フェーズ係数フィッティングツール
//!
//! JSONL（gzip 可）のサンプルから重み付き最小二乗で係数を求め、JSON で出力する。
//!
//! ```bash
//! cargo run --release -p tools --bin phase_fit -- --input samples.jsonl.gz --ridge 1e-6
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use rshogi_linalg::DEFAULT_SINGULAR_TOLERANCE;
use tools::common::io::open_writer;
use tools::phase_fit::{FitConfig, PhaseDataset, fit};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fit phase-blend coefficients by weighted least squares")]
struct Cli {
    /// 入力 JSONL ファイル（.gz 可、`-` で標準入力）
    #[arg(short, long)]
    input: PathBuf,

    /// 出力 JSON ファイル（省略時は標準出力、.gz なら圧縮）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 対角に加える L2 正則化項
    #[arg(long, default_value_t = 0.0)]
    ridge: f64,

    /// 行列式がこの値以下なら特異とみなす
    #[arg(long, default_value_t = DEFAULT_SINGULAR_TOLERANCE)]
    tolerance: f64,

    /// 読み込むサンプル数の上限
    #[arg(long)]
    limit: Option<usize>,

    /// 整形して出力する
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    if !(cli.ridge.is_finite() && cli.ridge >= 0.0) {
        bail!("--ridge must be a finite non-negative number");
    }
    if !(cli.tolerance.is_finite() && cli.tolerance >= 0.0) {
        bail!("--tolerance must be a finite non-negative number");
    }

    info!("SIMD backend: {}", rshogi_linalg::simd::backend_name());

    let dataset = PhaseDataset::load(&cli.input, cli.limit)?;
    info!(
        "Loaded {} samples from {} ({} skipped)",
        dataset.len(),
        cli.input.display(),
        dataset.skipped()
    );

    let config = FitConfig {
        ridge: cli.ridge,
        tolerance: cli.tolerance,
    };
    let report = fit(&dataset, &config)?;
    info!("coefficients={:?} rmse={:.6}", report.coefficients, report.rmse);

    let mut writer = open_writer(cli.output.as_deref()).context("Failed to open output")?;
    if cli.pretty {
        serde_json::to_writer_pretty(&mut writer, &report)?;
    } else {
        serde_json::to_writer(&mut writer, &report)?;
    }
    writeln!(writer)?;
    writer.close().context("Failed to finalize output")?;
    Ok(())
}
