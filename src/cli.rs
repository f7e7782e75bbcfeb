//! 命令行参数

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::models::LayerKind;

/// 红树林遥感分析客户端
#[derive(Debug, Parser)]
#[command(name = "mangrove-pulse", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 分析后端地址（覆盖 API_BASE_URL）
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// 报告输出目录（覆盖 REPORT_OUTPUT_DIR）
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// 分析年份（覆盖 DEFAULT_YEAR）
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// 图层: NDVI / NDWI / MVI / Satellite
    #[arg(long, global = true, default_value = "NDVI")]
    pub layer: LayerKind,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 查询单点指数
    Point {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
    /// 区域分析（统计、构成图、趋势图）
    Area {
        #[command(flatten)]
        shape: ShapeArgs,
        /// 分析完成后导出 PDF 报告
        #[arg(long)]
        report: bool,
    },
    /// 导出 GeoTIFF 下载地址
    ExportTiff {
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// 提交批量导出任务
    ExportDrive {
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// 查看图层瓦片地址
    Layer,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Point { .. } => "point",
            Command::Area { .. } => "area",
            Command::ExportTiff { .. } => "export-tiff",
            Command::ExportDrive { .. } => "export-drive",
            Command::Layer => "layer",
        }
    }
}

/// 几何来源：GeoJSON 文件或外接矩形
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ShapeArgs {
    /// GeoJSON 文件（Geometry / Feature / FeatureCollection 的第一个要素）
    #[arg(long)]
    pub geojson: Option<PathBuf>,

    /// 矩形: MIN_LON,MIN_LAT,MAX_LON,MAX_LAT
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub bbox: Option<Vec<f64>>,
}

impl Cli {
    /// 命令行参数覆盖环境配置
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.report_output_dir = dir.clone();
        }
        if let Some(year) = self.year {
            config.default_year = year;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}
