use std::path::PathBuf;

use clap::{builder::RangedU64ValueParser, Args};

use crate::chart::ImageFormat;

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_HORIZON: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Args)]
pub struct ForecastSettings {
    /// Number of trailing days averaged by the moving average
    #[arg(
        short = 'n',
        long,
        env = "METEO_WINDOW",
        default_value_t = DEFAULT_WINDOW,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub window: usize,

    /// Number of days to forecast
    #[arg(
        long,
        env = "METEO_HORIZON",
        default_value_t = DEFAULT_HORIZON,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub horizon: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ChartSettings {
    /// Directory receiving the chart images
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = ImageFormat::Png)]
    pub format: ImageFormat,

    /// Image width in pixels
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1080)]
    pub height: u32,
}

impl ChartSettings {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("."),
            format: ImageFormat::Png,
            width: 1920,
            height: 1080,
        }
    }
}
