//! Decorative sleep-phase chart.
//!
//! The series is random; all randomness comes from the generator passed in so that callers (and
//! tests) can pin the output with a seed.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ReportError;

/// Number of hourly samples in a chart when nothing else is configured.
pub const DEFAULT_CHART_HOURS: usize = 10;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([204, 204, 204]);
const AXIS: Rgb<u8> = Rgb([102, 102, 102]);
const STROKE: Rgb<u8> = Rgb([136, 132, 216]);
const GRID_DASH: u32 = 3;

/// Sleep phases on the chart's y-axis, lowest value first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SleepPhase {
    Awake,
    Rem,
    LightSleep,
    NormalSleep,
    DeepSleep,
    ExtremeSleep,
}

impl SleepPhase {
    /// All phases ordered by their axis value.
    pub const ALL: [SleepPhase; 6] = [
        SleepPhase::Awake,
        SleepPhase::Rem,
        SleepPhase::LightSleep,
        SleepPhase::NormalSleep,
        SleepPhase::DeepSleep,
        SleepPhase::ExtremeSleep,
    ];

    /// Position on the y-axis, `0..=5`.
    pub fn value(self) -> usize {
        self as usize
    }

    /// Axis label.
    pub fn label(self) -> &'static str {
        match self {
            SleepPhase::Awake => "Awake",
            SleepPhase::Rem => "REM",
            SleepPhase::LightSleep => "Light Sleep",
            SleepPhase::NormalSleep => "Normal Sleep",
            SleepPhase::DeepSleep => "Deep Sleep",
            SleepPhase::ExtremeSleep => "Extreme Sleep",
        }
    }

    fn max_value() -> usize {
        Self::ALL.len() - 1
    }
}

impl fmt::Display for SleepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One hourly sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartPoint {
    /// X-axis label, e.g. `"3 hr"`.
    pub time: String,
    pub phase: SleepPhase,
}

/// Draws one random phase per hour from `rng`.
pub fn generate_series<R: Rng + ?Sized>(rng: &mut R, hours: usize) -> Vec<ChartPoint> {
    (1..=hours)
        .map(|hour| ChartPoint {
            time: format!("{hour} hr"),
            phase: SleepPhase::ALL[rng.gen_range(0..SleepPhase::ALL.len())],
        })
        .collect()
}

/// Deterministic series for a fixed seed.
pub fn seeded_series(seed: u64, hours: usize) -> Vec<ChartPoint> {
    generate_series(&mut StdRng::seed_from_u64(seed), hours)
}

/// Rasterizes `series` as a line chart with a dashed grid.
pub fn rasterize(series: &[ChartPoint], width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    if width < 4 || height < 4 {
        return image;
    }

    let margin = (width.min(height) / 8).max(1);
    let plot = PlotArea {
        left: margin,
        top: margin,
        right: width - 1 - margin,
        bottom: height - 1 - margin,
    };

    for level in 0..=SleepPhase::max_value() {
        let y = plot.y_for(level);
        dashed_horizontal(&mut image, plot.left, plot.right, y);
    }
    for index in 0..series.len() {
        let x = plot.x_for(index, series.len());
        dashed_vertical(&mut image, x, plot.top, plot.bottom);
    }

    draw_line(&mut image, (plot.left, plot.bottom), (plot.right, plot.bottom), AXIS);
    draw_line(&mut image, (plot.left, plot.top), (plot.left, plot.bottom), AXIS);

    let points: Vec<_> = series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            (
                plot.x_for(index, series.len()),
                plot.y_for(point.phase.value()),
            )
        })
        .collect();
    for pair in points.windows(2) {
        draw_line(&mut image, pair[0], pair[1], STROKE);
        // Second pass one pixel lower for a 2px stroke.
        if pair[0].1 + 1 < height && pair[1].1 + 1 < height {
            draw_line(
                &mut image,
                (pair[0].0, pair[0].1 + 1),
                (pair[1].0, pair[1].1 + 1),
                STROKE,
            );
        }
    }
    if let [single] = points.as_slice() {
        image.put_pixel(single.0, single.1, STROKE);
    }

    image
}

/// Renders `series` to PNG bytes.
pub fn to_png(series: &[ChartPoint], width: u32, height: u32) -> Result<Vec<u8>, ReportError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(rasterize(series, width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

struct PlotArea {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl PlotArea {
    fn x_for(&self, index: usize, count: usize) -> u32 {
        let span = f64::from(self.right - self.left);
        let fraction = if count > 1 {
            index as f64 / (count - 1) as f64
        } else {
            0.5
        };
        self.left + (span * fraction).round() as u32
    }

    fn y_for(&self, level: usize) -> u32 {
        let span = f64::from(self.bottom - self.top);
        let fraction = level as f64 / SleepPhase::max_value() as f64;
        self.bottom - (span * fraction).round() as u32
    }
}

fn dashed_horizontal(image: &mut RgbImage, from: u32, to: u32, y: u32) {
    for x in (from..=to).filter(|x| (x / GRID_DASH) % 2 == 0) {
        image.put_pixel(x, y, GRID);
    }
}

fn dashed_vertical(image: &mut RgbImage, x: u32, from: u32, to: u32) {
    for y in (from..=to).filter(|y| (y / GRID_DASH) % 2 == 0) {
        image.put_pixel(x, y, GRID);
    }
}

// Bresenham; both endpoints must lie inside the image.
fn draw_line(image: &mut RgbImage, from: (u32, u32), to: (u32, u32), color: Rgb<u8>) {
    let (mut x0, mut y0) = (i64::from(from.0), i64::from(from.1));
    let (x1, y1) = (i64::from(to.0), i64::from(to.1));
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        image.put_pixel(x0 as u32, y0 as u32, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x0 += sx;
        }
        if doubled <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_has_one_point_per_hour() {
        let series = seeded_series(7, DEFAULT_CHART_HOURS);
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].time, "1 hr");
        assert_eq!(series[9].time, "10 hr");
        assert!(series.iter().all(|point| point.phase.value() <= 5));
    }

    #[test]
    fn same_seed_same_series() {
        assert_eq!(seeded_series(42, 24), seeded_series(42, 24));
    }

    #[test]
    fn phase_labels_follow_axis_order() {
        let labels: Vec<_> = SleepPhase::ALL.iter().map(|phase| phase.label()).collect();
        assert_eq!(
            labels,
            ["Awake", "REM", "Light Sleep", "Normal Sleep", "Deep Sleep", "Extreme Sleep"]
        );
        assert_eq!(SleepPhase::ExtremeSleep.value(), 5);
    }

    #[test]
    fn rasterized_chart_draws_the_series() {
        let series = vec![
            ChartPoint {
                time: "1 hr".into(),
                phase: SleepPhase::Awake,
            },
            ChartPoint {
                time: "2 hr".into(),
                phase: SleepPhase::ExtremeSleep,
            },
        ];
        let image = rasterize(&series, 160, 80);
        assert_eq!(image.dimensions(), (160, 80));
        // margin = 10: first point sits on the bottom-left corner of the plot, the last on top.
        assert_eq!(*image.get_pixel(10, 69), STROKE);
        assert_eq!(*image.get_pixel(149, 10), STROKE);
    }

    #[test]
    fn tiny_canvas_is_left_blank() {
        let image = rasterize(&seeded_series(1, 3), 3, 3);
        assert!(image.pixels().all(|pixel| *pixel == BACKGROUND));
    }

    #[test]
    fn png_output_decodes() {
        let bytes = to_png(&seeded_series(3, 10), 320, 160).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgb8().dimensions(), (320, 160));
    }
}
