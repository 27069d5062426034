//! Recorded flight data and the printers that turn it into plottable output.
use std::io::{self, Write};

use tvc_utils::Vec3D;

use crate::simulation::Sample;

/// Per-step samples at a uniform `dt`; index `i` was taken at the nominal time `t = i * dt`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightHistory {
    /// spacing between samples, seconds.
    pub dt: f64,
    /// body +z in the world frame.
    pub directions: Vec<Vec3D>,
    /// body rates, rad/s.
    pub angular_velocities: Vec<Vec3D>,
    /// world-frame position.
    pub positions: Vec<Vec3D>,
}

/// headline numbers for a finished flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightSummary {
    /// highest world z reached; never below the launch height of 0.
    pub apogee: f64,
    /// nominal time of the apogee sample.
    pub apogee_time: f64,
    /// largest |omega| seen.
    pub max_angular_rate: f64,
}

impl FlightHistory {
    /// an empty history for samples `dt` apart.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            directions: Vec::new(),
            angular_velocities: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// appends one sample to each sequence.
    pub fn push(&mut self, sample: &Sample) {
        self.directions.push(sample.direction);
        self.angular_velocities.push(sample.angular_velocity);
        self.positions.push(sample.position);
    }

    /// number of samples.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// true before the first sample.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// nominal time of sample `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.dt
    }

    /// samples in time order, rebuilt from the parallel sequences.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.directions
            .iter()
            .zip(&self.angular_velocities)
            .zip(&self.positions)
            .enumerate()
            .map(|(i, ((&direction, &angular_velocity), &position))| Sample {
                t: self.time_at(i),
                direction,
                angular_velocity,
                position,
            })
    }

    /// apogee and peak rate over the whole flight.
    pub fn summary(&self) -> FlightSummary {
        let mut summary = FlightSummary {
            apogee: 0.0,
            apogee_time: 0.0,
            max_angular_rate: 0.0,
        };
        for sample in self.samples() {
            if sample.position.2 > summary.apogee {
                summary.apogee = sample.position.2;
                summary.apogee_time = sample.t;
            }
            summary.max_angular_rate = summary
                .max_angular_rate
                .max(sample.angular_velocity.magnitude());
        }
        summary
    }
}

/// which rows a printer emits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrintType {
    /// every n-th sample, starting with the first.
    Every(usize),
    /// every sample.
    All,
}

impl PrintType {
    fn keeps(&self, index: usize) -> bool {
        match *self {
            PrintType::Every(n) => index % n.max(1) == 0,
            PrintType::All => true,
        }
    }
}

/// Consumer of a finished flight.
pub trait HistoryPlotter {
    /// renders the whole history in one go.
    fn plot(&mut self, history: &FlightHistory) -> io::Result<()>;
}

/// Writes `t, ux, uy, uz, wx, wy, wz, x, y, z` rows, one per kept sample, after a header line.
pub struct CsvPlotter<W: Write> {
    writer: W,
    print_type: PrintType,
}

impl<W: Write> CsvPlotter<W> {
    /// a printer writing to `writer`.
    pub fn new(writer: W, print_type: PrintType) -> Self {
        Self { writer, print_type }
    }

    /// hands back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HistoryPlotter for CsvPlotter<W> {
    fn plot(&mut self, history: &FlightHistory) -> io::Result<()> {
        writeln!(self.writer, "t, ux, uy, uz, wx, wy, wz, x, y, z")?;
        for (i, s) in history.samples().enumerate() {
            if !self.print_type.keeps(i) {
                continue;
            }
            let Sample {
                t,
                direction: u,
                angular_velocity: w,
                position: r,
            } = s;
            writeln!(
                self.writer,
                "{t}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
                u.0, u.1, u.2, w.0, w.1, w.2, r.0, r.1, r.2
            )?;
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climbing(n: usize) -> FlightHistory {
        let mut history = FlightHistory::new(0.5);
        for i in 0..n {
            let h = i as f64;
            let t = history.time_at(i);
            history.push(&Sample {
                t,
                direction: Vec3D::up(),
                angular_velocity: Vec3D(0.0, 0.0, h),
                // rises to a peak at i = 3 then falls.
                position: Vec3D(0.0, 0.0, 6.0 * h - h * h),
            });
        }
        history
    }

    #[test]
    fn sequences_stay_parallel() {
        let history = climbing(5);
        assert_eq!(history.len(), 5);
        assert_eq!(history.directions.len(), 5);
        assert_eq!(history.angular_velocities.len(), 5);
        assert_eq!(history.samples().last().map(|s| s.t), Some(2.0));
    }

    #[test]
    fn summary_finds_apogee() {
        let summary = climbing(6).summary();
        assert_eq!(summary.apogee, 9.0);
        assert_eq!(summary.apogee_time, 1.5);
        assert_eq!(summary.max_angular_rate, 5.0);
    }

    #[test]
    fn csv_thinning() {
        let mut plotter = CsvPlotter::new(Vec::new(), PrintType::Every(2));
        plotter.plot(&climbing(5)).unwrap();
        let text = String::from_utf8(plotter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // header + samples 0, 2, 4
        assert_eq!(lines.len(), 4, "{text}");
        assert!(lines[0].starts_with("t, ux"));
        assert_eq!(lines[2], "1, 0, 0, 1, 0, 0, 2, 0, 0, 8");
    }

    #[test]
    fn csv_all_rows() {
        let mut plotter = CsvPlotter::new(Vec::new(), PrintType::All);
        plotter.plot(&climbing(3)).unwrap();
        assert_eq!(String::from_utf8(plotter.into_inner()).unwrap().lines().count(), 4);
    }
}
