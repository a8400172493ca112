//! TrajectoryReconstructor - telemetry to 2D path.

use contracts::{
    AngleUnit, Channel, ContractError, TelemetryTable, Trajectory, TrajectoryConfig,
    TrajectoryModel,
};
use tracing::{debug, instrument};

/// Channels reconstruction cannot run without
const REQUIRED: [Channel; 4] = [
    Channel::Time,
    Channel::Distance,
    Channel::Speed,
    Channel::YawRate,
];

/// Trajectory reconstructor
///
/// Heading is the running sum of `yaw_rate * dt`, never wrapped. Position
/// follows the configured [`TrajectoryModel`].
#[derive(Debug, Clone, Default)]
pub struct TrajectoryReconstructor {
    config: TrajectoryConfig,
}

impl TrajectoryReconstructor {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    /// Reconstruct a path index-aligned with `telemetry`
    ///
    /// # Errors
    /// `MissingColumn` naming the first absent required channel.
    #[instrument(
        name = "trajectory_reconstruct",
        skip(self, telemetry),
        fields(rows = telemetry.len(), model = ?self.config.model)
    )]
    pub fn reconstruct(&self, telemetry: &TelemetryTable) -> Result<Trajectory, ContractError> {
        for channel in REQUIRED {
            if telemetry.channel(channel).is_none() {
                return Err(ContractError::missing_column(channel.name()));
            }
        }

        let values = |channel: Channel| telemetry.values(channel).unwrap_or_default();
        let time = values(Channel::Time);
        let distance = values(Channel::Distance);
        let speed = values(Channel::Speed);
        let yaw_rate = values(Channel::YawRate);

        let dt = self.time_deltas(&time);
        let heading = self.accumulate_heading(&yaw_rate, &dt);

        let (x, y) = match self.config.model {
            TrajectoryModel::PathIntegration => integrate_increments(&distance, &heading),
            TrajectoryModel::Velocity => {
                let to_mps = self.config.speed_unit.to_mps();
                let steps: Vec<f64> = speed
                    .iter()
                    .zip(&dt)
                    .map(|(v, dt)| v * to_mps * dt)
                    .collect();
                integrate_steps(&steps, &heading)
            }
            TrajectoryModel::DistanceRadius => distance
                .iter()
                .zip(&heading)
                .map(|(d, h)| (d * h.cos(), d * h.sin()))
                .unzip(),
        };

        let trajectory = Trajectory {
            model: self.config.model,
            heading,
            x,
            y,
            distance,
            ideal: None,
        };
        debug!(
            points = trajectory.len(),
            path_length = trajectory.path_length(),
            "trajectory reconstructed"
        );
        Ok(trajectory)
    }

    /// dt[i] = time[i] - time[i-1], dt[0] = 0, clamped to [dt_min, dt_max]
    fn time_deltas(&self, time: &[f64]) -> Vec<f64> {
        let (dt_min, dt_max) = (self.config.dt_min, self.config.dt_max);
        (0..time.len())
            .map(|i| {
                let raw = if i == 0 { 0.0 } else { time[i] - time[i - 1] };
                raw.max(dt_min).min(dt_max)
            })
            .collect()
    }

    fn accumulate_heading(&self, yaw_rate: &[f64], dt: &[f64]) -> Vec<f64> {
        let to_radians = |v: f64| match self.config.yaw_rate_unit {
            AngleUnit::Degrees => v.to_radians(),
            AngleUnit::Radians => v,
        };

        yaw_rate
            .iter()
            .zip(dt)
            .scan(0.0, |heading, (rate, dt)| {
                *heading += to_radians(*rate) * dt;
                Some(*heading)
            })
            .collect()
    }
}

/// Odometer increments along the heading, anchored at `distance[0]`
fn integrate_increments(distance: &[f64], heading: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let Some(&first) = distance.first() else {
        return (Vec::new(), Vec::new());
    };

    let mut steps = Vec::with_capacity(distance.len());
    steps.push(first);
    steps.extend(distance.windows(2).map(|w| w[1] - w[0]));
    integrate_steps(&steps, heading)
}

/// Running sum of `step * (cos h, sin h)`
fn integrate_steps(steps: &[f64], heading: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::with_capacity(steps.len());
    let mut y = Vec::with_capacity(steps.len());
    let (mut px, mut py) = (0.0, 0.0);

    for (step, h) in steps.iter().zip(heading) {
        px += step * h.cos();
        py += step * h.sin();
        x.push(px);
        y.push(py);
    }
    (x, y)
}
