use std::path::Path;

use csv::Writer;
use ndarray::{ArrayView2, ArrayView3};
use serde::Serialize;

use crate::disc::grid::Grid;
use crate::error::Result;
use crate::temporal_disc::Trajectory;

#[derive(Serialize)]
struct PointData {
    x: f64,
    y: f64,
    u: f64,
}

#[derive(Serialize)]
struct WindData {
    x: f64,
    y: f64,
    wx: f64,
    wy: f64,
}

#[derive(Serialize)]
struct HistoryData {
    step: usize,
    time: f64,
    max_norm: f64,
}

/// One `x,y,u` row per node.
pub fn write_to_csv(solution: ArrayView2<f64>, grid: &Grid, filename: impl AsRef<Path>) -> Result<()> {
    grid.check_scalar_shape(solution.shape())?;
    let mut writer = Writer::from_path(filename)?;
    for ((i, j), &u) in solution.indexed_iter() {
        let (x, y) = grid.coordinates(i, j);
        writer.serialize(PointData { x, y, u })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_wind_to_csv(wind: ArrayView3<f64>, grid: &Grid, filename: impl AsRef<Path>) -> Result<()> {
    grid.check_scalar_shape(&wind.shape()[..2])?;
    let mut writer = Writer::from_path(filename)?;
    for i in 0..grid.nx() {
        for j in 0..grid.ny() {
            let (x, y) = grid.coordinates(i, j);
            writer.serialize(WindData {
                x,
                y,
                wx: wind[[i, j, 0]],
                wy: wind[[i, j, 1]],
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// `step,time,max_norm` per recorded snapshot.
pub fn write_history(trajectory: &Trajectory, filename: impl AsRef<Path>) -> Result<()> {
    let mut writer = Writer::from_path(filename)?;
    for (snapshot, max_norm) in trajectory.snapshots().iter().zip(trajectory.max_norms()) {
        writer.serialize(HistoryData {
            step: snapshot.step,
            time: snapshot.time,
            max_norm,
        })?;
    }
    writer.flush()?;
    Ok(())
}
