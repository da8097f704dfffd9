//! Trajectory writer for jobs that produce trajectories.
//!
//! `create` fixes the atom subset, dtype and compression; each
//! `dump_configuration` appends one frame taken from a full-system view;
//! `close` finalises the offset table. A file that was never closed is
//! rejected by the reader.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use nscat_core::{ChemicalSystem, NscatError, NscatResult};

use crate::file::{
    encode_frame, CoordData, Compression, Dtype, FileHeader, Footer, FrameRecord, FORMAT_VERSION,
    MAGIC, TAIL_MAGIC,
};
use crate::frame::FrameView;

pub struct TrajectoryWriter {
    file: BufWriter<File>,
    path: PathBuf,
    subset: Option<Vec<u32>>,
    source_atoms: usize,
    declared_steps: usize,
    dtype: Dtype,
    compression: Compression,
    offsets: Vec<u64>,
    times: Vec<f64>,
    any_velocities: bool,
}

impl TrajectoryWriter {
    /// Open a new trajectory for writing. `subset` restricts the stored
    /// atoms (sorted unique indices into `system`); the written header
    /// carries the corresponding sub-system so the output is
    /// self-describing.
    pub fn create(
        path: impl AsRef<Path>,
        system: &ChemicalSystem,
        n_steps: usize,
        subset: Option<&[u32]>,
        dtype: Dtype,
        compression: Compression,
    ) -> NscatResult<Self> {
        let path = path.as_ref().to_path_buf();
        let stored_system = match subset {
            Some(indices) => system.subset(indices)?,
            None => system.clone(),
        };
        let header = FileHeader {
            version: FORMAT_VERSION,
            system: stored_system,
            declared_steps: n_steps as u64,
            dtype,
            compression,
        };
        let header_buf = bincode::serialize(&header)
            .map_err(|e| NscatError::Parse(format!("header encode: {e}")))?;

        let mut file = BufWriter::new(File::create(&path)?);
        file.write_all(MAGIC)?;
        file.write_all(&(header_buf.len() as u64).to_le_bytes())?;
        file.write_all(&header_buf)?;

        Ok(Self {
            file,
            path,
            subset: subset.map(|s| s.to_vec()),
            source_atoms: system.n_atoms(),
            declared_steps: n_steps,
            dtype,
            compression,
            offsets: Vec::with_capacity(n_steps),
            times: Vec::with_capacity(n_steps),
            any_velocities: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> usize {
        self.offsets.len()
    }

    /// Append one frame. `frame` is a full-system view; the subset is
    /// extracted here. `time` overrides the frame's own stamp.
    pub fn dump_configuration(&mut self, frame: &FrameView, time: f64) -> NscatResult<()> {
        if self.offsets.len() >= self.declared_steps {
            return Err(NscatError::InputData(format!(
                "trajectory writer declared {} steps, refusing to write more",
                self.declared_steps
            )));
        }
        if frame.n_atoms() != self.source_atoms {
            return Err(NscatError::InputData(format!(
                "frame has {} atoms, writer expects {}",
                frame.n_atoms(),
                self.source_atoms
            )));
        }

        let coords = self.extract(&frame.coords);
        let velocities = frame.velocities.as_ref().map(|v| self.extract(v));
        if velocities.is_some() {
            self.any_velocities = true;
        }
        let record = FrameRecord {
            time,
            cell: *frame.unit_cell.basis(),
            coords: CoordData::from_f64(&coords, self.dtype),
            velocities: velocities.map(|v| CoordData::from_f64(&v, self.dtype)),
        };
        let payload = encode_frame(&record, self.compression)?;

        let offset = self.file.stream_position()?;
        self.file
            .write_all(&(payload.len() as u64).to_le_bytes())?;
        self.file.write_all(&payload)?;
        self.offsets.push(offset);
        self.times.push(time);
        Ok(())
    }

    fn extract(&self, data: &[[f64; 3]]) -> Vec<[f64; 3]> {
        match &self.subset {
            Some(indices) => indices.iter().map(|&i| data[i as usize]).collect(),
            None => data.to_vec(),
        }
    }

    /// Write the footer and flush. Must be called for the file to be
    /// readable.
    pub fn close(mut self) -> NscatResult<()> {
        let md_time_step = if self.times.len() >= 2 {
            self.times[1] - self.times[0]
        } else {
            1.0
        };
        let footer = Footer {
            offsets: std::mem::take(&mut self.offsets),
            md_time_step,
            has_velocities: self.any_velocities,
        };
        let footer_buf = bincode::serialize(&footer)
            .map_err(|e| NscatError::Parse(format!("footer encode: {e}")))?;
        self.file.write_all(&footer_buf)?;
        self.file
            .write_all(&(footer_buf.len() as u64).to_le_bytes())?;
        self.file.write_all(TAIL_MAGIC)?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Trajectory;
    use nscat_core::{ChemicalSystemBuilder, UnitCell};

    fn system(n: usize) -> ChemicalSystem {
        let mut b = ChemicalSystemBuilder::new("test");
        for i in 0..n {
            b.add_atom("O", &format!("O{i}"));
        }
        b.build()
    }

    fn frame(i: usize, n: usize) -> FrameView {
        let coords = (0..n)
            .map(|a| [i as f64 + 0.125 * a as f64, -(a as f64), 0.5])
            .collect();
        FrameView::new(i as f64 * 0.5, UnitCell::cubic(12.0), coords)
    }

    fn round_trip(dtype: Dtype, compression: Compression) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ntj");
        let sys = system(3);
        let mut writer =
            TrajectoryWriter::create(&path, &sys, 4, None, dtype, compression).unwrap();
        for i in 0..4 {
            writer.dump_configuration(&frame(i, 3), i as f64 * 0.5).unwrap();
        }
        writer.close().unwrap();

        let traj = Trajectory::open(&path).unwrap();
        assert_eq!(traj.len(), 4);
        assert!((traj.md_time_step() - 0.5).abs() < 1e-12);
        let mut reader = traj.reader().unwrap();
        for i in 0..4 {
            let got = reader.frame(i).unwrap();
            let want = frame(i, 3);
            for (g, w) in got.coords.iter().zip(want.coords.iter()) {
                for d in 0..3 {
                    // Values chosen representable in f32, so both dtypes
                    // round-trip exactly.
                    assert!((g[d] - w[d]).abs() < 1e-12);
                }
            }
            assert_eq!(got.unit_cell, want.unit_cell);
        }
    }

    #[test]
    fn round_trip_uncompressed_f64() {
        round_trip(Dtype::F64, Compression::None);
    }

    #[test]
    fn round_trip_zstd_f64() {
        round_trip(Dtype::F64, Compression::Zstd);
    }

    #[test]
    fn round_trip_zstd_f32() {
        round_trip(Dtype::F32, Compression::Zstd);
    }

    #[test]
    fn subset_writer_stores_subsystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subset.ntj");
        let sys = system(4);
        let mut writer = TrajectoryWriter::create(
            &path,
            &sys,
            1,
            Some(&[1, 3]),
            Dtype::F64,
            Compression::None,
        )
        .unwrap();
        writer.dump_configuration(&frame(0, 4), 0.0).unwrap();
        writer.close().unwrap();

        let traj = Trajectory::open(&path).unwrap();
        assert_eq!(traj.chemical_system().n_atoms(), 2);
        let mut reader = traj.reader().unwrap();
        let got = reader.frame(0).unwrap();
        assert!((got.coords[0][0] - 0.125).abs() < 1e-12);
        assert!((got.coords[1][0] - 0.375).abs() < 1e-12);
    }

    #[test]
    fn writer_rejects_overflow_and_unclosed_files_are_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.ntj");
        let sys = system(2);
        let mut writer =
            TrajectoryWriter::create(&path, &sys, 1, None, Dtype::F64, Compression::None).unwrap();
        writer.dump_configuration(&frame(0, 2), 0.0).unwrap();
        assert!(writer.dump_configuration(&frame(1, 2), 1.0).is_err());
        drop(writer);
        assert!(Trajectory::open(&path).is_err());
    }
}
