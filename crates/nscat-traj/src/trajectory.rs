//! The trajectory view jobs consume: frame-count metadata plus a factory
//! for independent frame readers. `Trajectory` itself holds no file handle
//! and is cheap to clone; handles live in `FrameReader`, one per worker.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nscat_core::{ChemicalSystem, NscatError, NscatResult};

use crate::file::{self, Compression};
use crate::frame::FrameView;

#[derive(Debug, Clone)]
pub struct Trajectory {
    system: Arc<ChemicalSystem>,
    n_frames: usize,
    md_time_step: f64,
    has_velocities: bool,
    basename: String,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    File {
        path: PathBuf,
        offsets: Arc<Vec<u64>>,
        compression: Compression,
    },
    Memory {
        frames: Arc<Vec<FrameView>>,
    },
}

impl Trajectory {
    /// Open an on-disk trajectory read-only. Fails with an input-data
    /// error when the file is missing or its layout is not recognized.
    pub fn open(path: impl AsRef<Path>) -> NscatResult<Self> {
        let path = path.as_ref();
        let opened = file::open_container(path)?;
        let basename = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trajectory")
            .to_string();
        Ok(Self {
            system: Arc::new(opened.header.system),
            n_frames: opened.footer.offsets.len(),
            md_time_step: opened.footer.md_time_step,
            has_velocities: opened.footer.has_velocities,
            basename,
            source: Source::File {
                path: path.to_path_buf(),
                offsets: Arc::new(opened.footer.offsets),
                compression: opened.header.compression,
            },
        })
    }

    pub(crate) fn from_parts(
        system: Arc<ChemicalSystem>,
        md_time_step: f64,
        frames: Vec<FrameView>,
    ) -> NscatResult<Self> {
        let has_velocities = frames.first().map(|f| f.velocities.is_some()).unwrap_or(false);
        for (i, frame) in frames.iter().enumerate() {
            if frame.n_atoms() != system.n_atoms() {
                return Err(NscatError::InputData(format!(
                    "frame {i} has {} atoms, system has {}",
                    frame.n_atoms(),
                    system.n_atoms()
                )));
            }
            if frame.velocities.is_some() != has_velocities {
                return Err(NscatError::InputData(format!(
                    "frame {i} breaks the velocity layout of the trajectory"
                )));
            }
        }
        let basename = system.name().to_string();
        Ok(Self {
            system,
            n_frames: frames.len(),
            md_time_step,
            has_velocities,
            basename,
            source: Source::Memory {
                frames: Arc::new(frames),
            },
        })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.n_frames
    }

    pub fn is_empty(&self) -> bool {
        self.n_frames == 0
    }

    /// Time between consecutive frames in ps.
    pub fn md_time_step(&self) -> f64 {
        self.md_time_step
    }

    pub fn has_velocities(&self) -> bool {
        self.has_velocities
    }

    pub fn chemical_system(&self) -> &ChemicalSystem {
        &self.system
    }

    pub fn system_arc(&self) -> Arc<ChemicalSystem> {
        Arc::clone(&self.system)
    }

    /// File stem for on-disk trajectories, system name for in-memory
    /// ones. This is the user-definition target key.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Per-frame variables this trajectory can serve.
    pub fn variables(&self) -> Vec<String> {
        let mut names = vec!["coordinates".to_string()];
        if self.has_velocities {
            names.push("velocities".to_string());
        }
        names
    }

    /// A new independent reader. For on-disk trajectories each reader owns
    /// its own file handle, so one reader per worker gives lock-free reads.
    pub fn reader(&self) -> NscatResult<FrameReader> {
        let inner = match &self.source {
            Source::File {
                path,
                offsets,
                compression,
            } => ReaderInner::File {
                file: BufReader::new(File::open(path)?),
                offsets: Arc::clone(offsets),
                compression: *compression,
            },
            Source::Memory { frames } => ReaderInner::Memory {
                frames: Arc::clone(frames),
            },
        };
        Ok(FrameReader {
            system: Arc::clone(&self.system),
            n_frames: self.n_frames,
            inner,
        })
    }

    /// Release the trajectory. Readers hold their own handles, so this is
    /// a plain drop; the method exists to make the lifecycle explicit at
    /// job finalization.
    pub fn close(self) {}
}

pub struct FrameReader {
    system: Arc<ChemicalSystem>,
    n_frames: usize,
    inner: ReaderInner,
}

enum ReaderInner {
    File {
        file: BufReader<File>,
        offsets: Arc<Vec<u64>>,
        compression: Compression,
    },
    Memory {
        frames: Arc<Vec<FrameView>>,
    },
}

impl FrameReader {
    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    pub fn chemical_system(&self) -> &ChemicalSystem {
        &self.system
    }

    /// Read one frame. Out-of-range indices carry the frame index in the
    /// error so runtime failures can be located.
    pub fn frame(&mut self, index: usize) -> NscatResult<FrameView> {
        if index >= self.n_frames {
            return Err(NscatError::InputData(format!(
                "frame index {index} out of range ({} frames)",
                self.n_frames
            )));
        }
        match &mut self.inner {
            ReaderInner::File {
                file,
                offsets,
                compression,
            } => file::read_frame_at(file, offsets[index], *compression),
            ReaderInner::Memory { frames } => Ok(frames[index].clone()),
        }
    }

    /// Lazy bulk access to one per-frame variable: frames are read on
    /// demand as the iterator advances, so a whole-trajectory sweep never
    /// materialises more than one frame.
    pub fn variable(&mut self, name: &str) -> NscatResult<VariableSeries<'_>> {
        match name {
            "coordinates" => {}
            "velocities" => {
                if self.n_frames > 0 && self.frame(0)?.velocities.is_none() {
                    return Err(NscatError::InputData(
                        "trajectory carries no velocities".to_string(),
                    ));
                }
            }
            other => {
                return Err(NscatError::InputData(format!(
                    "unknown trajectory variable '{other}'"
                )))
            }
        }
        Ok(VariableSeries {
            reader: self,
            variable: name.to_string(),
            next: 0,
        })
    }

    /// Weighted centroid of `indices` over the frame slice
    /// `first..last:step`, for the given per-frame variable. With one atom
    /// and unit weight this is that atom's own series. Weights default
    /// to 1 and the centroid is normalized by their sum.
    pub fn read_particle_trajectory(
        &mut self,
        indices: &[u32],
        first: usize,
        last: usize,
        step: usize,
        variable: &str,
        weights: Option<&[f64]>,
    ) -> NscatResult<Vec<[f64; 3]>> {
        if step == 0 {
            return Err(NscatError::InputData("frame step must be positive".into()));
        }
        if indices.is_empty() {
            return Err(NscatError::InputData("empty atom index list".into()));
        }
        let n_atoms = self.system.n_atoms() as u32;
        for &idx in indices {
            if idx >= n_atoms {
                return Err(NscatError::InputData(format!(
                    "atom index {idx} out of bounds ({n_atoms} atoms)"
                )));
            }
        }
        if let Some(w) = weights {
            if w.len() != indices.len() {
                return Err(NscatError::InputData(format!(
                    "{} weights for {} atoms",
                    w.len(),
                    indices.len()
                )));
            }
        }
        let weight_sum: f64 = match weights {
            Some(w) => w.iter().sum(),
            None => indices.len() as f64,
        };
        if weight_sum == 0.0 {
            return Err(NscatError::InputData("weights sum to zero".into()));
        }

        let mut series = Vec::new();
        let mut frame_index = first;
        while frame_index < last {
            let frame = self.frame(frame_index)?;
            let data: &[[f64; 3]] = match variable {
                "coordinates" => &frame.coords,
                "velocities" => frame.velocities.as_deref().ok_or_else(|| {
                    NscatError::InputData(format!(
                        "frame {frame_index} carries no velocities"
                    ))
                })?,
                other => {
                    return Err(NscatError::InputData(format!(
                        "unknown trajectory variable '{other}'"
                    )))
                }
            };
            let mut acc = [0.0f64; 3];
            for (k, &idx) in indices.iter().enumerate() {
                let w = weights.map(|w| w[k]).unwrap_or(1.0);
                let r = data[idx as usize];
                acc[0] += w * r[0];
                acc[1] += w * r[1];
                acc[2] += w * r[2];
            }
            series.push([
                acc[0] / weight_sum,
                acc[1] / weight_sum,
                acc[2] / weight_sum,
            ]);
            frame_index += step;
        }
        Ok(series)
    }
}

/// Iterator over one variable's per-frame `[N x 3]` values.
pub struct VariableSeries<'r> {
    reader: &'r mut FrameReader,
    variable: String,
    next: usize,
}

impl Iterator for VariableSeries<'_> {
    type Item = NscatResult<Vec<[f64; 3]>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.reader.n_frames() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let item = self.reader.frame(index).and_then(|frame| {
            if self.variable == "velocities" {
                frame.velocities.ok_or_else(|| {
                    NscatError::InputData(format!("frame {index} carries no velocities"))
                })
            } else {
                Ok(frame.coords)
            }
        });
        Some(item)
    }
}
