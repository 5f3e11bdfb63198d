//! Background loading of session inputs.

use std::{
    io,
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread::{self, JoinHandle},
};

use gridfall_core::SessionData;

/// Source of the map, catalog and tunables a session is built from.
pub trait MapSupplier: Send + 'static {
    /// Produces the session inputs. May block on I/O.
    fn load(&mut self) -> Result<SessionData, LoadError>;
}

impl<F> MapSupplier for F
where
    F: FnMut() -> Result<SessionData, LoadError> + Send + 'static,
{
    fn load(&mut self) -> Result<SessionData, LoadError> {
        self()
    }
}

/// Failures raised while obtaining session inputs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The source could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Location that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The source was read but its contents were malformed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Location that failed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// The worker thread could not be started.
    #[error("failed to start the map loader thread")]
    Spawn(#[source] io::Error),
    /// The worker stopped without delivering a result.
    #[error("map loader stopped before delivering a result")]
    Disconnected,
}

/// Runs a [`MapSupplier`] on a dedicated thread and hands back its result.
#[derive(Debug)]
pub struct MapLoader {
    results: Receiver<Result<SessionData, LoadError>>,
    thread: Option<JoinHandle<()>>,
}

impl MapLoader {
    /// Starts loading on a named worker thread.
    pub fn spawn<S>(mut supplier: S) -> Result<Self, LoadError>
    where
        S: MapSupplier,
    {
        let (sender, results) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("gridfall-map-loader".to_owned())
            .spawn(move || {
                let result = supplier.load();
                if let Err(error) = &result {
                    tracing::warn!(%error, "map supplier failed");
                }
                let _ = sender.send(result);
            })
            .map_err(LoadError::Spawn)?;

        Ok(Self {
            results,
            thread: Some(thread),
        })
    }

    /// Returns the result if it already arrived, without blocking.
    pub fn try_take(&self) -> Option<Result<SessionData, LoadError>> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected)),
        }
    }

    /// Blocks until the worker delivers its result.
    pub fn wait(self) -> Result<SessionData, LoadError> {
        self.results
            .recv()
            .unwrap_or(Err(LoadError::Disconnected))
    }
}

impl Drop for MapLoader {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::mpsc,
        time::Duration,
    };

    use gridfall_core::MapDefinition;

    use super::*;

    #[test]
    fn delivers_supplier_output() {
        let loader = MapLoader::spawn(|| {
            Ok(SessionData {
                map: MapDefinition {
                    tiles: vec![vec![3, 0]],
                    ..MapDefinition::default()
                },
                ..SessionData::default()
            })
        })
        .expect("spawn");

        let data = loader.wait().expect("loaded");
        assert_eq!(data.map.tiles, vec![vec![3, 0]]);
    }

    #[test]
    fn surfaces_supplier_errors() {
        let loader = MapLoader::spawn(|| {
            Err(LoadError::Parse {
                path: PathBuf::from("broken.toml"),
                message: "expected table".to_owned(),
            })
        })
        .expect("spawn");

        assert!(matches!(loader.wait(), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn try_take_does_not_block_on_slow_suppliers() {
        let (release, gate) = mpsc::channel::<()>();
        let loader = MapLoader::spawn(move || {
            let _ = gate.recv_timeout(Duration::from_secs(5));
            Ok(SessionData::default())
        })
        .expect("spawn");

        assert!(loader.try_take().is_none());
        release.send(()).expect("worker alive");
        assert!(loader.wait().is_ok());
    }
}
