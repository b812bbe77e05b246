// THEORY:
// The `Player` is the driver that turns the per-frame pipeline into actual
// playback. It owns the playlist, the tick cadence, and the single pipeline
// instance, and it is the execution-context boundary the concurrency model
// hinges on:
//
// 1.  Decomposition is CPU-bound and touches no shared state, so each tick
//     ships it to `spawn_blocking` with a cloned decomposer and gets a plain
//     value (the frame target) back.
// 2.  Reconciliation mutates the surface pool, so it always runs on the
//     player's own context, after the decomposition result arrives. It can
//     never race with itself because the player processes one frame at a
//     time.
// 3.  At most one frame is in flight. A tick that lands while the previous
//     frame is still processing is skipped outright, never queued; the next
//     tick supplies a fresher frame anyway.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use tokio::time::MissedTickBehavior;
use walkdir::WalkDir;

use crate::core_modules::decomposer::ImageSource;
use crate::core_modules::surface::SurfaceFactory;
use crate::error::PlayerError;
use crate::pipeline::{FramePipeline, PlayerConfig};

/// Playable image extensions, matched case-insensitively.
const PLAYABLE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// What one tick of the player did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was decomposed and applied; `surfaces` is the live pool size.
    Rendered { surfaces: usize },
    /// The previous frame was still in flight; this tick did nothing.
    Skipped,
    /// The playlist is exhausted and the pool has been torn down.
    Finished,
}

/// Timer-driven playback over an image-sequence folder.
pub struct Player<F: SurfaceFactory, S: ImageSource + 'static> {
    pipeline: FramePipeline<F>,
    source: Arc<S>,
    files: Vec<PathBuf>,
    index: usize,
    config: PlayerConfig,
    /// Re-entrancy guard: set while a frame is being processed.
    in_flight: AtomicBool,
    finished: bool,
}

impl<F: SurfaceFactory, S: ImageSource + 'static> Player<F, S> {
    /// Builds a player over the image files in `folder`. Fails when the
    /// config is invalid or the folder holds nothing playable.
    pub fn new(
        config: PlayerConfig,
        folder: &Path,
        source: S,
        factory: F,
    ) -> Result<Self, PlayerError> {
        config.validate()?;
        let files = scan_playlist(folder)?;
        info!("playlist: {} frames from {}", files.len(), folder.display());
        Ok(Self {
            pipeline: FramePipeline::new(&config, factory),
            source: Arc::new(source),
            files,
            index: 0,
            config,
            in_flight: AtomicBool::new(false),
            finished: false,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    /// Index of the next frame to play.
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn pipeline(&self) -> &FramePipeline<F> {
        &self.pipeline
    }

    /// Processes one frame: decompose off-thread, reconcile here, advance.
    /// Skips (does not queue) when the previous frame is still in flight.
    pub async fn tick(&mut self) -> Result<TickOutcome, PlayerError> {
        if self.finished {
            return Ok(TickOutcome::Finished);
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("tick skipped: previous frame still in flight");
            return Ok(TickOutcome::Skipped);
        }
        let outcome = self.process_frame().await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn process_frame(&mut self) -> Result<TickOutcome, PlayerError> {
        if self.index >= self.files.len() {
            self.stop()?;
            return Ok(TickOutcome::Finished);
        }

        let path = self.files[self.index].clone();
        let decomposer = self.pipeline.decomposer().clone();
        let source = Arc::clone(&self.source);
        let target =
            tokio::task::spawn_blocking(move || decomposer.decompose_source(source.as_ref(), &path))
                .await?;

        let surfaces = self.pipeline.apply(&target)?;
        debug!(
            "frame {}/{}: {} surfaces",
            self.index + 1,
            self.files.len(),
            surfaces
        );
        self.index += 1;
        Ok(TickOutcome::Rendered { surfaces })
    }

    /// Stops playback and tears the pool down synchronously.
    pub fn stop(&mut self) -> Result<(), PlayerError> {
        self.pipeline.teardown()?;
        self.finished = true;
        Ok(())
    }

    /// Plays the whole sequence at the configured frame interval. Returns
    /// once the playlist is exhausted and the pool is torn down.
    pub async fn run(&mut self) -> Result<(), PlayerError> {
        let mut ticker = tokio::time::interval(self.config.frame_interval);
        // One tick = one frame. Ticks missed while a slow frame was in
        // flight are dropped, not replayed in a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.tick().await? == TickOutcome::Finished {
                info!("playback finished after {} frames", self.index);
                return Ok(());
            }
        }
    }
}

/// Enumerates the playable image files directly inside `folder`, sorted by
/// path so frame order follows file naming.
pub fn scan_playlist(folder: &Path) -> Result<Vec<PathBuf>, PlayerError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| PlayerError::PlaylistScan {
            path: folder.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let playable = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                PLAYABLE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if playable {
            files.push(entry.into_path());
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(PlayerError::EmptyPlaylist(folder.to_path_buf()));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::decomposer::FsImageSource;
    use crate::core_modules::surface::InMemorySurfaceFactory;
    use image::{Rgb, RgbImage};
    use std::fs;
    use tempfile::TempDir;

    fn test_config() -> PlayerConfig {
        PlayerConfig {
            display_width: 100,
            display_height: 100,
            step_size: 20,
            ..PlayerConfig::default()
        }
    }

    /// Writes a two-frame playlist: a half-dark frame, then an all-bright one.
    fn write_playlist(dir: &Path) {
        let mut dark = RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]));
        for y in 0..100 {
            for x in 0..60 {
                dark.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        dark.save(dir.join("frame_0001.png")).unwrap();
        RgbImage::from_pixel(100, 100, Rgb([255, 255, 255]))
            .save(dir.join("frame_0002.png"))
            .unwrap();
    }

    #[test]
    fn playlist_scan_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let touch = |name: &str| fs::write(dir.path().join(name), b"").unwrap();
        touch("b.png");
        touch("a.JPG");
        touch("notes.txt");
        touch("c.jpeg");
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = scan_playlist(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.jpeg"]);
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_playlist(dir.path()).unwrap_err();
        assert!(matches!(err, PlayerError::EmptyPlaylist(_)));
    }

    #[tokio::test]
    async fn ticks_play_through_and_finish() {
        let dir = TempDir::new().unwrap();
        write_playlist(dir.path());
        let mut player = Player::new(
            test_config(),
            dir.path(),
            FsImageSource,
            InMemorySurfaceFactory::new(),
        )
        .unwrap();
        assert_eq!(player.frame_count(), 2);

        // Frame 1: the dark half becomes one surface.
        assert_eq!(
            player.tick().await.unwrap(),
            TickOutcome::Rendered { surfaces: 1 }
        );
        // Frame 2: all bright, pool shrinks to nothing.
        assert_eq!(
            player.tick().await.unwrap(),
            TickOutcome::Rendered { surfaces: 0 }
        );
        // Playlist exhausted: teardown and Finished, stable thereafter.
        assert_eq!(player.tick().await.unwrap(), TickOutcome::Finished);
        assert_eq!(player.tick().await.unwrap(), TickOutcome::Finished);
        assert_eq!(player.pipeline().factory().live_count(), 0);
    }

    #[tokio::test]
    async fn in_flight_guard_skips_instead_of_queueing() {
        let dir = TempDir::new().unwrap();
        write_playlist(dir.path());
        let mut player = Player::new(
            test_config(),
            dir.path(),
            FsImageSource,
            InMemorySurfaceFactory::new(),
        )
        .unwrap();

        player.in_flight.store(true, Ordering::SeqCst);
        assert_eq!(player.tick().await.unwrap(), TickOutcome::Skipped);
        assert_eq!(player.current_index(), 0);

        player.in_flight.store(false, Ordering::SeqCst);
        assert_eq!(
            player.tick().await.unwrap(),
            TickOutcome::Rendered { surfaces: 1 }
        );
    }

    #[tokio::test]
    async fn undecodable_frame_renders_empty_and_playback_continues() {
        let dir = TempDir::new().unwrap();
        write_playlist(dir.path());
        // Shadow frame 1 with garbage bytes under a playable extension.
        fs::write(dir.path().join("frame_0000.png"), b"not a png").unwrap();

        let mut player = Player::new(
            test_config(),
            dir.path(),
            FsImageSource,
            InMemorySurfaceFactory::new(),
        )
        .unwrap();
        assert_eq!(player.frame_count(), 3);
        assert_eq!(
            player.tick().await.unwrap(),
            TickOutcome::Rendered { surfaces: 0 }
        );
        assert_eq!(
            player.tick().await.unwrap(),
            TickOutcome::Rendered { surfaces: 1 }
        );
    }

    #[tokio::test]
    async fn stop_mid_playback_tears_down() {
        let dir = TempDir::new().unwrap();
        write_playlist(dir.path());
        let mut player = Player::new(
            test_config(),
            dir.path(),
            FsImageSource,
            InMemorySurfaceFactory::new(),
        )
        .unwrap();
        player.tick().await.unwrap();
        assert_eq!(player.pipeline().surface_count(), 1);

        player.stop().unwrap();
        assert_eq!(player.pipeline().surface_count(), 0);
        assert_eq!(player.tick().await.unwrap(), TickOutcome::Finished);
    }
}
