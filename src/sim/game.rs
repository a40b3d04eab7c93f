//! Simulation driver
//!
//! Splits each external frame into bounded steps, ticks the runner, then
//! re-targets the camera and refills every generator. Large frames take more
//! ticks rather than longer ones, which keeps the boundary rewind in
//! [`Runner::tick`] accurate.

use super::camera::TrackingCamera;
use super::generator::{FillOptions, SkylineGenerator};
use super::runner::{GameEvent, Runner};
use crate::settings::{ConfigError, GameConfig};

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Jump key went down this frame
    pub jump_pressed: bool,
    /// Jump key went up this frame
    pub jump_released: bool,
    /// Start a new game (only honored while not playing)
    pub new_game: bool,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    runner: Runner,
    camera: TrackingCamera,
    obstacles: SkylineGenerator,
    skylines: Vec<SkylineGenerator>,
    playing: bool,
    events: Vec<GameEvent>,
}

impl Game {
    /// Validate `config` and build every component. No game is running until
    /// [`Game::start_new_game`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed;
        let obstacles = SkylineGenerator::new(&config.obstacles, seed);
        let skylines = config
            .skylines
            .iter()
            .enumerate()
            .map(|(i, skyline)| SkylineGenerator::new(skyline, seed.wrapping_add(i as u64 + 1)))
            .collect();

        Ok(Self {
            runner: Runner::new(config.runner.clone()),
            camera: TrackingCamera::new(&config.camera),
            obstacles,
            skylines,
            playing: false,
            events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn camera(&self) -> &TrackingCamera {
        &self.camera
    }

    pub fn obstacles(&self) -> &SkylineGenerator {
        &self.obstacles
    }

    pub fn skylines(&self) -> &[SkylineGenerator] {
        &self.skylines
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Distance readout: whole units travelled
    pub fn distance(&self) -> i64 {
        self.runner.position().x.floor() as i64
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn start_new_game(&mut self) {
        self.camera.start_new_game();
        // Obstacles first: the runner needs its starting segment
        let first = self.obstacles.start_new_game(&self.camera);
        self.runner.start_new_game(first, self.obstacles.pool());
        self.camera.track(self.runner.focus_point());

        for skyline in &mut self.skylines {
            skyline.start_new_game(&self.camera);
        }

        self.events.clear();
        self.playing = true;
        log::info!("New game started (seed {})", self.config.seed);
    }

    pub fn start_jumping(&mut self) {
        if self.playing {
            self.runner.start_jumping();
        }
    }

    pub fn end_jumping(&mut self) {
        if self.playing {
            self.runner.end_jumping();
        }
    }

    /// Handle one external frame: restart when idle, otherwise apply jump
    /// input and advance by `dt`. Returns whether a game is running.
    pub fn frame(&mut self, input: FrameInput, dt: f32) -> bool {
        if self.playing {
            if input.jump_pressed {
                self.runner.start_jumping();
            }
            if input.jump_released {
                self.runner.end_jumping();
            }
            self.update(dt);
        } else if input.new_game {
            self.start_new_game();
        }
        self.playing
    }

    /// Advance by `total_dt` seconds of wall time. Returns `false` once the
    /// runner has been destroyed.
    pub fn update(&mut self, total_dt: f32) -> bool {
        if !self.playing {
            return false;
        }

        let max_step = self.config.max_step;
        let mut remaining = total_dt.max(0.0);
        while remaining > max_step && self.playing {
            self.playing = self.runner.tick(max_step, self.obstacles.pool_mut());
            remaining -= max_step;
        }
        self.playing = self.playing && self.runner.tick(remaining, self.obstacles.pool_mut());
        self.events.extend(self.runner.drain_events());

        self.camera.track(self.runner.focus_point());

        let speed = self.runner.speed_x();
        self.obstacles.fill_view_with(
            &self.camera,
            FillOptions {
                extra_gap_length: speed * self.config.extra_gap_factor,
                extra_sequence_length: speed * self.config.extra_sequence_factor,
                keep: self.runner.current_segment(),
            },
        );
        for skyline in &mut self.skylines {
            skyline.fill_view(&self.camera);
        }

        if !self.playing {
            log::info!("Game over at distance {}", self.distance());
        }
        self.playing
    }
}
