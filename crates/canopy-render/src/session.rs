//! Per-viewer session: every piece of mutable render state lives here and
//! changes only through `SessionCommand`s.

use std::collections::VecDeque;

use canopy_core::{TileLoad, ViewerConfig};

use crate::camera::OrbitCamera;
use crate::frame::FrameScheduler;
use crate::ray::Viewport;
use crate::renderer::{Framebuffer, TileRenderer};
use crate::scene::TileScene;

/// Mutations a host may apply to a session. Each one schedules a redraw.
#[derive(Debug)]
pub enum SessionCommand {
    Resize { width: u32, height: u32 },
    SetViewport(Viewport),
    Orbit { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    Zoom(f32),
    /// Jump to a normalized time in [0, 1].
    Scrub(f32),
    Play,
    Pause,
    TogglePlayback,
    InstallTile(Box<TileLoad>),
}

pub struct Session {
    renderer: TileRenderer,
    camera: OrbitCamera,
    scene: Option<TileScene>,
    framebuffer: Framebuffer,
    viewport: Viewport,
    scheduler: FrameScheduler,
    commands: VecDeque<SessionCommand>,
    time: f32,
    playing: bool,
    period_secs: f32,
}

impl Session {
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        let renderer = TileRenderer::new(config.render.clone());
        let framebuffer = Framebuffer::new(width, height, renderer.palette().background);
        let mut scheduler = FrameScheduler::new();
        scheduler.request();
        Self {
            camera: OrbitCamera::framing(config.render.tile_world_size),
            renderer,
            scene: None,
            framebuffer,
            viewport: Viewport::full(width, height),
            scheduler,
            commands: VecDeque::new(),
            time: 0.0,
            playing: config.playback.start_playing,
            period_secs: config.playback.period_secs,
        }
    }

    /// Queue a command; it applies at the start of the next `frame` call.
    pub fn push(&mut self, command: SessionCommand) {
        self.commands.push_back(command);
        self.scheduler.request();
    }

    /// Apply a command immediately.
    pub fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Resize { width, height } => {
                let clear = self.renderer.palette().background;
                self.framebuffer.resize(width, height, clear);
                self.viewport = Viewport::full(width, height);
            }
            SessionCommand::SetViewport(viewport) => self.viewport = viewport,
            SessionCommand::Orbit { dx, dy } => self.camera.orbit(dx, dy),
            SessionCommand::Pan { dx, dy } => self.camera.pan(dx, dy),
            SessionCommand::Zoom(delta) => self.camera.zoom(delta),
            SessionCommand::Scrub(t) => self.time = t.clamp(0.0, 1.0),
            SessionCommand::Play => self.playing = true,
            SessionCommand::Pause => self.playing = false,
            SessionCommand::TogglePlayback => self.playing = !self.playing,
            SessionCommand::InstallTile(tile) => {
                log::info!(
                    "Installing tile: {}x{} slots, years {}..={}",
                    tile.tree_rows_per_tile,
                    tile.tree_rows_per_tile,
                    tile.first_year,
                    tile.last_year
                );
                self.scene = Some(TileScene::new(*tile, self.renderer.config()));
            }
        }
        self.scheduler.request();
    }

    /// Run one frame if one is pending: drain queued commands, advance
    /// playback by `dt_secs`, and redraw. Returns whether a frame ran.
    pub fn frame(&mut self, dt_secs: f32) -> bool {
        while let Some(command) = self.commands.pop_front() {
            self.apply(command);
        }
        if !self.scheduler.begin_frame() {
            return false;
        }

        if self.playing {
            self.time = (self.time + dt_secs / self.period_secs).rem_euclid(1.0);
        }
        self.render();
        if self.playing {
            self.scheduler.request();
        }
        true
    }

    fn render(&mut self) {
        match &self.scene {
            Some(scene) => {
                let uniforms = self.camera.to_uniforms(self.viewport, self.time);
                self.renderer.render(scene, &uniforms, &mut self.framebuffer);
            }
            None => self.framebuffer.fill(self.renderer.palette().background),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn scene(&self) -> Option<&TileScene> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Calendar year on screen, once a tile is installed.
    pub fn current_year(&self) -> Option<f32> {
        self.scene.as_ref().map(|scene| scene.year_at(self.time))
    }
}
