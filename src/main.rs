//! Red light, green light for the terminal.
//!
//! While the light is green, type the displayed key sequence. While it is
//! red, freeze: the webcam compares every frame against a snapshot taken the
//! moment the light changed, and any key press or detected movement ends the
//! game. Finish the sequence before the countdown runs out to win.

mod assets;
mod audio;
mod camera;
mod game;
mod light;
mod motion;
mod screen;
mod sequence;

use anyhow::{Context, Result};
use assets::Assets;
use audio::Audio;
use camera::{FrameSource, Webcam};
use crossterm::event::KeyCode;
use game::{COUNTDOWN_SECS, Game, Outcome, QUIT_KEY};
use image::{RgbImage, imageops};
use light::Phase;
use motion::MotionDetector;
use screen::Screen;
use sequence::SequenceTracker;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const ASSET_DIR: &str = "assets";
const CAMERA_INDEX: u32 = 0;
const START_KEY: char = 's';
/// Bounded key wait that also paces the loop.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);
/// Kill-screen flash cycles before waiting for acknowledgment.
const FLASH_CYCLES: u32 = 10;
const FLASH_FRAME: Duration = Duration::from_millis(80);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let assets = Assets::load(Path::new(ASSET_DIR)).context("loading game assets")?;
    let mut camera = Webcam::open(CAMERA_INDEX).context("opening camera")?;
    let audio = Audio::open();

    let mut screen = Screen::open()?;
    let result = run(&mut screen, &mut camera, &assets, &audio);
    // Restore the terminal before any error gets printed.
    screen.close()?;
    result
}

fn run(
    screen: &mut Screen,
    camera: &mut impl FrameSource,
    assets: &Assets,
    audio: &Audio,
) -> Result<()> {
    if !intro(screen, assets)? {
        info!("quit from intro");
        return Ok(());
    }

    let (cam_w, cam_h) = camera.dimensions();
    let tracker = SequenceTracker::generate(&mut rand::rng());
    info!(
        sequence = %tracker.keys().iter().collect::<String>(),
        "key sequence generated"
    );

    let mut game = Game::new(
        tracker,
        MotionDetector::for_frame_area(cam_w, cam_h),
        Instant::now(),
    );

    let outcome = loop {
        let frame = next_frame(camera)?;
        let key = screen.poll_key(POLL_TIMEOUT)?.map(map_key);

        let phase_before = game.phase();
        if let Some(outcome) = game.tick(Instant::now(), &frame, key) {
            break outcome;
        }
        if game.phase() != phase_before {
            match game.phase() {
                Phase::Green => audio.play_green(),
                Phase::Red => audio.play_red(),
            }
        }

        draw_hud(screen, assets, &game, &frame)?;
    };

    info!(?outcome, "game over");
    finish(screen, assets, audio, outcome)?;
    Ok(())
}

/// Reads the next camera frame, promoting a failure to an operational error
/// that ends the run without a game outcome.
fn next_frame(camera: &mut impl FrameSource) -> Result<RgbImage> {
    camera.read_frame().context("camera stopped delivering frames")
}

/// The character the engine sees for a key event. Keys without a character
/// become a null byte: it can never match the sequence, but it still counts
/// as a press, which matters during red light.
fn map_key(code: KeyCode) -> char {
    match code {
        KeyCode::Char(c) => c,
        KeyCode::Esc => QUIT_KEY,
        _ => '\0',
    }
}

/// Shows the intro until the start key is pressed. Returns `false` if the
/// player quit instead.
fn intro(screen: &mut Screen, assets: &Assets) -> Result<bool> {
    loop {
        screen.present(&assets.intro)?;
        match screen.poll_key(Duration::from_millis(50))? {
            Some(KeyCode::Char(START_KEY)) => return Ok(true),
            Some(KeyCode::Char(QUIT_KEY)) | Some(KeyCode::Esc) => return Ok(false),
            _ => {}
        }
    }
}

/// Composes one frame of gameplay: phase background, countdown, sequence
/// progress, and the live camera thumbnail in the top-right corner.
fn draw_hud(screen: &mut Screen, assets: &Assets, game: &Game, frame: &RgbImage) -> Result<()> {
    let (cw, ch) = screen.canvas_size();
    if cw < 8 || ch < 8 {
        return Ok(());
    }

    let background = match game.phase() {
        Phase::Green => &assets.green,
        Phase::Red => &assets.red,
    };
    let mut canvas = imageops::resize(background, cw, ch, imageops::FilterType::Triangle);

    // Camera thumbnail, top-right, a third of the canvas wide.
    let thumb_w = (cw / 3).max(1);
    let thumb_h = (thumb_w * frame.height() / frame.width().max(1)).max(1);
    let thumb = imageops::resize(frame, thumb_w, thumb_h, imageops::FilterType::Nearest);
    screen::blit(&mut canvas, &thumb, cw as i32 - thumb_w as i32, 0);

    // Countdown shades from green to red as time runs out.
    let spent = COUNTDOWN_SECS - game.countdown().min(COUNTDOWN_SECS);
    let color = screen::lerp(screen::GREEN, screen::RED, spent * 256 / COUNTDOWN_SECS);
    screen::draw_text(&mut canvas, 2, 2, &game.countdown().to_string(), color);

    // The target sequence: typed keys green, the expected key white, the rest gray.
    screen::draw_text(&mut canvas, 2, 10, "press", screen::WHITE);
    let base_x = 2 + 6 * screen::GLYPH_ADVANCE;
    for (i, key) in game.tracker().keys().iter().enumerate() {
        let color = if i < game.tracker().cursor() {
            screen::GREEN
        } else if i == game.tracker().cursor() {
            screen::WHITE
        } else {
            screen::GRAY
        };
        let x = base_x + i as i32 * (screen::GLYPH_ADVANCE + 2);
        screen::draw_text(&mut canvas, x, 10, &key.to_string(), color);
    }

    screen.present(&canvas)?;
    Ok(())
}

/// Terminal rendering for the outcome. A win shows the winner screen and
/// waits; losses flash the kill screen first; quitting skips the theatrics.
fn finish(screen: &mut Screen, assets: &Assets, audio: &Audio, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Win => {
            audio.play_win();
            screen.present(&assets.winner)?;
            screen.wait_key()?;
        }
        Outcome::LossQuit => {}
        Outcome::LossMovement | Outcome::LossWrongSequence | Outcome::LossTimeout => {
            audio.play_loss();
            for cycle in 0..FLASH_CYCLES {
                let mut canvas = assets.kill.clone();
                if cycle % 2 == 1 {
                    screen::dim(&mut canvas);
                }
                screen.present(&canvas)?;
                std::thread::sleep(FLASH_FRAME);
            }
            screen.present(&assets.kill)?;
            screen.wait_key()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera::CameraError;
    use nokhwa::NokhwaError;

    struct DeadCamera;

    impl FrameSource for DeadCamera {
        fn dimensions(&self) -> (u32, u32) {
            (64, 48)
        }

        fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
            Err(CameraError::Read(NokhwaError::ReadFrameError(
                "device disconnected".into(),
            )))
        }
    }

    #[test]
    fn failed_frame_read_is_an_operational_error() {
        let err = next_frame(&mut DeadCamera).unwrap_err();
        assert!(format!("{err:#}").contains("camera stopped delivering frames"));
    }

    #[test]
    fn every_key_event_counts_as_a_press() {
        assert_eq!(map_key(KeyCode::Char('a')), 'a');
        assert_eq!(map_key(KeyCode::Esc), QUIT_KEY);
        assert_eq!(map_key(KeyCode::Enter), '\0');
        assert_eq!(map_key(KeyCode::Left), '\0');
        assert_eq!(map_key(KeyCode::F(5)), '\0');
    }
}
