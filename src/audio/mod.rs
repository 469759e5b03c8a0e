pub mod chime;

use chime::AlertChime;

use log::warn;
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

enum AudioCommand {
    PlayCue { source_path: Option<PathBuf> },
}

/// Plays the break alert cue. A dedicated thread owns the non-Send rodio
/// output objects; callers only ever post a command and move on, so a broken
/// audio stack can never stall the scheduler or a running break.
#[derive(Clone)]
pub struct AlertPlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl AlertPlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Fire-and-forget. Uses the user's sound file when it decodes, the
    /// synthesized chime otherwise.
    pub fn play_cue(&self, source_path: Option<PathBuf>) {
        match self.ensure_thread() {
            Ok(tx) => {
                if tx.send(AudioCommand::PlayCue { source_path }).is_err() {
                    warn!("audio thread is gone; alert cue dropped");
                }
            }
            Err(err) => warn!("audio unavailable: {err}"),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        let mut guard = self.tx.lock().map_err(|e| e.to_string())?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Spawn dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("alert-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::PlayCue { source_path } => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                warn!("{err}");
                                continue;
                            }
                            let Some(ref s) = sink else { continue };

                            match source_path.and_then(open_custom_cue) {
                                Some(decoder) => s.append(decoder),
                                None => s.append(AlertChime::new()),
                            }
                            s.play();
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        *guard = Some(tx.clone());
        Ok(tx)
    }
}

impl Default for AlertPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn open_custom_cue(path: PathBuf) -> Option<Decoder<BufReader<File>>> {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            warn!("alert sound {} unreadable ({err}); using built-in chime", path.display());
            return None;
        }
    };

    match Decoder::new(BufReader::new(file)) {
        Ok(decoder) => Some(decoder),
        Err(err) => {
            warn!("alert sound {} undecodable ({err}); using built-in chime", path.display());
            None
        }
    }
}
