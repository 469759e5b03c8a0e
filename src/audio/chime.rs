use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const NOTE_SECONDS: f32 = 0.45;
const NOTES: [f32; 2] = [880.0, 1174.66]; // A5 then D6

/// Built-in two-note alert chime, used whenever no custom sound is configured
/// or the configured file fails to decode.
pub struct AlertChime {
    num_sample: usize,
    total_samples: usize,
}

impl AlertChime {
    pub fn new() -> Self {
        Self {
            num_sample: 0,
            total_samples: (SAMPLE_RATE as f32 * NOTE_SECONDS) as usize * NOTES.len(),
        }
    }
}

impl Default for AlertChime {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for AlertChime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }

        let samples_per_note = self.total_samples / NOTES.len();
        let note_index = (self.num_sample / samples_per_note).min(NOTES.len() - 1);
        let note_sample = self.num_sample % samples_per_note;

        let t = note_sample as f32 / SAMPLE_RATE as f32;
        // Exponential decay within each note keeps the cue soft-edged.
        let envelope = (-4.0 * t / NOTE_SECONDS).exp();
        let sample = (2.0 * PI * NOTES[note_index] * t).sin() * envelope;

        self.num_sample += 1;
        Some(sample * 0.2) // Lower amplitude to prevent clipping
    }
}

impl Source for AlertChime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(NOTE_SECONDS * NOTES.len() as f32))
    }
}
